use super::{ErrorKind, Result};
use std::{
    any::Any,
    fmt::{Formatter, Write},
    time::SystemTime,
};

/// Represents the metadata of a file or directory as seen through a [`Filesystem`].
///
/// [`Filesystem`]: trait.Filesystem.html
pub trait Metadata {
    /// The base name of the entry.
    fn name(&self) -> &str;

    /// Returns the length (size) of the file in bytes.
    fn len(&self) -> u64;

    /// Returns `self.len() == 0`.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns true if the path is a directory.
    fn is_dir(&self) -> bool;

    /// Returns true if the path is a symbolic link.
    fn is_symlink(&self) -> bool {
        false
    }

    /// Returns true if the path is a regular file.
    fn is_file(&self) -> bool {
        !self.is_dir() && !self.is_symlink()
    }

    /// Returns the last modified time of the path. Backends that cannot tell return an error of
    /// kind [`ErrorKind::Unsupported`].
    fn modified(&self) -> Result<SystemTime> {
        Err(ErrorKind::Unsupported.into())
    }

    /// Returns the `permissions` of the file. The default implementation reports no permission
    /// bits at all.
    fn permissions(&self) -> Permissions {
        Permissions(0)
    }

    /// The target of a symbolic link, if known.
    fn readlink(&self) -> Option<&str> {
        None
    }

    /// The backend specific record this metadata was derived from, if any.
    fn sys(&self) -> Option<&(dyn Any + Send + Sync)> {
        None
    }
}

/// Represents unix style permission bits of a file
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Permissions(pub u32);

const PERM_READ: u32 = 0b100100100;
const PERM_WRITE: u32 = 0b010010010;
const PERM_EXEC: u32 = 0b001001001;
const PERM_USER: u32 = 0b111000000;
const PERM_GROUP: u32 = 0b000111000;
const PERM_OTHERS: u32 = 0b000000111;

impl Permissions {
    /// Parses the nine `rwx` characters of an `ls -l` style mode string, e.g. `rwxr-x---`.
    /// Setuid/setgid/sticky markers (`s`, `S`, `t`, `T`) are read as their execute bit.
    pub fn from_symbolic(s: &str) -> Option<Permissions> {
        let bytes = s.as_bytes();
        if bytes.len() != 9 {
            return None;
        }
        let mut mode = 0;
        for (i, b) in bytes.iter().enumerate() {
            let bit = 1 << (8 - i);
            match (i % 3, *b) {
                (_, b'-') => {}
                (0, b'r') | (1, b'w') | (2, b'x' | b's' | b't') => mode |= bit,
                (2, b'S' | b'T') => {}
                _ => return None,
            }
        }
        Some(Permissions(mode))
    }
}

impl std::fmt::Display for Permissions {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_char(if self.0 & PERM_USER & PERM_READ > 0 { 'r' } else { '-' })?;
        f.write_char(if self.0 & PERM_USER & PERM_WRITE > 0 { 'w' } else { '-' })?;
        f.write_char(if self.0 & PERM_USER & PERM_EXEC > 0 { 'x' } else { '-' })?;
        f.write_char(if self.0 & PERM_GROUP & PERM_READ > 0 { 'r' } else { '-' })?;
        f.write_char(if self.0 & PERM_GROUP & PERM_WRITE > 0 { 'w' } else { '-' })?;
        f.write_char(if self.0 & PERM_GROUP & PERM_EXEC > 0 { 'x' } else { '-' })?;
        f.write_char(if self.0 & PERM_OTHERS & PERM_READ > 0 { 'r' } else { '-' })?;
        f.write_char(if self.0 & PERM_OTHERS & PERM_WRITE > 0 { 'w' } else { '-' })?;
        f.write_char(if self.0 & PERM_OTHERS & PERM_EXEC > 0 { 'x' } else { '-' })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn symbolic_permissions() {
        assert_eq!(Permissions::from_symbolic("rwxr-xr--"), Some(Permissions(0o754)));
        assert_eq!(Permissions::from_symbolic("rwsr-xr-t"), Some(Permissions(0o755)));
        assert_eq!(Permissions::from_symbolic("rwSr--r--"), Some(Permissions(0o644)));
        assert_eq!(Permissions::from_symbolic("rwx"), None);
        assert_eq!(Permissions::from_symbolic("xwrr-xr--"), None);
    }

    #[test]
    fn display_roundtrips_symbolic() {
        assert_eq!(Permissions(0o640).to_string(), "rw-r-----");
        assert_eq!(Permissions(0).to_string(), "---------");
    }
}
