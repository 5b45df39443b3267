//! Defines the service provider interface for filesystem back-end implementors.

use super::{Error, Metadata, Permissions};
use async_trait::async_trait;
use bitflags::bitflags;
use std::{fmt::Debug, io::SeekFrom, result, time::SystemTime};

/// Result type used by traits in this module
pub type Result<T> = result::Result<T, Error>;

bitflags! {
    /// Tells [`Filesystem::open_file`] how a file should be opened. Modelled after the flags of
    /// `open(2)`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct OpenFlags: u32 {
        /// Open for reading.
        const READ = 0b0000_0001;
        /// Open for writing.
        const WRITE = 0b0000_0010;
        /// Append to the end of the file when writing.
        const APPEND = 0b0000_0100;
        /// Create the file if it does not exist.
        const CREATE = 0b0000_1000;
        /// Used with `CREATE`: the file must not exist yet.
        const EXCLUSIVE = 0b0001_0000;
        /// Truncate the file when opening it for writing.
        const TRUNCATE = 0b0010_0000;
    }
}

impl OpenFlags {
    /// Returns true if the flags ask for any kind of write access.
    pub fn wants_write(&self) -> bool {
        self.intersects(OpenFlags::WRITE | OpenFlags::APPEND | OpenFlags::CREATE | OpenFlags::TRUNCATE)
    }
}

/// The `Filesystem` trait is implemented by back-ends that expose some storage (local disk, a
/// remote protocol, memory) through a common set of path addressed operations.
///
/// Operations a back-end cannot perform must return an error of kind
/// [`ErrorKind::Unsupported`](super::ErrorKind::Unsupported) rather than succeed silently. The
/// provided default implementations do exactly that.
#[async_trait]
pub trait Filesystem: Send + Sync + Debug {
    /// The concrete type of the file handles handed out by this back-end.
    type File: File<Metadata = Self::Metadata>;

    /// The concrete type of the _metadata_ used by this back-end.
    type Metadata: Metadata + Send + Sync;

    /// Implement to set the name of the back-end. By default it returns the type signature.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Returns a handle that will create or replace the file at `name` when written to.
    async fn create(&self, name: &str) -> Result<Self::File>;

    /// Returns a handle for reading the file at `name`.
    async fn open(&self, name: &str) -> Result<Self::File>;

    /// Generalized open call. The `perm` bits are applied when a file gets created, if the
    /// back-end supports permissions at all.
    async fn open_file(&self, name: &str, flags: OpenFlags, perm: Permissions) -> Result<Self::File>;

    /// Creates a directory.
    async fn mkdir(&self, name: &str, perm: Permissions) -> Result<()>;

    /// Creates a directory along with any missing parents. Succeeds if the directory already
    /// exists.
    async fn mkdir_all(&self, path: &str, perm: Permissions) -> Result<()>;

    /// Removes a file or an empty directory.
    async fn remove(&self, name: &str) -> Result<()>;

    /// Removes `path` and everything it contains. Succeeds if `path` does not exist.
    async fn remove_all(&self, path: &str) -> Result<()>;

    /// Renames a file or directory.
    async fn rename(&self, from: &str, to: &str) -> Result<()>;

    /// Returns the `Metadata` for the given path.
    async fn stat(&self, name: &str) -> Result<Self::Metadata>;

    /// Like [`stat`](Filesystem::stat) but does not follow symbolic links.
    async fn lstat(&self, name: &str) -> Result<Self::Metadata> {
        self.stat(name).await
    }

    /// Changes the permission bits of a path.
    async fn chmod(&self, _name: &str, _mode: Permissions) -> Result<()> {
        Err(Error::unsupported("chmod"))
    }

    /// Changes the access and modification times of a path.
    async fn chtimes(&self, _name: &str, _atime: SystemTime, _mtime: SystemTime) -> Result<()> {
        Err(Error::unsupported("chtimes"))
    }

    /// Creates `link` as a hard link to `original`.
    async fn link(&self, _original: &str, _link: &str) -> Result<()> {
        Err(Error::unsupported("link"))
    }
}

/// A handle to a single file (or directory) of a [`Filesystem`].
#[async_trait]
pub trait File: Send + Sync + Debug {
    /// The metadata type produced by [`stat`](File::stat) and [`readdir`](File::readdir).
    type Metadata: Metadata + Send + Sync;

    /// The path this handle was opened with.
    fn name(&self) -> &str;

    /// Reads some bytes into `buf`, returning how many were read. Zero means end of file.
    async fn read(&mut self, buf: &mut [u8]) -> Result<usize>;

    /// Reads from the given offset without moving the stream position.
    async fn read_at(&mut self, _buf: &mut [u8], _offset: u64) -> Result<usize> {
        Err(Error::unsupported("read_at"))
    }

    /// Reads until end of file, appending to `buf`.
    async fn read_to_end(&mut self, buf: &mut Vec<u8>) -> Result<usize> {
        let mut chunk = [0_u8; 8192];
        let mut total = 0;
        loop {
            let n = self.read(&mut chunk).await?;
            if n == 0 {
                return Ok(total);
            }
            buf.extend_from_slice(&chunk[..n]);
            total += n;
        }
    }

    /// Writes `buf`, returning how many bytes were accepted.
    async fn write(&mut self, buf: &[u8]) -> Result<usize>;

    /// Writes at the given offset without moving the stream position.
    async fn write_at(&mut self, _buf: &[u8], _offset: u64) -> Result<usize> {
        Err(Error::unsupported("write_at"))
    }

    /// Writes the UTF-8 bytes of `s`.
    async fn write_str(&mut self, s: &str) -> Result<usize> {
        self.write(s.as_bytes()).await
    }

    /// Moves the stream position.
    async fn seek(&mut self, _pos: SeekFrom) -> Result<u64> {
        Err(Error::unsupported("seek"))
    }

    /// Changes the size of the file.
    async fn truncate(&mut self, _size: u64) -> Result<()> {
        Err(Error::unsupported("truncate"))
    }

    /// Flushes buffered writes towards the back-end.
    async fn sync(&mut self) -> Result<()>;

    /// Releases the handle. Implementations must make a repeated close a no-op.
    async fn close(&mut self) -> Result<()>;

    /// Returns the metadata of the file this handle points at.
    async fn stat(&self) -> Result<Self::Metadata>;

    /// Lists the directory this handle points at.
    async fn readdir(&mut self, count: usize) -> Result<Vec<Self::Metadata>>;

    /// Lists the names in the directory this handle points at.
    async fn readdir_names(&mut self, count: usize) -> Result<Vec<String>>;
}
