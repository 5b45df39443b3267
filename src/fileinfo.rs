use crate::client::{EntryType, ListEntry};
use ftpfs_core::fs::{Error, ErrorKind, Metadata, Permissions, Result};
use std::{any::Any, time::SystemTime};

/// Metadata of a remote file or directory, taken from a directory listing.
///
/// This is a snapshot: it is produced each time `stat` or `readdir` lists the remote directory
/// and is never refreshed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileInfo {
    entry: ListEntry,
}

impl FileInfo {
    pub(crate) fn from_entry(entry: ListEntry) -> FileInfo {
        FileInfo { entry }
    }

    /// FTP can't list the root itself, so stat'ing `/` yields this stand-in.
    pub(crate) fn root() -> FileInfo {
        FileInfo {
            entry: ListEntry::new("/", 0, EntryType::Folder),
        }
    }

    /// The listing record this metadata was built from.
    pub fn entry(&self) -> &ListEntry {
        &self.entry
    }
}

impl Metadata for FileInfo {
    fn name(&self) -> &str {
        &self.entry.name
    }

    fn len(&self) -> u64 {
        self.entry.size
    }

    fn is_dir(&self) -> bool {
        self.entry.kind == EntryType::Folder
    }

    fn is_symlink(&self) -> bool {
        self.entry.kind == EntryType::Link
    }

    fn modified(&self) -> Result<SystemTime> {
        self.entry
            .modified
            .map(SystemTime::from)
            .ok_or_else(|| Error::new(ErrorKind::Unsupported, format!("no modification time listed for {}", self.entry.name)))
    }

    fn permissions(&self) -> Permissions {
        Permissions(self.entry.permissions.unwrap_or(0))
    }

    fn readlink(&self) -> Option<&str> {
        self.entry.target.as_deref()
    }

    fn sys(&self) -> Option<&(dyn Any + Send + Sync)> {
        Some(&self.entry)
    }
}
