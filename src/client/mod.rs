//! The [`FtpClient`] trait describes what [`FtpFs`](crate::FtpFs) needs from an FTP client
//! library. [`AsyncFtpClient`] implements it on top of the `async_ftp` crate.
//!
//! The FTP wire protocol itself is left entirely to the client library. Implement the trait for
//! another client to put `FtpFs` on top of it, or to drive `FtpFs` from an in-memory fake in tests.

mod ftp_stream;
pub mod list;

pub use ftp_stream::AsyncFtpClient;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use ftpfs_core::fs::{Error, Result};
use std::fmt::{self, Debug};
use tokio::io::AsyncRead;

/// What kind of entry a directory listing line describes.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum EntryType {
    /// A regular file
    File,
    /// A directory
    Folder,
    /// A symbolic link
    Link,
}

/// One entry of a remote directory listing, as reported by the server.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ListEntry {
    /// The base name of the entry.
    pub name: String,
    /// Size in bytes.
    pub size: u64,
    /// The type of entry.
    pub kind: EntryType,
    /// Last modification time, if the listing included one that could be parsed.
    pub modified: Option<DateTime<Utc>>,
    /// Unix permission bits, if the listing included them.
    pub permissions: Option<u32>,
    /// Where a symbolic link points to, if listed.
    pub target: Option<String>,
}

impl ListEntry {
    /// Creates a listing entry with only a name, a size and a type.
    pub fn new<S: Into<String>>(name: S, size: u64, kind: EntryType) -> ListEntry {
        ListEntry {
            name: name.into(),
            size,
            kind,
            modified: None,
            permissions: None,
            target: None,
        }
    }
}

/// The operations [`FtpFs`](crate::FtpFs) issues against a connected FTP session.
///
/// Implementations are expected to handle a single command at a time. `FtpFs` guarantees this by
/// keeping the client behind a mutex.
#[async_trait]
pub trait FtpClient: Send + Debug + 'static {
    /// Authenticates the session (USER/PASS).
    async fn login(&mut self, user: &str, password: &str) -> Result<()>;

    /// Switches to binary transfers (TYPE I).
    async fn binary(&mut self) -> Result<()>;

    /// Changes the working directory (CWD).
    async fn cwd(&mut self, path: &str) -> Result<()>;

    /// Returns the working directory (PWD).
    async fn pwd(&mut self) -> Result<String>;

    /// Ends the session (QUIT).
    async fn quit(&mut self) -> Result<()>;

    /// Lists a directory (LIST). `None` lists the working directory.
    async fn list(&mut self, path: Option<&str>) -> Result<Vec<ListEntry>>;

    /// Retrieves a file (RETR) and returns its content as a stream.
    async fn retrieve(&mut self, path: &str) -> Result<Box<dyn AsyncRead + Send + Sync + Unpin>>;

    /// Stores everything `reader` yields into `path` (STOR), starting at offset zero. Returns once
    /// the server has acknowledged the transfer.
    async fn store<R>(&mut self, path: &str, reader: R) -> Result<()>
    where
        R: AsyncRead + Send + Unpin + 'static;

    /// Renames a file or directory (RNFR/RNTO).
    async fn rename(&mut self, from: &str, to: &str) -> Result<()>;

    /// Creates a directory (MKD).
    async fn mkdir(&mut self, path: &str) -> Result<()>;

    /// Removes an empty directory (RMD).
    async fn rmdir(&mut self, path: &str) -> Result<()>;

    /// Deletes a file (DELE).
    async fn delete(&mut self, path: &str) -> Result<()>;
}

/// An error reply received from the FTP server. Errors of kind
/// [`ErrorKind::Rejected`](ftpfs_core::fs::ErrorKind::Rejected) carry one of these as their
/// source.
#[derive(Clone, PartialEq, Eq)]
pub struct Reply {
    code: Option<u32>,
    message: String,
}

impl Reply {
    /// Wraps a reply line. The three digit reply code is picked out of the text when present,
    /// e.g. `550 No such file` or `Expected code [257], got response: 550 No such file`.
    pub fn new<S: Into<String>>(message: S) -> Reply {
        let message = message.into();
        let code = parse_reply_code(&message);
        Reply { code, message }
    }

    /// The reply code, e.g. `550`.
    pub fn code(&self) -> Option<u32> {
        self.code
    }

    /// The full reply text.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Debug for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Reply({:?})", self.message)
    }
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for Reply {}

fn parse_reply_code(message: &str) -> Option<u32> {
    let line = message.rsplit_once("response: ").map_or(message, |(_, reply)| reply).trim_start();
    let code = line.get(..3)?;
    if code.bytes().all(|b| b.is_ascii_digit()) {
        code.parse().ok()
    } else {
        None
    }
}

/// Returns the FTP reply code behind an error, if the error came from a server reply.
pub fn reply_code(err: &Error) -> Option<u32> {
    std::error::Error::source(err)?.downcast_ref::<Reply>()?.code()
}
