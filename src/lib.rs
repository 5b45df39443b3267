//! Access a remote FTP server through the generic [`Filesystem`] interface of `ftpfs-core`.
//!
//! [`FtpFs`] maps filesystem operations onto FTP commands: `stat` and `readdir` become LIST,
//! `mkdir` MKD, `rename` RNFR/RNTO, `remove` DELE or RMD. Reads and writes go through an
//! [`FtpFile`] handle that lazily issues RETR or STOR on its first use. The wire protocol itself
//! is handled by the [`async_ftp`](https://docs.rs/async_ftp) crate behind the
//! [`FtpClient`](client::FtpClient) trait.
//!
//! ```no_run
//! use ftpfs::{File, Filesystem, FtpFs, Permissions};
//!
//! #[tokio::main]
//! pub async fn main() -> ftpfs::Result<()> {
//!     let fs = FtpFs::connect("test", "test", "localhost:21").await?;
//!     fs.mkdir("foo", Permissions(0o755)).await?;
//!
//!     let mut file = fs.create("foo/hello.txt").await?;
//!     file.write_str("hello\tworld!\n").await?;
//!     file.close().await?;
//!
//!     let mut file = fs.open("foo/hello.txt").await?;
//!     let mut content = Vec::new();
//!     file.read_to_end(&mut content).await?;
//!     file.close().await?;
//!
//!     fs.disconnect().await;
//!     Ok(())
//! }
//! ```
//!
//! Things FTP can't express return an error of kind [`ErrorKind::Unsupported`] rather than
//! pretending to succeed: `chmod`, `chtimes`, `link`, appending, and random access on file
//! handles.

pub mod client;
mod file;
mod fileinfo;
mod fs;
pub mod options;
mod path;

pub use file::FtpFile;
pub use fileinfo::FileInfo;
pub use fs::{FtpFs, NAME};
pub use ftpfs_core::fs::{Error, ErrorKind, File, Filesystem, Metadata, OpenFlags, Permissions, Result};
