//! Contains the [`Filesystem`] and [`File`] traits that back-ends implement to expose their
//! storage through a generic, path addressed filesystem interface.
//!
//! The `ftpfs` crate provides an implementation on top of a remote FTP server. Other back-ends
//! (local disk, memory, other protocols) can implement the same traits so that callers can swap
//! them without code changes.
//!
//! A back-end implements:
//!
//! 1. [`Filesystem`] for the path addressed operations (`stat`, `mkdir`, `rename`, ...), handing
//!    out file handles from `open`/`create`.
//! 2. [`File`] for the handle's stream operations (`read`, `write`, `close`, `readdir`, ...).
//! 3. [`Metadata`] for the records returned by `stat` and `readdir`.
//!
//! Operations a back-end cannot carry out must fail with [`ErrorKind::Unsupported`]. The traits
//! provide default implementations that do so for the optional operations.

mod error;
pub use error::{Error, ErrorKind};

mod filesystem;
pub use filesystem::{File, Filesystem, OpenFlags, Result};

mod metadata;
pub use metadata::{Metadata, Permissions};
