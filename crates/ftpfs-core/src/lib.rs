//! Core traits and types for ftpfs backends.

pub mod fs;

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;
