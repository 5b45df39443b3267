use crate::BoxError;
use derive_more::Display;
use thiserror::Error;

/// The Error returned by filesystem backends. Backends should pick the `ErrorKind` carefully
/// since that is what callers match on to decide what went wrong.
#[derive(Debug, Error)]
#[error("filesystem error: {kind}")]
pub struct Error {
    kind: ErrorKind,
    #[source]
    source: Option<BoxError>,
}

impl Error {
    /// Creates a new filesystem error
    pub fn new<E>(kind: ErrorKind, error: E) -> Error
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        Error {
            kind,
            source: Some(error.into()),
        }
    }

    /// Creates an [`ErrorKind::Unsupported`] error naming the operation that is not available.
    pub fn unsupported(operation: &'static str) -> Error {
        Error::new(ErrorKind::Unsupported, format!("{operation} is not supported by this filesystem"))
    }

    /// Tells what kind of failure this is
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns true if this error means the path does not exist.
    pub fn is_not_found(&self) -> bool {
        self.kind == ErrorKind::NotFound
    }

    /// Attempts to get a reference to the inner `std::io::Error` if there is one.
    pub fn get_io_error(&self) -> Option<&std::io::Error> {
        self.source.as_ref()?.downcast_ref::<std::io::Error>()
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Error {
        Error { kind, source: None }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => Error::new(ErrorKind::NotFound, err),
            std::io::ErrorKind::AlreadyExists => Error::new(ErrorKind::AlreadyExists, err),
            std::io::ErrorKind::PermissionDenied => Error::new(ErrorKind::PermissionDenied, err),
            std::io::ErrorKind::TimedOut => Error::new(ErrorKind::Timeout, err),
            std::io::ErrorKind::ConnectionRefused
            | std::io::ErrorKind::ConnectionReset
            | std::io::ErrorKind::ConnectionAborted
            | std::io::ErrorKind::NotConnected
            | std::io::ErrorKind::BrokenPipe
            | std::io::ErrorKind::UnexpectedEof => Error::new(ErrorKind::ConnectionFailed, err),
            _ => Error::new(ErrorKind::LocalError, err),
        }
    }
}

/// The `ErrorKind` variants that can be produced by [`Filesystem`] and [`File`] implementations.
///
/// [`Filesystem`]: trait.Filesystem.html
/// [`File`]: trait.File.html
#[derive(Copy, Clone, Eq, PartialEq, Debug, Display)]
pub enum ErrorKind {
    /// There is no entry at the given path.
    #[display("file or directory not found")]
    NotFound,
    /// An entry exists at the path where the operation required there to be none.
    #[display("file or directory already exists")]
    AlreadyExists,
    /// The remote side refused access to the path.
    #[display("permission denied")]
    PermissionDenied,
    /// The transport to the remote side failed, for instance while dialing or in the middle of a
    /// transfer.
    #[display("connection failed")]
    ConnectionFailed,
    /// Establishing the connection took longer than allowed.
    #[display("connection timed out")]
    Timeout,
    /// The remote side did not accept the supplied credentials.
    #[display("login failed")]
    LoginFailed,
    /// The remote side answered a command with an error reply. The reply text is available as the
    /// error source.
    #[display("request rejected by the remote server")]
    Rejected,
    /// A background transfer did not complete.
    #[display("transfer failed")]
    TransferFailed,
    /// The backend does not implement the operation. Callers can match on this to detect
    /// capability gaps instead of relying on silent success.
    #[display("operation not supported")]
    Unsupported,
    /// The file handle is not in a state that permits the operation, e.g. reading from a handle
    /// that is being written, or using a handle after it was closed.
    #[display("invalid file handle state")]
    InvalidHandleState,
    /// The connection is held by an upload that hasn't been closed yet.
    #[display("connection busy")]
    ConnectionBusy,
    /// Any other local failure.
    #[display("local error")]
    LocalError,
}
