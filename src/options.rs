//! Contains the options that can be given when connecting an [`FtpFs`](crate::FtpFs).

use std::{
    fmt::{self, Debug, Formatter},
    time::Duration,
};

/// How long dialing the server may take before giving up.
pub const DEFAULT_DIAL_TIMEOUT: Duration = Duration::from_secs(25);
/// The directory changed into after login. Servers that understand it map `~` to the home
/// directory of the logged in user.
pub const DEFAULT_HOME_DIR: &str = "~";
/// The user name used when no credentials are given.
pub const DEFAULT_USER: &str = "anonymous";

/// Describes how to connect and log in to an FTP server.
///
/// ```
/// use ftpfs::options::ConnectOptions;
/// use std::time::Duration;
///
/// let options = ConnectOptions::new("ftp.example.com:21")
///     .credentials("alice", "secret")
///     .dial_timeout(Duration::from_secs(5))
///     .home_dir("/pub");
/// assert_eq!(options.host(), "ftp.example.com:21");
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectOptions {
    pub(crate) host: String,
    pub(crate) user: String,
    pub(crate) password: String,
    pub(crate) dial_timeout: Duration,
    pub(crate) home_dir: Option<String>,
    pub(crate) binary: bool,
}

impl ConnectOptions {
    /// Creates options for connecting to `host`, given as `host:port`.
    pub fn new<S: Into<String>>(host: S) -> Self {
        ConnectOptions {
            host: host.into(),
            user: DEFAULT_USER.to_string(),
            password: String::new(),
            dial_timeout: DEFAULT_DIAL_TIMEOUT,
            home_dir: Some(DEFAULT_HOME_DIR.to_string()),
            binary: true,
        }
    }

    /// Sets the user name and password to log in with.
    pub fn credentials<U: Into<String>, P: Into<String>>(mut self, user: U, password: P) -> Self {
        self.user = user.into();
        self.password = password.into();
        self
    }

    /// Sets how long dialing the server may take.
    pub fn dial_timeout(mut self, timeout: Duration) -> Self {
        self.dial_timeout = timeout;
        self
    }

    /// Sets the directory to change into after logging in.
    pub fn home_dir<S: Into<String>>(mut self, dir: S) -> Self {
        self.home_dir = Some(dir.into());
        self
    }

    /// Stay in whatever directory the server puts the user in after login.
    pub fn stay_in_login_dir(mut self) -> Self {
        self.home_dir = None;
        self
    }

    /// Whether to switch to binary (image) transfers after login. On by default; ASCII mode
    /// rewrites line endings and corrupts anything that isn't text.
    pub fn binary(mut self, on: bool) -> Self {
        self.binary = on;
        self
    }

    /// The `host:port` to connect to.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// The user name to log in with.
    pub fn user(&self) -> &str {
        &self.user
    }
}

impl Debug for ConnectOptions {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectOptions")
            .field("host", &self.host)
            .field("user", &self.user)
            .field("password", &"*******")
            .field("dial_timeout", &self.dial_timeout)
            .field("home_dir", &self.home_dir)
            .field("binary", &self.binary)
            .finish()
    }
}
