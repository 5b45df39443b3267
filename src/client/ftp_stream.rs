use super::{FtpClient, ListEntry, Reply, list};
use async_ftp::{FtpError, FtpStream, types::FileType};
use async_trait::async_trait;
use chrono::Utc;
use ftpfs_core::fs::{Error, ErrorKind, Result};
use std::{fmt, time::Duration};
use tokio::io::AsyncRead;

/// An [`FtpClient`] backed by an `async_ftp` control connection.
pub struct AsyncFtpClient {
    stream: FtpStream,
    addr: String,
}

impl AsyncFtpClient {
    /// Connects to `addr` (`host:port`), giving up with an error of kind
    /// [`ErrorKind::Timeout`] once `timeout` has passed.
    pub async fn connect(addr: &str, timeout: Duration) -> Result<AsyncFtpClient> {
        match tokio::time::timeout(timeout, FtpStream::connect(addr)).await {
            Ok(Ok(stream)) => Ok(AsyncFtpClient {
                stream,
                addr: addr.to_string(),
            }),
            Ok(Err(err)) => Err(map_error(err)),
            Err(_) => Err(Error::new(
                ErrorKind::Timeout,
                format!("no connection to {addr} within {}s", timeout.as_secs_f32()),
            )),
        }
    }
}

impl fmt::Debug for AsyncFtpClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AsyncFtpClient").field("addr", &self.addr).finish()
    }
}

fn map_error(err: FtpError) -> Error {
    match err {
        FtpError::ConnectionError(e) => Error::new(ErrorKind::ConnectionFailed, e),
        FtpError::InvalidResponse(msg) => Error::new(ErrorKind::Rejected, Reply::new(msg)),
        other => Error::new(ErrorKind::LocalError, other.to_string()),
    }
}

#[async_trait]
impl FtpClient for AsyncFtpClient {
    async fn login(&mut self, user: &str, password: &str) -> Result<()> {
        self.stream.login(user, password).await.map_err(|err| match err {
            FtpError::InvalidResponse(msg) => Error::new(ErrorKind::LoginFailed, Reply::new(msg)),
            other => map_error(other),
        })
    }

    async fn binary(&mut self) -> Result<()> {
        self.stream.transfer_type(FileType::Binary).await.map_err(map_error)
    }

    async fn cwd(&mut self, path: &str) -> Result<()> {
        self.stream.cwd(path).await.map_err(map_error)
    }

    async fn pwd(&mut self) -> Result<String> {
        self.stream.pwd().await.map_err(map_error)
    }

    async fn quit(&mut self) -> Result<()> {
        self.stream.quit().await.map_err(map_error)
    }

    async fn list(&mut self, path: Option<&str>) -> Result<Vec<ListEntry>> {
        let lines = self.stream.list(path).await.map_err(map_error)?;
        Ok(list::parse_listing(lines.iter().map(String::as_str), Utc::now()))
    }

    // async_ftp only streams a RETR when the caller finalizes the control connection itself,
    // so the transfer is read into memory here and the lock is released right away.
    async fn retrieve(&mut self, path: &str) -> Result<Box<dyn AsyncRead + Send + Sync + Unpin>> {
        let content = self.stream.simple_retr(path).await.map_err(map_error)?;
        Ok(Box::new(content))
    }

    async fn store<R>(&mut self, path: &str, reader: R) -> Result<()>
    where
        R: AsyncRead + Send + Unpin + 'static,
    {
        let mut reader = reader;
        self.stream.put(path, &mut reader).await.map_err(map_error)
    }

    async fn rename(&mut self, from: &str, to: &str) -> Result<()> {
        self.stream.rename(from, to).await.map_err(map_error)
    }

    async fn mkdir(&mut self, path: &str) -> Result<()> {
        self.stream.mkdir(path).await.map_err(map_error)
    }

    async fn rmdir(&mut self, path: &str) -> Result<()> {
        self.stream.rmdir(path).await.map_err(map_error)
    }

    async fn delete(&mut self, path: &str) -> Result<()> {
        self.stream.rm(path).await.map_err(map_error)
    }
}
