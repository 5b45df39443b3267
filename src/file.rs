use crate::{
    client::FtpClient,
    fileinfo::FileInfo,
    fs::stat_path,
    path,
};
use async_trait::async_trait;
use ftpfs_core::fs::{Error, ErrorKind, File, Result};
use std::{fmt, io::SeekFrom, sync::Arc};
use tokio::{
    io::{AsyncRead, AsyncReadExt, AsyncWriteExt, DuplexStream},
    sync::{Mutex, OwnedMutexGuard},
    task::JoinHandle,
};

// Bytes buffered between `write` calls and the store task.
const PIPE_CAPACITY: usize = 64 * 1024;

/// A handle to a single file on the FTP server, obtained from
/// [`FtpFs::open`](crate::FtpFs) or [`FtpFs::create`](crate::FtpFs).
///
/// Nothing is sent to the server until the first `read` or `write`. The first `read` retrieves the
/// file; the first `write` starts uploading it. A handle does one or the other, never both, and
/// reads and writes strictly front to back.
///
/// An upload holds the connection from the first `write` until `close`. Starting a second upload
/// meanwhile fails with [`ErrorKind::ConnectionBusy`]; other commands wait for the `close`.
pub struct FtpFile<C: FtpClient> {
    conn: Arc<Mutex<C>>,
    name: String,
    state: State,
    position: u64,
}

enum State {
    Unbound,
    Reading(Box<dyn AsyncRead + Send + Sync + Unpin>),
    Writing(Upload),
    Closed,
}

impl State {
    fn describe(&self) -> &'static str {
        match self {
            State::Unbound => "not yet read or written",
            State::Reading(_) => "open for reading",
            State::Writing(_) => "open for writing",
            State::Closed => "closed",
        }
    }

    fn conflict(&self, operation: &str) -> Error {
        Error::new(
            ErrorKind::InvalidHandleState,
            format!("cannot {operation}: file handle is {}", self.describe()),
        )
    }
}

/// The write half of the pipe plus the task that pumps the read half into STOR. The task owns the
/// connection until the transfer ends.
struct Upload {
    pipe: DuplexStream,
    task: JoinHandle<Result<()>>,
}

impl Upload {
    fn start<C: FtpClient>(mut conn: OwnedMutexGuard<C>, path: String) -> Upload {
        let (pipe, source) = tokio::io::duplex(PIPE_CAPACITY);
        let task = tokio::spawn(async move {
            tracing::debug!(path = %path, "store started");
            let result = conn.store(&path, source).await;
            match &result {
                Ok(()) => tracing::debug!(path = %path, "store finished"),
                Err(err) => tracing::debug!(path = %path, error = %err, "store failed"),
            }
            result
        });
        Upload { pipe, task }
    }

    /// Signals end of file to the store task and waits for the server to acknowledge the upload.
    async fn finish(self) -> Result<()> {
        let Upload { pipe, task } = self;
        drop(pipe);
        match task.await {
            Ok(result) => result,
            Err(err) => Err(Error::new(ErrorKind::TransferFailed, err)),
        }
    }
}

impl<C: FtpClient> FtpFile<C> {
    pub(crate) fn new(conn: Arc<Mutex<C>>, name: &str) -> FtpFile<C> {
        FtpFile {
            conn,
            name: name.to_string(),
            state: State::Unbound,
            position: 0,
        }
    }

    // Listing while our own upload holds the connection would wait forever.
    fn ensure_idle_connection(&self, operation: &str) -> Result<()> {
        match self.state {
            State::Unbound | State::Reading(_) => Ok(()),
            ref other => Err(other.conflict(operation)),
        }
    }
}

impl<C: FtpClient> fmt::Debug for FtpFile<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FtpFile")
            .field("name", &self.name)
            .field("state", &self.state.describe())
            .field("position", &self.position)
            .finish()
    }
}

impl<C: FtpClient> Drop for FtpFile<C> {
    // Closing the pipe lets the store task finish with whatever was written so far, which would
    // leave a truncated file behind. Wait for it, then delete the file.
    fn drop(&mut self) {
        let State::Writing(Upload { pipe, task }) = std::mem::replace(&mut self.state, State::Closed) else {
            return;
        };
        tracing::warn!(path = %self.name, "file dropped while uploading; removing the partial upload");
        drop(pipe);
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            return;
        };
        let conn = self.conn.clone();
        let path = self.name.clone();
        runtime.spawn(async move {
            if let Ok(Ok(())) = task.await
                && let Err(err) = conn.lock().await.delete(&path).await
            {
                tracing::warn!(path = %path, error = %err, "could not remove partial upload");
            }
        });
    }
}

#[async_trait]
impl<C: FtpClient> File for FtpFile<C> {
    type Metadata = FileInfo;

    fn name(&self) -> &str {
        &self.name
    }

    async fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        if let State::Unbound = self.state {
            let reader = self.conn.lock().await.retrieve(&self.name).await?;
            self.state = State::Reading(reader);
        }
        match self.state {
            State::Reading(ref mut reader) => {
                let n = reader.read(buf).await?;
                self.position += n as u64;
                Ok(n)
            }
            ref other => Err(other.conflict("read")),
        }
    }

    async fn write(&mut self, buf: &[u8]) -> Result<usize> {
        if let State::Unbound = self.state {
            let conn = self.conn.clone().try_lock_owned().map_err(|_| {
                Error::new(
                    ErrorKind::ConnectionBusy,
                    format!("cannot write {}: the connection is in use by another command", self.name),
                )
            })?;
            self.state = State::Writing(Upload::start(conn, self.name.clone()));
        }
        let written = match self.state {
            State::Writing(ref mut upload) => upload.pipe.write_all(buf).await,
            ref other => return Err(other.conflict("write")),
        };
        match written {
            Ok(()) => {
                self.position += buf.len() as u64;
                Ok(buf.len())
            }
            Err(err) => {
                // The store task hung up on the pipe. Its result says why.
                let failure = match std::mem::replace(&mut self.state, State::Closed) {
                    State::Writing(upload) => upload.finish().await.err(),
                    _ => None,
                };
                Err(failure.unwrap_or_else(|| Error::new(ErrorKind::TransferFailed, err)))
            }
        }
    }

    async fn seek(&mut self, pos: SeekFrom) -> Result<u64> {
        match (pos, &self.state) {
            (_, State::Closed) => Err(self.state.conflict("seek")),
            (SeekFrom::Current(0), _) => Ok(self.position),
            _ => Err(Error::unsupported("seek")),
        }
    }

    async fn sync(&mut self) -> Result<()> {
        match self.state {
            State::Writing(ref mut upload) => Ok(upload.pipe.flush().await?),
            State::Closed => Err(self.state.conflict("sync")),
            State::Unbound | State::Reading(_) => Ok(()),
        }
    }

    async fn close(&mut self) -> Result<()> {
        match std::mem::replace(&mut self.state, State::Closed) {
            State::Writing(upload) => upload.finish().await,
            State::Reading(_) | State::Unbound | State::Closed => Ok(()),
        }
    }

    async fn stat(&self) -> Result<FileInfo> {
        self.ensure_idle_connection("stat")?;
        stat_path(&self.conn, &self.name).await
    }

    // The whole listing is returned regardless of `count`; LIST has no way to page.
    async fn readdir(&mut self, _count: usize) -> Result<Vec<FileInfo>> {
        self.ensure_idle_connection("readdir")?;
        let entries = self.conn.lock().await.list(path::list_arg(&self.name)).await?;
        Ok(entries.into_iter().map(FileInfo::from_entry).collect())
    }

    async fn readdir_names(&mut self, _count: usize) -> Result<Vec<String>> {
        self.ensure_idle_connection("readdir")?;
        let entries = self.conn.lock().await.list(path::list_arg(&self.name)).await?;
        Ok(entries.into_iter().map(|entry| entry.name).collect())
    }
}
