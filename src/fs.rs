use crate::{
    client::{AsyncFtpClient, EntryType, FtpClient, reply_code},
    file::FtpFile,
    fileinfo::FileInfo,
    options::ConnectOptions,
    path,
};
use async_trait::async_trait;
use ftpfs_core::fs::{Error, ErrorKind, Filesystem, Metadata, OpenFlags, Permissions, Result};
use std::{fmt, sync::Arc};
use tokio::sync::Mutex;

/// The name [`FtpFs`] reports through [`Filesystem::name`].
pub const NAME: &str = "ftpfs";

/// A [`Filesystem`] on a remote FTP server.
///
/// `FtpFs` owns a single control connection. All commands, including the uploads started by
/// [`FtpFile`] handles, are serialized over it. A handle that is being written holds the
/// connection until it is closed, so close it before issuing other commands from the same task.
pub struct FtpFs<C: FtpClient = AsyncFtpClient> {
    conn: Arc<Mutex<C>>,
}

impl FtpFs<AsyncFtpClient> {
    /// Connects to `host` (`host:port`) and logs in as `user`, then changes into the user's home
    /// directory.
    pub async fn connect(user: &str, password: &str, host: &str) -> Result<Self> {
        Self::connect_with(ConnectOptions::new(host).credentials(user, password)).await
    }

    /// Connects using the given options. See [`ConnectOptions`].
    #[tracing_attributes::instrument]
    pub async fn connect_with(options: ConnectOptions) -> Result<Self> {
        let client = AsyncFtpClient::connect(&options.host, options.dial_timeout).await?;
        Self::from_connection(client, &options).await
    }
}

impl<C: FtpClient> FtpFs<C> {
    /// Wraps an already logged in client without talking to the server.
    pub fn with_client(client: C) -> Self {
        FtpFs {
            conn: Arc::new(Mutex::new(client)),
        }
    }

    /// Logs in on a freshly connected client and changes into the configured home directory.
    pub async fn from_connection(mut client: C, options: &ConnectOptions) -> Result<Self> {
        client.login(&options.user, &options.password).await?;
        if options.binary {
            client.binary().await?;
        }
        if let Some(home) = &options.home_dir {
            client.cwd(home).await?;
        }
        let dir = client.pwd().await?;
        tracing::debug!(host = %options.host, user = %options.user, dir = %dir, "connected");
        Ok(Self::with_client(client))
    }

    /// Ends the session. Failures are logged rather than returned, since there is nothing left to
    /// do about them.
    pub async fn disconnect(self) {
        let mut conn = self.conn.lock().await;
        if let Err(err) = conn.quit().await {
            tracing::warn!(error = %err, "quit from remote server failed");
        }
    }
}

/// Looks up a single path by listing its parent directory.
pub(crate) async fn stat_path<C: FtpClient>(conn: &Mutex<C>, name: &str) -> Result<FileInfo> {
    let trimmed = path::trim_trailing(name);
    if trimmed == "/" {
        return Ok(FileInfo::root());
    }
    if trimmed.is_empty() {
        return Err(Error::new(ErrorKind::NotFound, "empty path"));
    }
    let (dir, base) = path::split(trimmed);

    let listed = conn.lock().await.list(dir).await;
    let entries = match listed {
        Ok(entries) => entries,
        // The parent doesn't exist (or isn't listable), so neither does the child.
        Err(err) if err.kind() == ErrorKind::Rejected && matches!(reply_code(&err), Some(450) | Some(550) | None) => {
            return Err(Error::new(ErrorKind::NotFound, err));
        }
        Err(err) => return Err(err),
    };

    entries
        .into_iter()
        .find(|entry| entry.name == base)
        .map(FileInfo::from_entry)
        .ok_or_else(|| Error::new(ErrorKind::NotFound, format!("{name}: no such file or directory")))
}

impl<C: FtpClient> fmt::Debug for FtpFs<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FtpFs").finish_non_exhaustive()
    }
}

#[async_trait]
impl<C: FtpClient> Filesystem for FtpFs<C> {
    type File = FtpFile<C>;
    type Metadata = FileInfo;

    fn name(&self) -> &str {
        NAME
    }

    async fn create(&self, name: &str) -> Result<FtpFile<C>> {
        Ok(FtpFile::new(self.conn.clone(), name))
    }

    async fn open(&self, name: &str) -> Result<FtpFile<C>> {
        Ok(FtpFile::new(self.conn.clone(), name))
    }

    #[tracing_attributes::instrument]
    async fn open_file(&self, name: &str, flags: OpenFlags, _perm: Permissions) -> Result<FtpFile<C>> {
        if flags.contains(OpenFlags::APPEND) {
            return Err(Error::unsupported("append"));
        }
        if !flags.wants_write() {
            stat_path(&self.conn, name).await?;
            return self.open(name).await;
        }
        if !flags.contains(OpenFlags::CREATE) {
            stat_path(&self.conn, name).await?;
        } else if flags.contains(OpenFlags::EXCLUSIVE) {
            match stat_path(&self.conn, name).await {
                Ok(_) => return Err(Error::new(ErrorKind::AlreadyExists, format!("{name} already exists"))),
                Err(err) if err.is_not_found() => {}
                Err(err) => return Err(err),
            }
        }
        self.create(name).await
    }

    // FTP has no notion of permission bits on MKD, so `perm` goes unused.
    #[tracing_attributes::instrument]
    async fn mkdir(&self, name: &str, _perm: Permissions) -> Result<()> {
        self.conn.lock().await.mkdir(name).await
    }

    #[tracing_attributes::instrument]
    async fn mkdir_all(&self, path: &str, perm: Permissions) -> Result<()> {
        let target = path::trim_trailing(path);
        if target.is_empty() || target == "/" {
            return Ok(());
        }

        // Walk up until an existing directory is found, then create the missing ones top down.
        let mut missing = Vec::new();
        let mut current = Some(target);
        while let Some(dir) = current {
            match stat_path(&self.conn, dir).await {
                Ok(info) if info.is_dir() => break,
                Ok(_) => return Err(Error::new(ErrorKind::AlreadyExists, format!("{dir} exists and is not a directory"))),
                Err(err) if err.is_not_found() => {
                    missing.push(dir);
                    current = path::parent(dir);
                }
                Err(err) => return Err(err),
            }
        }

        for dir in missing.into_iter().rev() {
            if let Err(err) = self.mkdir(dir, perm).await {
                // Somebody else may have created it in the meantime, or `dir` is something like
                // `foo/.` that the listing didn't match.
                match stat_path(&self.conn, dir).await {
                    Ok(info) if info.is_dir() => continue,
                    _ => return Err(err),
                }
            }
        }
        Ok(())
    }

    #[tracing_attributes::instrument]
    async fn remove(&self, name: &str) -> Result<()> {
        let info = stat_path(&self.conn, name).await?;
        let mut conn = self.conn.lock().await;
        if info.is_dir() { conn.rmdir(name).await } else { conn.delete(name).await }
    }

    #[tracing_attributes::instrument]
    async fn remove_all(&self, path: &str) -> Result<()> {
        let root = path::trim_trailing(path);
        let info = match stat_path(&self.conn, root).await {
            Ok(info) => info,
            Err(err) if err.is_not_found() => return Ok(()),
            Err(err) => return Err(err),
        };

        let mut conn = self.conn.lock().await;
        if !info.is_dir() {
            return conn.delete(root).await;
        }

        // Depth first: a directory is pushed back on the stack, marked as visited, below its
        // children and removed once they are gone.
        let mut stack = vec![(root.to_string(), false)];
        while let Some((dir, visited)) = stack.pop() {
            if visited {
                conn.rmdir(&dir).await?;
                continue;
            }
            let entries = conn.list(Some(&dir)).await?;
            stack.push((dir.clone(), true));
            for entry in entries {
                if entry.name == "." || entry.name == ".." {
                    continue;
                }
                let child = path::join(&dir, &entry.name);
                match entry.kind {
                    EntryType::Folder => stack.push((child, false)),
                    EntryType::File | EntryType::Link => conn.delete(&child).await?,
                }
            }
        }
        Ok(())
    }

    #[tracing_attributes::instrument]
    async fn rename(&self, from: &str, to: &str) -> Result<()> {
        self.conn.lock().await.rename(from, to).await
    }

    #[tracing_attributes::instrument]
    async fn stat(&self, name: &str) -> Result<FileInfo> {
        stat_path(&self.conn, name).await
    }
}
