//! An in-memory FTP server to run `FtpFs` against without a network.

#![allow(dead_code, missing_docs)]

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use ftpfs::client::{EntryType, FtpClient, ListEntry, Reply};
use ftpfs::{Error, ErrorKind, Result};
use std::{
    collections::BTreeMap,
    io::Cursor,
    sync::{Arc, Mutex},
};
use tokio::io::{AsyncRead, AsyncReadExt};

pub const USER: &str = "test";
pub const PASSWORD: &str = "test";
pub const HOME: &str = "/home/test";

#[derive(Debug, Clone)]
enum Node {
    Dir,
    File(Vec<u8>),
}

#[derive(Debug)]
struct State {
    nodes: BTreeMap<String, Node>,
    cwd: String,
    commands: Vec<String>,
    fail_stores: bool,
    fail_quit: bool,
}

/// Handle on the server side, to set up and inspect what the client did.
#[derive(Debug, Clone)]
pub struct MemoryServer {
    state: Arc<Mutex<State>>,
}

impl MemoryServer {
    pub fn new() -> MemoryServer {
        let mut nodes = BTreeMap::new();
        nodes.insert("/".to_string(), Node::Dir);
        nodes.insert("/home".to_string(), Node::Dir);
        nodes.insert(HOME.to_string(), Node::Dir);
        MemoryServer {
            state: Arc::new(Mutex::new(State {
                nodes,
                cwd: "/".to_string(),
                commands: Vec::new(),
                fail_stores: false,
                fail_quit: false,
            })),
        }
    }

    /// A fresh, not yet logged in, connection to this server.
    pub fn client(&self) -> MemoryFtp {
        MemoryFtp { server: self.clone() }
    }

    pub fn put_file(&self, path: &str, content: &[u8]) {
        self.state.lock().unwrap().nodes.insert(path.to_string(), Node::File(content.to_vec()));
    }

    pub fn put_dir(&self, path: &str) {
        self.state.lock().unwrap().nodes.insert(path.to_string(), Node::Dir);
    }

    pub fn file(&self, path: &str) -> Option<Vec<u8>> {
        match self.state.lock().unwrap().nodes.get(path) {
            Some(Node::File(content)) => Some(content.clone()),
            _ => None,
        }
    }

    pub fn is_dir(&self, path: &str) -> bool {
        matches!(self.state.lock().unwrap().nodes.get(path), Some(Node::Dir))
    }

    pub fn exists(&self, path: &str) -> bool {
        self.state.lock().unwrap().nodes.contains_key(path)
    }

    pub fn cwd(&self) -> String {
        self.state.lock().unwrap().cwd.clone()
    }

    pub fn commands(&self) -> Vec<String> {
        self.state.lock().unwrap().commands.clone()
    }

    pub fn fail_stores(&self) {
        self.state.lock().unwrap().fail_stores = true;
    }

    pub fn fail_quit(&self) {
        self.state.lock().unwrap().fail_quit = true;
    }
}

fn rejected(reply: &str) -> Error {
    Error::new(ErrorKind::Rejected, Reply::new(reply))
}

fn parent(path: &str) -> &str {
    match path.rfind('/') {
        Some(0) => "/",
        Some(i) => &path[..i],
        None => "/",
    }
}

fn basename(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

fn children<'a>(nodes: &'a BTreeMap<String, Node>, dir: &'a str) -> impl Iterator<Item = (&'a String, &'a Node)> + 'a {
    nodes
        .iter()
        .filter(move |(path, _)| path.as_str() != "/" && parent(path) == dir && path.as_str() != dir)
}

fn entry(path: &str, node: &Node) -> ListEntry {
    let mut entry = match node {
        Node::Dir => ListEntry::new(basename(path), 0, EntryType::Folder),
        Node::File(content) => ListEntry::new(basename(path), content.len() as u64, EntryType::File),
    };
    entry.modified = Some(Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 0).unwrap());
    entry.permissions = Some(0o644);
    entry
}

/// The client side of [`MemoryServer`].
#[derive(Debug)]
pub struct MemoryFtp {
    server: MemoryServer,
}

impl MemoryFtp {
    fn with_state<T>(&self, command: String, f: impl FnOnce(&mut State) -> T) -> T {
        let mut state = self.server.state.lock().unwrap();
        state.commands.push(command);
        f(&mut state)
    }
}

impl State {
    fn resolve(&self, path: &str) -> String {
        let joined = if path.starts_with('/') {
            path.to_string()
        } else {
            format!("{}/{}", self.cwd, path)
        };
        let mut parts: Vec<&str> = Vec::new();
        for part in joined.split('/') {
            match part {
                "" | "." => {}
                ".." => {
                    parts.pop();
                }
                p => parts.push(p),
            }
        }
        format!("/{}", parts.join("/"))
    }
}

#[async_trait]
impl FtpClient for MemoryFtp {
    async fn login(&mut self, user: &str, password: &str) -> Result<()> {
        self.with_state(format!("USER {user}"), |_| {
            if user == USER && password == PASSWORD {
                Ok(())
            } else {
                Err(Error::new(ErrorKind::LoginFailed, Reply::new("530 Wrong username or password")))
            }
        })
    }

    async fn binary(&mut self) -> Result<()> {
        self.with_state("TYPE I".to_string(), |_| Ok(()))
    }

    async fn cwd(&mut self, path: &str) -> Result<()> {
        self.with_state(format!("CWD {path}"), |state| {
            let target = if path == "~" { HOME.to_string() } else { state.resolve(path) };
            match state.nodes.get(&target) {
                Some(Node::Dir) => {
                    state.cwd = target;
                    Ok(())
                }
                _ => Err(rejected("550 No such directory")),
            }
        })
    }

    async fn pwd(&mut self) -> Result<String> {
        self.with_state("PWD".to_string(), |state| Ok(state.cwd.clone()))
    }

    async fn quit(&mut self) -> Result<()> {
        self.with_state("QUIT".to_string(), |state| {
            if state.fail_quit { Err(rejected("421 Service not available")) } else { Ok(()) }
        })
    }

    async fn list(&mut self, path: Option<&str>) -> Result<Vec<ListEntry>> {
        self.with_state(format!("LIST {}", path.unwrap_or("")), |state| {
            let target = state.resolve(path.unwrap_or("."));
            match state.nodes.get(&target) {
                Some(Node::Dir) => Ok(children(&state.nodes, &target).map(|(p, n)| entry(p, n)).collect()),
                Some(node) => Ok(vec![entry(&target, node)]),
                None => Err(rejected("550 No such file or directory")),
            }
        })
    }

    async fn retrieve(&mut self, path: &str) -> Result<Box<dyn AsyncRead + Send + Sync + Unpin>> {
        self.with_state(format!("RETR {path}"), |state| match state.nodes.get(&state.resolve(path)) {
            Some(Node::File(content)) => Ok(Box::new(Cursor::new(content.clone())) as Box<dyn AsyncRead + Send + Sync + Unpin>),
            _ => Err(rejected("550 No such file")),
        })
    }

    async fn store<R>(&mut self, path: &str, reader: R) -> Result<()>
    where
        R: AsyncRead + Send + Unpin + 'static,
    {
        let fail = self.with_state(format!("STOR {path}"), |state| state.fail_stores);
        if fail {
            return Err(rejected("552 Exceeded storage allocation"));
        }
        let mut reader = reader;
        let mut content = Vec::new();
        reader.read_to_end(&mut content).await?;
        let mut state = self.server.state.lock().unwrap();
        let target = state.resolve(path);
        match state.nodes.get(parent(&target)) {
            Some(Node::Dir) => {
                state.nodes.insert(target, Node::File(content));
                Ok(())
            }
            _ => Err(rejected("553 Parent directory does not exist")),
        }
    }

    async fn rename(&mut self, from: &str, to: &str) -> Result<()> {
        self.with_state(format!("RNFR {from} RNTO {to}"), |state| {
            let from = state.resolve(from);
            let to = state.resolve(to);
            if !state.nodes.contains_key(&from) {
                return Err(rejected("550 No such file"));
            }
            if !matches!(state.nodes.get(parent(&to)), Some(Node::Dir)) {
                return Err(rejected("553 Target directory does not exist"));
            }
            let prefix = format!("{from}/");
            let moved: Vec<String> = state
                .nodes
                .keys()
                .filter(|k| **k == from || k.starts_with(&prefix))
                .cloned()
                .collect();
            for key in moved {
                if let Some(node) = state.nodes.remove(&key) {
                    let new_key = format!("{to}{}", &key[from.len()..]);
                    state.nodes.insert(new_key, node);
                }
            }
            Ok(())
        })
    }

    async fn mkdir(&mut self, path: &str) -> Result<()> {
        self.with_state(format!("MKD {path}"), |state| {
            let target = state.resolve(path);
            if state.nodes.contains_key(&target) {
                return Err(rejected("550 File exists"));
            }
            if !matches!(state.nodes.get(parent(&target)), Some(Node::Dir)) {
                return Err(rejected("550 Parent directory does not exist"));
            }
            state.nodes.insert(target, Node::Dir);
            Ok(())
        })
    }

    async fn rmdir(&mut self, path: &str) -> Result<()> {
        self.with_state(format!("RMD {path}"), |state| {
            let target = state.resolve(path);
            if !matches!(state.nodes.get(&target), Some(Node::Dir)) {
                return Err(rejected("550 Not a directory"));
            }
            if children(&state.nodes, &target).next().is_some() {
                return Err(rejected("550 Directory not empty"));
            }
            state.nodes.remove(&target);
            Ok(())
        })
    }

    async fn delete(&mut self, path: &str) -> Result<()> {
        self.with_state(format!("DELE {path}"), |state| {
            let target = state.resolve(path);
            match state.nodes.get(&target) {
                Some(Node::File(_)) => {
                    state.nodes.remove(&target);
                    Ok(())
                }
                _ => Err(rejected("550 No such file")),
            }
        })
    }
}
