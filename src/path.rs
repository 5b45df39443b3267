//! Helpers for the slash separated paths used on FTP servers. These work on `&str` rather than
//! `std::path::Path` since remote paths follow the server's conventions, not the local OS's.

/// Strips trailing slashes, keeping a lone `/`.
pub(crate) fn trim_trailing(path: &str) -> &str {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() && path.starts_with('/') { "/" } else { trimmed }
}

/// Splits a path into its parent directory and base name. The parent is `None` for a bare name,
/// meaning the working directory.
pub(crate) fn split(path: &str) -> (Option<&str>, &str) {
    match path.rfind('/') {
        Some(0) => (Some("/"), &path[1..]),
        Some(i) => (Some(&path[..i]), &path[i + 1..]),
        None => (None, path),
    }
}

/// The parent that may need creating before `path` can be, if any. The root and the working
/// directory always exist.
pub(crate) fn parent(path: &str) -> Option<&str> {
    match split(path).0 {
        None | Some("/") => None,
        Some(p) => Some(p),
    }
}

/// Joins a listed entry name onto the directory it was listed from. Some servers list entries with
/// their directory prefixed, so only the last segment of `name` is used.
pub(crate) fn join(dir: &str, name: &str) -> String {
    let name = name.rsplit('/').next().unwrap_or(name);
    if dir.ends_with('/') { format!("{dir}{name}") } else { format!("{dir}/{name}") }
}

/// The argument to LIST for a path; the empty path lists the working directory.
pub(crate) fn list_arg(path: &str) -> Option<&str> {
    if path.is_empty() { None } else { Some(path) }
}
