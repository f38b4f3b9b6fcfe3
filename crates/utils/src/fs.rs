use std::{io, path::Path};

/// Returns `true` when `dir` exists and has no entries.
pub fn is_dir_empty<P: AsRef<Path>>(dir: P) -> io::Result<bool> {
    let mut entries = std::fs::read_dir(dir)?;
    Ok(entries.next().is_none())
}

/// Remove `dir` and everything under it. A missing directory is not an error.
pub fn remove_dir_if_exists<P: AsRef<Path>>(dir: P) -> io::Result<()> {
    match std::fs::remove_dir_all(dir) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(err),
    }
}
