pub mod download;
pub mod extract;

use std::fs;
use std::io;
use std::path::Path;

use crate::error::{IoContext, NvsError, Result};

/// Removes a file, link or directory tree. Absent paths are fine.
pub(crate) fn remove_path(path: &Path) -> Result<()> {
    match fs::symlink_metadata(path) {
        Ok(meta) if meta.is_dir() => fs::remove_dir_all(path).at("remove directory", path),
        Ok(_) => remove_link_or_file(path),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(NvsError::io("inspect", path, e)),
    }
}

// Junctions and directory symlinks on Windows need remove_dir, not remove_file.
fn remove_link_or_file(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(_) if cfg!(windows) => fs::remove_dir(path).at("remove link", path),
        Err(e) => Err(NvsError::io("remove", path, e)),
    }
}

/// Writes a small launcher script and marks it executable.
pub(crate) fn write_script(path: &Path, body: &str) -> Result<()> {
    fs::write(path, body).at("write", path)?;
    make_executable(path)
}

#[cfg(unix)]
pub(crate) fn make_executable(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let mut permissions = fs::metadata(path).at("read metadata of", path)?.permissions();
    let mode = permissions.mode();
    if mode & 0o111 != 0o111 {
        permissions.set_mode(mode | 0o755);
        fs::set_permissions(path, permissions).at("set permissions on", path)?;
    }
    Ok(())
}

#[cfg(not(unix))]
pub(crate) fn make_executable(_path: &Path) -> Result<()> {
    Ok(())
}
