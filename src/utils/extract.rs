//! Safe archive extraction for zip, tar+gzip and tar+xz.
//!
//! Each format only knows how to walk its entries and hand them over as
//! [`ArchiveEntry`] values; path validation and writing happen in one place.

use flate2::read::GzDecoder;
use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Component, Path, PathBuf};
use tracing::debug;
use xz2::read::XzDecoder;

use crate::error::{IoContext, NvsError, Result};
use crate::release::ArchiveFormat;

const DEFAULT_DIR_MODE: u32 = 0o755;
const S_IFMT: u32 = 0o170000;
const S_IFLNK: u32 = 0o120000;

pub enum EntryKind {
    Directory,
    File,
    Symlink(PathBuf),
}

pub struct ArchiveEntry<'a> {
    pub name: String,
    pub kind: EntryKind,
    pub mode: Option<u32>,
    pub contents: &'a mut dyn Read,
}

/// Extracts `archive_path` into `dest_dir`, creating it first.
///
/// Stops at the first failing entry; whatever was written so far stays behind
/// for the caller to discard.
pub fn extract_archive(archive_path: &Path, dest_dir: &Path, format: ArchiveFormat) -> Result<()> {
    debug!(
        "Extracting {} ({}) into {}",
        archive_path.display(),
        format.extension(),
        dest_dir.display()
    );

    fs::create_dir_all(dest_dir).at("create directory", dest_dir)?;
    let root = extraction_root(dest_dir)?;

    for_each_entry(archive_path, format, &mut |entry: ArchiveEntry<'_>| {
        write_entry(&root, entry)
    })
}

/// Walks every entry of the archive in order, regardless of container format.
pub fn for_each_entry(
    archive_path: &Path,
    format: ArchiveFormat,
    visit: &mut dyn FnMut(ArchiveEntry<'_>) -> Result<()>,
) -> Result<()> {
    let file = File::open(archive_path).at("open archive", archive_path)?;

    match format {
        ArchiveFormat::Zip => walk_zip(archive_path, file, visit),
        ArchiveFormat::TarGzip => walk_tar(archive_path, GzDecoder::new(file), visit),
        ArchiveFormat::TarXz => walk_tar(archive_path, XzDecoder::new(file), visit),
    }
}

fn walk_tar<R: Read>(
    archive_path: &Path,
    reader: R,
    visit: &mut dyn FnMut(ArchiveEntry<'_>) -> Result<()>,
) -> Result<()> {
    let mut archive = tar::Archive::new(reader);
    let entries = archive.entries().map_err(|e| archive_error(archive_path, e))?;

    for entry in entries {
        let mut entry = entry.map_err(|e| archive_error(archive_path, e))?;
        let header = entry.header();
        let entry_type = header.entry_type();
        let mode = header.mode().ok();

        let name = entry
            .path()
            .map_err(|e| archive_error(archive_path, e))?
            .to_string_lossy()
            .into_owned();

        let kind = if entry_type.is_dir() {
            EntryKind::Directory
        } else if entry_type.is_file() {
            EntryKind::File
        } else if entry_type.is_symlink() {
            let target = entry
                .link_name()
                .map_err(|e| archive_error(archive_path, e))?
                .ok_or_else(|| NvsError::Archive {
                    path: archive_path.to_path_buf(),
                    reason: format!("symlink entry '{name}' has no target"),
                })?;
            EntryKind::Symlink(target.into_owned())
        } else {
            debug!("Skipping unsupported tar entry {} ({:?})", name, entry_type);
            continue;
        };

        visit(ArchiveEntry {
            name,
            kind,
            mode,
            contents: &mut entry,
        })?;
    }

    Ok(())
}

fn walk_zip(
    archive_path: &Path,
    file: File,
    visit: &mut dyn FnMut(ArchiveEntry<'_>) -> Result<()>,
) -> Result<()> {
    let mut archive = zip::ZipArchive::new(file).map_err(|e| archive_error(archive_path, e))?;

    for i in 0..archive.len() {
        let mut file = archive
            .by_index(i)
            .map_err(|e| archive_error(archive_path, e))?;
        let name = file.name().to_string();
        let mode = file.unix_mode();

        let kind = if file.is_dir() {
            EntryKind::Directory
        } else if mode.is_some_and(|m| m & S_IFMT == S_IFLNK) {
            let mut target = String::new();
            file.read_to_string(&mut target)
                .map_err(|e| archive_error(archive_path, e))?;
            EntryKind::Symlink(PathBuf::from(target))
        } else {
            EntryKind::File
        };

        visit(ArchiveEntry {
            name,
            kind,
            mode,
            contents: &mut file,
        })?;
    }

    Ok(())
}

fn archive_error(path: &Path, err: impl ToString) -> NvsError {
    NvsError::Archive {
        path: path.to_path_buf(),
        reason: err.to_string(),
    }
}

fn write_entry(root: &Path, entry: ArchiveEntry<'_>) -> Result<()> {
    let target = normalize(&root.join(&entry.name));

    if target == root {
        if matches!(entry.kind, EntryKind::Directory) {
            return Ok(());
        }
        return Err(traversal(root, &entry.name));
    }
    if !target.starts_with(root) {
        return Err(traversal(root, &entry.name));
    }
    if passes_through_symlink(root, &target) {
        return Err(traversal(root, &entry.name));
    }

    match entry.kind {
        EntryKind::Directory => {
            remove_symlink(&target)?;
            fs::create_dir_all(&target).at("create directory", &target)?;
            set_mode(&target, entry.mode.unwrap_or(DEFAULT_DIR_MODE))?;
        }
        EntryKind::File => {
            ensure_parent(&target)?;
            remove_symlink(&target)?;
            let mut out = File::create(&target).at("create file", &target)?;
            io::copy(entry.contents, &mut out).at("write file", &target)?;
            if let Some(mode) = entry.mode {
                set_mode(&target, mode)?;
            }
        }
        EntryKind::Symlink(link_target) => {
            ensure_parent(&target)?;
            remove_existing(&target)?;
            create_symlink(&link_target, &target)?;
        }
    }

    Ok(())
}

fn traversal(root: &Path, name: &str) -> NvsError {
    NvsError::PathTraversal {
        entry: name.to_string(),
        root: root.to_path_buf(),
    }
}

/// Absolute form of `dest_dir`, which must already exist.
#[cfg(not(windows))]
fn extraction_root(dest_dir: &Path) -> Result<PathBuf> {
    fs::canonicalize(dest_dir).at("resolve", dest_dir)
}

// canonicalize yields verbatim `\\?\` paths, which reject `/` in entry names.
#[cfg(windows)]
fn extraction_root(dest_dir: &Path) -> Result<PathBuf> {
    let cwd = std::env::current_dir().at("resolve", dest_dir)?;
    Ok(normalize(&cwd.join(dest_dir)))
}

/// Lexically resolves `.` and `..` without touching the filesystem.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other),
        }
    }
    out
}

/// True when any already-extracted ancestor of `target` below `root` is a symlink.
fn passes_through_symlink(root: &Path, target: &Path) -> bool {
    target
        .ancestors()
        .skip(1)
        .take_while(|ancestor| *ancestor != root)
        .any(|ancestor| {
            fs::symlink_metadata(ancestor)
                .map(|meta| meta.file_type().is_symlink())
                .unwrap_or(false)
        })
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).at("create directory", parent)?;
    }
    Ok(())
}

fn remove_symlink(path: &Path) -> Result<()> {
    match fs::symlink_metadata(path) {
        Ok(meta) if meta.file_type().is_symlink() => {
            fs::remove_file(path).at("remove existing link", path)
        }
        _ => Ok(()),
    }
}

fn remove_existing(path: &Path) -> Result<()> {
    match fs::symlink_metadata(path) {
        Ok(meta) if meta.is_dir() => fs::remove_dir_all(path).at("remove existing directory", path),
        Ok(_) => fs::remove_file(path).at("remove existing file", path),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(NvsError::io("inspect", path, e)),
    }
}

#[cfg(unix)]
fn set_mode(path: &Path, mode: u32) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(mode & 0o7777)).at("set permissions on", path)
}

#[cfg(not(unix))]
fn set_mode(_path: &Path, _mode: u32) -> Result<()> {
    Ok(())
}

#[cfg(unix)]
fn create_symlink(target: &Path, link: &Path) -> Result<()> {
    std::os::unix::fs::symlink(target, link).at("create symlink", link)
}

#[cfg(windows)]
fn create_symlink(target: &Path, link: &Path) -> Result<()> {
    use std::os::windows::fs::{symlink_dir, symlink_file};

    if link_resolves_to_dir(target, link) {
        symlink_dir(target, link).at("create symlink", link)
    } else {
        symlink_file(target, link).at("create symlink", link)
    }
}

/// Windows needs to know up front whether a link points at a directory.
#[cfg(any(windows, test))]
fn link_resolves_to_dir(target: &Path, link: &Path) -> bool {
    match link.parent() {
        Some(parent) if target.is_relative() => parent.join(target).is_dir(),
        _ => target.is_dir(),
    }
}
