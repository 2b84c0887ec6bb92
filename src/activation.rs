//! The "current version" pointer and the shim set exposed on PATH.
//!
//! State is either `Unset` (no pointer) or `Active(key)`. Only [`Activation::activate`]
//! and [`Activation::deactivate`] move between the two.

use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::config::{NvsDirs, PointerKind};
use crate::error::{IoContext, NvsError, Result};
use crate::store::VersionKey;
use crate::utils::{remove_path, write_script};

#[cfg(windows)]
const SHIMS: &[(&str, &str)] = &[
    ("node", "node.exe"),
    ("npm", "npm.cmd"),
    ("npx", "npx.cmd"),
];
#[cfg(not(windows))]
const SHIMS: &[(&str, &str)] = &[("node", "node"), ("npm", "npm"), ("npx", "npx")];

/// Persistence for the current pointer.
pub trait PointerStore {
    /// The active key, or `None` when unset or dangling.
    fn read(&self) -> Option<VersionKey>;
    fn write(&self, key: &VersionKey, version_dir: &Path) -> Result<()>;
    fn clear(&self) -> Result<()>;
}

/// `current` as a symlink (Unix) or directory junction (Windows).
pub struct LinkPointer {
    link: PathBuf,
}

impl LinkPointer {
    pub fn new(link: impl Into<PathBuf>) -> Self {
        Self { link: link.into() }
    }
}

impl PointerStore for LinkPointer {
    fn read(&self) -> Option<VersionKey> {
        let target = fs::read_link(&self.link).ok()?;
        let resolved = if target.is_absolute() {
            target
        } else {
            self.link.parent()?.join(target)
        };
        if !resolved.is_dir() {
            debug!("{} points at missing {}", self.link.display(), resolved.display());
            return None;
        }
        resolved
            .file_name()
            .and_then(|name| name.to_str())
            .map(VersionKey::from)
    }

    fn write(&self, _key: &VersionKey, version_dir: &Path) -> Result<()> {
        remove_path(&self.link)?;
        create_dir_link(version_dir, &self.link)
    }

    fn clear(&self) -> Result<()> {
        remove_path(&self.link)
    }
}

#[cfg(unix)]
fn create_dir_link(target: &Path, link: &Path) -> Result<()> {
    std::os::unix::fs::symlink(target, link).at("create symlink", link)
}

// Junctions, unlike symlinks, need no elevated privileges.
#[cfg(windows)]
fn create_dir_link(target: &Path, link: &Path) -> Result<()> {
    let output = std::process::Command::new("cmd")
        .args(["/c", "mklink", "/J"])
        .arg(link)
        .arg(target)
        .output()
        .at("create junction", link)?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let stdout = String::from_utf8_lossy(&output.stdout);
        return Err(NvsError::io(
            "create junction",
            link,
            std::io::Error::new(std::io::ErrorKind::Other, format!("{stdout}{stderr}").trim().to_string()),
        ));
    }
    Ok(())
}

/// `current` as a text file naming the key; resolved against the versions root.
pub struct FilePointer {
    file: PathBuf,
    versions_dir: PathBuf,
}

impl FilePointer {
    pub fn new(file: impl Into<PathBuf>, versions_dir: impl Into<PathBuf>) -> Self {
        Self {
            file: file.into(),
            versions_dir: versions_dir.into(),
        }
    }
}

impl PointerStore for FilePointer {
    fn read(&self) -> Option<VersionKey> {
        let content = fs::read_to_string(&self.file).ok()?;
        let key = VersionKey::from(content.trim());
        if !key.is_valid() || !self.versions_dir.join(key.as_str()).is_dir() {
            return None;
        }
        Some(key)
    }

    fn write(&self, key: &VersionKey, _version_dir: &Path) -> Result<()> {
        let staged = self.file.with_extension("tmp");
        fs::write(&staged, key.as_str()).at("write", &staged)?;
        remove_path(&self.file)?;
        fs::rename(&staged, &self.file).at("replace", &self.file)
    }

    fn clear(&self) -> Result<()> {
        remove_path(&self.file)
    }
}

pub fn pointer_for(kind: PointerKind, dirs: &NvsDirs) -> Box<dyn PointerStore> {
    match kind {
        PointerKind::Link => Box::new(LinkPointer::new(&dirs.current)),
        PointerKind::File => Box::new(FilePointer::new(&dirs.current, &dirs.versions_dir)),
    }
}

/// Where an installed version keeps its executables on this host.
pub fn bin_path_for(version_dir: &Path) -> PathBuf {
    if cfg!(windows) {
        version_dir.to_path_buf()
    } else {
        version_dir.join("bin")
    }
}

pub struct Activation {
    pointer: Box<dyn PointerStore>,
    versions_dir: PathBuf,
    shim_dir: PathBuf,
}

impl Activation {
    pub fn new(pointer: Box<dyn PointerStore>, dirs: &NvsDirs) -> Self {
        Self {
            pointer,
            versions_dir: dirs.versions_dir.clone(),
            shim_dir: dirs.shim_dir.clone(),
        }
    }

    pub fn current(&self) -> Option<VersionKey> {
        self.pointer.read()
    }

    /// Repoints `current` at `key` and regenerates the shim set from `bin_path`.
    ///
    /// Preconditions are checked before anything on disk changes.
    pub fn activate(&self, key: &VersionKey, bin_path: &Path) -> Result<()> {
        let version_dir = self.versions_dir.join(key.as_str());
        if !key.is_valid() || !version_dir.is_dir() {
            return Err(NvsError::NotInstalled(key.to_string()));
        }
        if !bin_path.is_dir() {
            return Err(NvsError::InvalidInstallation {
                key: key.to_string(),
                path: bin_path.to_path_buf(),
            });
        }

        self.pointer.write(key, &version_dir)?;
        self.regenerate_shims(bin_path)?;

        debug!("Now using Node.js {}", key);
        Ok(())
    }

    pub fn deactivate(&self) -> Result<()> {
        self.pointer.clear()?;
        remove_path(&self.shim_dir)
    }

    fn regenerate_shims(&self, bin_path: &Path) -> Result<()> {
        remove_path(&self.shim_dir)?;
        fs::create_dir_all(&self.shim_dir).at("create directory", &self.shim_dir)?;

        for (name, file) in SHIMS {
            let target = bin_path.join(file);
            if !target.exists() {
                debug!("Skipping shim for {}: {} is missing", name, target.display());
                continue;
            }
            create_shim(&self.shim_dir, name, &target)?;
        }
        Ok(())
    }
}

#[cfg(unix)]
fn create_shim(shim_dir: &Path, name: &str, target: &Path) -> Result<()> {
    let shim = shim_dir.join(name);
    if std::os::unix::fs::symlink(target, &shim).is_ok() {
        return Ok(());
    }
    debug!("Symlink for {} failed, writing a shell shim", name);
    write_script(
        &shim,
        &format!("#!/bin/sh\nexec \"{}\" \"$@\"\n", target.display()),
    )
}

#[cfg(not(unix))]
fn create_shim(shim_dir: &Path, name: &str, target: &Path) -> Result<()> {
    let shim = shim_dir.join(format!("{name}.bat"));
    write_script(
        &shim,
        &format!("@echo off\r\n\"{}\" %*\r\n", target.display()),
    )
}
