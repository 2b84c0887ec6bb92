use directories::BaseDirs;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{IoContext, NvsError, Result};

pub const NVS_DIR_NAME: &str = ".nvs";
pub const DEFAULT_MIRROR: &str = "https://nodejs.org/dist";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointerKind {
    /// Symlink on Unix, directory junction on Windows.
    #[default]
    Link,
    /// Plain text file naming the active key.
    File,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub mirror: String,
    pub timeout_secs: u64,
    pub insecure: bool,
    pub pointer: PointerKind,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            mirror: DEFAULT_MIRROR.to_string(),
            timeout_secs: 30,
            insecure: false,
            pointer: PointerKind::Link,
        }
    }
}

impl Settings {
    pub fn index_url(&self) -> String {
        format!("{}/index.json", self.mirror.trim_end_matches('/'))
    }
}

/// On-disk layout rooted at `~/.nvs`.
#[derive(Debug, Clone)]
pub struct NvsDirs {
    pub root: PathBuf,
    pub versions_dir: PathBuf,
    pub current: PathBuf,
    pub shim_dir: PathBuf,
    pub bin_dir: PathBuf,
    pub tmp_dir: PathBuf,
    pub config_file: PathBuf,
}

impl NvsDirs {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            versions_dir: root.join("versions"),
            current: root.join("current"),
            shim_dir: root.join("current-bin"),
            bin_dir: root.join("bin"),
            tmp_dir: root.join("tmp"),
            config_file: root.join("config.json"),
            root,
        }
    }

    pub fn from_home() -> Result<Self> {
        let home = home_dir().ok_or_else(|| {
            NvsError::io(
                "locate home directory",
                Path::new("$HOME"),
                std::io::Error::from(std::io::ErrorKind::NotFound),
            )
        })?;
        Ok(Self::new(home.join(NVS_DIR_NAME)))
    }

    pub fn ensure(&self) -> Result<()> {
        for dir in [&self.root, &self.versions_dir, &self.tmp_dir] {
            fs::create_dir_all(dir).at("create directory", dir)?;
        }
        Ok(())
    }

    pub fn load_settings(&self) -> Result<Settings> {
        if !self.config_file.exists() {
            return Ok(Settings::default());
        }

        let content = fs::read_to_string(&self.config_file).at("read", &self.config_file)?;
        serde_json::from_str(&content).map_err(|source| NvsError::Config {
            path: self.config_file.clone(),
            source,
        })
    }

    pub fn save_settings(&self, settings: &Settings) -> Result<()> {
        fs::create_dir_all(&self.root).at("create directory", &self.root)?;
        let content = serde_json::to_string_pretty(settings).map_err(|source| NvsError::Config {
            path: self.config_file.clone(),
            source,
        })?;
        fs::write(&self.config_file, content).at("write", &self.config_file)
    }
}

fn home_dir() -> Option<PathBuf> {
    ["HOME", "USERPROFILE"]
        .iter()
        .filter_map(|var| env::var_os(var))
        .find(|value| !value.is_empty())
        .map(PathBuf::from)
        .or_else(|| BaseDirs::new().map(|dirs| dirs.home_dir().to_path_buf()))
}
