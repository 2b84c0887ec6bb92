use semver::Version;
use std::env::consts;
use std::fmt;

use crate::config::DEFAULT_MIRROR;
use crate::error::{NvsError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    Win,
    Darwin,
    Linux,
}

impl Platform {
    pub fn normalize(os: &str) -> Result<Self> {
        match os.trim().to_ascii_lowercase().as_str() {
            "windows" | "win" => Ok(Self::Win),
            "darwin" | "macos" => Ok(Self::Darwin),
            "linux" => Ok(Self::Linux),
            _ => Err(NvsError::UnsupportedPlatform(os.to_string())),
        }
    }

    pub fn host() -> Result<Self> {
        Self::normalize(consts::OS)
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Win => "win",
            Self::Darwin => "darwin",
            Self::Linux => "linux",
        }
    }

    pub fn archive_format(self) -> ArchiveFormat {
        match self {
            Self::Win => ArchiveFormat::Zip,
            Self::Darwin => ArchiveFormat::TarGzip,
            Self::Linux => ArchiveFormat::TarXz,
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArchiveFormat {
    Zip,
    TarGzip,
    TarXz,
}

impl ArchiveFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Zip => "zip",
            Self::TarGzip => "tar.gz",
            Self::TarXz => "tar.xz",
        }
    }
}

/// Maps common architecture spellings onto Node's names. Unknown values pass through.
pub fn normalize_arch(arch: &str) -> String {
    let arch = arch.trim();
    match arch.to_ascii_lowercase().as_str() {
        "x86_64" | "amd64" | "x64" => "x64".to_string(),
        "aarch64" | "arm64" => "arm64".to_string(),
        "x86" | "i386" | "i686" | "ia32" | "386" => "x86".to_string(),
        _ => arch.to_string(),
    }
}

pub fn host_arch() -> String {
    normalize_arch(consts::ARCH)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseDescriptor {
    pub version: Version,
    pub platform: Platform,
    pub arch: String,
    pub format: ArchiveFormat,
    pub filename: String,
    pub url: String,
}

impl ReleaseDescriptor {
    /// Descriptor for the official dist site. Omitted OS/arch default to the host.
    pub fn build(version: &Version, os: Option<&str>, arch: Option<&str>) -> Result<Self> {
        Self::build_with_base(DEFAULT_MIRROR, version, os, arch)
    }

    pub fn build_with_base(
        base: &str,
        version: &Version,
        os: Option<&str>,
        arch: Option<&str>,
    ) -> Result<Self> {
        let platform = match os {
            Some(os) => Platform::normalize(os)?,
            None => Platform::host()?,
        };
        let arch = arch.map_or_else(host_arch, normalize_arch);
        let format = platform.archive_format();

        let filename = format!(
            "node-v{}-{}-{}.{}",
            version,
            platform.name(),
            arch,
            format.extension()
        );
        let url = format!("{}/v{}/{}", base.trim_end_matches('/'), version, filename);

        Ok(Self {
            version: version.clone(),
            platform,
            arch,
            format,
            filename,
            url,
        })
    }
}
