//! Core of the Node Version Switcher: resolving version tokens against the
//! release index, installing official archives into `~/.nvs/versions`, and
//! switching the active version.

pub mod activation;
pub mod catalog;
pub mod config;
pub mod error;
pub mod release;
pub mod store;
pub mod utils;

pub use activation::{bin_path_for, pointer_for, Activation, FilePointer, LinkPointer, PointerStore};
pub use catalog::{resolve, CatalogEntry, CatalogFetcher, HttpCatalog, LtsMarker, VersionToken};
pub use config::{NvsDirs, PointerKind, Settings};
pub use error::{NvsError, Result};
pub use release::{ArchiveFormat, Platform, ReleaseDescriptor};
pub use store::{InstallOptions, InstallOutcome, InstalledVersion, UninstallOutcome, VersionKey, VersionStore};
pub use utils::download::{Downloader, HttpDownloader};
