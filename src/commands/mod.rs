pub mod current;
pub mod install;
pub mod list;
pub mod uninstall;
pub mod r#use;

use anyhow::{Context as _, Result};
use nvs::utils::download::build_client;
use nvs::{pointer_for, Activation, HttpCatalog, HttpDownloader, NvsDirs, Settings, VersionStore};
use reqwest::blocking::Client;

/// Everything a command needs, built once per invocation.
pub struct Context {
    pub dirs: NvsDirs,
    pub settings: Settings,
    client: Client,
}

impl Context {
    pub fn load(insecure: bool) -> Result<Self> {
        let dirs = NvsDirs::from_home()?;
        let mut settings = dirs
            .load_settings()
            .with_context(|| format!("Failed to load {}", dirs.config_file.display()))?;
        settings.insecure |= insecure;

        let client = build_client(&settings)?;
        Ok(Self {
            dirs,
            settings,
            client,
        })
    }

    pub fn store(&self) -> VersionStore {
        VersionStore::new(&self.dirs)
    }

    pub fn activation(&self) -> Activation {
        Activation::new(pointer_for(self.settings.pointer, &self.dirs), &self.dirs)
    }

    pub fn catalog(&self) -> HttpCatalog {
        HttpCatalog::new(self.client.clone(), self.settings.index_url())
    }

    pub fn downloader(&self) -> HttpDownloader {
        HttpDownloader::new(self.client.clone())
    }
}
