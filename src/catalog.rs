//! Upstream release index and version-token resolution.
//!
//! The index at `{mirror}/index.json` lists every release newest-first. Alias
//! resolution (`latest`, `lts`) relies on that order; major/minor prefixes do
//! not, they track the numeric maximum explicitly.

use reqwest::blocking::Client;
use semver::Version;
use serde::Deserialize;
use tracing::{debug, info};

use crate::error::{NvsError, Result};

/// The `lts` field of an index row: `false` or a codename such as `"Hydrogen"`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum LtsMarker {
    Flag(bool),
    Codename(String),
}

impl Default for LtsMarker {
    fn default() -> Self {
        Self::Flag(false)
    }
}

impl LtsMarker {
    pub fn is_lts(&self) -> bool {
        match self {
            Self::Flag(flag) => *flag,
            Self::Codename(_) => true,
        }
    }

    pub fn codename(&self) -> Option<&str> {
        match self {
            Self::Codename(name) => Some(name),
            Self::Flag(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CatalogEntry {
    pub version: String,
    #[serde(default, deserialize_with = "nullable_lts")]
    pub lts: LtsMarker,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub npm: Option<String>,
}

fn nullable_lts<'de, D>(deserializer: D) -> std::result::Result<LtsMarker, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<LtsMarker>::deserialize(deserializer)?.unwrap_or_default())
}

impl CatalogEntry {
    pub fn new(version: &str, lts: LtsMarker) -> Self {
        Self {
            version: version.to_string(),
            lts,
            date: None,
            npm: None,
        }
    }

    /// Version string without the leading `v`.
    pub fn bare_version(&self) -> &str {
        self.version.strip_prefix('v').unwrap_or(&self.version)
    }

    fn components(&self) -> Vec<u64> {
        numeric_components(self.bare_version())
    }
}

/// A user-supplied version request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionToken {
    Exact(Version),
    /// `20` or `20.5`: newest release in that line.
    Prefix(Vec<u64>),
    Latest,
    Lts,
    LtsCodename(String),
}

impl VersionToken {
    pub fn parse(input: &str) -> Result<Self> {
        let lowered = input.trim().to_ascii_lowercase();
        let cleaned = lowered.strip_prefix('v').unwrap_or(&lowered);

        match cleaned {
            "latest" | "current" | "node" => return Ok(Self::Latest),
            "lts" | "lts/*" => return Ok(Self::Lts),
            _ => {}
        }

        if let Some(codename) = cleaned
            .strip_prefix("lts/")
            .or_else(|| cleaned.strip_prefix("lts-"))
            .filter(|name| !name.is_empty())
        {
            return Ok(Self::LtsCodename(codename.to_string()));
        }

        let parts: Vec<&str> = cleaned.split('.').collect();
        let numeric = parts
            .iter()
            .all(|part| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit()));
        if !numeric {
            return Err(NvsError::NotFound(input.to_string()));
        }

        match parts.len() {
            3 => Version::parse(cleaned)
                .map(Self::Exact)
                .map_err(|_| NvsError::NotFound(input.to_string())),
            1 | 2 => Ok(Self::Prefix(numeric_components(cleaned))),
            _ => Err(NvsError::NotFound(input.to_string())),
        }
    }

    pub fn needs_catalog(&self) -> bool {
        !matches!(self, Self::Exact(_))
    }
}

/// Source of the release index. The HTTP implementation is [`HttpCatalog`].
pub trait CatalogFetcher {
    fn fetch(&self) -> Result<Vec<CatalogEntry>>;
}

pub struct HttpCatalog {
    client: Client,
    index_url: String,
}

impl HttpCatalog {
    pub fn new(client: Client, index_url: impl Into<String>) -> Self {
        Self {
            client,
            index_url: index_url.into(),
        }
    }
}

impl CatalogFetcher for HttpCatalog {
    fn fetch(&self) -> Result<Vec<CatalogEntry>> {
        debug!("Fetching release index from {}", self.index_url);

        let response = self
            .client
            .get(&self.index_url)
            .send()
            .map_err(|e| NvsError::fetch(&self.index_url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(NvsError::fetch(&self.index_url, format!("HTTP {status}")));
        }

        let body = response
            .text()
            .map_err(|e| NvsError::fetch(&self.index_url, e))?;

        serde_json::from_str(&body).map_err(|source| NvsError::Parse {
            url: self.index_url.clone(),
            source,
        })
    }
}

/// Resolves `input` to a concrete release. Exact versions never touch the catalog.
pub fn resolve(input: &str, fetcher: &dyn CatalogFetcher) -> Result<Version> {
    let token = VersionToken::parse(input)?;

    if let VersionToken::Exact(version) = token {
        debug!("'{}' is an exact version, skipping catalog lookup", input);
        return Ok(version);
    }

    let catalog = fetcher.fetch()?;
    let entry = select(&token, &catalog).ok_or_else(|| NvsError::NotFound(input.to_string()))?;

    let version = Version::parse(entry.bare_version())
        .map_err(|_| NvsError::NotFound(input.to_string()))?;

    match entry.lts.codename() {
        Some(codename) => info!("Resolved '{}' -> v{} (LTS {})", input, version, codename),
        None => info!("Resolved '{}' -> v{}", input, version),
    }

    Ok(version)
}

/// The full release index, newest first, for remote listings.
pub fn remote_versions(fetcher: &dyn CatalogFetcher) -> Result<Vec<CatalogEntry>> {
    fetcher.fetch()
}

fn select<'a>(token: &VersionToken, catalog: &'a [CatalogEntry]) -> Option<&'a CatalogEntry> {
    match token {
        VersionToken::Exact(version) => {
            let wanted = version.to_string();
            catalog.iter().find(|entry| entry.bare_version() == wanted)
        }
        VersionToken::Latest => catalog.first(),
        VersionToken::Lts => catalog.iter().find(|entry| entry.lts.is_lts()),
        VersionToken::LtsCodename(codename) => catalog.iter().find(|entry| {
            entry
                .lts
                .codename()
                .is_some_and(|name| name.eq_ignore_ascii_case(codename))
        }),
        VersionToken::Prefix(prefix) => {
            let mut best: Option<(&CatalogEntry, Vec<u64>)> = None;
            for entry in catalog {
                let components = entry.components();
                if !components.starts_with(prefix) || components.len() <= prefix.len() {
                    continue;
                }
                // Strict comparison keeps the earliest entry on ties.
                if best.as_ref().map_or(true, |(_, top)| components > *top) {
                    best = Some((entry, components));
                }
            }
            best.map(|(entry, _)| entry)
        }
    }
}

/// Splits `18.17.0` into `[18, 17, 0]`, stopping at the first non-numeric part.
pub(crate) fn numeric_components(version: &str) -> Vec<u64> {
    version
        .split('.')
        .map_while(|part| part.parse::<u64>().ok())
        .collect()
}
