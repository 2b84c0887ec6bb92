//! Installed versions under `versions/`. Directory presence is the only record
//! of what is installed.

use std::cmp::Ordering;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};
use semver::Version;
use tracing::{debug, info, warn};

use crate::activation::Activation;
use crate::catalog::numeric_components;
use crate::config::NvsDirs;
use crate::error::{IoContext, NvsError, Result};
use crate::release::{Platform, ReleaseDescriptor};
use crate::utils::download::Downloader;
use crate::utils::extract::extract_archive;
use crate::utils::{make_executable, remove_path, write_script};

const NPM_LAUNCHERS: &[(&str, &str)] = &[("npm", "npm-cli.js"), ("npx", "npx-cli.js")];

/// On-disk name of an installed build: `18.17.0`, or `18.17.0-linux-x64` for
/// builds targeting another platform.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VersionKey(String);

impl VersionKey {
    pub fn native(version: &Version) -> Self {
        Self(version.to_string())
    }

    pub fn for_target(version: &Version, platform: Platform, arch: &str) -> Self {
        Self(format!("{}-{}-{}", version, platform.name(), arch))
    }

    /// Native key when neither OS nor arch was requested, composite otherwise.
    pub fn for_release(release: &ReleaseDescriptor, cross_platform: bool) -> Self {
        if cross_platform {
            Self::for_target(&release.version, release.platform, &release.arch)
        } else {
            Self::native(&release.version)
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when the key names exactly one directory directly under `versions/`.
    /// Empty names, `.`, `..` and anything with a separator are rejected.
    pub fn is_valid(&self) -> bool {
        let mut parts = Path::new(&self.0).components();
        matches!(parts.next(), Some(Component::Normal(_)))
            && parts.next().is_none()
            && !self.0.contains(|c: char| c == '/' || c == '\\')
    }

    /// The `MAJOR.MINOR.PATCH` part of the key.
    pub fn version_part(&self) -> &str {
        self.0.split('-').next().unwrap_or(&self.0)
    }

    fn sort_key(&self) -> Vec<u64> {
        numeric_components(self.version_part())
    }
}

impl fmt::Display for VersionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for VersionKey {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl Ord for VersionKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.sort_key()
            .cmp(&other.sort_key())
            .then_with(|| self.0.cmp(&other.0))
    }
}

impl PartialOrd for VersionKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstalledVersion {
    pub key: VersionKey,
    pub path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallOutcome {
    Installed(InstalledVersion),
    AlreadyInstalled(InstalledVersion),
}

impl InstallOutcome {
    pub fn installed(&self) -> &InstalledVersion {
        match self {
            Self::Installed(v) | Self::AlreadyInstalled(v) => v,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UninstallOutcome {
    Removed { was_current: bool },
    NotInstalled,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct InstallOptions {
    pub force: bool,
}

pub struct VersionStore {
    versions_dir: PathBuf,
    tmp_dir: PathBuf,
}

impl VersionStore {
    pub fn new(dirs: &NvsDirs) -> Self {
        Self {
            versions_dir: dirs.versions_dir.clone(),
            tmp_dir: dirs.tmp_dir.clone(),
        }
    }

    pub fn version_dir(&self, key: &VersionKey) -> PathBuf {
        self.versions_dir.join(key.as_str())
    }

    pub fn is_installed(&self, key: &VersionKey) -> bool {
        self.installed_dir(key).is_some()
    }

    fn installed_dir(&self, key: &VersionKey) -> Option<PathBuf> {
        if !key.is_valid() {
            return None;
        }
        Some(self.version_dir(key)).filter(|dir| dir.is_dir())
    }

    /// Downloads and unpacks `release` under `key`.
    ///
    /// The archive is unpacked into a staging directory under `tmp/` and renamed
    /// into `versions/` only once complete. On failure nothing is left behind.
    pub fn install(
        &self,
        release: &ReleaseDescriptor,
        key: &VersionKey,
        downloader: &dyn Downloader,
        options: InstallOptions,
    ) -> Result<InstallOutcome> {
        if !key.is_valid() {
            return Err(NvsError::InvalidKey(key.to_string()));
        }
        let target = self.version_dir(key);
        let installed = InstalledVersion {
            key: key.clone(),
            path: target.clone(),
        };

        if target.is_dir() {
            if !options.force {
                debug!("Node.js {} is already installed", key);
                return Ok(InstallOutcome::AlreadyInstalled(installed));
            }
            info!("Reinstalling Node.js {}", key);
            remove_path(&target)?;
        }

        fs::create_dir_all(&self.tmp_dir).at("create directory", &self.tmp_dir)?;
        fs::create_dir_all(&self.versions_dir).at("create directory", &self.versions_dir)?;

        let archive = self.tmp_dir.join(&release.filename);
        let staging = self.tmp_dir.join(format!("staging-{key}"));
        remove_path(&staging)?;

        let result = self.download_and_unpack(release, &archive, &staging, &target, downloader);

        let archive_cleanup = remove_path(&archive);
        let staging_cleanup = remove_path(&staging);

        if let Err(err) = result {
            warn!("Install of {} failed, cleaning up: {}", key, err);
            if let Err(cleanup) = remove_path(&target) {
                warn!("Could not remove {}: {}", target.display(), cleanup);
            }
            return Err(err);
        }

        archive_cleanup?;
        staging_cleanup?;

        debug!("Installed Node.js {} into {}", key, target.display());
        Ok(InstallOutcome::Installed(installed))
    }

    fn download_and_unpack(
        &self,
        release: &ReleaseDescriptor,
        archive: &Path,
        staging: &Path,
        target: &Path,
        downloader: &dyn Downloader,
    ) -> Result<()> {
        downloader.download(&release.url, archive)?;
        extract_archive(archive, staging, release.format)?;
        promote(staging, target)?;

        if release.platform != Platform::Win {
            repair_npm_links(target)?;
        }
        Ok(())
    }

    /// Removes `key`, clearing the active pointer first when it points here.
    pub fn uninstall(&self, key: &VersionKey, activation: &Activation) -> Result<UninstallOutcome> {
        let Some(target) = self.installed_dir(key) else {
            debug!("Node.js {} is not installed, nothing to remove", key);
            return Ok(UninstallOutcome::NotInstalled);
        };

        let was_current = activation.current().as_ref() == Some(key);
        if was_current {
            debug!("{} is active, clearing current pointer", key);
            activation.deactivate()?;
        }

        remove_path(&target)?;
        debug!("Uninstalled Node.js {}", key);
        Ok(UninstallOutcome::Removed { was_current })
    }

    /// Installed keys ordered numerically by version, then by full key.
    pub fn list(&self) -> Result<Vec<VersionKey>> {
        let entries = match fs::read_dir(&self.versions_dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(NvsError::io("read directory", &self.versions_dir, e)),
        };

        let mut keys = Vec::new();
        for entry in entries {
            let entry = entry.at("read directory", &self.versions_dir)?;
            if !entry.file_type().at("inspect", &entry.path())?.is_dir() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                if !name.starts_with('.') {
                    keys.push(VersionKey::from(name));
                }
            }
        }

        keys.sort();
        Ok(keys)
    }

    /// Maps loose user input (`v18.17.0`, `18`, `18.17`) onto an installed key,
    /// picking the newest native build for prefixes.
    pub fn match_installed(&self, query: &str) -> Result<Option<VersionKey>> {
        let query = query.trim();
        let cleaned = query.strip_prefix('v').unwrap_or(query);

        for candidate in [query, cleaned] {
            let key = VersionKey::from(candidate);
            if !candidate.is_empty() && self.is_installed(&key) {
                return Ok(Some(key));
            }
        }

        let prefix = format!("{cleaned}.");
        Ok(self
            .list()?
            .into_iter()
            .filter(|key| key.as_str().starts_with(&prefix) && !key.as_str().contains('-'))
            .max())
    }
}

/// Moves the unpacked tree into place. Node archives wrap everything in a single
/// `node-v*` folder; its contents become the version directory.
fn promote(staging: &Path, target: &Path) -> Result<()> {
    let entries = fs::read_dir(staging)
        .at("read directory", staging)?
        .collect::<io::Result<Vec<_>>>()
        .at("read directory", staging)?;

    if entries.is_empty() {
        return Err(NvsError::Archive {
            path: staging.to_path_buf(),
            reason: "archive contains no files".to_string(),
        });
    }

    let source = match entries.as_slice() {
        [only] if only.file_type().map(|t| t.is_dir()).unwrap_or(false)
            && only.file_name().to_string_lossy().starts_with("node-") =>
        {
            only.path()
        }
        _ => staging.to_path_buf(),
    };

    debug!("Promoting {} to {}", source.display(), target.display());
    fs::rename(&source, target).at("move into place", target)
}

/// Recreates `bin/npm` and `bin/npx` as relative links to npm's launchers.
/// Archive extraction does not reliably keep them as links.
pub fn repair_npm_links(version_dir: &Path) -> Result<()> {
    let bin = version_dir.join("bin");
    if !bin.is_dir() {
        return Ok(());
    }

    for (name, launcher) in NPM_LAUNCHERS {
        let launcher_path = version_dir.join("lib/node_modules/npm/bin").join(launcher);
        if !launcher_path.is_file() {
            debug!("No {} launcher in {}", name, version_dir.display());
            continue;
        }
        make_executable(&launcher_path)?;

        let link = bin.join(name);
        remove_path(&link)?;
        let relative = format!("../lib/node_modules/npm/bin/{launcher}");
        if !link_relative(&relative, &link) {
            debug!("Symlink for {} unavailable, writing wrapper", name);
            write_script(
                &link,
                &format!("#!/bin/sh\nexec \"$(dirname \"$0\")/node\" \"$(dirname \"$0\")/{relative}\" \"$@\"\n"),
            )?;
        }
    }
    Ok(())
}

#[cfg(unix)]
fn link_relative(target: &str, link: &Path) -> bool {
    std::os::unix::fs::symlink(target, link).is_ok()
}

#[cfg(not(unix))]
fn link_relative(_target: &str, _link: &Path) -> bool {
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activation::tests::{fake_install, MemoryPointer};
    use crate::activation::{bin_path_for, LinkPointer};
    use crate::utils::extract::tests::{tar_xz, zip_bytes, Fixture};
    use std::cell::Cell;
    use tempfile::tempdir;

    struct FakeDownloader {
        payload: Vec<u8>,
        calls: Cell<usize>,
    }

    impl FakeDownloader {
        fn new(payload: Vec<u8>) -> Self {
            Self {
                payload,
                calls: Cell::new(0),
            }
        }
    }

    impl Downloader for FakeDownloader {
        fn download(&self, _url: &str, dest: &Path) -> Result<()> {
            self.calls.set(self.calls.get() + 1);
            fs::write(dest, &self.payload).at("write", dest)
        }
    }

    struct FailingDownloader;

    impl Downloader for FailingDownloader {
        fn download(&self, url: &str, dest: &Path) -> Result<()> {
            fs::write(dest, b"partial").at("write", dest)?;
            Err(NvsError::fetch(url, "connection reset"))
        }
    }

    fn linux_release(version: &str) -> ReleaseDescriptor {
        let version = Version::parse(version).unwrap();
        ReleaseDescriptor::build(&version, Some("linux"), Some("x64")).unwrap()
    }

    fn linux_tarball() -> Vec<u8> {
        tar_xz(&[
            Fixture::Dir("node-v18.17.0-linux-x64/"),
            Fixture::Dir("node-v18.17.0-linux-x64/bin/"),
            Fixture::File("node-v18.17.0-linux-x64/bin/node", b"#!/bin/sh\n", 0o755),
            Fixture::File("node-v18.17.0-linux-x64/bin/npm", b"stale copy", 0o644),
            Fixture::File(
                "node-v18.17.0-linux-x64/lib/node_modules/npm/bin/npm-cli.js",
                b"// npm\n",
                0o644,
            ),
            Fixture::File(
                "node-v18.17.0-linux-x64/lib/node_modules/npm/bin/npx-cli.js",
                b"// npx\n",
                0o644,
            ),
        ])
    }

    fn tmp_is_empty(dirs: &NvsDirs) -> bool {
        fs::read_dir(&dirs.tmp_dir)
            .map(|mut entries| entries.next().is_none())
            .unwrap_or(true)
    }

    #[test]
    fn install_flattens_the_wrapper_folder() {
        let tmp = tempdir().unwrap();
        let dirs = NvsDirs::new(tmp.path());
        let store = VersionStore::new(&dirs);
        let downloader = FakeDownloader::new(linux_tarball());
        let key = VersionKey::from("18.17.0");

        let outcome = store
            .install(&linux_release("18.17.0"), &key, &downloader, InstallOptions::default())
            .unwrap();

        let path = &outcome.installed().path;
        assert!(matches!(outcome, InstallOutcome::Installed(_)));
        assert!(path.join("bin/node").is_file());
        assert!(!path.join("node-v18.17.0-linux-x64").exists());
        assert!(tmp_is_empty(&dirs));
    }

    #[test]
    fn second_install_is_a_no_op() {
        let tmp = tempdir().unwrap();
        let dirs = NvsDirs::new(tmp.path());
        let store = VersionStore::new(&dirs);
        let downloader = FakeDownloader::new(linux_tarball());
        let key = VersionKey::from("18.17.0");
        let release = linux_release("18.17.0");

        store.install(&release, &key, &downloader, InstallOptions::default()).unwrap();
        let second = store.install(&release, &key, &downloader, InstallOptions::default()).unwrap();

        assert!(matches!(second, InstallOutcome::AlreadyInstalled(_)));
        assert_eq!(downloader.calls.get(), 1);
    }

    #[test]
    fn force_reinstalls() {
        let tmp = tempdir().unwrap();
        let dirs = NvsDirs::new(tmp.path());
        let store = VersionStore::new(&dirs);
        let downloader = FakeDownloader::new(linux_tarball());
        let key = VersionKey::from("18.17.0");
        let release = linux_release("18.17.0");

        store.install(&release, &key, &downloader, InstallOptions::default()).unwrap();
        fs::write(store.version_dir(&key).join("marker"), "old").unwrap();
        store.install(&release, &key, &downloader, InstallOptions { force: true }).unwrap();

        assert_eq!(downloader.calls.get(), 2);
        assert!(!store.version_dir(&key).join("marker").exists());
    }

    #[test]
    fn truncated_archive_leaves_no_trace() {
        let tmp = tempdir().unwrap();
        let dirs = NvsDirs::new(tmp.path());
        let store = VersionStore::new(&dirs);
        let full = linux_tarball();
        let downloader = FakeDownloader::new(full[..full.len() / 3].to_vec());
        let key = VersionKey::from("18.17.0");

        let result = store.install(&linux_release("18.17.0"), &key, &downloader, InstallOptions::default());

        assert!(result.is_err());
        assert!(!store.version_dir(&key).exists());
        assert!(tmp_is_empty(&dirs));
        assert!(store.list().unwrap().is_empty());
    }

    #[test]
    fn failed_download_removes_the_temp_archive() {
        let tmp = tempdir().unwrap();
        let dirs = NvsDirs::new(tmp.path());
        let store = VersionStore::new(&dirs);
        let key = VersionKey::from("18.17.0");

        let err = store
            .install(&linux_release("18.17.0"), &key, &FailingDownloader, InstallOptions::default())
            .unwrap_err();

        assert!(err.is_retryable());
        assert!(!store.version_dir(&key).exists());
        assert!(tmp_is_empty(&dirs));
    }

    #[test]
    fn traversal_aborts_the_install() {
        let tmp = tempdir().unwrap();
        let dirs = NvsDirs::new(tmp.path());
        let store = VersionStore::new(&dirs);
        let payload = zip_bytes(&[
            Fixture::File("node-v20.5.0-win-x64/node.exe", b"MZ", 0o755),
            Fixture::File("../../evil.txt", b"pwned", 0o644),
        ]);
        let downloader = FakeDownloader::new(payload);
        let release =
            ReleaseDescriptor::build(&Version::new(20, 5, 0), Some("win"), Some("x64")).unwrap();
        let key = VersionKey::for_release(&release, true);

        let err = store
            .install(&release, &key, &downloader, InstallOptions::default())
            .unwrap_err();

        assert!(matches!(err, NvsError::PathTraversal { .. }));
        assert!(!store.version_dir(&key).exists());
        assert!(!tmp.path().join("evil.txt").exists());
    }

    #[cfg(unix)]
    #[test]
    fn npm_links_are_repaired_after_install() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = tempdir().unwrap();
        let dirs = NvsDirs::new(tmp.path());
        let store = VersionStore::new(&dirs);
        let downloader = FakeDownloader::new(linux_tarball());
        let key = VersionKey::from("18.17.0");

        store
            .install(&linux_release("18.17.0"), &key, &downloader, InstallOptions::default())
            .unwrap();

        let dir = store.version_dir(&key);
        for (name, launcher) in NPM_LAUNCHERS {
            let link = fs::read_link(dir.join("bin").join(name)).unwrap();
            assert_eq!(link, PathBuf::from(format!("../lib/node_modules/npm/bin/{launcher}")));
            let mode = fs::metadata(dir.join("lib/node_modules/npm/bin").join(launcher))
                .unwrap()
                .permissions()
                .mode();
            assert_eq!(mode & 0o111, 0o111);
        }
    }

    #[test]
    fn list_orders_numerically() {
        let tmp = tempdir().unwrap();
        let dirs = NvsDirs::new(tmp.path());
        for key in ["9.0.0", "18.17.0", "2.0.0"] {
            fs::create_dir_all(dirs.versions_dir.join(key)).unwrap();
        }
        let store = VersionStore::new(&dirs);

        let keys: Vec<String> = store.list().unwrap().iter().map(ToString::to_string).collect();
        assert_eq!(keys, ["2.0.0", "9.0.0", "18.17.0"]);
    }

    #[test]
    fn list_groups_cross_platform_keys_by_version() {
        let tmp = tempdir().unwrap();
        let dirs = NvsDirs::new(tmp.path());
        for key in ["18.17.0-win-x64", "18.17.0", "18.17.0-darwin-arm64", "16.0.0"] {
            fs::create_dir_all(dirs.versions_dir.join(key)).unwrap();
        }
        fs::write(dirs.versions_dir.join("notes.txt"), "").unwrap();
        let store = VersionStore::new(&dirs);

        let keys: Vec<String> = store.list().unwrap().iter().map(ToString::to_string).collect();
        assert_eq!(
            keys,
            ["16.0.0", "18.17.0", "18.17.0-darwin-arm64", "18.17.0-win-x64"]
        );
    }

    #[test]
    fn list_without_versions_dir_is_empty() {
        let tmp = tempdir().unwrap();
        let store = VersionStore::new(&NvsDirs::new(tmp.path().join("absent")));
        assert!(store.list().unwrap().is_empty());
    }

    #[test]
    fn uninstall_missing_is_not_an_error() {
        let tmp = tempdir().unwrap();
        let dirs = NvsDirs::new(tmp.path());
        let store = VersionStore::new(&dirs);
        let activation = Activation::new(Box::<MemoryPointer>::default(), &dirs);

        let outcome = store.uninstall(&VersionKey::from("18.17.0"), &activation).unwrap();
        assert_eq!(outcome, UninstallOutcome::NotInstalled);
    }

    #[test]
    fn uninstall_current_clears_the_pointer() {
        let tmp = tempdir().unwrap();
        let dirs = NvsDirs::new(tmp.path());
        let store = VersionStore::new(&dirs);
        let activation = Activation::new(Box::<MemoryPointer>::default(), &dirs);
        let version_dir = fake_install(&dirs, "18.17.0", &["node"]);
        let key = VersionKey::from("18.17.0");
        activation.activate(&key, &bin_path_for(&version_dir)).unwrap();

        let outcome = store.uninstall(&key, &activation).unwrap();

        assert_eq!(outcome, UninstallOutcome::Removed { was_current: true });
        assert_eq!(activation.current(), None);
        assert!(!version_dir.exists());
        assert!(!dirs.shim_dir.exists());
    }

    #[cfg(unix)]
    #[test]
    fn uninstall_other_version_keeps_current_link() {
        let tmp = tempdir().unwrap();
        let dirs = NvsDirs::new(tmp.path());
        let store = VersionStore::new(&dirs);
        let activation = Activation::new(Box::new(LinkPointer::new(&dirs.current)), &dirs);
        let active_dir = fake_install(&dirs, "20.5.0", &["node"]);
        fake_install(&dirs, "18.17.0", &["node"]);
        let active = VersionKey::from("20.5.0");
        activation.activate(&active, &bin_path_for(&active_dir)).unwrap();

        let outcome = store.uninstall(&VersionKey::from("18.17.0"), &activation).unwrap();

        assert_eq!(outcome, UninstallOutcome::Removed { was_current: false });
        assert_eq!(activation.current(), Some(active));
    }

    #[test]
    fn uninstall_rejects_keys_outside_the_versions_root() {
        let tmp = tempdir().unwrap();
        let dirs = NvsDirs::new(tmp.path());
        let store = VersionStore::new(&dirs);
        let activation = Activation::new(Box::<MemoryPointer>::default(), &dirs);
        fake_install(&dirs, "18.17.0", &["node"]);
        fake_install(&dirs, "20.5.0", &["node"]);
        fs::write(dirs.root.join("config.json"), "{}").unwrap();

        for name in ["", ".", "..", "/", "../..", "18.17.0/bin", "..\\x"] {
            let outcome = store.uninstall(&VersionKey::from(name), &activation).unwrap();
            assert_eq!(outcome, UninstallOutcome::NotInstalled, "{name:?}");
        }

        assert!(store.is_installed(&VersionKey::from("18.17.0")));
        assert!(store.is_installed(&VersionKey::from("20.5.0")));
        assert!(dirs.root.join("config.json").is_file());
    }

    #[test]
    fn loose_input_never_matches_the_root_or_its_parent() {
        let tmp = tempdir().unwrap();
        let dirs = NvsDirs::new(tmp.path());
        fs::create_dir_all(dirs.versions_dir.join("18.17.0")).unwrap();
        let store = VersionStore::new(&dirs);

        for query in ["v", "", "..", ".", "/"] {
            assert_eq!(store.match_installed(query).unwrap(), None, "{query:?}");
        }
    }

    #[test]
    fn install_refuses_an_invalid_key() {
        let tmp = tempdir().unwrap();
        let dirs = NvsDirs::new(tmp.path());
        let store = VersionStore::new(&dirs);
        let downloader = FakeDownloader::new(linux_tarball());

        let err = store
            .install(&linux_release("18.17.0"), &VersionKey::from(".."), &downloader, InstallOptions::default())
            .unwrap_err();

        assert!(matches!(err, NvsError::InvalidKey(_)));
        assert_eq!(downloader.calls.get(), 0);
    }

    #[test]
    fn key_validity() {
        assert!(VersionKey::from("18.17.0").is_valid());
        assert!(VersionKey::from("18.17.0-win-x64").is_valid());
        for name in ["", ".", "..", "/", "a/b", "a\\b", "18.17.0/"] {
            assert!(!VersionKey::from(name).is_valid(), "{name:?}");
        }
    }

    #[test]
    fn empty_archive_is_not_installed() {
        let tmp = tempdir().unwrap();
        let dirs = NvsDirs::new(tmp.path());
        let store = VersionStore::new(&dirs);
        let downloader = FakeDownloader::new(tar_xz(&[]));
        let key = VersionKey::from("18.17.0");

        let err = store
            .install(&linux_release("18.17.0"), &key, &downloader, InstallOptions::default())
            .unwrap_err();

        assert!(matches!(err, NvsError::Archive { .. }));
        assert!(!store.version_dir(&key).exists());
        assert!(tmp_is_empty(&dirs));
    }

    #[test]
    fn match_installed_accepts_loose_input() {
        let tmp = tempdir().unwrap();
        let dirs = NvsDirs::new(tmp.path());
        for key in ["18.2.0", "18.17.0", "20.5.0", "180.1.0"] {
            fs::create_dir_all(dirs.versions_dir.join(key)).unwrap();
        }
        let store = VersionStore::new(&dirs);

        let found = |q: &str| store.match_installed(q).unwrap().map(|k| k.to_string());
        assert_eq!(found("v18.17.0").as_deref(), Some("18.17.0"));
        assert_eq!(found("18").as_deref(), Some("18.17.0"));
        assert_eq!(found("18.2").as_deref(), Some("18.2.0"));
        assert_eq!(found("16"), None);
    }

    #[test]
    fn composite_keys_use_normalized_names() {
        let release = ReleaseDescriptor::build(&Version::new(18, 17, 0), Some("linux"), Some("amd64"))
            .unwrap();
        assert_eq!(VersionKey::for_release(&release, true).as_str(), "18.17.0-linux-x64");
        assert_eq!(VersionKey::for_release(&release, false).as_str(), "18.17.0");
        assert_eq!(VersionKey::from("18.17.0-linux-x64").version_part(), "18.17.0");
    }
}
