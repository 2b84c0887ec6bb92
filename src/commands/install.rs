use anyhow::Result;
use colored::Colorize;
use nvs::{bin_path_for, catalog, InstallOptions, InstallOutcome, ReleaseDescriptor, VersionKey};

use super::Context;

pub fn execute(
    ctx: &Context,
    version: &str,
    os: Option<&str>,
    arch: Option<&str>,
    force: bool,
) -> Result<()> {
    ctx.dirs.ensure()?;

    println!("Resolving version '{}'...", version);
    let resolved = catalog::resolve(version, &ctx.catalog())?;

    let cross_platform = os.is_some() || arch.is_some();
    let release = ReleaseDescriptor::build_with_base(&ctx.settings.mirror, &resolved, os, arch)?;
    let key = VersionKey::for_release(&release, cross_platform);

    println!("Installing Node.js {} ({})", key.as_str().green(), release.filename);

    let store = ctx.store();
    let outcome = store.install(&release, &key, &ctx.downloader(), InstallOptions { force })?;

    match &outcome {
        InstallOutcome::AlreadyInstalled(_) => {
            println!("Node.js {} is already installed", key);
        }
        InstallOutcome::Installed(installed) => {
            println!(
                "Successfully installed Node.js {} into {}",
                key.as_str().green(),
                installed.path.display()
            );
        }
    }

    let activation = ctx.activation();
    if !cross_platform && activation.current().is_none() {
        println!("Setting Node.js {} as the default version", key);
        activation.activate(&key, &bin_path_for(&outcome.installed().path))?;
    }

    Ok(())
}
