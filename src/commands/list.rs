use anyhow::Result;
use colored::Colorize;
use nvs::catalog::remote_versions;
use nvs::VersionKey;

use super::Context;

const REMOTE_LIMIT: usize = 30;

pub fn execute(ctx: &Context, remote: bool) -> Result<()> {
    if remote {
        list_remote_versions(ctx)?;
    } else {
        list_local_versions(ctx)?;
    }

    Ok(())
}

fn list_local_versions(ctx: &Context) -> Result<()> {
    let versions = ctx.store().list()?;

    if versions.is_empty() {
        println!("No versions installed");
        println!("  Run 'nvs install <version>' to install one");
        return Ok(());
    }

    let current = ctx.activation().current();
    println!("Installed Node.js versions:");

    for version in versions {
        if current.as_ref() == Some(&version) {
            println!("* {} (current)", version.as_str().green());
        } else {
            println!("  {}", version);
        }
    }

    Ok(())
}

fn list_remote_versions(ctx: &Context) -> Result<()> {
    println!("Fetching available Node.js versions...");

    let available = remote_versions(&ctx.catalog())?;
    if available.is_empty() {
        println!("No available versions found");
        return Ok(());
    }

    let store = ctx.store();
    let current = ctx.activation().current();

    println!("\nAvailable Node.js versions:");

    for entry in available.iter().take(REMOTE_LIMIT) {
        let key = VersionKey::from(entry.bare_version());
        let lts = entry
            .lts
            .codename()
            .map(|name| format!(" (LTS: {name})"))
            .unwrap_or_default();

        if current.as_ref() == Some(&key) {
            println!("* {}{} (installed, current)", entry.version.green(), lts);
        } else if store.is_installed(&key) {
            println!("* {}{} (installed)", entry.version.yellow(), lts);
        } else {
            println!("  {}{}", entry.version, lts);
        }
    }

    if available.len() > REMOTE_LIMIT {
        println!("  ... and {} more", available.len() - REMOTE_LIMIT);
    }

    Ok(())
}
