use anyhow::Result;
use colored::Colorize;
use nvs::{UninstallOutcome, VersionKey};

use super::Context;

pub fn execute(ctx: &Context, version: &str) -> Result<()> {
    let store = ctx.store();
    let key = store
        .match_installed(version)?
        .unwrap_or_else(|| VersionKey::from(version.trim_start_matches('v')));

    match store.uninstall(&key, &ctx.activation())? {
        UninstallOutcome::NotInstalled => {
            println!("Node.js {} is not installed", key.as_str().yellow());
        }
        UninstallOutcome::Removed { was_current } => {
            println!("Successfully removed Node.js {}", key.as_str().green());
            if was_current {
                println!("No version is active now. Run 'nvs use <version>' to pick one.");
            }
        }
    }

    Ok(())
}
