use anyhow::{Context as _, Result};
use colored::Colorize;
use nvs::{bin_path_for, config::NVS_DIR_NAME, VersionKey};

use super::Context;

pub fn execute(ctx: &Context, version: &str) -> Result<()> {
    let store = ctx.store();
    let key = store
        .match_installed(version)?
        .unwrap_or_else(|| VersionKey::from(version.trim_start_matches('v')));

    println!("Switching to {}...", key);
    ctx.activation()
        .activate(&key, &bin_path_for(&store.version_dir(&key)))
        .with_context(|| format!("Run 'nvs install {}' first if it is missing", version))?;

    println!("Now using Node.js {}", key.as_str().green());

    let on_path = std::env::var("PATH")
        .map(|path| path.contains(NVS_DIR_NAME))
        .unwrap_or(false);
    if !on_path {
        println!(
            "{} {} is not on your PATH; add it to pick up node, npm and npx",
            "warning:".yellow(),
            ctx.dirs.shim_dir.display()
        );
    }

    Ok(())
}
