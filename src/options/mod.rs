pub mod verbose;

use clap::{ArgAction, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    #[arg(short, long, global = true, action = ArgAction::SetTrue)]
    pub verbose: bool,

    /// Skip TLS certificate verification (corporate proxies)
    #[arg(short = 'k', long, global = true, action = ArgAction::SetTrue)]
    pub insecure: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Install a Node.js version (22, 20.5, 18.17.0, lts, latest)
    #[command(visible_alias = "i")]
    Install {
        version: String,

        /// Target OS for a cross-platform install (linux, darwin, win)
        #[arg(long)]
        os: Option<String>,

        /// Target architecture for a cross-platform install (x64, arm64, x86)
        #[arg(long)]
        arch: Option<String>,

        /// Reinstall even if already present
        #[arg(short, long)]
        force: bool,
    },

    /// Switch to an installed version
    #[command(name = "use", visible_alias = "u")]
    Use { version: String },

    /// Remove an installed version
    #[command(visible_aliases = ["remove", "rm"])]
    Uninstall { version: String },

    /// List installed versions
    #[command(visible_alias = "ls")]
    List {
        #[arg(short, long)]
        remote: bool,
    },

    /// Show the active version
    #[command(visible_alias = "c")]
    Current,
}
