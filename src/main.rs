mod commands;
mod options;

use clap::{CommandFactory, Parser};

fn main() -> anyhow::Result<()> {
    let cli = options::Cli::parse();

    options::verbose::init(cli.verbose);

    let Some(command) = cli.command else {
        let mut cmd = options::Cli::command();
        cmd.print_help()?;
        println!();
        return Ok(());
    };

    let ctx = commands::Context::load(cli.insecure)?;
    if ctx.settings.insecure {
        eprintln!("Warning: TLS certificate verification disabled");
    }

    match command {
        options::Commands::Install {
            version,
            os,
            arch,
            force,
        } => {
            commands::install::execute(&ctx, &version, os.as_deref(), arch.as_deref(), force)?;
        }
        options::Commands::Use { version } => {
            commands::r#use::execute(&ctx, &version)?;
        }
        options::Commands::Uninstall { version } => {
            commands::uninstall::execute(&ctx, &version)?;
        }
        options::Commands::List { remote } => {
            commands::list::execute(&ctx, remote)?;
        }
        options::Commands::Current => {
            commands::current::execute(&ctx)?;
        }
    }

    Ok(())
}
