mod cli;
mod commands;
mod engine;
mod paths;
mod ui;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::generate;
use cli::{Cli, Command};
use pkgkit::InventoryStore;
use std::io;

/// Global context for the application
pub struct Context {
    pub verbose: u8,
    pub quiet: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    let log_level = match cli.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    env_logger::Builder::new()
        .filter_level(if cli.quiet {
            log::LevelFilter::Error
        } else {
            log_level
        })
        .format_timestamp(None)
        .init();

    let ctx = Context {
        verbose: cli.verbose,
        quiet: cli.quiet,
    };

    let dir = match &cli.dir {
        Some(dir) => paths::expand(dir),
        None => paths::data_dir()?,
    };
    let store = InventoryStore::new(dir);

    match cli.command {
        Command::Capture(args) => commands::capture::run(&ctx, &store, &args),
        Command::Plan(args) => commands::plan::run(&ctx, &store, &args),
        Command::Restore(args) => commands::restore::run(&ctx, &store, &args),
        Command::Script(args) => commands::script::run(&ctx, &store, &args),
        Command::Doctor => commands::doctor::run(&ctx, &store),
        Command::Completions { shell } => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "pkgport", &mut io::stdout());
            Ok(())
        }
    }
}
