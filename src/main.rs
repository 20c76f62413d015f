//! keg - desktop package lifecycle manager
//!
//! Installs packages described by JSON manifests: downloads are
//! hash-verified and cached, archives expand into a staging directory,
//! and a rename-based swap publishes the install root atomically.

use clap::Parser;

mod cache;
mod cli;
mod commands;
mod error;
mod force_delete;
mod hash;
mod installer;
mod links;
mod meta;
mod net;
mod package;
mod simulator;
mod unpack;
mod version;
mod vfs;

use cli::{Cli, Commands};
use vfs::PathTable;

fn main() {
    let cli = Cli::parse();

    if cli.verbose {
        match PathTable::discover(cli.root.clone()) {
            Ok(table) => eprintln!(
                "keg: base {} (mode {})",
                table.base.display(),
                table.mode.as_str()
            ),
            Err(e) => {
                eprintln!("Error: {e}");
                std::process::exit(1);
            }
        }
    }

    let result = match cli.command {
        Commands::Install(args) => commands::install::run(cli.root, args),
        Commands::Uninstall(args) => commands::uninstall::run(cli.root, args),
        Commands::List(args) => commands::list::run(cli.root, args),
        Commands::Info(args) => commands::info::run(cli.root, args),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
