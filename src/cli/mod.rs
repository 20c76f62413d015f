//! CLI definitions using clap derive API
//!
//! This module is organized into submodules for each command's argument
//! types:
//! - install: Install command arguments
//! - uninstall: Uninstall command arguments
//! - list: List command arguments
//! - info: Info command arguments

use clap::builder::{Styles, styling::AnsiColor};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub mod info;
pub mod install;
pub mod list;
pub mod uninstall;

pub use info::InfoArgs;
pub use install::InstallArgs;
pub use list::ListArgs;
pub use uninstall::UninstallArgs;

/// keg - desktop package lifecycle manager
///
/// Fetch, verify, unpack, and atomically install packages into a managed
/// directory tree.
#[derive(Parser, Debug)]
#[command(
    name = "keg",
    author,
    version,
    color = clap::ColorChoice::Always,
    styles = Styles::styled()
        .header(AnsiColor::Green.on_default().bold())
        .usage(AnsiColor::Green.on_default().bold())
        .literal(AnsiColor::Cyan.on_default().bold())
        .placeholder(AnsiColor::Cyan.on_default()),
    about = "Desktop package lifecycle manager with atomic installs",
    long_about = "keg installs packages described by JSON manifests: downloads are \
                  hash-verified and cached, archives expand into a staging directory, \
                  and a rename-based swap makes the install root visible atomically.",
    after_help = "\x1b[1m\x1b[32mExamples:\x1b[0m\n   \
                  keg install ./manifests/rg.json        \x1b[90m# Install one package\x1b[0m\n   \
                  keg install ./a.json ./b.json --force  \x1b[90m# Upgrade even frozen packages\x1b[0m\n   \
                  keg list                               \x1b[90m# List installed packages\x1b[0m\n   \
                  keg info rg                            \x1b[90m# Show an installed record\x1b[0m\n   \
                  keg uninstall rg                       \x1b[90m# Remove a package\x1b[0m\n\n\
                  "
)]
pub struct Cli {
    /// Base directory of the managed tree (defaults to mode detection)
    #[arg(long, global = true, env = "KEG_ROOT")]
    pub root: Option<PathBuf>,

    /// Enable verbose output
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Install or upgrade packages from manifest files
    Install(InstallArgs),

    /// Remove installed packages
    Uninstall(UninstallArgs),

    /// List installed packages
    List(ListArgs),

    /// Show a manifest or an installed record
    Info(InfoArgs),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing_list() {
        let cli = Cli::try_parse_from(["keg", "list"]).unwrap();
        assert!(matches!(cli.command, Commands::List(_)));
    }

    #[test]
    fn test_cli_parsing_install() {
        let cli = Cli::try_parse_from(["keg", "install", "./rg.json"]).unwrap();
        match cli.command {
            Commands::Install(args) => {
                assert_eq!(args.manifests, vec![PathBuf::from("./rg.json")]);
                assert!(!args.force);
            }
            _ => panic!("Expected Install command"),
        }
    }

    #[test]
    fn test_cli_parsing_install_force_multiple() {
        let cli =
            Cli::try_parse_from(["keg", "install", "./a.json", "./b.json", "--force"]).unwrap();
        match cli.command {
            Commands::Install(args) => {
                assert_eq!(args.manifests.len(), 2);
                assert!(args.force);
            }
            _ => panic!("Expected Install command"),
        }
    }

    #[test]
    fn test_cli_parsing_uninstall() {
        let cli = Cli::try_parse_from(["keg", "uninstall", "rg", "--force-delete"]).unwrap();
        match cli.command {
            Commands::Uninstall(args) => {
                assert_eq!(args.names, vec!["rg".to_string()]);
                assert!(args.force_delete);
            }
            _ => panic!("Expected Uninstall command"),
        }
    }

    #[test]
    fn test_cli_parsing_info() {
        let cli = Cli::try_parse_from(["keg", "info", "rg"]).unwrap();
        match cli.command {
            Commands::Info(args) => assert_eq!(args.target, "rg"),
            _ => panic!("Expected Info command"),
        }
    }

    #[test]
    fn test_cli_global_root_flag() {
        let cli = Cli::try_parse_from(["keg", "--root", "/tmp/kegs", "list"]).unwrap();
        assert_eq!(cli.root, Some(PathBuf::from("/tmp/kegs")));
    }
}
