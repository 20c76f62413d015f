use clap::Parser;
use std::path::PathBuf;

/// Arguments for the install command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                   Install one package:\n    keg install ./manifests/rg.json\n\n\
                   Install several packages:\n    keg install ./rg.json ./fd.json\n\n\
                   Upgrade a frozen package:\n    keg install ./node.json --force")]
pub struct InstallArgs {
    /// Manifest files describing the packages to install
    #[arg(required = true, value_name = "MANIFEST")]
    pub manifests: Vec<PathBuf>,

    /// Upgrade packages even when they are frozen
    #[arg(long, short = 'f')]
    pub force: bool,
}
