use clap::Parser;

/// Arguments for the uninstall command
#[derive(Parser, Debug)]
pub struct UninstallArgs {
    /// Names of installed packages to remove
    #[arg(required = true, value_name = "NAME")]
    pub names: Vec<String>,

    /// Also remove the package's recorded force-delete paths
    #[arg(long = "force-delete")]
    pub force_delete: bool,
}
