use clap::Parser;

/// Arguments for the list command
#[derive(Parser, Debug)]
pub struct ListArgs {
    /// Only print package names
    #[arg(long)]
    pub names_only: bool,
}
