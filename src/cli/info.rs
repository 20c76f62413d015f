use clap::Parser;

/// Arguments for the info command
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// A manifest file path or the name of an installed package
    pub target: String,
}
