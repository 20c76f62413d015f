//! Install command implementation
//!
//! Each manifest on the command line is one independent install
//! operation: manifest parse, version decision, acquisition, swap, link
//! rebuild. A failing package does not stop the remaining ones; the
//! first error is reported as the command's result.

use std::path::PathBuf;

use console::style;

use crate::cli::InstallArgs;
use crate::error::Result;
use crate::installer::{self, InstallOptions, InstallOutcome};
use crate::package::Package;
use crate::vfs::PathTable;

pub fn run(root: Option<PathBuf>, args: InstallArgs) -> Result<()> {
    let table = PathTable::discover(root)?;
    let options = InstallOptions { force: args.force };

    let mut first_error = None;
    for manifest in &args.manifests {
        let outcome = Package::from_file(manifest)
            .and_then(|pkg| installer::install_package(&table, &pkg, options).map(|o| (pkg, o)));
        match outcome {
            Ok((pkg, InstallOutcome::Installed)) => display_post_install(&pkg),
            Ok(_) => {}
            Err(e) => {
                eprintln!("Error: {e}");
                if first_error.is_none() {
                    first_error = Some(e);
                }
            }
        }
    }
    match first_error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

/// Print suggestions, notes, and declared dependency names
///
/// Dependencies are displayed only; nothing is resolved or installed on
/// the caller's behalf.
fn display_post_install(pkg: &Package) {
    if !pkg.suggest.is_empty() {
        eprintln!(
            "Suggest installing: {}",
            style(pkg.suggest.join("\n  ")).green()
        );
    }
    if let Some(notes) = &pkg.notes {
        eprintln!("Notes: {notes}");
    }
    if !pkg.venv.dependencies.is_empty() {
        eprintln!(
            "{} '{}' depends on: {}",
            style("Package").yellow(),
            pkg.name,
            style(pkg.venv.dependencies.join("\n    ")).blue()
        );
    }
}
