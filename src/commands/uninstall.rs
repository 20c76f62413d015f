//! Uninstall command implementation
//!
//! Removal order mirrors install in reverse: launcher links first, then
//! the install root, then the installed-state record. The recorded
//! force-delete patterns are only honored with `--force-delete`.

use std::path::PathBuf;

use console::style;

use crate::cli::UninstallArgs;
use crate::error::{KegError, Result};
use crate::force_delete;
use crate::links;
use crate::meta;
use crate::simulator::ExpandContext;
use crate::vfs::PathTable;

pub fn run(root: Option<PathBuf>, args: UninstallArgs) -> Result<()> {
    let table = PathTable::discover(root)?;

    let mut first_error = None;
    for name in &args.names {
        if let Err(e) = uninstall_one(&table, name, args.force_delete) {
            eprintln!("Error: {e}");
            if first_error.is_none() {
                first_error = Some(e);
            }
        }
    }
    match first_error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

fn uninstall_one(table: &PathTable, name: &str, run_force_delete: bool) -> Result<()> {
    let Some(record) = meta::read(table, name)? else {
        return Err(KegError::NotInstalled {
            name: name.to_string(),
        });
    };

    links::remove_package_links(table, name)?;

    let pkg_root = table.package_root(name);
    force_delete::remove_tree(&pkg_root).map_err(|e| KegError::FileWriteFailed {
        path: pkg_root.display().to_string(),
        reason: e.to_string(),
    })?;

    meta::remove(table, name)?;

    if run_force_delete && !record.force_delete.is_empty() {
        let ctx = ExpandContext::for_package(table, name);
        force_delete::run(name, &record.force_delete, &ctx);
    }

    eprintln!(
        "keg uninstall {} version {} done.",
        style(name).magenta(),
        style(&record.version).green(),
    );
    Ok(())
}
