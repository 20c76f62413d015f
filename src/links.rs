//! Launcher link registration
//!
//! After a successful swap the package's declared `links` and `launchers`
//! entries are exposed in the links directory. Created link names are
//! recorded in a `<name>.links.json` sidecar so removal works from the
//! record instead of guessing; an upgrade removes the old set before
//! creating the new one.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{KegError, Result};
use crate::package::Package;
use crate::simulator::ExpandContext;
use crate::vfs::PathTable;

/// Sidecar record of links created for one package
#[derive(Debug, Default, Serialize, Deserialize)]
struct LinkRecord {
    links: Vec<String>,
}

fn record_path(table: &PathTable, name: &str) -> PathBuf {
    table.links_dir.join(format!("{name}.links.json"))
}

/// Create the package's declared directories
///
/// Per-path failures are reported and do not stop the rest.
fn make_venv_dirs(pkg: &Package, ctx: &ExpandContext) {
    for pattern in &pkg.venv.mkdirs {
        let dir = ctx.expand(pattern);
        if let Err(e) = fs::create_dir_all(&dir) {
            eprintln!("keg: mkdir {}: {e}", dir.display());
        }
    }
}

/// Remove the links previously recorded for a package
pub fn remove_package_links(table: &PathTable, name: &str) -> Result<()> {
    let record_file = record_path(table, name);
    let record = match fs::read_to_string(&record_file) {
        Ok(text) => serde_json::from_str::<LinkRecord>(&text).unwrap_or_default(),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
        Err(e) => {
            return Err(KegError::FileReadFailed {
                path: record_file.display().to_string(),
                reason: e.to_string(),
            });
        }
    };
    for link in &record.links {
        let path = table.links_dir.join(link);
        if let Err(e) = fs::remove_file(&path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                eprintln!("keg: remove link {}: {e}", path.display());
            }
        }
    }
    let _ = fs::remove_file(&record_file);
    Ok(())
}

/// Create links for the package's declared entries
fn make_package_links(table: &PathTable, pkg: &Package) -> Result<()> {
    let root = table.package_root(&pkg.name);
    let mut created = Vec::new();

    for entry in pkg.links.iter().chain(&pkg.launchers) {
        let source = root.join(entry);
        let Some(filename) = source.file_name().and_then(|n| n.to_str()) else {
            eprintln!("keg: skipping unlinkable entry '{entry}'");
            continue;
        };
        if !source.exists() {
            eprintln!(
                "keg: link source {} missing for '{}'",
                source.display(),
                pkg.name
            );
            continue;
        }
        let target = table.links_dir.join(filename);
        let _ = fs::remove_file(&target);
        place_link(&source, &target)?;
        created.push(filename.to_string());
    }

    let record = LinkRecord { links: created };
    let text = serde_json::to_string_pretty(&record).map_err(|e| KegError::MetaEncodeFailed {
        name: pkg.name.clone(),
        reason: e.to_string(),
    })?;
    fs::write(record_path(table, &pkg.name), text).map_err(|e| KegError::FileWriteFailed {
        path: record_path(table, &pkg.name).display().to_string(),
        reason: e.to_string(),
    })?;
    Ok(())
}

#[cfg(unix)]
fn place_link(source: &Path, target: &Path) -> Result<()> {
    std::os::unix::fs::symlink(source, target).map_err(|e| KegError::FileWriteFailed {
        path: target.display().to_string(),
        reason: e.to_string(),
    })
}

#[cfg(not(unix))]
fn place_link(source: &Path, target: &Path) -> Result<()> {
    fs::copy(source, target)
        .map(|_| ())
        .map_err(|e| KegError::FileWriteFailed {
            path: target.display().to_string(),
            reason: e.to_string(),
        })
}

/// Rebuild a package's launcher links from its descriptor
///
/// Creates declared directories, removes the previously recorded link
/// set, then links the new entries.
pub fn relink(table: &PathTable, pkg: &Package) -> Result<()> {
    let ctx = ExpandContext::for_package(table, &pkg.name);
    make_venv_dirs(pkg, &ctx);
    remove_package_links(table, &pkg.name)?;
    make_package_links(table, pkg)
}
