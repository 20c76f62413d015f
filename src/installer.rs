//! Archive expansion and the atomic install swap
//!
//! The swap protocol never exposes a half-written install root. The
//! archive expands into a staging directory derived from the archive
//! path; the existing root (if any) is renamed aside to `<root>.old`,
//! staging is renamed into place, and only then is the backup discarded.
//! A failed swap restores the backup; at every observation point the root
//! is either fully the old content or fully the new content.
//!
//! No inter-process lock guards the root or the lock directory:
//! concurrent installs of the same package can interleave renames. This
//! matches the original design and is a documented hazard.

use std::fs;
use std::path::{Path, PathBuf};

use console::style;

use crate::cache;
use crate::error::{KegError, Result};
use crate::force_delete;
use crate::links;
use crate::meta;
use crate::package::Package;
use crate::unpack::ArchiveHandler;
use crate::version::{self, InstallDecision};
use crate::vfs::PathTable;

/// Options for one install operation
#[derive(Debug, Clone, Copy, Default)]
pub struct InstallOptions {
    /// Upgrade even frozen packages
    pub force: bool,
}

/// What an install request actually did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallOutcome {
    /// Fresh install or upgrade completed
    Installed,
    /// Content already current; links rebuilt only
    RelinkedOnly,
    /// Frozen package left untouched
    SkippedFrozen,
}

/// Derive the staging directory from the archive path
///
/// Strips the archive's extension tag; an extensionless name gains a
/// `.out` suffix, and a name the extension fully consumes falls back to a
/// sibling `out` directory.
pub fn unarchive_path(archive: &Path) -> PathBuf {
    let dir = archive.parent().unwrap_or_else(|| Path::new("."));
    let filename = archive
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();
    let ext = extension_tag(filename);
    if filename.len() <= ext.len() {
        return dir.join("out");
    }
    if ext.is_empty() {
        return dir.join(format!("{filename}.out"));
    }
    dir.join(&filename[..filename.len() - ext.len()])
}

/// Extended extension of a filename, multi-part suffixes included
fn extension_tag(filename: &str) -> &str {
    const COMPOUND: [&str; 3] = [".tar.gz", ".tar.bz2", ".tar.xz"];
    let lower = filename.to_ascii_lowercase();
    for suffix in COMPOUND {
        if lower.ends_with(suffix) {
            return &filename[filename.len() - suffix.len()..];
        }
    }
    match filename.rfind('.') {
        Some(0) | None => "",
        Some(pos) => &filename[pos..],
    }
}

/// Backup location used while the root is swapped
///
/// Appends `.old` to the whole name; `with_extension` would truncate
/// package names that contain a dot.
fn backup_path(root: &Path) -> PathBuf {
    let mut os = root.as_os_str().to_os_string();
    os.push(".old");
    PathBuf::from(os)
}

/// Rename over a possibly existing target
///
/// A pre-existing target (such as a stale `.old` backup) is force-deleted
/// first; its partial-failure is left for the rename to surface.
fn rename_force(source: &Path, target: &Path) -> std::io::Result<()> {
    if target.exists() {
        let _ = force_delete::remove_tree(target);
    }
    fs::rename(source, target)
}

/// Expand a verified artifact and swap it into the canonical install root
pub fn expand(table: &PathTable, pkg: &Package, artifact: &Path) -> Result<()> {
    let handler =
        ArchiveHandler::lookup(&pkg.extension).ok_or_else(|| KegError::UnsupportedFormat {
            extension: pkg.extension.clone(),
        })?;

    let staging = unarchive_path(artifact);
    if staging.exists() {
        if let Err(e) = force_delete::remove_tree(&staging) {
            eprintln!("keg: pre-clean {}: {e}", staging.display());
        }
    }

    // a decompress failure leaves staging behind for diagnostics
    handler.decompress(artifact, &staging)?;
    handler.regularize(&staging);

    let root = table.package_root(&pkg.name);
    let backup = backup_path(&root);
    let had_previous = root.exists();
    if had_previous {
        if let Err(e) = rename_force(&root, &backup) {
            return Err(KegError::SwapFailed {
                staging: staging.display().to_string(),
                root: root.display().to_string(),
                reason: format!("backup rename to {}: {e}", backup.display()),
            });
        }
    }

    if let Err(swap_err) = fs::rename(&staging, &root) {
        if had_previous {
            if let Err(restore_err) = fs::rename(&backup, &root) {
                return Err(KegError::FatalInconsistency {
                    root: root.display().to_string(),
                    backup: backup.display().to_string(),
                    reason: format!("swap: {swap_err}; restore: {restore_err}"),
                });
            }
        }
        return Err(KegError::SwapFailed {
            staging: staging.display().to_string(),
            root: root.display().to_string(),
            reason: swap_err.to_string(),
        });
    }

    if had_previous {
        if let Err(e) = force_delete::remove_tree(&backup) {
            eprintln!("keg: remove backup {}: {e}", backup.display());
        }
    }

    if handler.is_single_executable() {
        rename_single_executable(pkg, artifact, &root);
    }

    // root content is now correct; an aborted meta write leaves it
    // unregistered and a retried install converges on the same state
    meta::write(table, pkg)?;

    if let Err(e) = links::relink(table, pkg) {
        eprintln!("keg: unable to make {} links: {e}", pkg.name);
    }
    Ok(())
}

/// Give a single-executable artifact its canonical display name
///
/// Uses the manifest's `rename` when present, else `<name>.<ext>`; a
/// case-insensitively equal name skips the rename, and failure is
/// reported without failing the install.
fn rename_single_executable(pkg: &Package, artifact: &Path, root: &Path) {
    let Some(expanded_name) = artifact.file_name().and_then(|n| n.to_str()) else {
        return;
    };
    let display_name = pkg.rename.clone().unwrap_or_else(|| {
        let ext = artifact
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default();
        if ext.is_empty() {
            pkg.name.clone()
        } else {
            format!("{}.{ext}", pkg.name)
        }
    });
    if expanded_name.eq_ignore_ascii_case(&display_name) {
        return;
    }
    let source = root.join(expanded_name);
    let target = root.join(&display_name);
    if let Err(e) = rename_force(&source, &target) {
        eprintln!(
            "keg: rename package file {} to {}: {e}",
            source.display(),
            target.display()
        );
    }
}

/// Run one complete install/upgrade operation for a package
pub fn install_package(
    table: &PathTable,
    pkg: &Package,
    options: InstallOptions,
) -> Result<InstallOutcome> {
    let existing = meta::read(table, &pkg.name)?;
    let decision = version::decide(
        pkg,
        existing.as_ref(),
        table.is_frozen(&pkg.name),
        options.force,
    )?;

    match decision {
        InstallDecision::SkipRelinkOnly => {
            if let Err(e) = links::relink(table, pkg) {
                eprintln!("keg: unable to make {} links: {e}", pkg.name);
            }
            report_success(pkg);
            return Ok(InstallOutcome::RelinkedOnly);
        }
        InstallDecision::SkipFrozen => {
            if let Some(meta) = &existing {
                eprintln!(
                    "keg {} {}({}) from {}@{} to {}@{}.",
                    style("skip upgrade").red(),
                    style(&pkg.name).magenta(),
                    style("frozen").red(),
                    style(&meta.version).yellow(),
                    style(&meta.bucket).blue(),
                    style(&pkg.version).green(),
                    style(&pkg.bucket).blue(),
                );
            }
            return Ok(InstallOutcome::SkippedFrozen);
        }
        InstallDecision::FreshInstall => {}
        InstallDecision::Upgrade => {
            if let Some(meta) = &existing {
                eprintln!(
                    "keg will upgrade {} from {}@{} to {}@{}",
                    style(&pkg.name).magenta(),
                    style(&meta.version).yellow(),
                    style(&meta.bucket).blue(),
                    style(&pkg.version).green(),
                    style(&pkg.bucket).blue(),
                );
            }
        }
    }

    let artifact = cache::acquire(table, pkg)?;
    expand(table, pkg, &artifact)?;
    report_success(pkg);
    Ok(InstallOutcome::Installed)
}

fn report_success(pkg: &Package) {
    eprintln!(
        "keg install {}/{} version {} success.",
        style(&pkg.name).magenta(),
        style(&pkg.bucket).blue(),
        style(&pkg.version).green(),
    );
}
