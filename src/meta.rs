//! Installed-state records
//!
//! One JSON document per package at `<locks>/<name>.json`. Absence of the
//! file means "not installed" and is not an error; a present file must
//! decode completely or the read fails. Writes go through a temporary
//! file in the same directory and a single rename, so a concurrent reader
//! sees either the previous record or the new one, never a blend.

use std::fs;
use std::io::Write;
use std::path::Path;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::error::{KegError, Result};
use crate::package::{Package, VenvSpec};
use crate::vfs::PathTable;

/// Snapshot of a package's venv descriptor, as persisted
///
/// Sub-fields are omitted from the document when empty.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VenvSnapshot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub path: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub include: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub lib: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub env: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<String>,
}

impl From<&VenvSpec> for VenvSnapshot {
    fn from(venv: &VenvSpec) -> Self {
        Self {
            category: venv.category.clone(),
            path: venv.path.clone(),
            include: venv.include.clone(),
            lib: venv.lib.clone(),
            env: venv.env.clone(),
            dependencies: venv.dependencies.clone(),
        }
    }
}

/// The per-package installed-state record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocalMeta {
    /// Installed version
    pub version: String,

    /// Bucket the installed manifest came from
    pub bucket: String,

    /// Install timestamp (RFC 3339)
    pub date: String,

    /// Weight of the installed manifest, for equal-version tie-breaks
    #[serde(default)]
    pub weight: u32,

    /// Recorded force-delete patterns, omitted when empty
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub force_delete: Vec<String>,

    /// Venv snapshot, omitted when the descriptor is empty
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub venv: Option<VenvSnapshot>,
}

/// Read a package's installed-state record
///
/// `Ok(None)` means the package is not installed.
pub fn read(table: &PathTable, name: &str) -> Result<Option<LocalMeta>> {
    let path = table.lock_file(name);
    let text = match fs::read_to_string(&path) {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(KegError::FileReadFailed {
                path: path.display().to_string(),
                reason: e.to_string(),
            });
        }
    };
    let meta = serde_json::from_str(&text).map_err(|e| KegError::MetaDecodeFailed {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    Ok(Some(meta))
}

/// Persist the installed-state record for a freshly installed package
///
/// The record replaces any previous one atomically.
pub fn write(table: &PathTable, pkg: &Package) -> Result<()> {
    let record = LocalMeta {
        version: pkg.version.clone(),
        bucket: pkg.bucket.clone(),
        date: now_rfc3339(),
        weight: pkg.weight,
        force_delete: pkg.force_delete.clone(),
        venv: if pkg.venv.is_empty() {
            None
        } else {
            Some(VenvSnapshot::from(&pkg.venv))
        },
    };

    let text =
        serde_json::to_string_pretty(&record).map_err(|e| KegError::MetaEncodeFailed {
            name: pkg.name.clone(),
            reason: e.to_string(),
        })?;

    let target = table.lock_file(&pkg.name);
    write_atomic(&target, text.as_bytes())
}

/// List the names of all installed packages, sorted
pub fn installed_names(table: &PathTable) -> Result<Vec<String>> {
    let mut names = Vec::new();
    let entries = match fs::read_dir(&table.locks_dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(names),
        Err(e) => {
            return Err(KegError::FileReadFailed {
                path: table.locks_dir.display().to_string(),
                reason: e.to_string(),
            });
        }
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.extension().is_some_and(|ext| ext == "json") {
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                names.push(stem.to_string());
            }
        }
    }
    names.sort();
    Ok(names)
}

/// Remove a package's installed-state record; absence is a no-op
pub fn remove(table: &PathTable, name: &str) -> Result<()> {
    let path = table.lock_file(name);
    match fs::remove_file(&path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(KegError::FileWriteFailed {
            path: path.display().to_string(),
            reason: e.to_string(),
        }),
    }
}

fn now_rfc3339() -> String {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_else(|_| "1970-01-01T00:00:00Z".to_string())
}

/// Write a file through a sibling temporary file and one rename
fn write_atomic(target: &Path, content: &[u8]) -> Result<()> {
    let dir = target.parent().ok_or_else(|| KegError::FileWriteFailed {
        path: target.display().to_string(),
        reason: "no parent directory".to_string(),
    })?;
    let mut temp =
        tempfile::NamedTempFile::new_in(dir).map_err(|e| KegError::FileWriteFailed {
            path: target.display().to_string(),
            reason: e.to_string(),
        })?;
    temp.write_all(content).map_err(|e| KegError::FileWriteFailed {
        path: target.display().to_string(),
        reason: e.to_string(),
    })?;
    temp.persist(target).map_err(|e| KegError::FileWriteFailed {
        path: target.display().to_string(),
        reason: e.to_string(),
    })?;
    Ok(())
}
