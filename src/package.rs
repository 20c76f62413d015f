//! Package manifest descriptor
//!
//! A manifest is a JSON document describing one installable package:
//! where to download it, how to verify it, how to unpack it, and what to
//! register after the swap. The descriptor is immutable for the duration
//! of one install operation.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::{KegError, Result};

/// A download candidate, optionally tagged with an architecture or locale
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum UrlEntry {
    /// Bare URL string
    Plain(String),
    /// URL with selection tags
    Tagged {
        url: String,
        #[serde(default)]
        arch: Option<String>,
        #[serde(default)]
        locale: Option<String>,
    },
}

impl UrlEntry {
    pub fn url(&self) -> &str {
        match self {
            Self::Plain(url) => url,
            Self::Tagged { url, .. } => url,
        }
    }

    pub fn arch(&self) -> Option<&str> {
        match self {
            Self::Plain(_) => None,
            Self::Tagged { arch, .. } => arch.as_deref(),
        }
    }

    pub fn locale(&self) -> Option<&str> {
        match self {
            Self::Plain(_) => None,
            Self::Tagged { locale, .. } => locale.as_deref(),
        }
    }

    /// Untagged entries match any host
    pub fn is_untagged(&self) -> bool {
        self.arch().is_none() && self.locale().is_none()
    }
}

/// Package-declared environment augmentation applied after install
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VenvSpec {
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub path: Vec<String>,
    #[serde(default)]
    pub include: Vec<String>,
    #[serde(default)]
    pub lib: Vec<String>,
    #[serde(default)]
    pub env: Vec<String>,
    #[serde(default)]
    pub dependencies: Vec<String>,
    #[serde(default)]
    pub mkdirs: Vec<String>,
}

impl VenvSpec {
    pub fn is_empty(&self) -> bool {
        self.category.is_none()
            && self.path.is_empty()
            && self.include.is_empty()
            && self.lib.is_empty()
            && self.env.is_empty()
            && self.dependencies.is_empty()
            && self.mkdirs.is_empty()
    }
}

/// One installable package, as declared by its manifest
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Package {
    /// Package name; doubles as the install-root directory name
    pub name: String,

    /// Requested version string
    pub version: String,

    /// Named source this manifest originates from
    #[serde(default)]
    pub bucket: String,

    /// Tie-break priority among manifests of equal version
    #[serde(default)]
    pub weight: u32,

    /// Candidate download URLs in preference order
    #[serde(default)]
    pub urls: Vec<UrlEntry>,

    /// Algorithm-tagged expected content hash; empty disables verification
    #[serde(default)]
    pub hash: String,

    /// Archive extension tag selecting the decompression handler
    #[serde(default)]
    pub extension: String,

    /// Display name for single-executable packages
    #[serde(default)]
    pub rename: Option<String>,

    /// Path patterns force-removed on uninstall
    #[serde(default)]
    pub force_delete: Vec<String>,

    /// Expanded files to expose as plain links
    #[serde(default)]
    pub links: Vec<String>,

    /// Expanded files to expose as launchers
    #[serde(default)]
    pub launchers: Vec<String>,

    /// Environment augmentation descriptor
    #[serde(default)]
    pub venv: VenvSpec,

    /// Suggested companion packages
    #[serde(default)]
    pub suggest: Vec<String>,

    /// Free-text notes shown after install
    #[serde(default)]
    pub notes: Option<String>,
}

impl Package {
    /// Load a package descriptor from a manifest file
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                KegError::ManifestNotFound {
                    path: path.display().to_string(),
                }
            } else {
                KegError::FileReadFailed {
                    path: path.display().to_string(),
                    reason: e.to_string(),
                }
            }
        })?;
        let pkg: Package =
            serde_json::from_str(&text).map_err(|e| KegError::ManifestParseFailed {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;
        if pkg.name.is_empty() || pkg.version.is_empty() {
            return Err(KegError::ManifestParseFailed {
                path: path.display().to_string(),
                reason: "manifest requires non-empty \"name\" and \"version\"".to_string(),
            });
        }
        Ok(pkg)
    }
}
