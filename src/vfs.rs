//! Managed directory tree resolution
//!
//! keg supports several base-directory layouts ("deployment modes"). The
//! active mode is read from a `keg.env` JSON document next to the
//! executable; a missing document means the legacy co-located layout. The
//! `KEG_ROOT` environment variable pins the base directory outright and
//! wins over everything else.
//!
//! ## Directory layout
//!
//! ```text
//! <base>/
//! ├── pkgs/<name>       install roots (one per package)
//! ├── locks/<name>.json installed-state records
//! ├── temp/             download cache
//! ├── links/            launcher links
//! └── vfs/              per-package persistent user data
//! ```
//!
//! The [`PathTable`] is constructed once at process start and passed by
//! reference into every component; nothing in the core performs ambient
//! path lookups.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{KegError, Result};

/// Name of the mode-selection document next to the executable
const ENV_FILE: &str = "keg.env";

/// Supported base-directory layouts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeploymentMode {
    /// Base directory is the executable's own directory tree
    Portable,
    /// Per-user data directory
    User,
    /// Machine-wide data directory
    System,
    /// Co-located layout: executable lives in `<base>/bin`
    Legacy,
}

impl DeploymentMode {
    fn parse(value: &str) -> Self {
        if value.eq_ignore_ascii_case("portable") {
            Self::Portable
        } else if value.eq_ignore_ascii_case("user") {
            Self::User
        } else if value.eq_ignore_ascii_case("system") {
            Self::System
        } else {
            Self::Legacy
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Portable => "portable",
            Self::User => "user",
            Self::System => "system",
            Self::Legacy => "legacy",
        }
    }
}

/// Contents of `keg.env`
///
/// Carries the deployment mode plus the freeze policy; both are read once
/// at startup.
#[derive(Debug, Default, Deserialize)]
struct EnvDocument {
    #[serde(default)]
    mode: Option<String>,
    #[serde(default)]
    frozen: Vec<String>,
}

/// Immutable table of managed directories, built once at process start
#[derive(Debug, Clone)]
pub struct PathTable {
    /// Active deployment mode
    pub mode: DeploymentMode,
    /// Base directory of the managed tree
    pub base: PathBuf,
    /// Parent directory of all install roots
    pub packages_root: PathBuf,
    /// Directory of installed-state records
    pub locks_dir: PathBuf,
    /// Download cache directory
    pub temp_dir: PathBuf,
    /// Launcher links directory
    pub links_dir: PathBuf,
    /// Per-package persistent user data root
    pub user_vfs_root: PathBuf,
    /// Packages protected from automatic upgrade
    frozen: Vec<String>,
}

impl PathTable {
    /// Resolve the table for the current process
    ///
    /// Resolution order: explicit `--root` override, `KEG_ROOT` environment
    /// variable, then the mode declared in `keg.env` next to the executable.
    pub fn discover(root_override: Option<PathBuf>) -> Result<Self> {
        if let Some(root) = root_override {
            return Self::from_base(root, DeploymentMode::Portable, Vec::new());
        }
        if let Ok(root) = std::env::var("KEG_ROOT") {
            return Self::from_base(PathBuf::from(root), DeploymentMode::Portable, Vec::new());
        }

        let exe_root = executable_root()?;
        let env = read_env_document(&exe_root.join(ENV_FILE));
        let mode = match env.mode.as_deref() {
            Some(value) => DeploymentMode::parse(value),
            None => DeploymentMode::Legacy,
        };
        let base = match mode {
            DeploymentMode::Portable => exe_root,
            DeploymentMode::User => user_base()?,
            DeploymentMode::System => system_base(),
            DeploymentMode::Legacy => legacy_base(&exe_root),
        };
        Self::from_base(base, mode, env.frozen)
    }

    /// Build the table over an explicit base directory
    pub fn from_base(base: PathBuf, mode: DeploymentMode, frozen: Vec<String>) -> Result<Self> {
        let table = Self {
            mode,
            packages_root: base.join("pkgs"),
            locks_dir: base.join("locks"),
            temp_dir: base.join("temp"),
            links_dir: base.join("links"),
            user_vfs_root: base.join("vfs"),
            base,
            frozen,
        };
        table.ensure_layout()?;
        Ok(table)
    }

    /// Install root for a package
    pub fn package_root(&self, name: &str) -> PathBuf {
        self.packages_root.join(name)
    }

    /// Installed-state record path for a package
    pub fn lock_file(&self, name: &str) -> PathBuf {
        self.locks_dir.join(format!("{name}.json"))
    }

    /// Whether a package is protected from automatic upgrade
    pub fn is_frozen(&self, name: &str) -> bool {
        self.frozen.iter().any(|f| f == name)
    }

    /// Create the managed tree; failure at startup is fatal
    fn ensure_layout(&self) -> Result<()> {
        for dir in [
            &self.packages_root,
            &self.locks_dir,
            &self.temp_dir,
            &self.links_dir,
            &self.user_vfs_root,
        ] {
            fs::create_dir_all(dir).map_err(|e| KegError::PathResolveFailed {
                reason: format!("create {}: {}", dir.display(), e),
            })?;
        }
        Ok(())
    }
}

fn read_env_document(path: &Path) -> EnvDocument {
    let Ok(text) = fs::read_to_string(path) else {
        return EnvDocument::default();
    };
    match serde_json::from_str(&text) {
        Ok(doc) => doc,
        Err(e) => {
            eprintln!("keg: ignoring malformed {}: {}", path.display(), e);
            EnvDocument::default()
        }
    }
}

fn executable_root() -> Result<PathBuf> {
    let exe = std::env::current_exe().map_err(|e| KegError::PathResolveFailed {
        reason: format!("current_exe: {e}"),
    })?;
    let exe = dunce::canonicalize(&exe).unwrap_or(exe);
    exe.parent()
        .map(Path::to_path_buf)
        .ok_or_else(|| KegError::PathResolveFailed {
            reason: "executable has no parent directory".to_string(),
        })
}

fn user_base() -> Result<PathBuf> {
    dirs::data_local_dir()
        .map(|d| d.join("keg"))
        .ok_or_else(|| KegError::PathResolveFailed {
            reason: "could not determine user data directory".to_string(),
        })
}

fn system_base() -> PathBuf {
    #[cfg(windows)]
    {
        std::env::var("ProgramData")
            .map(|d| PathBuf::from(d).join("keg"))
            .unwrap_or_else(|_| PathBuf::from(r"C:\ProgramData\keg"))
    }
    #[cfg(not(windows))]
    {
        PathBuf::from("/usr/local/keg")
    }
}

/// Legacy layout places the executable in `<base>/bin`
fn legacy_base(exe_root: &Path) -> PathBuf {
    if exe_root.file_name().is_some_and(|n| n == "bin") {
        exe_root
            .parent()
            .map_or_else(|| exe_root.to_path_buf(), Path::to_path_buf)
    } else {
        exe_root.to_path_buf()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_mode_parse() {
        assert_eq!(DeploymentMode::parse("Portable"), DeploymentMode::Portable);
        assert_eq!(DeploymentMode::parse("USER"), DeploymentMode::User);
        assert_eq!(DeploymentMode::parse("system"), DeploymentMode::System);
        assert_eq!(DeploymentMode::parse("whatever"), DeploymentMode::Legacy);
    }

    #[test]
    fn test_from_base_creates_layout() {
        let temp = TempDir::new().unwrap();
        let table = PathTable::from_base(
            temp.path().to_path_buf(),
            DeploymentMode::Portable,
            Vec::new(),
        )
        .unwrap();

        assert!(table.packages_root.is_dir());
        assert!(table.locks_dir.is_dir());
        assert!(table.temp_dir.is_dir());
        assert!(table.links_dir.is_dir());
        assert!(table.user_vfs_root.is_dir());
    }

    #[test]
    fn test_package_root_and_lock_file() {
        let temp = TempDir::new().unwrap();
        let table = PathTable::from_base(
            temp.path().to_path_buf(),
            DeploymentMode::Portable,
            Vec::new(),
        )
        .unwrap();

        assert_eq!(table.package_root("rg"), table.packages_root.join("rg"));
        assert_eq!(table.lock_file("rg"), table.locks_dir.join("rg.json"));
    }

    #[test]
    fn test_is_frozen() {
        let temp = TempDir::new().unwrap();
        let table = PathTable::from_base(
            temp.path().to_path_buf(),
            DeploymentMode::Portable,
            vec!["node".to_string()],
        )
        .unwrap();

        assert!(table.is_frozen("node"));
        assert!(!table.is_frozen("rg"));
    }

    #[test]
    fn test_env_document_parsing() {
        let temp = TempDir::new().unwrap();
        let env_path = temp.path().join(ENV_FILE);
        std::fs::write(&env_path, r#"{"mode": "user", "frozen": ["go"]}"#).unwrap();

        let doc = read_env_document(&env_path);
        assert_eq!(doc.mode.as_deref(), Some("user"));
        assert_eq!(doc.frozen, vec!["go".to_string()]);
    }

    #[test]
    fn test_env_document_missing_is_default() {
        let doc = read_env_document(Path::new("/nonexistent/keg.env"));
        assert!(doc.mode.is_none());
        assert!(doc.frozen.is_empty());
    }

    #[test]
    fn test_legacy_base_strips_bin() {
        let base = legacy_base(Path::new("/opt/keg/bin"));
        assert_eq!(base, Path::new("/opt/keg"));

        let base = legacy_base(Path::new("/opt/keg"));
        assert_eq!(base, Path::new("/opt/keg"));
    }
}
