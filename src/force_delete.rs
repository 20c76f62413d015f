//! Best-effort recursive removal of package-declared paths
//!
//! Each pattern expands through the [`ExpandContext`](crate::simulator::ExpandContext)
//! and is removed independently: one failure is reported and the rest of
//! the list is still attempted. A nonexistent path is a successful no-op.

use std::fs;
use std::io;
use std::path::Path;

use crate::simulator::ExpandContext;

/// Remove a file or directory tree; absence is not an error
pub fn remove_tree(path: &Path) -> io::Result<()> {
    let metadata = match fs::symlink_metadata(path) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(e),
    };
    if metadata.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    }
}

/// Expand and force-remove each declared pattern
///
/// Returns the number of patterns that could not be removed.
pub fn run(name: &str, patterns: &[String], ctx: &ExpandContext) -> usize {
    let mut failures = 0;
    for pattern in patterns {
        let target = ctx.expand(pattern);
        if let Err(e) = remove_tree(&target) {
            eprintln!("keg: force delete {}@{}: {e}", name, target.display());
            failures += 1;
        }
    }
    failures
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vfs::{DeploymentMode, PathTable};
    use tempfile::TempDir;

    fn test_setup() -> (TempDir, PathTable, ExpandContext) {
        let temp = TempDir::new().unwrap();
        let table = PathTable::from_base(
            temp.path().to_path_buf(),
            DeploymentMode::Portable,
            Vec::new(),
        )
        .unwrap();
        let ctx = ExpandContext::for_package(&table, "rg");
        (temp, table, ctx)
    }

    #[test]
    fn test_remove_tree_missing_is_noop() {
        let temp = TempDir::new().unwrap();
        remove_tree(&temp.path().join("absent")).unwrap();
    }

    #[test]
    fn test_remove_tree_file_and_dir() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("f");
        std::fs::write(&file, b"x").unwrap();
        remove_tree(&file).unwrap();
        assert!(!file.exists());

        let dir = temp.path().join("d/nested");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("f"), b"x").unwrap();
        remove_tree(&dir.parent().unwrap().to_path_buf()).unwrap();
        assert!(!temp.path().join("d").exists());
    }

    #[test]
    fn test_run_expands_variables() {
        let (_temp, table, ctx) = test_setup();
        let target = table.user_vfs_root.join("rg-cache");
        std::fs::create_dir_all(&target).unwrap();

        let failures = run("rg", &["$KEG_VFS/rg-cache".to_string()], &ctx);
        assert_eq!(failures, 0);
        assert!(!target.exists());
    }

    #[test]
    fn test_run_continues_past_missing_paths() {
        let (_temp, table, ctx) = test_setup();
        let present = table.user_vfs_root.join("keep-me-not");
        std::fs::create_dir_all(&present).unwrap();

        let patterns = vec![
            "$KEG_VFS/never-existed".to_string(),
            "$KEG_VFS/keep-me-not".to_string(),
        ];
        let failures = run("rg", &patterns, &ctx);
        assert_eq!(failures, 0);
        assert!(!present.exists());
    }
}
