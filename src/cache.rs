//! Hash-keyed artifact cache over the temp directory
//!
//! A cache entry is implicit: a file in the temp directory named after the
//! chosen URL's path tail. There is no index — validity is re-derived by
//! hashing on every probe, so a stale or truncated file can never be
//! trusted. The temp directory is shared across packages; distinct URLs
//! and the hash check keep unrelated artifacts from colliding silently.

use std::path::PathBuf;

use crate::error::{KegError, Result};
use crate::hash;
use crate::net;
use crate::package::Package;
use crate::vfs::PathTable;

/// Probe the cache for a verified artifact
///
/// Returns the cached path only when the file exists and its hash matches
/// the expected value. A mismatch is reported and treated as a miss; the
/// file is left in place for the subsequent fetch to overwrite.
pub fn cached_artifact(table: &PathTable, filename: &str, expected_hash: &str) -> Option<PathBuf> {
    let candidate = table.temp_dir.join(filename);
    if !candidate.exists() {
        return None;
    }
    match hash::matches(&candidate, expected_hash) {
        Ok(true) => Some(candidate),
        Ok(false) => {
            eprintln!("keg: cached file {filename} does not match expected hash, refetching");
            None
        }
        Err(e) => {
            eprintln!("keg: cached file {filename} unusable: {e}");
            None
        }
    }
}

/// Resolve a verified local artifact for a package
///
/// Cache probe first (no network on a hit), then fetch with one inline
/// retry on network failure. A post-fetch hash mismatch triggers exactly
/// one re-fetch; a second mismatch is fatal. The returned path is
/// hash-verified whenever the manifest declares an expected hash.
pub fn acquire(table: &PathTable, pkg: &Package) -> Result<PathBuf> {
    let url = net::best_url(&pkg.urls).ok_or_else(|| KegError::NoValidUrl {
        name: pkg.name.clone(),
    })?;
    let url = url.url();
    let filename = net::url_path_tail(url);

    if !pkg.hash.is_empty() {
        if let Some(cached) = cached_artifact(table, &filename, &pkg.hash) {
            return Ok(cached);
        }
    }

    let artifact = fetch_with_retry(url, table)?;
    if pkg.hash.is_empty() {
        return Ok(artifact);
    }

    if hash::matches(&artifact, &pkg.hash)? {
        return Ok(artifact);
    }
    eprintln!("keg: {url} hash mismatch, retrying download");
    let artifact = fetch_with_retry(url, table)?;
    if hash::matches(&artifact, &pkg.hash)? {
        return Ok(artifact);
    }
    Err(KegError::HashMismatch {
        path: artifact.display().to_string(),
        expected: pkg.hash.clone(),
        actual: hash::actual_tagged(&artifact, &pkg.hash)?,
    })
}

/// One fetch, retried exactly once on network failure
fn fetch_with_retry(url: &str, table: &PathTable) -> Result<PathBuf> {
    match net::fetch(url, &table.temp_dir) {
        Ok(path) => Ok(path),
        Err(first) => {
            eprintln!("keg: {first}, retrying");
            net::fetch(url, &table.temp_dir)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::HashAlgorithm;
    use crate::package::UrlEntry;
    use crate::vfs::DeploymentMode;
    use tempfile::TempDir;

    fn test_table() -> (TempDir, PathTable) {
        let temp = TempDir::new().unwrap();
        let table = PathTable::from_base(
            temp.path().to_path_buf(),
            DeploymentMode::Portable,
            Vec::new(),
        )
        .unwrap();
        (temp, table)
    }

    fn seed_artifact(table: &PathTable, filename: &str, content: &[u8]) -> String {
        let path = table.temp_dir.join(filename);
        std::fs::write(&path, content).unwrap();
        let digest = hash::hash_file(&path, HashAlgorithm::Sha256).unwrap();
        format!("sha256:{digest}")
    }

    #[test]
    fn test_cached_artifact_hit() {
        let (_temp, table) = test_table();
        let expected = seed_artifact(&table, "rg.zip", b"archive bytes");

        let hit = cached_artifact(&table, "rg.zip", &expected);
        assert_eq!(hit, Some(table.temp_dir.join("rg.zip")));
    }

    #[test]
    fn test_cached_artifact_absent_is_miss() {
        let (_temp, table) = test_table();
        assert!(cached_artifact(&table, "rg.zip", &format!("sha256:{}", "0".repeat(64))).is_none());
    }

    #[test]
    fn test_cached_artifact_mismatch_never_reused() {
        let (_temp, table) = test_table();
        seed_artifact(&table, "rg.zip", b"archive bytes");

        let wrong = format!("sha256:{}", "0".repeat(64));
        assert!(cached_artifact(&table, "rg.zip", &wrong).is_none());
    }

    #[test]
    fn test_acquire_no_url() {
        let (_temp, table) = test_table();
        let pkg = Package {
            name: "rg".to_string(),
            version: "1.0.0".to_string(),
            ..Package::default()
        };
        let result = acquire(&table, &pkg);
        assert!(matches!(result, Err(KegError::NoValidUrl { .. })));
    }

    #[test]
    fn test_acquire_uses_cache_without_network() {
        let (_temp, table) = test_table();
        let expected = seed_artifact(&table, "rg-1.0.0.zip", b"archive bytes");

        // the URL is unreachable; a cache hit must short-circuit the fetch
        let pkg = Package {
            name: "rg".to_string(),
            version: "1.0.0".to_string(),
            urls: vec![UrlEntry::Plain(
                "https://keg.invalid/dl/rg-1.0.0.zip".to_string(),
            )],
            hash: expected,
            ..Package::default()
        };
        let artifact = acquire(&table, &pkg).unwrap();
        assert_eq!(artifact, table.temp_dir.join("rg-1.0.0.zip"));
    }
}
