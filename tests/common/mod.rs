//! Common test utilities for keg integration tests

use std::io::Write;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use sha2::Digest;
use tempfile::TempDir;
use zip::write::FileOptions;

/// A managed tree plus helpers for one integration test
#[allow(dead_code)]
pub struct TestKeg {
    /// Temporary directory holding the managed tree
    #[allow(dead_code)]
    pub temp: TempDir,
    /// Base directory passed to `--root`
    pub base: PathBuf,
}

#[allow(dead_code)]
impl TestKeg {
    /// Create a fresh managed tree
    pub fn new() -> Self {
        let temp = TempDir::new().expect("Failed to create temp directory");
        let base = temp.path().to_path_buf();
        Self { temp, base }
    }

    /// A keg command pinned to this tree
    pub fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("keg").expect("Failed to find keg binary");
        cmd.arg("--root").arg(&self.base);
        cmd.env_remove("KEG_ROOT");
        cmd
    }

    /// Seed a zip artifact into the download cache and return its tagged hash
    ///
    /// Installs driven by these fixtures resolve entirely from the cache,
    /// so the manifest URL is never fetched.
    pub fn seed_zip(&self, filename: &str, files: &[(&str, &[u8])]) -> String {
        let temp_dir = self.base.join("temp");
        std::fs::create_dir_all(&temp_dir).expect("Failed to create temp dir");
        let archive = temp_dir.join(filename);
        build_zip(&archive, files);
        sha256_tagged(&archive)
    }

    /// Write a manifest file outside the managed tree and return its path
    pub fn write_manifest(&self, name: &str, content: &str) -> PathBuf {
        let manifests = self.base.join("manifests");
        std::fs::create_dir_all(&manifests).expect("Failed to create manifests dir");
        let path = manifests.join(format!("{name}.json"));
        std::fs::write(&path, content).expect("Failed to write manifest");
        path
    }

    /// Manifest for a cached zip fixture
    pub fn zip_manifest(&self, name: &str, version: &str, files: &[(&str, &[u8])]) -> PathBuf {
        let filename = format!("{name}-{version}.zip");
        let hash = self.seed_zip(&filename, files);
        self.write_manifest(
            name,
            &format!(
                r#"{{
                    "name": "{name}",
                    "version": "{version}",
                    "bucket": "main",
                    "urls": ["https://keg.invalid/dl/{filename}"],
                    "hash": "{hash}",
                    "extension": "zip"
                }}"#
            ),
        )
    }

    /// Path of a package's install root
    pub fn package_root(&self, name: &str) -> PathBuf {
        self.base.join("pkgs").join(name)
    }

    /// Path of a package's installed-state record
    pub fn lock_file(&self, name: &str) -> PathBuf {
        self.base.join("locks").join(format!("{name}.json"))
    }
}

/// Build a zip archive with the given entries
pub fn build_zip(path: &Path, files: &[(&str, &[u8])]) {
    let file = std::fs::File::create(path).expect("Failed to create archive");
    let mut writer = zip::ZipWriter::new(file);
    for (name, content) in files {
        writer
            .start_file(*name, FileOptions::default())
            .expect("Failed to start zip entry");
        writer.write_all(content).expect("Failed to write zip entry");
    }
    writer.finish().expect("Failed to finish archive");
}

/// SHA-256 of a file as an algorithm-tagged hash string
pub fn sha256_tagged(path: &Path) -> String {
    let content = std::fs::read(path).expect("Failed to read file");
    let mut hasher = sha2::Sha256::new();
    hasher.update(&content);
    format!("sha256:{}", hex::encode(hasher.finalize()))
}
