//! Archive decompression handlers
//!
//! Handlers are a closed set of tagged variants looked up by the
//! manifest's extension tag. Every variant implements the same two
//! operations: `decompress` into a destination directory and `regularize`
//! the resulting layout. Adding a format means adding a variant here;
//! the installer never changes.

use std::fs;
use std::path::Path;

use crate::error::{KegError, Result};

mod tar;
mod zip;

/// A decompression capability selected by extension tag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveHandler {
    Zip,
    TarGz,
    TarBz2,
    Tar,
    /// Single executable artifact; "decompress" copies it into place
    Exe,
}

impl ArchiveHandler {
    /// Look up the handler for an extension tag
    pub fn lookup(extension: &str) -> Option<Self> {
        let tag = extension.trim_start_matches('.').to_ascii_lowercase();
        match tag.as_str() {
            "zip" => Some(Self::Zip),
            "tar.gz" | "tgz" => Some(Self::TarGz),
            "tar.bz2" | "tbz2" => Some(Self::TarBz2),
            "tar" => Some(Self::Tar),
            "exe" => Some(Self::Exe),
            _ => None,
        }
    }

    /// Expand an archive into the destination directory
    pub fn decompress(&self, archive: &Path, dest: &Path) -> Result<()> {
        match self {
            Self::Zip => zip::extract(archive, dest),
            Self::TarGz => tar::extract_gz(archive, dest),
            Self::TarBz2 => tar::extract_bz2(archive, dest),
            Self::Tar => tar::extract_plain(archive, dest),
            Self::Exe => copy_single(archive, dest),
        }
    }

    /// Normalize the expanded layout
    ///
    /// Archives frequently wrap their content in a single top-level
    /// directory; collapse it so the install root holds the content
    /// directly. Failures are reported, never fatal.
    pub fn regularize(&self, dest: &Path) {
        if *self == Self::Exe {
            return;
        }
        if let Err(e) = flatten_single_dir(dest) {
            eprintln!("keg: regularize {}: {e}", dest.display());
        }
    }

    /// Whether the artifact is a single executable rather than an archive
    pub fn is_single_executable(&self) -> bool {
        *self == Self::Exe
    }
}

/// "Decompress" a single-file artifact: copy it into a fresh directory
fn copy_single(artifact: &Path, dest: &Path) -> Result<()> {
    fs::create_dir_all(dest).map_err(|e| KegError::ExtractFailed {
        archive: artifact.display().to_string(),
        reason: e.to_string(),
    })?;
    let filename = artifact
        .file_name()
        .ok_or_else(|| KegError::ExtractFailed {
            archive: artifact.display().to_string(),
            reason: "artifact has no file name".to_string(),
        })?;
    fs::copy(artifact, dest.join(filename)).map_err(|e| KegError::ExtractFailed {
        archive: artifact.display().to_string(),
        reason: e.to_string(),
    })?;
    Ok(())
}

/// Collapse a single nested top-level directory
///
/// If `dest` contains exactly one entry and it is a directory, that
/// directory becomes `dest` itself via two renames.
fn flatten_single_dir(dest: &Path) -> std::io::Result<()> {
    let mut entries = fs::read_dir(dest)?;
    let Some(first) = entries.next().transpose()? else {
        return Ok(());
    };
    if entries.next().is_some() || !first.path().is_dir() {
        return Ok(());
    }

    let holder = sibling_with_suffix(dest, ".flatten");
    if holder.exists() {
        fs::remove_dir_all(&holder)?;
    }
    fs::rename(dest, &holder)?;
    fs::rename(holder.join(first.file_name()), dest)?;
    fs::remove_dir(&holder)?;
    Ok(())
}

fn sibling_with_suffix(path: &Path, suffix: &str) -> std::path::PathBuf {
    let mut name = path.file_name().map_or_else(
        || std::ffi::OsString::from("out"),
        std::ffi::OsStr::to_os_string,
    );
    name.push(suffix);
    path.parent().map_or_else(
        || std::path::PathBuf::from(&name),
        |parent| parent.join(&name),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_lookup_known_tags() {
        assert_eq!(ArchiveHandler::lookup("zip"), Some(ArchiveHandler::Zip));
        assert_eq!(ArchiveHandler::lookup("tar.gz"), Some(ArchiveHandler::TarGz));
        assert_eq!(ArchiveHandler::lookup("tgz"), Some(ArchiveHandler::TarGz));
        assert_eq!(ArchiveHandler::lookup("tar.bz2"), Some(ArchiveHandler::TarBz2));
        assert_eq!(ArchiveHandler::lookup("tbz2"), Some(ArchiveHandler::TarBz2));
        assert_eq!(ArchiveHandler::lookup("tar"), Some(ArchiveHandler::Tar));
        assert_eq!(ArchiveHandler::lookup("exe"), Some(ArchiveHandler::Exe));
    }

    #[test]
    fn test_lookup_is_case_insensitive_and_dot_tolerant() {
        assert_eq!(ArchiveHandler::lookup("ZIP"), Some(ArchiveHandler::Zip));
        assert_eq!(ArchiveHandler::lookup(".tar.gz"), Some(ArchiveHandler::TarGz));
    }

    #[test]
    fn test_lookup_unknown_tag() {
        assert!(ArchiveHandler::lookup("rar").is_none());
        assert!(ArchiveHandler::lookup("").is_none());
    }

    #[test]
    fn test_exe_copy_single() {
        let temp = TempDir::new().unwrap();
        let artifact = temp.path().join("tool.exe");
        std::fs::write(&artifact, b"MZ...").unwrap();

        let dest = temp.path().join("out");
        ArchiveHandler::Exe.decompress(&artifact, &dest).unwrap();
        assert!(dest.join("tool.exe").is_file());
    }

    #[test]
    fn test_flatten_single_dir() {
        let temp = TempDir::new().unwrap();
        let dest = temp.path().join("expanded");
        std::fs::create_dir_all(dest.join("pkg-1.0.0/bin")).unwrap();
        std::fs::write(dest.join("pkg-1.0.0/bin/tool"), b"bin").unwrap();
        std::fs::write(dest.join("pkg-1.0.0/README"), b"doc").unwrap();

        flatten_single_dir(&dest).unwrap();
        assert!(dest.join("bin/tool").is_file());
        assert!(dest.join("README").is_file());
        assert!(!dest.join("pkg-1.0.0").exists());
    }

    #[test]
    fn test_flatten_leaves_multi_entry_layouts() {
        let temp = TempDir::new().unwrap();
        let dest = temp.path().join("expanded");
        std::fs::create_dir_all(dest.join("bin")).unwrap();
        std::fs::write(dest.join("README"), b"doc").unwrap();

        flatten_single_dir(&dest).unwrap();
        assert!(dest.join("bin").is_dir());
        assert!(dest.join("README").is_file());
    }

    #[test]
    fn test_flatten_empty_dir_is_noop() {
        let temp = TempDir::new().unwrap();
        let dest = temp.path().join("expanded");
        std::fs::create_dir_all(&dest).unwrap();
        flatten_single_dir(&dest).unwrap();
        assert!(dest.is_dir());
    }
}
