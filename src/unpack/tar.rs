//! Tar extraction (plain, gzip, bzip2)

use std::fs;
use std::io::Read;
use std::path::Path;

use bzip2::read::BzDecoder;
use flate2::read::GzDecoder;
use tar::Archive;

use crate::error::{KegError, Result};

/// Extract a gzip-compressed tarball
pub fn extract_gz(archive: &Path, dest: &Path) -> Result<()> {
    let file = open(archive)?;
    unpack(Archive::new(GzDecoder::new(file)), archive, dest)
}

/// Extract a bzip2-compressed tarball
pub fn extract_bz2(archive: &Path, dest: &Path) -> Result<()> {
    let file = open(archive)?;
    unpack(Archive::new(BzDecoder::new(file)), archive, dest)
}

/// Extract an uncompressed tarball
pub fn extract_plain(archive: &Path, dest: &Path) -> Result<()> {
    let file = open(archive)?;
    unpack(Archive::new(file), archive, dest)
}

fn open(archive: &Path) -> Result<fs::File> {
    fs::File::open(archive).map_err(|e| KegError::ExtractFailed {
        archive: archive.display().to_string(),
        reason: e.to_string(),
    })
}

fn unpack<R: Read>(mut tar: Archive<R>, archive: &Path, dest: &Path) -> Result<()> {
    fs::create_dir_all(dest).map_err(|e| KegError::ExtractFailed {
        archive: archive.display().to_string(),
        reason: e.to_string(),
    })?;
    tar.unpack(dest).map_err(|e| KegError::ExtractFailed {
        archive: archive.display().to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::Compression;
    use flate2::write::GzEncoder;
    use tempfile::TempDir;

    fn build_tar_gz(path: &Path, files: &[(&str, &[u8])]) {
        let file = fs::File::create(path).unwrap();
        let encoder = GzEncoder::new(file, Compression::default());
        let mut builder = tar::Builder::new(encoder);
        for (name, content) in files {
            let mut header = tar::Header::new_gnu();
            header.set_size(content.len() as u64);
            header.set_mode(0o644);
            header.set_cksum();
            builder.append_data(&mut header, name, *content).unwrap();
        }
        builder.into_inner().unwrap().finish().unwrap();
    }

    #[test]
    fn test_extract_gz() {
        let temp = TempDir::new().unwrap();
        let archive = temp.path().join("pkg.tar.gz");
        build_tar_gz(&archive, &[("pkg/bin/tool", b"binary")]);

        let dest = temp.path().join("out");
        extract_gz(&archive, &dest).unwrap();
        assert_eq!(fs::read(dest.join("pkg/bin/tool")).unwrap(), b"binary");
    }

    #[test]
    fn test_extract_gz_rejects_garbage() {
        let temp = TempDir::new().unwrap();
        let archive = temp.path().join("broken.tar.gz");
        fs::write(&archive, b"not a tarball").unwrap();

        assert!(extract_gz(&archive, &temp.path().join("out")).is_err());
    }

    #[test]
    fn test_extract_missing_archive() {
        let temp = TempDir::new().unwrap();
        let result = extract_plain(
            &temp.path().join("absent.tar"),
            &temp.path().join("out"),
        );
        assert!(matches!(result, Err(KegError::ExtractFailed { .. })));
    }
}
