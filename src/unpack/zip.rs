//! Zip extraction

use std::fs;
use std::io;
use std::path::Path;

use zip::ZipArchive;

use crate::error::{KegError, Result};

/// Extract a zip archive into the destination directory
///
/// Entries whose names escape the destination are skipped; Unix mode bits
/// are preserved where present.
pub fn extract(archive: &Path, dest: &Path) -> Result<()> {
    extract_inner(archive, dest).map_err(|e| KegError::ExtractFailed {
        archive: archive.display().to_string(),
        reason: e.to_string(),
    })
}

fn extract_inner(archive: &Path, dest: &Path) -> io::Result<()> {
    let file = fs::File::open(archive)?;
    let mut zip = ZipArchive::new(file).map_err(io::Error::other)?;
    fs::create_dir_all(dest)?;

    for i in 0..zip.len() {
        let mut entry = zip.by_index(i).map_err(io::Error::other)?;
        let Some(target) = entry.enclosed_name().map(|p| dest.join(p)) else {
            continue;
        };
        if entry.is_dir() {
            fs::create_dir_all(&target)?;
            continue;
        }
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut out = fs::File::create(&target)?;
        io::copy(&mut entry, &mut out)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            if let Some(mode) = entry.unix_mode() {
                fs::set_permissions(&target, fs::Permissions::from_mode(mode))?;
            }
        }
    }
    Ok(())
}
