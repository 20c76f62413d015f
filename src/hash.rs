//! Algorithm-tagged hashing for artifact integrity
//!
//! Expected hashes in manifests are strings of the form `<algo>:<hex>`;
//! a bare 64-hex string is treated as SHA-256. Verification streams the
//! file and compares case-insensitively.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use sha2::Digest;

use crate::error::{KegError, Result};

/// Hash prefix for BLAKE3 hashes
pub const BLAKE3_PREFIX: &str = "blake3:";

/// Hash prefix for SHA-256 hashes
pub const SHA256_PREFIX: &str = "sha256:";

/// Supported hash algorithms
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashAlgorithm {
    Blake3,
    Sha256,
}

/// Split an algorithm-tagged hash string into algorithm and lowercase hex
pub fn split_tagged(value: &str) -> Result<(HashAlgorithm, String)> {
    let trimmed = value.trim();
    if let Some(hex) = trimmed.strip_prefix(BLAKE3_PREFIX) {
        return Ok((HashAlgorithm::Blake3, hex.to_ascii_lowercase()));
    }
    if let Some(hex) = trimmed.strip_prefix(SHA256_PREFIX) {
        return Ok((HashAlgorithm::Sha256, hex.to_ascii_lowercase()));
    }
    // bare 64-hex strings default to SHA-256
    if trimmed.len() == 64 && trimmed.chars().all(|c| c.is_ascii_hexdigit()) {
        return Ok((HashAlgorithm::Sha256, trimmed.to_ascii_lowercase()));
    }
    Err(KegError::UnsupportedHashAlgorithm {
        value: value.to_string(),
    })
}

/// Calculate the hex digest of a file with the given algorithm
pub fn hash_file(path: &Path, algorithm: HashAlgorithm) -> Result<String> {
    let file = File::open(path).map_err(|e| KegError::FileReadFailed {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;

    let mut reader = BufReader::new(file);
    let mut buffer = [0u8; 8192];

    match algorithm {
        HashAlgorithm::Blake3 => {
            let mut hasher = blake3::Hasher::new();
            loop {
                let bytes_read = read_chunk(&mut reader, &mut buffer, path)?;
                if bytes_read == 0 {
                    break;
                }
                hasher.update(&buffer[..bytes_read]);
            }
            Ok(hasher.finalize().to_hex().to_string())
        }
        HashAlgorithm::Sha256 => {
            let mut hasher = sha2::Sha256::new();
            loop {
                let bytes_read = read_chunk(&mut reader, &mut buffer, path)?;
                if bytes_read == 0 {
                    break;
                }
                hasher.update(&buffer[..bytes_read]);
            }
            Ok(hex::encode(hasher.finalize()))
        }
    }
}

fn read_chunk(reader: &mut impl Read, buffer: &mut [u8], path: &Path) -> Result<usize> {
    reader.read(buffer).map_err(|e| KegError::FileReadFailed {
        path: path.display().to_string(),
        reason: e.to_string(),
    })
}

/// Check whether a file's content matches an algorithm-tagged hash
///
/// `Ok(false)` is a mismatch; IO failures and unknown algorithm tags are
/// errors.
pub fn matches(path: &Path, expected: &str) -> Result<bool> {
    let (algorithm, expected_hex) = split_tagged(expected)?;
    let actual = hash_file(path, algorithm)?;
    Ok(actual == expected_hex)
}

/// Compute the actual digest of a file, tagged like the expected value
///
/// Used to report what was found when a verification fails.
pub fn actual_tagged(path: &Path, expected: &str) -> Result<String> {
    let (algorithm, _) = split_tagged(expected)?;
    let actual = hash_file(path, algorithm)?;
    Ok(match algorithm {
        HashAlgorithm::Blake3 => format!("{BLAKE3_PREFIX}{actual}"),
        HashAlgorithm::Sha256 => format!("{SHA256_PREFIX}{actual}"),
    })
}
