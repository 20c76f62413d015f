//! Error types and handling for keg
//!
//! Uses `thiserror` for error definitions and `miette` for pretty diagnostics.
//! Every failure an install or uninstall can surface is a variant here;
//! best-effort cleanup steps report to stderr instead of returning errors.

use miette::Diagnostic;
use thiserror::Error;

/// Main error type for keg operations
#[derive(Error, Diagnostic, Debug)]
pub enum KegError {
    // Manifest errors
    #[error("Failed to parse manifest: {path}")]
    #[diagnostic(
        code(keg::manifest::parse_failed),
        help("Manifests are JSON documents with at least \"name\" and \"version\" fields")
    )]
    ManifestParseFailed { path: String, reason: String },

    #[error("Manifest not found: {path}")]
    #[diagnostic(code(keg::manifest::not_found))]
    ManifestNotFound { path: String },

    #[error("Package '{name}' has no valid download url")]
    #[diagnostic(
        code(keg::manifest::no_valid_url),
        help("Declare at least one entry in the manifest's \"urls\" array")
    )]
    NoValidUrl { name: String },

    #[error("Unsupported package extension: {extension}")]
    #[diagnostic(
        code(keg::unpack::unsupported_format),
        help("Supported extensions: zip, tar.gz, tgz, tar.bz2, tbz2, tar, exe")
    )]
    UnsupportedFormat { extension: String },

    // Version errors
    #[error("Failed to parse version '{input}'")]
    #[diagnostic(
        code(keg::version::parse_failed),
        help("Versions are dotted numeric components, e.g. 1.2.0")
    )]
    VersionParse { input: String },

    // Acquisition errors
    #[error("Failed to download {url}: {reason}")]
    #[diagnostic(
        code(keg::net::download_failed),
        help("The fetch is retried once before this error is reported")
    )]
    Network { url: String, reason: String },

    #[error("Hash mismatch for {path}: expected {expected}, got {actual}")]
    #[diagnostic(
        code(keg::net::hash_mismatch),
        help("The upstream artifact changed or the manifest hash is stale")
    )]
    HashMismatch {
        path: String,
        expected: String,
        actual: String,
    },

    #[error("Unsupported hash algorithm in '{value}'")]
    #[diagnostic(
        code(keg::hash::unsupported_algorithm),
        help("Supported prefixes: blake3:, sha256: (bare 64-hex is sha256)")
    )]
    UnsupportedHashAlgorithm { value: String },

    // Swap / transaction errors
    #[error("Failed to extract {archive}: {reason}")]
    #[diagnostic(code(keg::unpack::extract_failed))]
    ExtractFailed { archive: String, reason: String },

    #[error("Failed to swap {staging} into {root}: {reason}")]
    #[diagnostic(
        code(keg::install::swap_failed),
        help("The previous install root was restored; retrying the install is safe")
    )]
    SwapFailed {
        staging: String,
        root: String,
        reason: String,
    },

    #[error(
        "Install root {root} is inconsistent: swap failed and backup {backup} could not be restored: {reason}"
    )]
    #[diagnostic(
        code(keg::install::fatal_inconsistency),
        help("Manual repair required: inspect the root and its .old backup before retrying")
    )]
    FatalInconsistency {
        root: String,
        backup: String,
        reason: String,
    },

    // Metadata errors
    #[error("Failed to encode installed-state record for '{name}'")]
    #[diagnostic(code(keg::meta::encode_failed))]
    MetaEncodeFailed { name: String, reason: String },

    #[error("Failed to decode installed-state record: {path}")]
    #[diagnostic(
        code(keg::meta::decode_failed),
        help("The record is unreadable; reinstalling the package rewrites it")
    )]
    MetaDecodeFailed { path: String, reason: String },

    #[error("Package '{name}' is not installed")]
    #[diagnostic(code(keg::meta::not_installed))]
    NotInstalled { name: String },

    // Path table errors
    #[error("Failed to resolve keg directories: {reason}")]
    #[diagnostic(
        code(keg::vfs::resolve_failed),
        help("Set KEG_ROOT to pin the base directory explicitly")
    )]
    PathResolveFailed { reason: String },

    // File system errors
    #[error("Failed to read file: {path}")]
    #[diagnostic(code(keg::fs::read_failed))]
    FileReadFailed { path: String, reason: String },

    #[error("Failed to write file: {path}")]
    #[diagnostic(code(keg::fs::write_failed))]
    FileWriteFailed { path: String, reason: String },

    #[error("IO error: {message}")]
    #[diagnostic(code(keg::fs::io_error))]
    IoError { message: String },
}

impl From<std::io::Error> for KegError {
    fn from(err: std::io::Error) -> Self {
        KegError::IoError {
            message: err.to_string(),
        }
    }
}

/// Result type alias using miette for error handling
pub type Result<T> = miette::Result<T, KegError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = KegError::NoValidUrl {
            name: "ripgrep".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Package 'ripgrep' has no valid download url"
        );
    }

    #[test]
    fn test_error_code() {
        let err = KegError::UnsupportedFormat {
            extension: "rar".to_string(),
        };
        assert_eq!(
            err.code().map(|c| c.to_string()),
            Some("keg::unpack::unsupported_format".to_string())
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let keg_err: KegError = io_err.into();
        assert!(matches!(keg_err, KegError::IoError { .. }));
    }

    #[test]
    fn test_hash_mismatch_display() {
        let err = KegError::HashMismatch {
            path: "/tmp/pkg.zip".to_string(),
            expected: "sha256:aa".to_string(),
            actual: "sha256:bb".to_string(),
        };
        let message = err.to_string();
        assert!(message.contains("/tmp/pkg.zip"));
        assert!(message.contains("sha256:aa"));
        assert!(message.contains("sha256:bb"));
    }

    #[test]
    fn test_fatal_inconsistency_display() {
        let err = KegError::FatalInconsistency {
            root: "/kegs/pkgs/rg".to_string(),
            backup: "/kegs/pkgs/rg.old".to_string(),
            reason: "permission denied".to_string(),
        };
        assert!(err.to_string().contains("inconsistent"));
        assert!(err.to_string().contains("rg.old"));
    }
}
