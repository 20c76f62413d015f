//! Version ordering and the install decision
//!
//! Versions are compared numerically per dotted component (up to four
//! components), never lexically: "1.10.0" is newer than "1.2.0". A
//! prerelease tail after a component's digits is tolerated and ignored.

use std::cmp::Ordering;

use crate::error::{KegError, Result};
use crate::meta::LocalMeta;
use crate::package::Package;

/// A parsed package version: up to four numeric components
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Version {
    parts: [u64; 4],
}

impl Version {
    /// Parse a dotted version string
    ///
    /// Each component contributes its leading digits; missing components
    /// are zero. A leading `v` is accepted. A first component without any
    /// digits is an error.
    pub fn parse(input: &str) -> Result<Self> {
        let trimmed = input.trim().trim_start_matches(['v', 'V']);
        if trimmed.is_empty() {
            return Err(KegError::VersionParse {
                input: input.to_string(),
            });
        }

        let mut parts = [0u64; 4];
        for (i, component) in trimmed.split('.').take(4).enumerate() {
            let digits: String = component.chars().take_while(char::is_ascii_digit).collect();
            if digits.is_empty() {
                if i == 0 {
                    return Err(KegError::VersionParse {
                        input: input.to_string(),
                    });
                }
                // prerelease tail such as "beta" in 1.0.beta
                break;
            }
            parts[i] = digits.parse().map_err(|_| KegError::VersionParse {
                input: input.to_string(),
            })?;
        }
        Ok(Self { parts })
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        self.parts.cmp(&other.parts)
    }
}

/// What an install request requires
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallDecision {
    /// No installed-state record exists
    FreshInstall,
    /// Same or newer content already installed; rebuild links only
    SkipRelinkOnly,
    /// Newer version available but the package is frozen
    SkipFrozen,
    /// Proceed through acquisition and swap
    Upgrade,
}

/// Decide whether an install request requires action
///
/// Downgrades and equal-version requests with equal-or-lower weight only
/// rebuild links; an equal version republished with a higher weight
/// overrides the prior install.
pub fn decide(
    pkg: &Package,
    existing: Option<&LocalMeta>,
    frozen: bool,
    force: bool,
) -> Result<InstallDecision> {
    let Some(meta) = existing else {
        return Ok(InstallDecision::FreshInstall);
    };

    let requested = Version::parse(&pkg.version)?;
    let installed = Version::parse(&meta.version)?;
    if requested < installed || (requested == installed && pkg.weight <= meta.weight) {
        return Ok(InstallDecision::SkipRelinkOnly);
    }
    if frozen && !force {
        return Ok(InstallDecision::SkipFrozen);
    }
    Ok(InstallDecision::Upgrade)
}
