//! Platform detection
//!
//! Reads the OS identity of the host (or of an alternate filesystem root) and
//! maps it to one of the supported families. Detection has no side effects.

pub mod os_release;

use std::fmt;
use std::path::Path;

use tracing::debug;

use crate::error::{Result, SiteError};

pub use os_release::OsRelease;

/// Distribution family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OsFamily {
    Debian,
    RedHat,
}

impl OsFamily {
    pub fn package_manager(self) -> PackageManagerKind {
        match self {
            Self::Debian => PackageManagerKind::Apt,
            Self::RedHat => PackageManagerKind::Dnf,
        }
    }

    /// Key used for this family in the configuration file
    pub fn key(self) -> &'static str {
        match self {
            Self::Debian => "debian",
            Self::RedHat => "redhat",
        }
    }
}

impl fmt::Display for OsFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Debian => "Debian",
            Self::RedHat => "RedHat",
        })
    }
}

/// Package manager family used to install packages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageManagerKind {
    Apt,
    Dnf,
}

impl fmt::Display for PackageManagerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Apt => "apt",
            Self::Dnf => "dnf",
        })
    }
}

/// Detected platform
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Platform {
    pub family: OsFamily,
    pub package_manager: PackageManagerKind,
    /// Human readable distribution name, for logs
    pub distribution: String,
}

const OS_RELEASE_PATHS: &[&str] = &["etc/os-release", "usr/lib/os-release"];
const DEBIAN_MARKER: &str = "etc/debian_version";
const REDHAT_MARKER: &str = "etc/redhat-release";

/// Detect the platform of the filesystem mounted at `root`.
pub fn detect(root: &Path) -> Result<Platform> {
    if let Some(release) = read_os_release(root)? {
        let family = release
            .family()
            .ok_or_else(|| SiteError::UnsupportedPlatform {
                reason: format!(
                    "unrecognized distribution '{}'",
                    release.id.as_deref().unwrap_or("unknown")
                ),
            })?;
        return Ok(Platform {
            family,
            package_manager: family.package_manager(),
            distribution: release.display_name(),
        });
    }

    debug!("No os-release file under {}, checking marker files", root.display());
    let family = if root.join(DEBIAN_MARKER).is_file() {
        OsFamily::Debian
    } else if root.join(REDHAT_MARKER).is_file() {
        OsFamily::RedHat
    } else {
        return Err(SiteError::UnsupportedPlatform {
            reason: "cannot read the OS identity of this host".to_string(),
        });
    };

    Ok(Platform {
        family,
        package_manager: family.package_manager(),
        distribution: family.to_string(),
    })
}

fn read_os_release(root: &Path) -> Result<Option<OsRelease>> {
    for relative in OS_RELEASE_PATHS {
        let path = root.join(relative);
        if !path.is_file() {
            continue;
        }
        let content =
            std::fs::read_to_string(&path).map_err(|e| SiteError::UnsupportedPlatform {
                reason: format!("cannot read {}: {e}", path.display()),
            })?;
        return Ok(Some(OsRelease::parse(&content)));
    }
    Ok(None)
}
