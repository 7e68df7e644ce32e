//! Package installation
//!
//! [`PackageManager`] hides the family-specific commands; [`PackageInstaller`]
//! holds the convergence logic on top of it.

pub mod apt;
pub mod dnf;

use std::fmt;

use tracing::info;

use crate::error::Result;
use crate::host::CommandRunner;
use crate::platform::PackageManagerKind;

pub use apt::Apt;
pub use dnf::Dnf;

/// Family-specific package database access
pub trait PackageManager {
    fn name(&self) -> &'static str;

    /// Refresh the package index from the configured repositories.
    fn refresh_index(&self) -> Result<()>;

    /// Names of every installed package.
    fn installed_packages(&self) -> Result<Vec<String>>;

    /// Install `package` non-interactively.
    fn install(&self, package: &str) -> Result<()>;
}

/// Package manager for the detected family
pub fn manager_for<'a>(
    kind: PackageManagerKind,
    runner: &'a dyn CommandRunner,
) -> Box<dyn PackageManager + 'a> {
    match kind {
        PackageManagerKind::Apt => Box::new(Apt::new(runner)),
        PackageManagerKind::Dnf => Box::new(Dnf::new(runner)),
    }
}

/// Result of [`PackageInstaller::ensure_installed`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageOutcome {
    AlreadyInstalled,
    Installed,
}

impl fmt::Display for PackageOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::AlreadyInstalled => "already installed",
            Self::Installed => "installed",
        })
    }
}

/// Idempotent package convergence
pub struct PackageInstaller<'a> {
    manager: &'a dyn PackageManager,
}

impl<'a> PackageInstaller<'a> {
    pub fn new(manager: &'a dyn PackageManager) -> Self {
        Self { manager }
    }

    pub fn refresh_index(&self) -> Result<()> {
        info!("Refreshing {} package index", self.manager.name());
        self.manager.refresh_index()
    }

    /// Exact-name membership test against the installed package list.
    pub fn is_installed(&self, package: &str) -> Result<bool> {
        Ok(self
            .manager
            .installed_packages()?
            .iter()
            .any(|installed| installed == package))
    }

    pub fn ensure_installed(&self, package: &str) -> Result<PackageOutcome> {
        if self.is_installed(package)? {
            info!("Package '{package}' is already installed");
            return Ok(PackageOutcome::AlreadyInstalled);
        }

        info!("Installing package '{package}' with {}", self.manager.name());
        self.manager.install(package)?;
        Ok(PackageOutcome::Installed)
    }
}
