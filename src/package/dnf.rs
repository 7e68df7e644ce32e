//! RedHat family package manager (rpm database, dnf frontend)

use super::PackageManager;
use crate::error::{Result, SiteError};
use crate::host::{CommandRunner, HostCommand};

pub struct Dnf<'a> {
    runner: &'a dyn CommandRunner,
}

impl<'a> Dnf<'a> {
    pub fn new(runner: &'a dyn CommandRunner) -> Self {
        Self { runner }
    }
}

impl PackageManager for Dnf<'_> {
    fn name(&self) -> &'static str {
        "dnf"
    }

    fn refresh_index(&self) -> Result<()> {
        let output = self
            .runner
            .run(&HostCommand::new("dnf").args(["makecache", "-y"]))?;
        if output.success() {
            Ok(())
        } else {
            Err(SiteError::PackageIndexRefreshFailed {
                manager: self.name().to_string(),
                status: output.failure_reason(),
            })
        }
    }

    fn installed_packages(&self) -> Result<Vec<String>> {
        let output = self
            .runner
            .run(&HostCommand::new("rpm").args(["-qa", "--queryformat", "%{NAME}\n"]))?;
        if !output.success() {
            return Err(SiteError::PackageQueryFailed {
                reason: output.failure_reason(),
            });
        }
        Ok(output
            .stdout
            .lines()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(ToString::to_string)
            .collect())
    }

    fn install(&self, package: &str) -> Result<()> {
        let output = self
            .runner
            .run(&HostCommand::new("dnf").args(["install", "-y", package]))?;
        if output.success() {
            Ok(())
        } else {
            Err(SiteError::InstallationFailed {
                package: package.to_string(),
                status: output.failure_reason(),
            })
        }
    }
}
