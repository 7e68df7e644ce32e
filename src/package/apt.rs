//! Debian family package manager (dpkg database, apt-get frontend)

use super::PackageManager;
use crate::error::{Result, SiteError};
use crate::host::{CommandRunner, HostCommand};

/// dpkg status column value for a fully installed package
const INSTALLED_STATUS: &str = "installed";

pub struct Apt<'a> {
    runner: &'a dyn CommandRunner,
}

impl<'a> Apt<'a> {
    pub fn new(runner: &'a dyn CommandRunner) -> Self {
        Self { runner }
    }

    fn apt_get() -> HostCommand {
        HostCommand::new("apt-get").env("DEBIAN_FRONTEND", "noninteractive")
    }
}

impl PackageManager for Apt<'_> {
    fn name(&self) -> &'static str {
        "apt"
    }

    fn refresh_index(&self) -> Result<()> {
        let output = self.runner.run(&Self::apt_get().arg("update"))?;
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
        let output = self.runner.run(
            &HostCommand::new("dpkg-query")
                .arg("-W")
                .arg("-f=${Package}\t${db:Status-Status}\n"),
        )?;
        if !output.success() {
            return Err(SiteError::PackageQueryFailed {
                reason: output.failure_reason(),
            });
        }
        Ok(parse_dpkg_listing(&output.stdout))
    }

    fn install(&self, package: &str) -> Result<()> {
        let output = self
            .runner
            .run(&Self::apt_get().args(["install", "-y", package]))?;
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

/// Names from `dpkg-query` lines of the form `name<TAB>status`.
///
/// Packages that were removed but not purged are listed by dpkg with a
/// `config-files` status and are skipped.
pub fn parse_dpkg_listing(listing: &str) -> Vec<String> {
    listing
        .lines()
        .filter_map(|line| {
            let (name, status) = line.split_once('\t')?;
            (status.trim() == INSTALLED_STATUS).then(|| name.trim().to_string())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_dpkg_listing() {
        let listing = "nginx\tinstalled\nnginx-common\tinstalled\napache2\tconfig-files\nbroken line\n";
        assert_eq!(parse_dpkg_listing(listing), vec!["nginx", "nginx-common"]);
    }
}
