//! Site directory provisioning
//!
//! Creating a site directory is deliberately not idempotent: if the
//! directory already exists the run stops with
//! [`SiteError::SiteAlreadyExists`] and nothing on disk is touched.

pub mod owner;

use std::fs;
use std::path::PathBuf;

use tracing::{debug, info, warn};

use crate::config::SiteLayout;
use crate::domain::SiteDirectory;
use crate::error::{Result, SiteError};

use owner::{Owner, lookup_owner, parse_user_directive};

/// Permissions of a site directory: owner and group rwx, others nothing
pub const SITE_DIR_MODE: u32 = 0o770;

pub struct SiteDirectoryProvisioner<'a> {
    layout: &'a SiteLayout,
}

impl<'a> SiteDirectoryProvisioner<'a> {
    pub fn new(layout: &'a SiteLayout) -> Self {
        Self { layout }
    }

    pub fn site_path(&self, site: &str) -> PathBuf {
        self.layout.document_root.join(site)
    }

    /// The user the web server runs as, from its primary configuration.
    pub fn resolve_run_as_user(&self) -> Result<String> {
        let path = &self.layout.web_server_config;
        let config =
            fs::read_to_string(path).map_err(|e| SiteError::WebServerConfigUnreadable {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;

        if let Some(user) = parse_user_directive(&config) {
            debug!("Web server runs as '{user}' per {}", path.display());
            Ok(user)
        } else {
            warn!(
                "No user directive in {}, assuming '{}'",
                path.display(),
                self.layout.default_user
            );
            Ok(self.layout.default_user.clone())
        }
    }

    /// The run-as user and group as they exist on this host.
    pub fn resolve_owner(&self) -> Result<Owner> {
        lookup_owner(&self.resolve_run_as_user()?)
    }

    /// Fail with `SiteAlreadyExists` if the site directory is present.
    pub fn ensure_absent(&self, site: &str) -> Result<PathBuf> {
        let path = self.site_path(site);
        // symlink_metadata so a dangling link still counts as taken
        if fs::symlink_metadata(&path).is_ok() {
            return Err(SiteError::SiteAlreadyExists {
                site: site.to_string(),
                path: path.display().to_string(),
            });
        }
        Ok(path)
    }

    pub fn provision(&self, site: &str) -> Result<SiteDirectory> {
        let owner = self.resolve_owner()?;
        let path = self.ensure_absent(site)?;

        fs::create_dir_all(&path).map_err(|e| SiteError::DirectoryProvisionFailed {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        owner::chown_recursive(&path, &owner)?;
        owner::chmod_recursive(&path, SITE_DIR_MODE)?;

        info!(
            "Created site directory {} owned by {}:{}",
            path.display(),
            owner.user,
            owner.group
        );
        Ok(SiteDirectory {
            path,
            owner_user: owner.user,
            owner_group: owner.group,
            mode: SITE_DIR_MODE,
        })
    }
}
