//! Virtual host activation
//!
//! Disables the distribution's default site, writes a server block for the
//! new site and links it into the directory the web server loads.

pub mod template;

use std::fs;
use std::io;
use std::os::unix::fs::symlink;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::config::SiteLayout;
use crate::domain::{SiteDirectory, VHostConfig};
use crate::error::{Result, SiteError};

const BACKUP_SUFFIX: &str = ".bak";

/// What happened to the distribution's default site
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DefaultSiteChanges {
    /// Where the default configuration was moved to
    pub backed_up_to: Option<PathBuf>,
    pub link_removed: bool,
}

pub struct VHostConfigurator<'a> {
    layout: &'a SiteLayout,
}

impl<'a> VHostConfigurator<'a> {
    pub fn new(layout: &'a SiteLayout) -> Self {
        Self { layout }
    }

    pub fn config_path(&self, site: &str) -> PathBuf {
        self.layout
            .available_dir
            .join(self.layout.vhost_file_name(site))
    }

    pub fn enabled_link(&self, site: &str) -> PathBuf {
        self.layout
            .enabled_dir
            .join(self.layout.vhost_file_name(site))
    }

    /// Describe the configuration that [`activate`](Self::activate) writes.
    pub fn plan(&self, site: &str, server_name: &str, site_root: &Path) -> VHostConfig {
        VHostConfig {
            config_path: self.config_path(site),
            enabled_link: self.enabled_link(site),
            content: template::render(site_root, server_name),
        }
    }

    /// Fail with `VHostAlreadyActivated` if the site is already linked.
    pub fn ensure_not_activated(&self, site: &str) -> Result<()> {
        let link = self.enabled_link(site);
        if fs::symlink_metadata(&link).is_ok() {
            return Err(SiteError::VHostAlreadyActivated {
                link: link.display().to_string(),
            });
        }
        Ok(())
    }

    /// Move the default configuration aside and drop its enabled link.
    ///
    /// Safe to repeat: once renamed the default no longer exists under its
    /// original name.
    pub fn disable_default_site(&self) -> Result<DefaultSiteChanges> {
        let mut changes = DefaultSiteChanges::default();

        let default_config = &self.layout.default_config;
        if default_config.exists() {
            let backup = backup_path(default_config);
            fs::rename(default_config, &backup)
                .map_err(|e| write_failed(default_config, &e))?;
            info!(
                "Moved default site {} to {}",
                default_config.display(),
                backup.display()
            );
            changes.backed_up_to = Some(backup);
        } else {
            debug!("No default site at {}", default_config.display());
        }

        if let Some(link) = &self.layout.default_enabled_link {
            if fs::symlink_metadata(link).is_ok() {
                fs::remove_file(link).map_err(|e| write_failed(link, &e))?;
                info!("Removed default site link {}", link.display());
                changes.link_removed = true;
            }
        }

        Ok(changes)
    }

    pub fn activate(
        &self,
        site: &str,
        server_name: &str,
        site_dir: &SiteDirectory,
    ) -> Result<VHostConfig> {
        self.disable_default_site()?;
        self.ensure_not_activated(site)?;

        let vhost = self.plan(site, server_name, &site_dir.path);
        for dir in [&self.layout.available_dir, &self.layout.enabled_dir] {
            fs::create_dir_all(dir).map_err(|e| write_failed(dir, &e))?;
        }

        fs::write(&vhost.config_path, &vhost.content)
            .map_err(|e| write_failed(&vhost.config_path, &e))?;
        symlink(&vhost.config_path, &vhost.enabled_link)
            .map_err(|e| write_failed(&vhost.enabled_link, &e))?;

        info!(
            "Activated virtual host {} -> {}",
            vhost.enabled_link.display(),
            vhost.config_path.display()
        );
        Ok(vhost)
    }
}

fn backup_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(BACKUP_SUFFIX);
    PathBuf::from(name)
}

fn write_failed(path: &Path, err: &io::Error) -> SiteError {
    SiteError::VHostWriteFailed {
        path: path.display().to_string(),
        reason: err.to_string(),
    }
}
