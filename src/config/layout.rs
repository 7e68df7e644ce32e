//! Per-family web server filesystem layout
//!
//! The built-in table covers nginx as packaged by Debian and RedHat
//! derivatives. Any field can be overridden from the configuration file.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::platform::OsFamily;

/// Where the web server keeps its files on a given platform
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteLayout {
    /// Base directory under which site directories are created
    pub document_root: PathBuf,
    /// Directory holding virtual host definitions
    pub available_dir: PathBuf,
    /// Directory whose entries the web server loads
    pub enabled_dir: PathBuf,
    /// The distribution's default site definition
    pub default_config: PathBuf,
    /// Link that activates the default site, if the platform uses one
    pub default_enabled_link: Option<PathBuf>,
    /// Primary web server configuration file
    pub web_server_config: PathBuf,
    /// Extension appended to virtual host file names, e.g. `.conf`
    pub vhost_extension: Option<String>,
    /// Run-as user when the configuration names none
    pub default_user: String,
}

impl SiteLayout {
    pub fn builtin(family: OsFamily) -> Self {
        match family {
            OsFamily::Debian => Self {
                document_root: PathBuf::from("/var/www"),
                available_dir: PathBuf::from("/etc/nginx/sites-available"),
                enabled_dir: PathBuf::from("/etc/nginx/sites-enabled"),
                default_config: PathBuf::from("/etc/nginx/sites-available/default"),
                default_enabled_link: Some(PathBuf::from("/etc/nginx/sites-enabled/default")),
                web_server_config: PathBuf::from("/etc/nginx/nginx.conf"),
                vhost_extension: None,
                default_user: "www-data".to_string(),
            },
            OsFamily::RedHat => Self {
                document_root: PathBuf::from("/usr/share/nginx"),
                available_dir: PathBuf::from("/etc/nginx/sites-available"),
                enabled_dir: PathBuf::from("/etc/nginx/conf.d"),
                default_config: PathBuf::from("/etc/nginx/conf.d/default.conf"),
                default_enabled_link: None,
                web_server_config: PathBuf::from("/etc/nginx/nginx.conf"),
                vhost_extension: Some(".conf".to_string()),
                default_user: "nginx".to_string(),
            },
        }
    }

    /// Apply the fields set in `patch`.
    pub fn apply(&mut self, patch: &LayoutPatch) {
        if let Some(v) = &patch.document_root {
            self.document_root.clone_from(v);
        }
        if let Some(v) = &patch.available_dir {
            self.available_dir.clone_from(v);
        }
        if let Some(v) = &patch.enabled_dir {
            self.enabled_dir.clone_from(v);
        }
        if let Some(v) = &patch.default_config {
            self.default_config.clone_from(v);
        }
        if let Some(v) = &patch.default_enabled_link {
            self.default_enabled_link = Some(v.clone());
        }
        if let Some(v) = &patch.web_server_config {
            self.web_server_config.clone_from(v);
        }
        if let Some(v) = &patch.vhost_extension {
            self.vhost_extension = (!v.is_empty()).then(|| v.clone());
        }
        if let Some(v) = &patch.default_user {
            self.default_user.clone_from(v);
        }
    }

    /// Resolve every path beneath `root`.
    #[must_use]
    pub fn under_root(&self, root: &Path) -> Self {
        Self {
            document_root: rooted(root, &self.document_root),
            available_dir: rooted(root, &self.available_dir),
            enabled_dir: rooted(root, &self.enabled_dir),
            default_config: rooted(root, &self.default_config),
            default_enabled_link: self
                .default_enabled_link
                .as_ref()
                .map(|p| rooted(root, p)),
            web_server_config: rooted(root, &self.web_server_config),
            vhost_extension: self.vhost_extension.clone(),
            default_user: self.default_user.clone(),
        }
    }

    /// File name of the virtual host definition for `site`
    pub fn vhost_file_name(&self, site: &str) -> String {
        match &self.vhost_extension {
            Some(ext) => format!("{site}{ext}"),
            None => site.to_string(),
        }
    }
}

fn rooted(root: &Path, path: &Path) -> PathBuf {
    root.join(path.strip_prefix("/").unwrap_or(path))
}

/// Layout fields overridable from the configuration file
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LayoutPatch {
    pub document_root: Option<PathBuf>,
    pub available_dir: Option<PathBuf>,
    pub enabled_dir: Option<PathBuf>,
    pub default_config: Option<PathBuf>,
    pub default_enabled_link: Option<PathBuf>,
    pub web_server_config: Option<PathBuf>,
    /// Empty string removes the extension
    pub vhost_extension: Option<String>,
    pub default_user: Option<String>,
}
