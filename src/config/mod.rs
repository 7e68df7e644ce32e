//! Configuration loading
//!
//! sitekit runs without any configuration file. When one is present it can
//! move the filesystem root, tune the reachability timeout and override the
//! per-family layout table.
//!
//! Lookup order:
//! 1. `--config <path>` (or `SITEKIT_CONFIG`); must exist when given
//! 2. `~/.config/sitekit/config.yaml` (if exists)

pub mod layout;

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use crate::error::{Result, SiteError};
use crate::platform::OsFamily;

pub use layout::{LayoutPatch, SiteLayout};

/// Default timeout for the repository reachability probe
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

const CONFIG_DIR_NAME: &str = "sitekit";
const CONFIG_FILE_NAME: &str = "config.yaml";

/// On-disk configuration file
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub root: Option<PathBuf>,
    pub http_timeout_secs: Option<u64>,
    #[serde(default)]
    pub layout: LayoutOverrides,
}

/// Layout overrides keyed by family
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LayoutOverrides {
    pub debian: Option<LayoutPatch>,
    pub redhat: Option<LayoutPatch>,
}

impl LayoutOverrides {
    fn for_family(&self, family: OsFamily) -> Option<&LayoutPatch> {
        match family {
            OsFamily::Debian => self.debian.as_ref(),
            OsFamily::RedHat => self.redhat.as_ref(),
        }
    }
}

/// Effective settings for one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Filesystem root every layout path is resolved beneath
    pub root: PathBuf,
    pub http_timeout: Duration,
    overrides: LayoutOverrides,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            root: PathBuf::from("/"),
            http_timeout: DEFAULT_HTTP_TIMEOUT,
            overrides: LayoutOverrides::default(),
        }
    }
}

impl Settings {
    /// Load settings from the configuration file, if any, then apply the
    /// command line root override.
    pub fn load(explicit: Option<&Path>, root_override: Option<PathBuf>) -> Result<Self> {
        let file = match explicit {
            Some(path) => {
                if !path.exists() {
                    return Err(SiteError::ConfigNotFound {
                        path: path.display().to_string(),
                    });
                }
                Some(read_config_file(path)?)
            }
            None => match global_config_path() {
                Some(path) if path.is_file() => Some(read_config_file(&path)?),
                _ => None,
            },
        };

        let mut settings = file.map(Self::from_file).unwrap_or_default();
        if let Some(root) = root_override {
            settings.root = root;
        }
        debug!("Using filesystem root {}", settings.root.display());
        Ok(settings)
    }

    pub fn from_file(file: ConfigFile) -> Self {
        let defaults = Self::default();
        Self {
            root: file.root.unwrap_or(defaults.root),
            http_timeout: file
                .http_timeout_secs
                .map_or(defaults.http_timeout, Duration::from_secs),
            overrides: file.layout,
        }
    }

    #[cfg(test)]
    #[must_use]
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = root.into();
        self
    }

    /// The layout for `family` with overrides applied, resolved under the root
    pub fn layout_for(&self, family: OsFamily) -> SiteLayout {
        let mut layout = SiteLayout::builtin(family);
        if let Some(patch) = self.overrides.for_family(family) {
            debug!("Applying {} layout overrides", family.key());
            layout.apply(patch);
        }
        layout.under_root(&self.root)
    }
}

fn global_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
}

fn read_config_file(path: &Path) -> Result<ConfigFile> {
    let content = fs::read_to_string(path).map_err(|e| SiteError::ConfigReadFailed {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    parse_config(&content, &path.display().to_string())
}

/// Parse configuration YAML; an empty document is an empty configuration.
pub fn parse_config(content: &str, path: &str) -> Result<ConfigFile> {
    if content.trim().is_empty() {
        return Ok(ConfigFile::default());
    }
    serde_yaml::from_str(content).map_err(|e| SiteError::ConfigParseFailed {
        path: path.to_string(),
        reason: e.to_string(),
    })
}
