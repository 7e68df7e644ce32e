//! Domain types for a single provisioning run
//!
//! All of these live for one invocation only; nothing is persisted between
//! runs.

pub mod state;

use std::path::PathBuf;

use crate::error::{Result, SiteError};

pub use state::{BootState, ProvisionState, ServiceState};

/// What to install and control on the host
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostTarget {
    pub package: String,
    pub service: String,
}

impl HostTarget {
    pub fn new(package: impl Into<String>, service: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            service: service.into(),
        }
    }
}

/// The site to create
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteSpec {
    name: String,
    server_name: String,
    source_subdir: Option<String>,
}

impl SiteSpec {
    /// Validate `name` and build a site description.
    ///
    /// An empty `source_subdir` is the same as none.
    pub fn new(
        name: impl Into<String>,
        server_name: impl Into<String>,
        source_subdir: Option<String>,
    ) -> Result<Self> {
        let name = name.into();
        validate_site_name(&name)?;
        Ok(Self {
            name,
            server_name: server_name.into(),
            source_subdir: source_subdir.filter(|s| !s.trim().is_empty()),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn server_name(&self) -> &str {
        &self.server_name
    }

    pub fn source_subdir(&self) -> Option<&str> {
        self.source_subdir.as_deref()
    }
}

/// Check that a site name is a single filesystem-safe path segment.
pub fn validate_site_name(name: &str) -> Result<()> {
    let reason = if name.is_empty() {
        Some("name is empty")
    } else if name == "." || name == ".." {
        Some("name refers to a relative directory")
    } else if name.contains('/') || name.contains('\\') {
        Some("name contains a path separator")
    } else if name.contains('\0') {
        Some("name contains a NUL byte")
    } else if name.chars().any(char::is_whitespace) {
        Some("name contains whitespace")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(SiteError::InvalidSiteName {
            name: name.to_string(),
            reason: reason.to_string(),
        }),
        None => Ok(()),
    }
}

/// A repository URL and the local name derived from it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryReference {
    pub url: String,
    pub canonical_id: String,
}

/// A provisioned document directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteDirectory {
    pub path: PathBuf,
    pub owner_user: String,
    pub owner_group: String,
    pub mode: u32,
}

/// A rendered virtual host and where it is written and linked
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VHostConfig {
    pub config_path: PathBuf,
    pub enabled_link: PathBuf,
    pub content: String,
}
