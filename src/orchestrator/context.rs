//! State carried from one provisioning stage to the next

use std::fmt;

use crate::config::SiteLayout;
use crate::domain::{RepositoryReference, SiteDirectory, VHostConfig};
use crate::platform::Platform;

/// Stages in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Platform,
    PackageIndex,
    Package,
    Service,
    Boot,
    Directory,
    VHost,
    Deploy,
}

impl Stage {
    pub fn name(self) -> &'static str {
        match self {
            Self::Platform => "platform",
            Self::PackageIndex => "index",
            Self::Package => "package",
            Self::Service => "service",
            Self::Boot => "boot",
            Self::Directory => "directory",
            Self::VHost => "vhost",
            Self::Deploy => "deploy",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageStatus {
    /// The host was modified
    Changed,
    /// Already in the desired state
    Unchanged,
    /// Would be modified (dry run)
    Planned,
    /// Skipped with a warning
    Warning,
}

impl StageStatus {
    pub fn label(self) -> &'static str {
        match self {
            Self::Changed => "changed",
            Self::Unchanged => "unchanged",
            Self::Planned => "planned",
            Self::Warning => "warning",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageRecord {
    pub stage: Stage,
    pub status: StageStatus,
    pub detail: String,
}

/// Everything learned so far during one run
#[derive(Debug)]
pub struct ProvisionContext {
    pub platform: Platform,
    pub layout: SiteLayout,
    pub site_dir: Option<SiteDirectory>,
    pub vhost: Option<VHostConfig>,
    pub repository: Option<RepositoryReference>,
    records: Vec<StageRecord>,
}

impl ProvisionContext {
    pub fn new(platform: Platform, layout: SiteLayout) -> Self {
        Self {
            platform,
            layout,
            site_dir: None,
            vhost: None,
            repository: None,
            records: Vec::new(),
        }
    }

    pub fn record(&mut self, stage: Stage, status: StageStatus, detail: impl Into<String>) {
        self.records.push(StageRecord {
            stage,
            status,
            detail: detail.into(),
        });
    }

    pub fn into_report(self, dry_run: bool) -> Report {
        Report {
            dry_run,
            stages: self.records,
            site_dir: self.site_dir,
            vhost: self.vhost,
            repository: self.repository,
        }
    }
}

/// Summary of a finished run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub dry_run: bool,
    pub stages: Vec<StageRecord>,
    /// Only set when the directory was actually created
    pub site_dir: Option<SiteDirectory>,
    pub vhost: Option<VHostConfig>,
    pub repository: Option<RepositoryReference>,
}

#[cfg(test)]
impl Report {
    pub fn status_of(&self, stage: Stage) -> Option<StageStatus> {
        self.stages
            .iter()
            .find(|r| r.stage == stage)
            .map(|r| r.status)
    }
}
