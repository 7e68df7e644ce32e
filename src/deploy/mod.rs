//! Content deployment
//!
//! The repository is cloned into a scratch workspace, the selected subtree
//! is merged into the site directory and the web server is restarted. The
//! workspace is removed on every exit path when its guard drops.

use std::path::{Component, Path, PathBuf};

use tracing::{debug, info, warn};

use crate::common::fs::{CopyOptions, merge_dir};
use crate::domain::RepositoryReference;
use crate::error::{Result, SiteError};
use crate::git;
use crate::service::ServiceController;
use crate::temp;
use crate::ui;

/// Fetches a repository's content into a local directory
pub trait RepositoryFetcher {
    fn fetch(&self, url: &str, target: &Path) -> Result<()>;
}

/// Fetcher backed by a git clone
pub struct GitFetcher;

impl RepositoryFetcher for GitFetcher {
    fn fetch(&self, url: &str, target: &Path) -> Result<()> {
        let pb = ui::spinner(format!("Cloning {url}"));
        let result = git::clone(url, target);
        pb.finish_and_clear();
        result.map(|_| ())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployOutcome {
    /// Directory inside the checkout that was copied, relative to its root
    pub source: PathBuf,
    pub files_copied: usize,
}

pub struct Deployer<'a> {
    fetcher: &'a dyn RepositoryFetcher,
}

impl<'a> Deployer<'a> {
    pub fn new(fetcher: &'a dyn RepositoryFetcher) -> Self {
        Self { fetcher }
    }

    /// Deploy `repo` into `target` and restart `service`.
    pub fn deploy(
        &self,
        repo: &RepositoryReference,
        target: &Path,
        subdir: Option<&str>,
        service: &str,
        services: &ServiceController<'_>,
    ) -> Result<DeployOutcome> {
        let outcome = self.copy_content(repo, target, subdir)?;
        services.ensure_restarted(service)?;
        Ok(outcome)
    }

    fn copy_content(
        &self,
        repo: &RepositoryReference,
        target: &Path,
        subdir: Option<&str>,
    ) -> Result<DeployOutcome> {
        let workspace = temp::workspace()?;
        let checkout = workspace.path().join(&repo.canonical_id);

        info!("Fetching {} into {}", repo.url, checkout.display());
        self.fetcher.fetch(&repo.url, &checkout)?;

        let source = select_source(&checkout, subdir);
        let source_root = checkout.join(&source);
        debug!("Deploying from {}", source_root.display());

        let files_copied = merge_dir(&source_root, target, &CopyOptions::exclude_git()).map_err(
            |e| SiteError::DeploymentCopyFailed {
                target: target.display().to_string(),
                reason: e.to_string(),
            },
        )?;
        info!("Copied {files_copied} files into {}", target.display());

        if let Err(e) = workspace.close() {
            warn!("Failed to remove scratch workspace: {e}");
        }

        Ok(DeployOutcome {
            source,
            files_copied,
        })
    }
}

/// Pick the directory to deploy, relative to the checkout root.
///
/// A subdirectory that escapes the checkout or does not exist falls back to
/// the checkout root.
fn select_source(checkout: &Path, subdir: Option<&str>) -> PathBuf {
    let Some(subdir) = subdir else {
        return PathBuf::new();
    };

    let relative = Path::new(subdir);
    let contained = relative
        .components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));

    if contained && checkout.join(relative).is_dir() {
        relative.to_path_buf()
    } else {
        warn!("Subdirectory '{subdir}' not found in repository, deploying repository root");
        PathBuf::new()
    }
}
