//! Git transport for fetching site content
//!
//! This module handles:
//! - Cloning repositories over HTTPS, SSH and local paths
//! - Probing SSH remotes for reachability without cloning
//!
//! Authentication is delegated to git's native credential system (SSH agent,
//! keys in `~/.ssh/`, credential helpers).

pub mod auth;
pub mod error;
pub mod url;

use std::path::Path;

use git2::{Direction, FetchOptions, Remote, RemoteCallbacks, Repository, build::RepoBuilder};
use tracing::debug;

use crate::error::{Result, SiteError};

pub use error::interpret_git_error;

/// Clone `url` into `target`.
///
/// Remote clones are shallow (depth 1): only the tip of the default branch
/// is deployed. Local repositories are cloned in full since libgit2 does
/// not support shallow local clones.
pub fn clone(url: &str, target: &Path) -> Result<Repository> {
    let mut callbacks = RemoteCallbacks::new();
    auth::setup_auth_callbacks(&mut callbacks);

    let mut fetch_options = FetchOptions::new();
    fetch_options.remote_callbacks(callbacks);
    if !url::is_local(url) {
        fetch_options.depth(1);
    }

    let normalized = url::normalize_for_libgit2(url);
    debug!("Cloning {normalized} into {}", target.display());

    RepoBuilder::new()
        .fetch_options(fetch_options)
        .clone(normalized.as_ref(), target)
        .map_err(|e| SiteError::FetchFailed {
            url: url.to_string(),
            reason: interpret_git_error(&e),
        })
}

/// Connect to a remote for fetch and disconnect again.
///
/// Returns a readable reason when the remote cannot be reached.
pub fn probe_remote(url: &str) -> std::result::Result<(), String> {
    let normalized = url::normalize_for_libgit2(url);
    let mut remote =
        Remote::create_detached(normalized.as_ref()).map_err(|e| interpret_git_error(&e))?;

    let mut callbacks = RemoteCallbacks::new();
    auth::setup_auth_callbacks(&mut callbacks);

    let connection = remote
        .connect_auth(Direction::Fetch, Some(callbacks), None)
        .map_err(|e| interpret_git_error(&e))?;
    drop(connection);
    Ok(())
}
