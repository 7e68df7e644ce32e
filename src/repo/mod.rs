//! Repository reference resolution
//!
//! A repository URL is first probed for reachability, then its last path
//! segment is turned into the canonical local name used as the clone
//! directory:
//!
//! | segment           | parts | canonical id     |
//! |-------------------|-------|------------------|
//! | `app.git`         | 2     | `app`            |
//! | `app.tar.gz`      | 3     | `app.tar`        |
//! | `my.app.v2.git`   | 4     | `my.app.v2`      |
//! | `app`, `a.b.c.d.e`| 1, 5+ | error            |

pub mod probe;

use tracing::{debug, info};

use crate::domain::RepositoryReference;
use crate::error::{Result, SiteError};

pub use probe::{HostProbe, Reachability, ReachabilityProbe};

/// Last path segment of a repository URL or SCP-style address.
pub fn last_segment(url: &str) -> &str {
    let trimmed = url.trim_end_matches('/');
    let path = if trimmed.contains("://") {
        trimmed
    } else {
        // git@host:org/repo.git
        trimmed.rsplit_once(':').map_or(trimmed, |(_, path)| path)
    };
    path.rsplit('/').next().unwrap_or(path)
}

/// Derive the canonical local identifier from the last path segment.
pub fn canonical_id(url: &str) -> Result<String> {
    let segment = last_segment(url);
    let parts: Vec<&str> = segment.split('.').collect();

    let keep = match parts.len() {
        2 => 1,
        3 => 2,
        4 => 3,
        _ => 0,
    };
    let id = parts[..keep].join(".");
    if id.is_empty() {
        return Err(SiteError::UnparsableRepositoryName {
            url: url.to_string(),
            segment: segment.to_string(),
        });
    }
    Ok(id)
}

pub struct RepositoryResolver<'a> {
    probe: &'a dyn ReachabilityProbe,
}

impl<'a> RepositoryResolver<'a> {
    pub fn new(probe: &'a dyn ReachabilityProbe) -> Self {
        Self { probe }
    }

    /// Probe `url` and derive its canonical id. Names are only parsed once
    /// the repository is known to be reachable.
    pub fn resolve(&self, url: &str) -> Result<RepositoryReference> {
        debug!("Probing repository {url}");
        if let Reachability::Unreachable(reason) = self.probe.probe(url)? {
            return Err(SiteError::UnreachableRepository {
                url: url.to_string(),
                reason,
            });
        }

        let canonical_id = canonical_id(url)?;
        info!("Repository {url} resolved as '{canonical_id}'");
        Ok(RepositoryReference {
            url: url.to_string(),
            canonical_id,
        })
    }
}
