//! Repository reachability probes
//!
//! Only an exact `200 OK` counts as reachable for HTTP(S) URLs; redirects
//! are followed before the final status is judged.

use std::path::Path;
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::redirect::Policy;
use reqwest::StatusCode;
use tracing::debug;

use crate::error::{Result, SiteError};
use crate::git;

const MAX_REDIRECTS: usize = 10;
const USER_AGENT: &str = concat!("sitekit/", env!("CARGO_PKG_VERSION"));

/// Answer of a reachability probe
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reachability {
    Reachable,
    Unreachable(String),
}

pub trait ReachabilityProbe {
    fn probe(&self, url: &str) -> Result<Reachability>;
}

/// Probe dispatching on the URL scheme
pub struct HostProbe {
    http: Client,
}

impl HostProbe {
    pub fn new(timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .redirect(Policy::limited(MAX_REDIRECTS))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| SiteError::IoError {
                message: format!("failed to build HTTP client: {e}"),
            })?;
        Ok(Self { http })
    }

    fn probe_http(&self, url: &str) -> Reachability {
        match self.http.get(url).send() {
            Ok(response) => {
                let status = response.status();
                debug!("{url} answered {status} (final URL {})", response.url());
                if status == StatusCode::OK {
                    Reachability::Reachable
                } else {
                    Reachability::Unreachable(format!("HTTP {status}"))
                }
            }
            Err(e) if e.is_timeout() => Reachability::Unreachable("request timed out".to_string()),
            Err(e) if e.is_redirect() => {
                Reachability::Unreachable("too many redirects".to_string())
            }
            Err(e) => Reachability::Unreachable(e.to_string()),
        }
    }
}

impl ReachabilityProbe for HostProbe {
    fn probe(&self, url: &str) -> Result<Reachability> {
        if url.starts_with("http://") || url.starts_with("https://") {
            return Ok(self.probe_http(url));
        }
        if git::url::is_local(url) {
            return Ok(probe_local(url));
        }
        if git::url::is_ssh(url) {
            return Ok(match git::probe_remote(url) {
                Ok(()) => Reachability::Reachable,
                Err(reason) => Reachability::Unreachable(reason),
            });
        }
        Ok(Reachability::Unreachable(
            "unsupported repository URL scheme".to_string(),
        ))
    }
}

fn probe_local(url: &str) -> Reachability {
    let path = url.strip_prefix("file://").unwrap_or(url);
    if Path::new(path).exists() {
        Reachability::Reachable
    } else {
        Reachability::Unreachable(format!("{path} does not exist"))
    }
}
