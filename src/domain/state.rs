//! Observed host state, recomputed on every run

use std::fmt;

/// Run state of a service as reported by the service manager
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceState {
    Running,
    Dead,
    Failed,
    /// The service manager does not know the unit
    Absent,
}

impl fmt::Display for ServiceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Running => "running",
            Self::Dead => "dead",
            Self::Failed => "failed",
            Self::Absent => "absent",
        };
        f.write_str(s)
    }
}

/// Whether a service starts at boot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootState {
    Enabled,
    Disabled,
    Unknown,
}

impl fmt::Display for BootState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Enabled => "enabled",
            Self::Disabled => "disabled",
            Self::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

/// Snapshot of the convergence-relevant host state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProvisionState {
    pub installed: bool,
    pub service: ServiceState,
    pub boot: BootState,
}
