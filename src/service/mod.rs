//! Service convergence
//!
//! [`ServiceController`] implements the run/enable state machine on top of a
//! [`ServiceManager`], which reports structured [`ServiceState`] and
//! [`BootState`] values and performs the raw transitions.
//!
//! | current | `ensure_running`            |
//! |---------|-----------------------------|
//! | Running | no-op                       |
//! | Dead    | start, then verify Running  |
//! | Failed  | error, no start attempted   |
//! | Absent  | no-op, warning              |

pub mod systemd;

use std::fmt;

use tracing::{info, warn};

use crate::domain::{BootState, ServiceState};
use crate::error::{Result, SiteError};

pub use systemd::Systemd;

/// Outcome of a state transition: `Err` carries the manager's failure reason
pub type Transition = std::result::Result<(), String>;

/// Raw service manager access
pub trait ServiceManager {
    fn state(&self, service: &str) -> Result<ServiceState>;
    fn boot_state(&self, service: &str) -> Result<BootState>;

    fn start(&self, service: &str) -> Result<Transition>;
    fn enable(&self, service: &str) -> Result<Transition>;
    fn restart(&self, service: &str) -> Result<Transition>;
}

/// Result of [`ServiceController::ensure_running`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    AlreadyRunning,
    Started,
    /// The service does not exist; nothing was done
    Absent,
}

impl fmt::Display for RunOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::AlreadyRunning => "already running",
            Self::Started => "started",
            Self::Absent => "not present, skipped",
        })
    }
}

/// Result of [`ServiceController::ensure_enabled`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnableOutcome {
    AlreadyEnabled,
    Enabled,
    /// Boot state could not be determined; nothing was done
    Unknown,
}

impl fmt::Display for EnableOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::AlreadyEnabled => "already enabled",
            Self::Enabled => "enabled at boot",
            Self::Unknown => "boot state unknown, skipped",
        })
    }
}

pub struct ServiceController<'a> {
    manager: &'a dyn ServiceManager,
}

impl<'a> ServiceController<'a> {
    pub fn new(manager: &'a dyn ServiceManager) -> Self {
        Self { manager }
    }

    pub fn state(&self, service: &str) -> Result<ServiceState> {
        self.manager.state(service)
    }

    pub fn boot_state(&self, service: &str) -> Result<BootState> {
        self.manager.boot_state(service)
    }

    pub fn ensure_running(&self, service: &str) -> Result<RunOutcome> {
        match self.manager.state(service)? {
            ServiceState::Running => {
                info!("Service '{service}' is already running");
                Ok(RunOutcome::AlreadyRunning)
            }
            ServiceState::Absent => {
                warn!("Service '{service}' does not exist, not starting it");
                Ok(RunOutcome::Absent)
            }
            ServiceState::Failed => Err(SiteError::ServiceInFailedState {
                service: service.to_string(),
            }),
            ServiceState::Dead => {
                info!("Starting service '{service}'");
                if let Err(reason) = self.manager.start(service)? {
                    return Err(SiteError::ServiceStartFailed {
                        service: service.to_string(),
                        reason,
                    });
                }
                self.verify_running(service)?
                    .map_err(|reason| SiteError::ServiceStartFailed {
                        service: service.to_string(),
                        reason,
                    })?;
                Ok(RunOutcome::Started)
            }
        }
    }

    pub fn ensure_enabled(&self, service: &str) -> Result<EnableOutcome> {
        match self.manager.boot_state(service)? {
            BootState::Enabled => {
                info!("Service '{service}' is already enabled at boot");
                Ok(EnableOutcome::AlreadyEnabled)
            }
            BootState::Unknown => {
                info!("Boot state of '{service}' is unknown, leaving it as is");
                Ok(EnableOutcome::Unknown)
            }
            BootState::Disabled => {
                info!("Enabling service '{service}' at boot");
                let failure = |reason| SiteError::ServiceEnableFailed {
                    service: service.to_string(),
                    reason,
                };
                self.manager.enable(service)?.map_err(failure)?;
                match self.manager.boot_state(service)? {
                    BootState::Enabled => Ok(EnableOutcome::Enabled),
                    other => Err(failure(format!("boot state is {other} after enable"))),
                }
            }
        }
    }

    /// Restart unconditionally and verify the service came back up.
    pub fn ensure_restarted(&self, service: &str) -> Result<()> {
        info!("Restarting service '{service}'");
        let failure = |reason| SiteError::ServiceRestartFailed {
            service: service.to_string(),
            reason,
        };
        self.manager.restart(service)?.map_err(failure)?;
        self.verify_running(service)?.map_err(failure)
    }

    fn verify_running(&self, service: &str) -> Result<Transition> {
        Ok(match self.manager.state(service)? {
            ServiceState::Running => Ok(()),
            other => Err(format!("service is {other} after the operation")),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::test_fixtures::FakeHost;

    fn controller_test(host: &FakeHost, check: impl FnOnce(&ServiceController<'_>)) {
        let systemd = Systemd::new(host);
        let controller = ServiceController::new(&systemd);
        check(&controller);
    }

    #[test]
    fn test_running_is_noop() {
        let host = FakeHost::new().with_service("nginx", ServiceState::Running, BootState::Enabled);
        controller_test(&host, |c| {
            assert_eq!(c.ensure_running("nginx").unwrap(), RunOutcome::AlreadyRunning);
        });
        assert_eq!(host.count_commands("systemctl start"), 0);
    }

    #[test]
    fn test_dead_is_started_and_observed_running() {
        let host = FakeHost::new().with_service("nginx", ServiceState::Dead, BootState::Disabled);
        controller_test(&host, |c| {
            assert_eq!(c.ensure_running("nginx").unwrap(), RunOutcome::Started);
            assert_eq!(c.state("nginx").unwrap(), ServiceState::Running);
        });
        assert_eq!(host.count_commands("systemctl start"), 1);
    }

    #[test]
    fn test_failed_is_fatal_without_start() {
        let host = FakeHost::new().with_service("nginx", ServiceState::Failed, BootState::Enabled);
        controller_test(&host, |c| {
            let err = c.ensure_running("nginx").unwrap_err();
            assert!(matches!(err, SiteError::ServiceInFailedState { .. }));
        });
        assert_eq!(host.count_commands("systemctl start"), 0);
    }

    #[test]
    fn test_absent_is_noop() {
        let host = FakeHost::new();
        controller_test(&host, |c| {
            assert_eq!(c.ensure_running("nginx").unwrap(), RunOutcome::Absent);
            assert_eq!(c.ensure_enabled("nginx").unwrap(), EnableOutcome::Unknown);
        });
        assert_eq!(host.count_commands("systemctl start"), 0);
        assert_eq!(host.count_commands("systemctl enable"), 0);
    }

    #[test]
    fn test_start_failure_is_reported() {
        let host = FakeHost::new()
            .with_service("nginx", ServiceState::Dead, BootState::Enabled)
            .failing_starts();
        controller_test(&host, |c| {
            let err = c.ensure_running("nginx").unwrap_err();
            assert!(matches!(err, SiteError::ServiceStartFailed { .. }));
        });
    }

    #[test]
    fn test_disabled_is_enabled() {
        let host = FakeHost::new().with_service("nginx", ServiceState::Running, BootState::Disabled);
        controller_test(&host, |c| {
            assert_eq!(c.ensure_enabled("nginx").unwrap(), EnableOutcome::Enabled);
            assert_eq!(
                c.ensure_enabled("nginx").unwrap(),
                EnableOutcome::AlreadyEnabled
            );
        });
        assert_eq!(host.count_commands("systemctl enable"), 1);
    }

    #[test]
    fn test_enable_failure() {
        let host = FakeHost::new()
            .with_service("nginx", ServiceState::Running, BootState::Disabled)
            .failing_enables();
        controller_test(&host, |c| {
            let err = c.ensure_enabled("nginx").unwrap_err();
            assert!(matches!(err, SiteError::ServiceEnableFailed { .. }));
        });
    }

    #[test]
    fn test_restart_always_runs() {
        let host = FakeHost::new().with_service("nginx", ServiceState::Running, BootState::Enabled);
        controller_test(&host, |c| {
            c.ensure_restarted("nginx").unwrap();
            c.ensure_restarted("nginx").unwrap();
        });
        assert_eq!(host.count_commands("systemctl restart"), 2);
    }

    #[test]
    fn test_restart_failure_is_fatal() {
        let host = FakeHost::new()
            .with_service("nginx", ServiceState::Running, BootState::Enabled)
            .failing_restarts();
        controller_test(&host, |c| {
            let err = c.ensure_restarted("nginx").unwrap_err();
            assert!(matches!(err, SiteError::ServiceRestartFailed { .. }));
        });
    }
}
