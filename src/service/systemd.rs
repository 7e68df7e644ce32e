//! systemd adapter
//!
//! State comes from `systemctl show` properties rather than the free-text
//! `systemctl status` output.

use super::{ServiceManager, Transition};
use crate::domain::{BootState, ServiceState};
use crate::error::{Result, SiteError};
use crate::host::{CommandRunner, HostCommand};

pub struct Systemd<'a> {
    runner: &'a dyn CommandRunner,
}

impl<'a> Systemd<'a> {
    pub fn new(runner: &'a dyn CommandRunner) -> Self {
        Self { runner }
    }

    fn transition(&self, verb: &str, service: &str) -> Result<Transition> {
        let output = self
            .runner
            .run(&HostCommand::new("systemctl").args([verb, service]))?;
        Ok(if output.success() {
            Ok(())
        } else {
            Err(output.failure_reason())
        })
    }
}

impl ServiceManager for Systemd<'_> {
    fn state(&self, service: &str) -> Result<ServiceState> {
        let output = self.runner.run(&HostCommand::new("systemctl").args([
            "show",
            "--property=LoadState",
            "--property=ActiveState",
            service,
        ]))?;
        if !output.success() {
            return Err(SiteError::ServiceQueryFailed {
                service: service.to_string(),
                reason: output.failure_reason(),
            });
        }
        Ok(parse_show_output(&output.stdout))
    }

    fn boot_state(&self, service: &str) -> Result<BootState> {
        // is-enabled exits non-zero for disabled units; only stdout matters
        let output = self
            .runner
            .run(&HostCommand::new("systemctl").args(["is-enabled", service]))?;
        Ok(parse_is_enabled(&output.stdout))
    }

    fn start(&self, service: &str) -> Result<Transition> {
        self.transition("start", service)
    }

    fn enable(&self, service: &str) -> Result<Transition> {
        self.transition("enable", service)
    }

    fn restart(&self, service: &str) -> Result<Transition> {
        self.transition("restart", service)
    }
}

/// Map `LoadState=`/`ActiveState=` lines onto [`ServiceState`].
pub fn parse_show_output(stdout: &str) -> ServiceState {
    let mut load_state = "";
    let mut active_state = "";
    for line in stdout.lines() {
        match line.trim().split_once('=') {
            Some(("LoadState", v)) => load_state = v,
            Some(("ActiveState", v)) => active_state = v,
            _ => {}
        }
    }

    if load_state == "not-found" {
        return ServiceState::Absent;
    }
    match active_state {
        "active" | "reloading" | "activating" => ServiceState::Running,
        "failed" => ServiceState::Failed,
        _ => ServiceState::Dead,
    }
}

pub fn parse_is_enabled(stdout: &str) -> BootState {
    match stdout.lines().next().map(str::trim) {
        Some("enabled" | "enabled-runtime") => BootState::Enabled,
        Some("disabled") => BootState::Disabled,
        _ => BootState::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_show_states() {
        assert_eq!(
            parse_show_output("LoadState=loaded\nActiveState=active\n"),
            ServiceState::Running
        );
        assert_eq!(
            parse_show_output("LoadState=loaded\nActiveState=inactive\n"),
            ServiceState::Dead
        );
        assert_eq!(
            parse_show_output("LoadState=loaded\nActiveState=failed\n"),
            ServiceState::Failed
        );
        assert_eq!(
            parse_show_output("LoadState=not-found\nActiveState=inactive\n"),
            ServiceState::Absent
        );
    }

    #[test]
    fn test_parse_is_enabled() {
        assert_eq!(parse_is_enabled("enabled\n"), BootState::Enabled);
        assert_eq!(parse_is_enabled("disabled\n"), BootState::Disabled);
        assert_eq!(parse_is_enabled("static\n"), BootState::Unknown);
        assert_eq!(parse_is_enabled(""), BootState::Unknown);
    }
}
