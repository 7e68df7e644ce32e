//! Host command execution
//!
//! Every interaction with the OS package manager and service manager goes
//! through the [`CommandRunner`] seam. Adapters build a [`HostCommand`], run
//! it, and interpret the captured [`CommandOutput`]; nothing else in the crate
//! spawns processes.

pub mod address;

use std::fmt;
use std::process::Command;

use tracing::debug;

use crate::error::{Result, SiteError};

/// A program invocation with arguments and extra environment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostCommand {
    program: String,
    args: Vec<String>,
    env: Vec<(String, String)>,
}

impl HostCommand {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            env: Vec::new(),
        }
    }

    #[must_use]
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn arguments(&self) -> &[String] {
        &self.args
    }

    pub fn environment(&self) -> &[(String, String)] {
        &self.env
    }
}

impl fmt::Display for HostCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Captured result of a finished command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code, `None` when the process was killed by a signal
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    /// Human readable exit status, e.g. `exit status 100`
    pub fn status_text(&self) -> String {
        describe_exit(self.code)
    }

    /// Status plus the last line of stderr, for error messages
    pub fn failure_reason(&self) -> String {
        match self.stderr.lines().rev().find(|l| !l.trim().is_empty()) {
            Some(line) => format!("{}: {}", self.status_text(), line.trim()),
            None => self.status_text(),
        }
    }
}

pub fn describe_exit(code: Option<i32>) -> String {
    match code {
        Some(code) => format!("exit status {code}"),
        None => "terminated by signal".to_string(),
    }
}

/// Runs host commands and captures their output
pub trait CommandRunner {
    /// Run `command` to completion.
    ///
    /// A non-zero exit is not an error here; only failing to spawn the
    /// process is. Callers decide what a non-success status means.
    fn run(&self, command: &HostCommand) -> Result<CommandOutput>;
}

/// Runs commands on the local host with `std::process`
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, command: &HostCommand) -> Result<CommandOutput> {
        debug!("Running {command}");

        let output = Command::new(command.program())
            .args(command.arguments())
            .envs(command.environment().iter().map(|(k, v)| (k, v)))
            .output()
            .map_err(|e| SiteError::CommandSpawnFailed {
                command: command.to_string(),
                reason: e.to_string(),
            })?;

        let result = CommandOutput {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };
        debug!("{} finished with {}", command.program(), result.status_text());
        Ok(result)
    }
}
