//! sitekit - single-host web site provisioner
//!
//! Converges a Debian or RedHat family host into serving a site: installs
//! and starts the web server, creates the site directory, activates a
//! virtual host and deploys content from a git repository.

use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

mod cli;
mod common;
mod config;
mod deploy;
mod domain;
mod error;
mod git;
mod host;
mod orchestrator;
mod package;
mod platform;
mod repo;
mod service;
mod site;
mod temp;
mod ui;
mod vhost;

#[cfg(test)]
mod test_fixtures;

use cli::Cli;
use config::Settings;
use deploy::GitFetcher;
use domain::{HostTarget, SiteSpec};
use error::{EXIT_OK, EXIT_USAGE, Result, SiteError};
use host::SystemRunner;
use orchestrator::{Collaborators, Orchestrator, ProvisionRequest, Report};
use repo::HostProbe;

/// Log filter used when `SITEKIT_LOG` is unset
fn default_filter(verbose: bool) -> &'static str {
    if verbose { "sitekit=debug" } else { "sitekit=info" }
}

fn init_logging(verbose: bool) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("SITEKIT_LOG")
                .unwrap_or_else(|_| EnvFilter::new(default_filter(verbose))),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn build_request(cli: Cli) -> Result<ProvisionRequest> {
    for (label, value) in [("PACKAGE", &cli.package), ("SERVICE", &cli.service)] {
        if value.trim().is_empty() {
            return Err(SiteError::InvalidArguments {
                message: format!("{label} must not be empty"),
            });
        }
    }

    let server_name = cli
        .server_name
        .filter(|name| !name.trim().is_empty())
        .unwrap_or_else(host::address::default_server_name);
    debug!("Using server_name '{server_name}'");

    Ok(ProvisionRequest {
        target: HostTarget::new(cli.package, cli.service),
        site: SiteSpec::new(cli.site, server_name, cli.source_subdir)?,
        repository_url: cli.repository_url,
    })
}

fn run(cli: Cli) -> Result<Report> {
    let dry_run = cli.dry_run;
    let config = cli.config.clone();
    let root = cli.root.clone();
    let request = build_request(cli)?;
    let settings = Settings::load(config.as_deref(), root)?;

    let runner = SystemRunner;
    let probe = HostProbe::new(settings.http_timeout)?;
    let orchestrator = Orchestrator::new(
        &settings,
        Collaborators {
            runner: &runner,
            probe: &probe,
            fetcher: &GitFetcher,
        },
    );

    if dry_run {
        orchestrator.plan(&request)
    } else {
        orchestrator.run(&request)
    }
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // --help and --version are reported through the error path too
            let code = if e.use_stderr() { EXIT_USAGE } else { EXIT_OK };
            let _ = e.print();
            std::process::exit(code);
        }
    };

    init_logging(cli.verbose);

    match run(cli) {
        Ok(report) => ui::print_report(&report),
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(e.exit_code());
        }
    }
}
