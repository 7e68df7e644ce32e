//! Terminal presentation
//!
//! Spinners for long-running network work and the end-of-run summary.
//! Everything here writes to the terminal only; logging goes through
//! `tracing`.

use std::time::Duration;

use console::{Style, Term};
use indicatif::{ProgressBar, ProgressStyle};

use crate::orchestrator::{Report, StageStatus};

const SPINNER_TEMPLATE: &str = "{spinner:.cyan} {msg}";
const TICK: Duration = Duration::from_millis(100);

/// Spinner on stderr, hidden when stderr is not a terminal.
pub fn spinner(message: impl Into<String>) -> ProgressBar {
    if !Term::stderr().is_term() {
        return ProgressBar::hidden();
    }
    let style = ProgressStyle::default_spinner()
        .template(SPINNER_TEMPLATE)
        .unwrap_or_else(|_| ProgressStyle::default_spinner());
    let pb = ProgressBar::new_spinner();
    pb.set_style(style);
    pb.set_message(message.into());
    pb.enable_steady_tick(TICK);
    pb
}

fn status_style(status: StageStatus) -> Style {
    match status {
        StageStatus::Changed => Style::new().green(),
        StageStatus::Unchanged => Style::new().dim(),
        StageStatus::Planned => Style::new().cyan(),
        StageStatus::Warning => Style::new().yellow(),
    }
}

/// One summary line, without styling.
pub fn format_stage_line(stage: &str, status: StageStatus, detail: &str) -> String {
    format!("{:<10} {:<9} {detail}", stage, status.label())
}

/// Print the summary of a run to stdout.
pub fn print_report(report: &Report) {
    let heading = if report.dry_run {
        "Planned actions"
    } else {
        "Provisioning summary"
    };
    println!("{}", Style::new().bold().apply_to(heading));
    for record in &report.stages {
        let line = format_stage_line(record.stage.name(), record.status, &record.detail);
        println!("  {}", status_style(record.status).apply_to(line));
    }
    let label = Style::new().bold();
    if let Some(vhost) = &report.vhost {
        println!(
            "{} {}",
            label.apply_to("Virtual host:"),
            vhost.config_path.display()
        );
    }
    if let Some(repository) = &report.repository {
        println!(
            "{} {} ({})",
            label.apply_to("Content:"),
            repository.url,
            repository.canonical_id
        );
    }
    if let Some(site_dir) = &report.site_dir {
        println!(
            "{} {}",
            Style::new().bold().green().apply_to("Site ready:"),
            site_dir.path.display()
        );
    }
}
