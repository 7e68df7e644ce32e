//! CLI definitions using clap derive API

use clap::builder::{Styles, styling::AnsiColor};
use clap::Parser;
use std::path::PathBuf;

/// sitekit - provision an nginx site from a git repository
#[derive(Parser, Debug)]
#[command(
    name = "sitekit",
    author,
    version,
    styles = Styles::styled()
        .header(AnsiColor::Green.on_default().bold())
        .usage(AnsiColor::Green.on_default().bold())
        .literal(AnsiColor::Cyan.on_default().bold())
        .placeholder(AnsiColor::Cyan.on_default()),
    about = "Provision a web site on this host from a git repository",
    long_about = "sitekit installs and starts the web server package, creates the site's \
                  document directory, activates a virtual host for it and deploys the \
                  repository content. Runs are fail-fast; completed steps are not rolled back.",
    after_help = "\x1b[1m\x1b[32mExamples:\x1b[0m\n    \
                  sitekit nginx nginx blog https://github.com/org/blog.git\n    \
                  sitekit nginx nginx shop git@github.com:org/shop.git public shop.example.com\n    \
                  sitekit --dry-run nginx nginx blog https://github.com/org/blog.git\n\n\
                  \x1b[1m\x1b[32mExit codes:\x1b[0m\n    \
                  0 success, 1 failure, 2 site exists, 3 usage, 4 repository unreachable"
)]
pub struct Cli {
    /// Package providing the web server
    pub package: String,

    /// Service unit of the web server
    pub service: String,

    /// Site name, used as directory and virtual host name
    pub site: String,

    /// Repository holding the site content
    pub repository_url: String,

    /// Subdirectory of the repository to deploy (empty for the root)
    pub source_subdir: Option<String>,

    /// server_name for the virtual host (defaults to this host's address)
    pub server_name: Option<String>,

    /// Report planned actions without changing the host
    #[arg(long)]
    pub dry_run: bool,

    /// Configuration file
    #[arg(long, short = 'c', env = "SITEKIT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Filesystem root the web server layout is resolved under
    #[arg(long, env = "SITEKIT_ROOT")]
    pub root: Option<PathBuf>,

    /// Enable verbose output
    #[arg(long, short = 'v')]
    pub verbose: bool,
}
