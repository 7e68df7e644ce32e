//! Error types and exit-code mapping for sitekit
//!
//! Uses `thiserror` for error definitions and `miette` for diagnostics. Every
//! failure is terminal for the run; [`SiteError::exit_code`] maps each variant
//! onto the process exit status reported to the operator.

use miette::Diagnostic;
use thiserror::Error;

/// Exit status for a successful run.
pub const EXIT_OK: i32 = 0;
/// Exit status for any command failure not covered by a more specific code.
pub const EXIT_COMMAND_FAILURE: i32 = 1;
/// Exit status when the site directory already exists.
pub const EXIT_SITE_EXISTS: i32 = 2;
/// Exit status for a malformed invocation.
pub const EXIT_USAGE: i32 = 3;
/// Exit status when the repository is unreachable or its name undecipherable.
pub const EXIT_REPOSITORY: i32 = 4;

/// Main error type for sitekit operations
#[derive(Error, Diagnostic, Debug)]
pub enum SiteError {
    // Argument errors
    #[error("Invalid arguments: {message}")]
    #[diagnostic(code(sitekit::args::invalid), help("Run 'sitekit --help' for usage"))]
    InvalidArguments { message: String },

    #[error("Invalid site name '{name}': {reason}")]
    #[diagnostic(
        code(sitekit::args::site_name),
        help("Site names must be a single path segment such as 'blog' or 'shop-v2'")
    )]
    InvalidSiteName { name: String, reason: String },

    // Platform errors
    #[error("Unsupported platform: {reason}")]
    #[diagnostic(
        code(sitekit::platform::unsupported),
        help("Supported families: Debian-like (apt) and RedHat-like (dnf)")
    )]
    UnsupportedPlatform { reason: String },

    // Repository errors
    #[error("Repository unreachable: {url} ({reason})")]
    #[diagnostic(
        code(sitekit::repo::unreachable),
        help("Check that the URL is correct and the host answers with 200 OK")
    )]
    UnreachableRepository { url: String, reason: String },

    #[error("Cannot derive a local name from repository '{url}' (segment '{segment}')")]
    #[diagnostic(
        code(sitekit::repo::unparsable),
        help("The last path segment must have 2 to 4 dot-separated parts, e.g. 'app.git'")
    )]
    UnparsableRepositoryName { url: String, segment: String },

    #[error("Failed to fetch repository: {url}: {reason}")]
    #[diagnostic(code(sitekit::repo::fetch_failed))]
    FetchFailed { url: String, reason: String },

    #[error("Git operation failed: {message}")]
    #[diagnostic(code(sitekit::git::operation_failed))]
    GitOperationFailed { message: String },

    // Package errors
    #[error("Failed to refresh package index with {manager} ({status})")]
    #[diagnostic(code(sitekit::package::refresh_failed))]
    PackageIndexRefreshFailed { manager: String, status: String },

    #[error("Failed to query installed packages: {reason}")]
    #[diagnostic(code(sitekit::package::query_failed))]
    PackageQueryFailed { reason: String },

    #[error("Failed to install package '{package}' ({status})")]
    #[diagnostic(
        code(sitekit::package::install_failed),
        help("Check the package name and that the package index is reachable")
    )]
    InstallationFailed { package: String, status: String },

    // Service errors
    #[error("Failed to query service '{service}': {reason}")]
    #[diagnostic(code(sitekit::service::query_failed))]
    ServiceQueryFailed { service: String, reason: String },

    #[error("Service '{service}' is in a failed state")]
    #[diagnostic(
        code(sitekit::service::failed_state),
        help("Inspect the unit with 'systemctl status' and 'journalctl -u', then re-run")
    )]
    ServiceInFailedState { service: String },

    #[error("Failed to start service '{service}': {reason}")]
    #[diagnostic(code(sitekit::service::start_failed))]
    ServiceStartFailed { service: String, reason: String },

    #[error("Failed to enable service '{service}': {reason}")]
    #[diagnostic(code(sitekit::service::enable_failed))]
    ServiceEnableFailed { service: String, reason: String },

    #[error("Failed to restart service '{service}': {reason}")]
    #[diagnostic(
        code(sitekit::service::restart_failed),
        help("The deployment did not take effect; check the web server configuration")
    )]
    ServiceRestartFailed { service: String, reason: String },

    // Site errors
    #[error("Failed to read web server configuration: {path}: {reason}")]
    #[diagnostic(code(sitekit::site::config_unreadable))]
    WebServerConfigUnreadable { path: String, reason: String },

    #[error("User '{user}' does not exist on this host")]
    #[diagnostic(code(sitekit::site::user_not_found))]
    UserNotFound { user: String },

    #[error("Site '{site}' already exists at {path}")]
    #[diagnostic(
        code(sitekit::site::already_exists),
        help("Choose another site name or remove the existing directory")
    )]
    SiteAlreadyExists { site: String, path: String },

    #[error("Failed to provision site directory {path}: {reason}")]
    #[diagnostic(code(sitekit::site::provision_failed))]
    DirectoryProvisionFailed { path: String, reason: String },

    // Virtual host errors
    #[error("Virtual host is already activated: {link}")]
    #[diagnostic(
        code(sitekit::vhost::already_activated),
        help("Remove the stale link if the previous configuration is no longer wanted")
    )]
    VHostAlreadyActivated { link: String },

    #[error("Failed to write virtual host configuration {path}: {reason}")]
    #[diagnostic(code(sitekit::vhost::write_failed))]
    VHostWriteFailed { path: String, reason: String },

    // Deployment errors
    #[error("Failed to copy deployment into {target}: {reason}")]
    #[diagnostic(code(sitekit::deploy::copy_failed))]
    DeploymentCopyFailed { target: String, reason: String },

    // Host command errors
    #[error("Failed to run '{command}': {reason}")]
    #[diagnostic(code(sitekit::host::spawn_failed))]
    CommandSpawnFailed { command: String, reason: String },

    // Configuration errors
    #[error("Configuration file not found: {path}")]
    #[diagnostic(code(sitekit::config::not_found))]
    ConfigNotFound { path: String },

    #[error("Failed to read configuration file: {path}")]
    #[diagnostic(code(sitekit::config::read_failed))]
    ConfigReadFailed { path: String, reason: String },

    #[error("Failed to parse configuration file: {path}: {reason}")]
    #[diagnostic(code(sitekit::config::parse_failed))]
    ConfigParseFailed { path: String, reason: String },

    #[error("IO error: {message}")]
    #[diagnostic(code(sitekit::fs::io_error))]
    IoError { message: String },
}

impl SiteError {
    /// Process exit status for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::InvalidArguments { .. } | Self::InvalidSiteName { .. } => EXIT_USAGE,
            Self::UnreachableRepository { .. } | Self::UnparsableRepositoryName { .. } => {
                EXIT_REPOSITORY
            }
            Self::SiteAlreadyExists { .. } => EXIT_SITE_EXISTS,
            _ => EXIT_COMMAND_FAILURE,
        }
    }
}

impl From<std::io::Error> for SiteError {
    fn from(err: std::io::Error) -> Self {
        SiteError::IoError {
            message: err.to_string(),
        }
    }
}

impl From<git2::Error> for SiteError {
    fn from(err: git2::Error) -> Self {
        SiteError::GitOperationFailed {
            message: err.to_string(),
        }
    }
}

/// Result type alias using miette for error handling
pub type Result<T> = miette::Result<T, SiteError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SiteError::SiteAlreadyExists {
            site: "blog".to_string(),
            path: "/var/www/blog".to_string(),
        };
        assert_eq!(err.to_string(), "Site 'blog' already exists at /var/www/blog");
    }

    #[test]
    fn test_error_code() {
        let err = SiteError::ServiceInFailedState {
            service: "nginx".to_string(),
        };
        assert_eq!(
            err.code().map(|c| c.to_string()),
            Some("sitekit::service::failed_state".to_string())
        );
    }

    #[test]
    fn test_exit_code_taxonomy() {
        let usage = SiteError::InvalidArguments {
            message: "expected 4 arguments".to_string(),
        };
        let exists = SiteError::SiteAlreadyExists {
            site: "blog".to_string(),
            path: "/var/www/blog".to_string(),
        };
        let unreachable = SiteError::UnreachableRepository {
            url: "https://example.com/x.git".to_string(),
            reason: "HTTP 404".to_string(),
        };
        let unparsable = SiteError::UnparsableRepositoryName {
            url: "https://example.com/x".to_string(),
            segment: "x".to_string(),
        };
        let install = SiteError::InstallationFailed {
            package: "nginx".to_string(),
            status: "exit status 100".to_string(),
        };

        assert_eq!(usage.exit_code(), EXIT_USAGE);
        assert_eq!(exists.exit_code(), EXIT_SITE_EXISTS);
        assert_eq!(unreachable.exit_code(), EXIT_REPOSITORY);
        assert_eq!(unparsable.exit_code(), EXIT_REPOSITORY);
        assert_eq!(install.exit_code(), EXIT_COMMAND_FAILURE);
    }

    #[test]
    fn test_platform_and_restart_are_generic_failures() {
        let platform = SiteError::UnsupportedPlatform {
            reason: "unknown ID 'plan9'".to_string(),
        };
        let restart = SiteError::ServiceRestartFailed {
            service: "nginx".to_string(),
            reason: "exit status 1".to_string(),
        };
        assert_eq!(platform.exit_code(), EXIT_COMMAND_FAILURE);
        assert_eq!(restart.exit_code(), EXIT_COMMAND_FAILURE);
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: SiteError = io_err.into();
        assert!(matches!(err, SiteError::IoError { .. }));
    }

    #[test]
    fn test_git_error_conversion() {
        let git_err = git2::Error::from_str("git error");
        let err: SiteError = git_err.into();
        assert!(matches!(err, SiteError::GitOperationFailed { .. }));
    }
}
