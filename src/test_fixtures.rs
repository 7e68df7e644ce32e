//! Test fixtures shared by the unit tests.
//!
//! - temp directories and git repositories on disk
//! - [`seed_host_root`], a fake filesystem root with os-release and nginx files
//! - [`FakeHost`], a stateful stand-in for the package and service managers
//! - fixed reachability probes and fetchers for the deploy stage
//!
//! ```ignore
//! let host = FakeHost::new().with_service("nginx", ServiceState::Dead, BootState::Disabled);
//! let systemd = Systemd::new(&host);
//! ```

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::os::unix::fs::symlink;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::common::fs::{CopyOptions, merge_dir};
use crate::config::SiteLayout;
use crate::deploy::RepositoryFetcher;
use crate::domain::{BootState, ServiceState};
use crate::error::{Result, SiteError};
use crate::host::{CommandOutput, CommandRunner, HostCommand};
use crate::platform::OsFamily;
use crate::repo::{Reachability, ReachabilityProbe};

/// Create a temp directory in the system temp location.
///
/// # Panics
///
/// Panics if the temp directory cannot be created.
#[must_use]
pub fn create_temp_dir() -> TempDir {
    TempDir::new_in(crate::temp::temp_dir_base()).expect("Failed to create temp directory")
}

/// Create a git repository named `blog-site.git` holding `files` in one commit.
///
/// Returns the `TempDir` (which cleans up on drop) and the repository path.
///
/// # Panics
///
/// Panics if any step fails.
#[must_use]
pub fn create_git_repo_with_files(files: &[(&str, &str)]) -> (TempDir, PathBuf) {
    let temp = create_temp_dir();
    let path = temp.path().join("blog-site.git");
    let repo = git2::Repository::init(&path).expect("Failed to init git repository");

    for (relative, content) in files {
        let full_path = path.join(relative);
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        fs::write(&full_path, content).expect("Failed to write test file");
    }

    let mut index = repo.index().expect("Failed to open index");
    index
        .add_all(["*"].iter(), git2::IndexAddOption::DEFAULT, None)
        .expect("Failed to stage files");
    index.write().expect("Failed to write index");
    let tree_id = index.write_tree().expect("Failed to write tree");
    let tree = repo.find_tree(tree_id).expect("Failed to find tree");
    let signature =
        git2::Signature::now("Test", "test@example.com").expect("Failed to create signature");
    repo.commit(
        Some("HEAD"),
        &signature,
        &signature,
        "Initial commit",
        &tree,
        &[],
    )
    .expect("Failed to commit");

    (temp, path)
}

/// Name of the user running the tests.
///
/// # Panics
///
/// Panics if the current uid has no passwd entry.
#[must_use]
pub fn current_user() -> String {
    nix::unistd::User::from_uid(nix::unistd::Uid::current())
        .expect("Failed to read passwd")
        .expect("Current uid has no passwd entry")
        .name
}

/// Lay out a minimal host filesystem for `family` beneath `root`.
///
/// Writes os-release, an nginx.conf naming `user`, and the distribution's
/// default site (plus its enabled link where the family has one).
///
/// # Panics
///
/// Panics if any file cannot be written.
pub fn seed_host_root(root: &Path, family: OsFamily, user: &str) -> SiteLayout {
    let layout = SiteLayout::builtin(family).under_root(root);
    let os_release = match family {
        OsFamily::Debian => "ID=debian\nPRETTY_NAME=\"Debian GNU/Linux 12 (bookworm)\"\n",
        OsFamily::RedHat => {
            "ID=\"rocky\"\nID_LIKE=\"rhel centos fedora\"\nPRETTY_NAME=\"Rocky Linux 9.3\"\n"
        }
    };

    write_file(&root.join("etc/os-release"), os_release);
    write_file(
        &layout.web_server_config,
        &format!("# nginx.conf\nuser {user};\nworker_processes auto;\n"),
    );
    write_file(&layout.default_config, "server { listen 80 default_server; }\n");
    fs::create_dir_all(&layout.enabled_dir).expect("Failed to create enabled dir");
    fs::create_dir_all(&layout.document_root).expect("Failed to create document root");
    if let Some(link) = &layout.default_enabled_link {
        symlink(&layout.default_config, link).expect("Failed to link default site");
    }

    layout
}

fn write_file(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("Failed to create parent directory");
    }
    fs::write(path, content).expect("Failed to write file");
}

#[derive(Debug, Default)]
struct HostState {
    packages: BTreeSet<String>,
    services: BTreeMap<String, (ServiceState, BootState)>,
    commands: Vec<String>,
}

/// In-memory host answering the package and service manager commands.
///
/// Understands apt-get, dpkg-query, dnf, rpm and systemctl, and updates its
/// state on successful installs and transitions.
#[derive(Debug, Default)]
pub struct FakeHost {
    state: RefCell<HostState>,
    fail_refresh: bool,
    fail_installs: bool,
    fail_starts: bool,
    fail_enables: bool,
    fail_restarts: bool,
}

impl FakeHost {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_package(self, name: &str) -> Self {
        self.state.borrow_mut().packages.insert(name.to_string());
        self
    }

    #[must_use]
    pub fn with_service(self, name: &str, state: ServiceState, boot: BootState) -> Self {
        self.state
            .borrow_mut()
            .services
            .insert(name.to_string(), (state, boot));
        self
    }

    #[must_use]
    pub fn failing_refresh(mut self) -> Self {
        self.fail_refresh = true;
        self
    }

    #[must_use]
    pub fn failing_installs(mut self) -> Self {
        self.fail_installs = true;
        self
    }

    #[must_use]
    pub fn failing_starts(mut self) -> Self {
        self.fail_starts = true;
        self
    }

    #[must_use]
    pub fn failing_enables(mut self) -> Self {
        self.fail_enables = true;
        self
    }

    #[must_use]
    pub fn failing_restarts(mut self) -> Self {
        self.fail_restarts = true;
        self
    }

    pub fn is_installed(&self, name: &str) -> bool {
        self.state.borrow().packages.contains(name)
    }

    pub fn service(&self, name: &str) -> Option<(ServiceState, BootState)> {
        self.state.borrow().services.get(name).copied()
    }

    /// Number of commands run whose command line starts with `prefix`.
    pub fn count_commands(&self, prefix: &str) -> usize {
        self.state
            .borrow()
            .commands
            .iter()
            .filter(|c| c.starts_with(prefix))
            .count()
    }

    fn package_manager(&self, args: &[String]) -> CommandOutput {
        match args.first().map(String::as_str) {
            Some("update" | "makecache") if self.fail_refresh => {
                failure(100, "E: Some index files failed to download")
            }
            Some("update" | "makecache") => success(""),
            Some("install") if self.fail_installs => failure(1, "E: Unable to locate package"),
            Some("install") => {
                if let Some(package) = args.last() {
                    self.state.borrow_mut().packages.insert(package.clone());
                }
                success("")
            }
            _ => failure(64, "unsupported invocation"),
        }
    }

    fn listing(&self, line: impl Fn(&str) -> String) -> CommandOutput {
        let stdout: String = self
            .state
            .borrow()
            .packages
            .iter()
            .map(|p| line(p))
            .collect();
        success(&stdout)
    }

    fn systemctl(&self, args: &[String]) -> CommandOutput {
        let (Some(verb), Some(service)) = (args.first(), args.last()) else {
            return failure(64, "missing arguments");
        };
        let known = self.service(service);

        match (verb.as_str(), known) {
            ("show", None) => success("LoadState=not-found\nActiveState=inactive\n"),
            ("show", Some((state, _))) => {
                let active = match state {
                    ServiceState::Running => "active",
                    ServiceState::Failed => "failed",
                    ServiceState::Dead | ServiceState::Absent => "inactive",
                };
                success(&format!("LoadState=loaded\nActiveState={active}\n"))
            }
            ("is-enabled", Some((_, BootState::Enabled))) => success("enabled\n"),
            ("is-enabled", Some((_, BootState::Disabled))) => CommandOutput {
                code: Some(1),
                stdout: "disabled\n".to_string(),
                stderr: String::new(),
            },
            ("is-enabled", _) => failure(1, "Failed to get unit file state"),
            (_, None) => failure(5, &format!("Unit {service}.service not found.")),
            ("start", Some(_)) if self.fail_starts => failure(1, "Job for nginx.service failed."),
            ("enable", Some(_)) if self.fail_enables => failure(1, "Failed to enable unit."),
            ("restart", Some(_)) if self.fail_restarts => {
                failure(1, "Job for nginx.service failed.")
            }
            ("start" | "restart", Some((_, boot))) => {
                self.set_service(service, ServiceState::Running, boot);
                success("")
            }
            ("enable", Some((state, _))) => {
                self.set_service(service, state, BootState::Enabled);
                success("")
            }
            _ => failure(64, "unsupported invocation"),
        }
    }

    fn set_service(&self, name: &str, state: ServiceState, boot: BootState) {
        self.state
            .borrow_mut()
            .services
            .insert(name.to_string(), (state, boot));
    }
}

impl CommandRunner for FakeHost {
    fn run(&self, command: &HostCommand) -> Result<CommandOutput> {
        self.state.borrow_mut().commands.push(command.to_string());
        let args = command.arguments();

        Ok(match command.program() {
            "apt-get" | "dnf" => self.package_manager(args),
            "dpkg-query" => self.listing(|p| format!("{p}\tinstalled\n")),
            "rpm" => self.listing(|p| format!("{p}\n")),
            "systemctl" => self.systemctl(args),
            other => failure(127, &format!("{other}: command not found")),
        })
    }
}

fn success(stdout: &str) -> CommandOutput {
    CommandOutput {
        code: Some(0),
        stdout: stdout.to_string(),
        stderr: String::new(),
    }
}

fn failure(code: i32, stderr: &str) -> CommandOutput {
    CommandOutput {
        code: Some(code),
        stdout: String::new(),
        stderr: format!("{stderr}\n"),
    }
}

/// Probe with a fixed answer that counts its calls
pub struct FixedProbe {
    answer: Reachability,
    calls: Cell<usize>,
}

impl FixedProbe {
    pub fn reachable() -> Self {
        Self {
            answer: Reachability::Reachable,
            calls: Cell::new(0),
        }
    }

    pub fn unreachable(reason: &str) -> Self {
        Self {
            answer: Reachability::Unreachable(reason.to_string()),
            calls: Cell::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.get()
    }
}

impl ReachabilityProbe for FixedProbe {
    fn probe(&self, _url: &str) -> Result<Reachability> {
        self.calls.set(self.calls.get() + 1);
        Ok(self.answer.clone())
    }
}

/// Fetcher that copies a prepared directory instead of cloning
pub struct DirFetcher {
    source: PathBuf,
    targets: RefCell<Vec<PathBuf>>,
}

impl DirFetcher {
    pub fn new(source: &Path) -> Self {
        Self {
            source: source.to_path_buf(),
            targets: RefCell::new(Vec::new()),
        }
    }

    /// Checkout locations requested so far
    pub fn targets(&self) -> Vec<PathBuf> {
        self.targets.borrow().clone()
    }
}

impl RepositoryFetcher for DirFetcher {
    fn fetch(&self, _url: &str, target: &Path) -> Result<()> {
        self.targets.borrow_mut().push(target.to_path_buf());
        merge_dir(&self.source, target, &CopyOptions::default())?;
        Ok(())
    }
}

/// Fetcher that always fails like an unreachable remote
pub struct FailingFetcher;

impl RepositoryFetcher for FailingFetcher {
    fn fetch(&self, url: &str, _target: &Path) -> Result<()> {
        Err(SiteError::FetchFailed {
            url: url.to_string(),
            reason: "Repository not found".to_string(),
        })
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_create_git_repo_with_files() {
        let (_temp, path) = create_git_repo_with_files(&[("public/index.html", "hi")]);
        assert!(path.join(".git").exists());
        let repo = git2::Repository::open(&path).unwrap();
        assert!(repo.head().unwrap().peel_to_commit().is_ok());
    }

    #[test]
    fn test_seed_host_root_debian() {
        let temp = create_temp_dir();
        let layout = seed_host_root(temp.path(), OsFamily::Debian, "www-data");
        assert!(layout.web_server_config.is_file());
        let link = layout.default_enabled_link.unwrap();
        assert!(link.symlink_metadata().unwrap().file_type().is_symlink());
    }

    #[test]
    fn test_fake_host_tracks_installs() {
        let host = FakeHost::new();
        let output = host
            .run(&HostCommand::new("dnf").args(["install", "-y", "nginx"]))
            .unwrap();
        assert!(output.success());
        assert!(host.is_installed("nginx"));
        assert_eq!(host.count_commands("dnf install"), 1);
    }
}
