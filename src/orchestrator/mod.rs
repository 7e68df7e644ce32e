//! Provisioning pipeline
//!
//! Stages run strictly in order and the first failure aborts the run.
//! Nothing is rolled back: stages that already ran stay applied.
//!
//! ```text
//! platform -> index -> package -> service -> boot -> directory -> vhost -> deploy
//! ```
//!
//! [`Orchestrator::plan`] walks the same stages read-only for `--dry-run`.

pub mod context;

use std::path::Path;

use tracing::{debug, info, warn};

use crate::config::Settings;
use crate::deploy::{Deployer, RepositoryFetcher};
use crate::domain::{BootState, HostTarget, ProvisionState, ServiceState, SiteSpec};
use crate::error::{Result, SiteError};
use crate::host::CommandRunner;
use crate::package::{self, PackageInstaller, PackageOutcome};
use crate::platform;
use crate::repo::{ReachabilityProbe, RepositoryResolver};
use crate::service::{EnableOutcome, RunOutcome, ServiceController, Systemd};
use crate::site::{SITE_DIR_MODE, SiteDirectoryProvisioner};
use crate::vhost::VHostConfigurator;

pub use context::{ProvisionContext, Report, Stage, StageStatus};

/// One provisioning request as given on the command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionRequest {
    pub target: HostTarget,
    pub site: SiteSpec,
    pub repository_url: String,
}

/// Host access used by the pipeline
#[derive(Clone, Copy)]
pub struct Collaborators<'a> {
    pub runner: &'a dyn CommandRunner,
    pub probe: &'a dyn ReachabilityProbe,
    pub fetcher: &'a dyn RepositoryFetcher,
}

pub struct Orchestrator<'a> {
    settings: &'a Settings,
    host: Collaborators<'a>,
}

impl<'a> Orchestrator<'a> {
    pub fn new(settings: &'a Settings, host: Collaborators<'a>) -> Self {
        Self { settings, host }
    }

    fn detect(&self) -> Result<ProvisionContext> {
        info!("Detecting platform under {}", self.settings.root.display());
        let platform = platform::detect(&self.settings.root)?;
        let layout = self.settings.layout_for(platform.family);
        let detail = format!("{} ({})", platform.distribution, platform.package_manager);
        info!("Platform: {detail}");

        let mut ctx = ProvisionContext::new(platform, layout);
        ctx.record(Stage::Platform, StageStatus::Unchanged, detail);
        Ok(ctx)
    }

    /// Converge the host and deploy the site.
    pub fn run(&self, request: &ProvisionRequest) -> Result<Report> {
        let mut ctx = self.detect()?;
        let target = &request.target;
        let site = &request.site;

        let manager = package::manager_for(ctx.platform.package_manager, self.host.runner);
        let installer = PackageInstaller::new(manager.as_ref());

        installer.refresh_index()?;
        ctx.record(
            Stage::PackageIndex,
            StageStatus::Changed,
            format!("{} index refreshed", manager.name()),
        );

        let (status, detail) = match installer.ensure_installed(&target.package)? {
            PackageOutcome::AlreadyInstalled => (StageStatus::Unchanged, "already installed"),
            PackageOutcome::Installed => (StageStatus::Changed, "installed"),
        };
        ctx.record(Stage::Package, status, format!("{} {detail}", target.package));

        let systemd = Systemd::new(self.host.runner);
        let services = ServiceController::new(&systemd);

        let status = match services.ensure_running(&target.service)? {
            RunOutcome::AlreadyRunning => StageStatus::Unchanged,
            RunOutcome::Started => StageStatus::Changed,
            RunOutcome::Absent => StageStatus::Warning,
        };
        let detail = format!("{} {}", target.service, services.state(&target.service)?);
        ctx.record(Stage::Service, status, detail);

        let outcome = services.ensure_enabled(&target.service)?;
        let status = match outcome {
            EnableOutcome::AlreadyEnabled => StageStatus::Unchanged,
            EnableOutcome::Enabled => StageStatus::Changed,
            EnableOutcome::Unknown => StageStatus::Warning,
        };
        ctx.record(Stage::Boot, status, format!("{} {outcome}", target.service));

        info!("Provisioning site directory for '{}'", site.name());
        let site_dir = SiteDirectoryProvisioner::new(&ctx.layout).provision(site.name())?;
        ctx.record(
            Stage::Directory,
            StageStatus::Changed,
            format!(
                "{} ({}:{}, {:o})",
                site_dir.path.display(),
                site_dir.owner_user,
                site_dir.owner_group,
                site_dir.mode
            ),
        );

        let vhost =
            VHostConfigurator::new(&ctx.layout).activate(site.name(), site.server_name(), &site_dir)?;
        ctx.record(
            Stage::VHost,
            StageStatus::Changed,
            format!(
                "{} for server_name {}",
                vhost.config_path.display(),
                site.server_name()
            ),
        );
        ctx.vhost = Some(vhost);

        let repository = RepositoryResolver::new(self.host.probe).resolve(&request.repository_url)?;
        let deployed = Deployer::new(self.host.fetcher).deploy(
            &repository,
            &site_dir.path,
            site.source_subdir(),
            &target.service,
            &services,
        )?;
        ctx.record(
            Stage::Deploy,
            StageStatus::Changed,
            format!(
                "{} files from {} ({}), {} restarted",
                deployed.files_copied,
                repository.url,
                source_label(&deployed.source),
                target.service
            ),
        );
        ctx.repository = Some(repository);

        info!("Site '{}' is live at {}", site.name(), site_dir.path.display());
        ctx.site_dir = Some(site_dir);
        Ok(ctx.into_report(false))
    }

    /// Inspect the host and report what [`run`](Self::run) would do.
    ///
    /// Conflicts a real run would hit fail here with the same error.
    pub fn plan(&self, request: &ProvisionRequest) -> Result<Report> {
        let mut ctx = self.detect()?;
        let target = &request.target;
        let site = &request.site;

        let manager = package::manager_for(ctx.platform.package_manager, self.host.runner);
        let installer = PackageInstaller::new(manager.as_ref());
        ctx.record(
            Stage::PackageIndex,
            StageStatus::Planned,
            format!("refresh {} index", manager.name()),
        );

        let systemd = Systemd::new(self.host.runner);
        let services = ServiceController::new(&systemd);
        let observed = ProvisionState {
            installed: installer.is_installed(&target.package)?,
            service: services.state(&target.service)?,
            boot: services.boot_state(&target.service)?,
        };
        debug!("Observed host state: {observed:?}");

        if observed.installed {
            ctx.record(
                Stage::Package,
                StageStatus::Unchanged,
                format!("{} already installed", target.package),
            );
        } else {
            ctx.record(
                Stage::Package,
                StageStatus::Planned,
                format!("install {}", target.package),
            );
        }

        let (status, detail) = match observed.service {
            ServiceState::Running => (StageStatus::Unchanged, "running"),
            ServiceState::Dead => (StageStatus::Planned, "start"),
            ServiceState::Absent => {
                warn!("Service '{}' is not known to systemd", target.service);
                (StageStatus::Warning, "absent")
            }
            ServiceState::Failed => {
                return Err(SiteError::ServiceInFailedState {
                    service: target.service.clone(),
                });
            }
        };
        ctx.record(Stage::Service, status, format!("{} {detail}", target.service));

        let (status, detail) = match observed.boot {
            BootState::Enabled => (StageStatus::Unchanged, "enabled"),
            BootState::Disabled => (StageStatus::Planned, "enable"),
            BootState::Unknown => (StageStatus::Warning, "boot state unknown"),
        };
        ctx.record(Stage::Boot, status, format!("{} {detail}", target.service));

        let provisioner = SiteDirectoryProvisioner::new(&ctx.layout);
        let owner = provisioner.resolve_owner()?;
        let site_path = provisioner.ensure_absent(site.name())?;
        ctx.record(
            Stage::Directory,
            StageStatus::Planned,
            format!(
                "create {} owned by {}:{}, mode {SITE_DIR_MODE:o}",
                site_path.display(),
                owner.user,
                owner.group
            ),
        );

        let configurator = VHostConfigurator::new(&ctx.layout);
        configurator.ensure_not_activated(site.name())?;
        let vhost = configurator.plan(site.name(), site.server_name(), &site_path);
        ctx.record(
            Stage::VHost,
            StageStatus::Planned,
            format!(
                "write {} and link {}",
                vhost.config_path.display(),
                vhost.enabled_link.display()
            ),
        );
        ctx.vhost = Some(vhost);

        let repository = RepositoryResolver::new(self.host.probe).resolve(&request.repository_url)?;
        ctx.record(
            Stage::Deploy,
            StageStatus::Planned,
            format!(
                "deploy {} as '{}', restart {}",
                repository.url, repository.canonical_id, target.service
            ),
        );
        ctx.repository = Some(repository);

        Ok(ctx.into_report(true))
    }
}

fn source_label(source: &Path) -> String {
    if source.as_os_str().is_empty() {
        "repository root".to_string()
    } else {
        source.display().to_string()
    }
}
