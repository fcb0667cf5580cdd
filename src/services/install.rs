use anyhow::Result;
use async_trait::async_trait;
use indicatif::ProgressBar;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::config::{AppConfig, DefaultAppConfig};
use crate::models::{InstallEvent, InstallEventSender, InstallItem, InstallPhase};
use crate::services::{DefaultPackageService, PackageService};
use crate::ui::{Operation, OperationManager};
use crate::utils::Utils;

/// Installs a batch of plugin packages, reporting every phase of every item
/// through `events`. An item failure is reported as an `InstallDone` event
/// carrying the error; only a failure of the whole batch is returned.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait InstallService: Send + Sync {
    async fn install(&self, batch: Vec<InstallItem>, events: InstallEventSender) -> Result<()>;
}

pub struct PackageInstallService {
    package_service: Arc<dyn PackageService>,
    app_config: DefaultAppConfig,
    show_progress: bool,
}

impl Default for PackageInstallService {
    fn default() -> Self {
        PackageInstallService::new(
            Arc::new(DefaultPackageService::default()),
            DefaultAppConfig::default(),
        )
    }
}

impl PackageInstallService {
    pub fn new(package_service: Arc<dyn PackageService>, app_config: DefaultAppConfig) -> Self {
        Self {
            package_service,
            app_config,
            show_progress: true,
        }
    }

    pub fn without_progress(mut self) -> Self {
        self.show_progress = false;
        self
    }

    fn report(events: &InstallEventSender, progress_bar: Option<&ProgressBar>, event: InstallEvent) {
        debug!("Plugin {}: {}", event.id, event.phase);
        if let Some(pb) = progress_bar {
            pb.set_position(event.phase.position() + 1);
        }
        if events.send(event).is_err() {
            warn!("Install progress receiver dropped");
        }
    }

    async fn install_item(
        &self,
        item: &InstallItem,
        events: &InstallEventSender,
        progress_bar: Option<&ProgressBar>,
    ) -> Result<PathBuf> {
        let package = self.package_service.fetch(&item.package_location).await?;
        Self::report(
            events,
            progress_bar,
            InstallEvent::new(&item.id, InstallPhase::DownloadDone),
        );

        self.package_service
            .verify(&package, item.package_hash.as_deref().unwrap_or_default())?;

        Self::report(
            events,
            progress_bar,
            InstallEvent::new(&item.id, InstallPhase::InstallStart),
        );
        let destination =
            Utils::plugin_install_folder(&self.app_config.get_plugins_folder_path(), &item.id);
        self.package_service.unpack(package, &destination).await
    }
}

#[async_trait]
impl InstallService for PackageInstallService {
    async fn install(&self, batch: Vec<InstallItem>, events: InstallEventSender) -> Result<()> {
        let operation_manager = if self.show_progress {
            Some(OperationManager::new(Operation::Install)?)
        } else {
            None
        };

        for (index, item) in batch.iter().enumerate() {
            let progress_bar = match &operation_manager {
                Some(manager) => Some(manager.add_progress_bar(index, batch.len(), &item.id)?),
                None => None,
            };

            Self::report(
                &events,
                progress_bar.as_ref(),
                InstallEvent::new(&item.id, InstallPhase::DownloadStart),
            );

            let error = match self.install_item(item, &events, progress_bar.as_ref()).await {
                Ok(path) => {
                    info!("Installed plugin {} to {}", item.id, path.display());
                    None
                }
                Err(e) => {
                    warn!("Failed to install plugin {}: {:#}", item.id, e);
                    Some(format!("{:#}", e))
                }
            };

            Self::report(
                &events,
                progress_bar.as_ref(),
                InstallEvent::done(&item.id, error),
            );
            if let Some(pb) = progress_bar {
                pb.finish_and_clear();
            }
        }

        if let Some(manager) = operation_manager {
            manager.finish();
        }
        Ok(())
    }
}
