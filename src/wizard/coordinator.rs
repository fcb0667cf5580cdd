use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use anyhow::Result;
use futures::StreamExt;
use futures::future::BoxFuture;
use futures::stream::FuturesUnordered;
use indexmap::IndexMap;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::models::{
    InstallEvent, InstallItem, InstallPhase, InstallSummary, NotFoundRecord, PluginRecord,
    PluginRequest, PluginStatus, SummaryHeadline, SummaryRow,
};
use crate::services::{InstallService, LookupService};
use crate::ui::Navigator;
use crate::wizard::{LicenseFlow, Stage, WizardError};

/// A lookup call in flight, resolving to the request it was issued for.
pub type PendingLookup = BoxFuture<'static, (PluginRequest, Result<Option<PluginRecord>>)>;

/// Whether a license step kept the wizard on the license page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LicenseStep {
    Stayed,
    Exited,
}

/// Coordinates one plugin finder session: lookup, selection, license
/// acceptance, install and summary.
///
/// Callbacks from the collaborators are applied one at a time through
/// `&mut self`; the `run_*` drivers poll the in-flight calls and feed every
/// completion in before polling the next one. Nothing that was started can be
/// aborted: `cancel` only disables forward navigation.
pub struct InstallerWizard {
    requests: IndexMap<String, PluginRequest>,
    records: IndexMap<String, PluginRecord>,
    not_found: IndexMap<String, NotFoundRecord>,
    /// Requested mime type -> id of the record that resolved it.
    resolved: HashMap<String, String>,
    received: HashSet<String>,
    license_flow: LicenseFlow,
    license_loaded: bool,
    batch: Vec<InstallItem>,
    completed: HashSet<String>,
    success_count: usize,
    stage: Stage,
    cancelled: bool,
    lookup_service: Arc<dyn LookupService>,
    install_service: Arc<dyn InstallService>,
    navigator: Box<dyn Navigator>,
}

impl InstallerWizard {
    pub fn new(
        requests: Vec<PluginRequest>,
        lookup_service: Arc<dyn LookupService>,
        install_service: Arc<dyn InstallService>,
        navigator: Box<dyn Navigator>,
    ) -> Self {
        let mut registered = IndexMap::new();
        for request in requests {
            if registered.contains_key(&request.mime_type) {
                debug!("Ignoring duplicate request for {}", request.mime_type);
                continue;
            }
            registered.insert(request.mime_type.clone(), request);
        }

        let mut wizard = Self {
            requests: registered,
            records: IndexMap::new(),
            not_found: IndexMap::new(),
            resolved: HashMap::new(),
            received: HashSet::new(),
            license_flow: LicenseFlow::default(),
            license_loaded: false,
            batch: Vec::new(),
            completed: HashSet::new(),
            success_count: 0,
            stage: Stage::CollectingRequests,
            cancelled: false,
            lookup_service,
            install_service,
            navigator,
        };
        wizard.navigator.set_can_advance(false);
        wizard
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    pub fn requests(&self) -> impl Iterator<Item = &PluginRequest> {
        self.requests.values()
    }

    pub fn records(&self) -> impl Iterator<Item = &PluginRecord> {
        self.records.values()
    }

    #[cfg(test)]
    pub fn record(&self, id: &str) -> Option<&PluginRecord> {
        self.records.get(id)
    }

    pub fn not_found(&self) -> impl Iterator<Item = &NotFoundRecord> {
        self.not_found.values()
    }

    pub fn received_count(&self) -> usize {
        self.received.len()
    }

    pub fn success_count(&self) -> usize {
        self.success_count
    }

    #[cfg(test)]
    pub fn license_flow(&self) -> &LicenseFlow {
        &self.license_flow
    }

    pub fn install_batch(&self) -> &[InstallItem] {
        &self.batch
    }

    /// Whether any found plugin brings its own installer UI, which the
    /// selection page warns about.
    pub fn needs_installer_ui(&self) -> bool {
        self.records.values().any(|r| r.requires_ui_during_install)
    }

    fn expect_stage(&self, operation: &'static str, expected: Stage) -> Result<(), WizardError> {
        if self.stage != expected {
            return Err(WizardError::InvalidStage {
                operation,
                actual: self.stage,
            });
        }
        Ok(())
    }

    fn expect_not_cancelled(&self) -> Result<(), WizardError> {
        if self.cancelled {
            return Err(WizardError::Cancelled);
        }
        Ok(())
    }

    fn set_can_advance(&mut self, enabled: bool) {
        self.navigator.set_can_advance(enabled && !self.cancelled);
    }

    fn advance_page(
        &mut self,
        stage: Option<Stage>,
        can_advance: bool,
        can_rewind: bool,
        can_cancel: bool,
    ) {
        self.navigator.set_can_advance(true);
        self.navigator.advance(stage);

        self.set_can_advance(can_advance);
        self.navigator.set_can_rewind(can_rewind);
        self.navigator.set_can_cancel(can_cancel && !self.cancelled);
    }

    fn enter(&mut self, stage: Stage) {
        debug!("Wizard stage: {} -> {}", self.stage, stage);
        self.stage = stage;
    }

    /// Disables forward navigation and the cancel control. Calls already in
    /// flight keep running and their results are still recorded.
    pub fn cancel(&mut self) {
        if self.cancelled {
            return;
        }
        info!("Plugin wizard cancelled while {}", self.stage);
        self.cancelled = true;
        self.navigator.set_can_advance(false);
        self.navigator.set_can_cancel(false);
    }

    /// Issues one lookup per request, all at once.
    pub fn begin_lookup(&mut self) -> Result<FuturesUnordered<PendingLookup>, WizardError> {
        self.expect_stage("begin lookup", Stage::CollectingRequests)?;
        self.expect_not_cancelled()?;
        self.enter(Stage::LookingUp);

        info!("Looking up {} plugin request(s)", self.requests.len());
        let pending: FuturesUnordered<PendingLookup> = self
            .requests
            .values()
            .cloned()
            .map(|request| {
                let lookup_service = self.lookup_service.clone();
                let lookup: PendingLookup = Box::pin(async move {
                    let result = lookup_service.lookup(&request).await;
                    (request, result)
                });
                lookup
            })
            .collect();

        if self.requests.is_empty() {
            self.finish_lookup();
        }
        Ok(pending)
    }

    /// Runs the whole lookup stage.
    pub async fn run_lookup(&mut self) -> Result<(), WizardError> {
        let mut pending = self.begin_lookup()?;
        while let Some((request, result)) = pending.next().await {
            self.on_lookup_result(&request, result)?;
        }
        Ok(())
    }

    /// Records a lookup completion. A failed lookup or an empty answer leaves a
    /// not-found record; a found plugin replaces an earlier one with the same
    /// id.
    pub fn on_lookup_result(
        &mut self,
        request: &PluginRequest,
        result: Result<Option<PluginRecord>>,
    ) -> Result<(), WizardError> {
        self.expect_stage("record a lookup result", Stage::LookingUp)?;

        let mime_type = request.mime_type.clone();
        let Some(request) = self.requests.get(&mime_type).cloned() else {
            return Err(WizardError::UnknownRequest(mime_type));
        };
        if !self.received.insert(mime_type.clone()) {
            warn!("Ignoring repeated lookup result for {}", mime_type);
            return Ok(());
        }

        match result {
            Ok(Some(record)) => {
                info!("Found plugin {} for {}", record.display_name(), mime_type);
                self.resolved.insert(mime_type, record.id.clone());
                self.records.insert(record.id.clone(), record);
            }
            Ok(None) => {
                info!("No plugin found for {}", mime_type);
                self.not_found.insert(mime_type, NotFoundRecord::from(&request));
            }
            Err(e) => {
                warn!("Lookup failed for {}: {:#}", mime_type, e);
                self.not_found.insert(mime_type, NotFoundRecord::from(&request));
            }
        }

        if self.received.len() == self.requests.len() {
            self.finish_lookup();
        }
        Ok(())
    }

    fn finish_lookup(&mut self) {
        let requests = &self.requests;
        let order = |record: &PluginRecord| {
            requests
                .get_index_of(&record.requested_mime_type)
                .unwrap_or(usize::MAX)
        };
        self.records.sort_by(|_, a, _, b| order(a).cmp(&order(b)));

        info!(
            "Lookup finished: {} found, {} not found",
            self.records.len(),
            self.not_found.len()
        );

        if self.records.is_empty() {
            self.enter(Stage::ShowingResults);
            self.advance_page(Some(Stage::ShowingResults), true, false, false);
        } else {
            self.enter(Stage::SelectingPlugins);
            self.advance_page(None, true, false, true);
        }
    }

    /// Checks or unchecks a found plugin. Returns whether the user may move on,
    /// which needs at least one checked plugin.
    pub fn toggle_selection(&mut self, id: &str, selected: bool) -> Result<bool, WizardError> {
        self.expect_stage("change the selection", Stage::SelectingPlugins)?;
        let record = self
            .records
            .get_mut(id)
            .ok_or_else(|| WizardError::UnknownPlugin(id.to_string()))?;
        record.selected_for_install = selected;

        let can_advance = self.records.values().any(|r| r.selected_for_install);
        self.set_can_advance(can_advance);
        Ok(can_advance)
    }

    /// Starts the license pages for the checked plugins that have a license.
    pub fn begin_license_flow(&mut self) -> Result<Stage, WizardError> {
        self.expect_stage("show licenses", Stage::SelectingPlugins)?;
        self.expect_not_cancelled()?;

        self.navigator.set_can_advance(false);
        self.navigator.set_can_rewind(false);

        let ids = self
            .records
            .values()
            .filter(|r| r.selected_for_install && r.has_license())
            .map(|r| r.id.clone())
            .collect();
        self.license_flow = LicenseFlow::new(ids);

        if self.license_flow.is_empty() {
            debug!("No selected plugin requires a license");
            self.enter(Stage::ReadyToInstall);
            self.advance_page(None, true, false, false);
        } else {
            self.enter(Stage::AcceptingLicenses);
            self.show_license();
        }
        Ok(self.stage)
    }

    /// The record whose license is on screen.
    pub fn current_license(&self) -> Option<&PluginRecord> {
        if self.stage != Stage::AcceptingLicenses {
            return None;
        }
        self.license_flow
            .current()
            .and_then(|id| self.records.get(id))
    }

    fn show_license(&mut self) {
        if let Some(record) = self.current_license() {
            debug!(
                "Showing license {}/{} for {}",
                self.license_flow.position() + 1,
                self.license_flow.ids().len(),
                record.display_name()
            );
        }
        // Forward stays disabled until the license document is loaded.
        self.license_loaded = false;
        self.navigator.set_can_advance(false);
        self.navigator
            .set_can_rewind(self.license_flow.can_retreat());
    }

    pub fn on_license_loaded(&mut self) -> Result<(), WizardError> {
        self.expect_stage("load a license", Stage::AcceptingLicenses)?;
        self.license_loaded = true;
        self.set_can_advance(true);
        Ok(())
    }

    fn store_license_choice(&mut self, accepted: bool) {
        let Some(id) = self.license_flow.current().map(str::to_string) else {
            return;
        };
        if let Some(record) = self.records.get_mut(&id) {
            debug!(
                "License for {} {}",
                record.display_name(),
                if accepted { "accepted" } else { "declined" }
            );
            record.license_accepted = accepted;
        }
    }

    /// Stores the choice for the license on screen and shows the next one.
    /// After the last license the wizard moves on to the install stage.
    pub fn advance_license(&mut self, accepted: bool) -> Result<LicenseStep, WizardError> {
        self.expect_stage("accept a license", Stage::AcceptingLicenses)?;
        self.expect_not_cancelled()?;
        if !self.license_loaded {
            let id = self.license_flow.current().unwrap_or_default().to_string();
            return Err(WizardError::LicenseNotLoaded(id));
        }
        self.store_license_choice(accepted);

        if self.license_flow.advance() {
            self.show_license();
            return Ok(LicenseStep::Stayed);
        }

        self.enter(Stage::ReadyToInstall);
        self.advance_page(None, true, false, false);
        Ok(LicenseStep::Exited)
    }

    /// Stores the choice for the license on screen and shows the previous one.
    /// There is no way back from the first license.
    #[allow(unused)]
    pub fn retreat_license(&mut self, accepted: bool) -> Result<LicenseStep, WizardError> {
        self.expect_stage("go back a license", Stage::AcceptingLicenses)?;
        self.store_license_choice(accepted);

        if !self.license_flow.retreat() {
            debug!("Already at the first license");
        }
        self.show_license();
        Ok(LicenseStep::Stayed)
    }

    /// Builds the install batch. An empty batch goes straight to the results.
    pub fn begin_install(&mut self) -> Result<Vec<InstallItem>, WizardError> {
        self.expect_stage("start the install", Stage::ReadyToInstall)?;
        self.expect_not_cancelled()?;

        self.navigator.set_can_advance(false);
        self.navigator.set_can_rewind(false);

        self.batch = self
            .records
            .values()
            .filter(|r| r.is_eligible_for_install())
            .filter_map(InstallItem::from_record)
            .collect();

        if self.batch.is_empty() {
            info!("No plugins to install");
            self.enter(Stage::ShowingResults);
            self.advance_page(None, true, false, false);
        } else {
            info!("Installing {} plugin(s)", self.batch.len());
            self.enter(Stage::Installing);
        }
        Ok(self.batch.clone())
    }

    /// Runs the install stage: hands the batch to the install service once and
    /// applies its progress events as they arrive.
    pub async fn run_install(&mut self) -> Result<(), WizardError> {
        let batch = self.begin_install()?;
        if batch.is_empty() {
            return Ok(());
        }

        let install_service = self.install_service.clone();
        let (sender, mut receiver) = mpsc::unbounded_channel::<InstallEvent>();

        let install = async move { install_service.install(batch, sender).await };
        let progress = async {
            while let Some(event) = receiver.recv().await {
                if let Err(e) = self.on_install_progress(event) {
                    warn!("Ignoring install progress: {}", e);
                }
            }
        };
        let (outcome, ()) = tokio::join!(install, progress);

        if self.stage == Stage::Installing {
            let message = match outcome {
                Err(e) => format!("{:#}", e),
                Ok(()) => "Installer finished without reporting this plugin".to_string(),
            };
            self.on_install_service_failed(&message)?;
        }
        Ok(())
    }

    /// Applies one progress report from the install service.
    pub fn on_install_progress(&mut self, event: InstallEvent) -> Result<(), WizardError> {
        self.expect_stage("record install progress", Stage::Installing)?;
        if !self.batch.iter().any(|item| item.id == event.id) {
            return Err(WizardError::UnknownPlugin(event.id));
        }

        let name = self
            .records
            .get(&event.id)
            .map(|r| r.display_name())
            .unwrap_or_else(|| event.id.clone());

        if event.phase != InstallPhase::InstallDone {
            info!("{}: {}", name, event.phase);
            return Ok(());
        }

        if self.completed.contains(&event.id) {
            warn!("Ignoring repeated install result for {}", name);
            return Ok(());
        }

        match &event.error {
            Some(error) => warn!("{}: install failed: {}", name, error),
            None => info!("{}: installed", name),
        }
        if event.error.is_none() {
            self.success_count += 1;
        }
        if let Some(record) = self.records.get_mut(&event.id) {
            record.last_error = event.error;
        }
        self.completed.insert(event.id);

        if self.completed.len() == self.batch.len() {
            self.finish_install();
        }
        Ok(())
    }

    /// Marks every batch item that has not reported completion as failed.
    pub fn on_install_service_failed(&mut self, message: &str) -> Result<(), WizardError> {
        self.expect_stage("record an install failure", Stage::Installing)?;
        warn!("Plugin installer failed: {}", message);

        for item in &self.batch {
            if self.completed.insert(item.id.clone())
                && let Some(record) = self.records.get_mut(&item.id)
            {
                record.last_error = Some(message.to_string());
            }
        }
        self.finish_install();
        Ok(())
    }

    fn finish_install(&mut self) {
        info!(
            "Install finished: {} of {} succeeded",
            self.success_count,
            self.batch.len()
        );
        self.enter(Stage::ShowingResults);
        self.advance_page(None, true, false, false);
    }

    /// Outcome per request, in the order the requests were registered.
    pub fn compute_summary(&self) -> InstallSummary {
        let mut rows = Vec::with_capacity(self.requests.len());
        let mut succeeded = HashSet::new();
        let mut needs_restart = false;

        for request in self.requests.values() {
            let record = self
                .resolved
                .get(&request.mime_type)
                .and_then(|id| self.records.get(id));

            let Some(record) = record else {
                rows.push(SummaryRow {
                    mime_type: request.mime_type.clone(),
                    plugin_id: None,
                    name: None,
                    status: PluginStatus::PluginNotFound,
                    manual_url: request.plugins_page.clone(),
                });
                continue;
            };

            let status = self.record_status(record);
            if status == PluginStatus::Success && succeeded.insert(record.id.as_str()) {
                needs_restart |= record.needs_restart_after_install;
            }

            let manual_url = match status {
                PluginStatus::Failed(_) | PluginStatus::PackageUnavailable => record
                    .manual_install_url
                    .clone()
                    .or_else(|| request.plugins_page.clone()),
                _ => None,
            };

            rows.push(SummaryRow {
                mime_type: request.mime_type.clone(),
                plugin_id: Some(record.id.clone()),
                name: Some(record.display_name()),
                status,
                manual_url,
            });
        }

        let success_count = succeeded.len();
        let headline = if self.records.is_empty() {
            SummaryHeadline::NoPluginsFound
        } else if success_count == 0 {
            SummaryHeadline::NoPluginsInstalled
        } else {
            SummaryHeadline::PluginsInstalled
        };

        InstallSummary {
            rows,
            success_count,
            needs_restart,
            headline,
        }
    }

    fn record_status(&self, record: &PluginRecord) -> PluginStatus {
        if !record.selected_for_install {
            PluginStatus::NotSelected
        } else if let Some(error) = &record.last_error {
            PluginStatus::Failed(error.clone())
        } else if !record.license_accepted {
            PluginStatus::LicenseDeclined
        } else if record.install_package_location.is_none() {
            PluginStatus::PackageUnavailable
        } else if !self.completed.contains(&record.id) {
            // Wizard left before the install stage.
            PluginStatus::NotSelected
        } else {
            PluginStatus::Success
        }
    }
}
