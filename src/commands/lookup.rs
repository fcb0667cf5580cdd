use std::sync::Arc;

use anyhow::Result;
use clap::Args;
use tracing::debug;

use crate::commands::RequestArgs;
use crate::config::DefaultAppConfig;
use crate::services::{DefaultPackageService, PackageInstallService};
use crate::ui::{ConsoleNavigator, Operation, OperationManager};
use crate::wizard::InstallerWizard;

#[derive(Args, Debug)]
#[command(about = "Show which plugins handle the given mime types without installing anything.")]
pub struct LookupArgs {
    #[command(flatten)]
    request: RequestArgs,
}

pub async fn handle(args: &LookupArgs) -> Result<()> {
    debug!("Looking up plugins with args: {:?}", args);
    let app_config = DefaultAppConfig::from_env();
    let lookup_service = args.request.lookup_service(&app_config)?;

    // Only the lookup stage runs, the install service is never called.
    let mut wizard = InstallerWizard::new(
        args.request.requests(),
        lookup_service,
        Arc::new(PackageInstallService::new(
            Arc::new(DefaultPackageService::new()),
            app_config,
        )),
        Box::new(ConsoleNavigator::new()),
    );

    let operation_manager = OperationManager::new(Operation::Lookup)?;
    wizard.run_lookup().await?;
    operation_manager.finish();

    for record in wizard.records() {
        println!(
            "{}: {} ({})",
            record.requested_mime_type,
            record.display_name(),
            record.id
        );
        if let Some(license) = &record.license_url {
            println!("  License: {}", license);
        }
        match &record.install_package_location {
            Some(location) => println!("  Package: {}", location),
            None => println!("  No installer available"),
        }
    }
    for not_found in wizard.not_found() {
        println!("{}: no plugin found", not_found.requested_mime_type);
        if let Some(page) = &not_found.plugins_page {
            println!("  Plugins page: {}", page);
        }
    }
    Ok(())
}
