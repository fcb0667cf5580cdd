use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::Result;
use clap::Args;
use tokio::signal;
use tracing::{debug, warn};

use crate::commands::RequestArgs;
use crate::config::{AppConfig, DefaultAppConfig};
use crate::models::InstallSummary;
use crate::services::{DefaultPackageService, PackageInstallService};
use crate::ui::ConsoleNavigator;
use crate::wizard::{InstallerWizard, LicenseStep, Stage};

#[derive(Args, Debug)]
#[command(
    about = "Find plugins for the given mime types, accept their licenses and install them into the plugins folder."
)]
pub struct FindArgs {
    #[command(flatten)]
    request: RequestArgs,
    #[arg(
        long,
        help = "Accept every plugin license. Without it, plugins with a license are not installed"
    )]
    accept_licenses: bool,
    #[arg(
        long,
        value_name = "ID",
        help = "Do not install the plugin with this id, e.g. \"adobe-flash\""
    )]
    exclude: Vec<String>,
    #[arg(long, help = "Do not show install progress bars")]
    no_progress: bool,
}

pub async fn handle(args: &FindArgs) -> Result<()> {
    debug!("Finding plugins with args: {:?}", args);
    let app_config = DefaultAppConfig::from_env();

    let lookup_service = args.request.lookup_service(&app_config)?;
    let mut install_service =
        PackageInstallService::new(Arc::new(DefaultPackageService::new()), app_config.clone());
    if args.no_progress {
        install_service = install_service.without_progress();
    }
    // Shares its navigation state with the copy handed to the wizard.
    let shell = ConsoleNavigator::new();
    let mut wizard = InstallerWizard::new(
        args.request.requests(),
        lookup_service,
        Arc::new(install_service),
        Box::new(shell.clone()),
    );
    let interrupted = watch_interrupt();

    debug!("Looking up {} mime type(s)", wizard.requests().count());
    wizard.run_lookup().await?;
    debug!("Received {} lookup result(s)", wizard.received_count());
    cancel_if_interrupted(&mut wizard, &interrupted);

    if wizard.stage() == Stage::SelectingPlugins {
        select_plugins(&mut wizard, &args.exclude);
        if wizard.needs_installer_ui() {
            println!("Some plugins open their own installer window.");
        }
        cancel_if_interrupted(&mut wizard, &interrupted);

        if can_advance(&shell) {
            accept_licenses(&mut wizard, &shell, &interrupted, args.accept_licenses)?;
            if wizard.stage() == Stage::ReadyToInstall && can_advance(&shell) {
                wizard.run_install().await?;
                debug!(
                    "Installed {} of {} plugin(s)",
                    wizard.success_count(),
                    wizard.install_batch().len()
                );
            }
        } else if !wizard.is_cancelled() {
            println!("No plugins selected.");
        }
    }

    if wizard.is_cancelled() {
        println!("Cancelled.");
    }
    if !wizard.stage().is_terminal() {
        debug!("Leaving the wizard while {}", wizard.stage());
    }
    print_summary(&wizard.compute_summary(), &app_config)?;
    Ok(())
}

/// Ctrl-C cancels the wizard. Lookups or installs already running finish first.
fn watch_interrupt() -> Arc<AtomicBool> {
    let interrupted = Arc::new(AtomicBool::new(false));
    let flag = interrupted.clone();
    tokio::spawn(async move {
        if signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, stopping after the current stage");
            flag.store(true, Ordering::SeqCst);
        }
    });
    interrupted
}

fn cancel_if_interrupted(wizard: &mut InstallerWizard, interrupted: &AtomicBool) {
    if interrupted.load(Ordering::SeqCst) {
        wizard.cancel();
    }
}

fn can_advance(shell: &ConsoleNavigator) -> bool {
    ConsoleNavigator::snapshot(&shell.state()).can_advance
}

fn select_plugins(wizard: &mut InstallerWizard, exclude: &[String]) {
    println!("Found plugins:");
    for record in wizard.records() {
        println!("  {} ({})", record.display_name(), record.id);
    }

    for id in exclude {
        if let Err(e) = wizard.toggle_selection(id, false) {
            warn!("Cannot exclude {}: {}", id, e);
        }
    }
}

fn accept_licenses(
    wizard: &mut InstallerWizard,
    shell: &ConsoleNavigator,
    interrupted: &AtomicBool,
    accept: bool,
) -> Result<()> {
    wizard.begin_license_flow()?;

    while wizard.stage() == Stage::AcceptingLicenses {
        if let Some(record) = wizard.current_license() {
            println!(
                "License for {}: {}",
                record.display_name(),
                record.license_url.as_deref().unwrap_or_default()
            );
            println!("  {}", if accept { "accepted" } else { "declined" });
        }
        wizard.on_license_loaded()?;
        cancel_if_interrupted(wizard, interrupted);
        if !can_advance(shell) {
            break;
        }
        if wizard.advance_license(accept)? == LicenseStep::Exited {
            debug!("All licenses answered");
        }
    }
    Ok(())
}

fn print_summary(summary: &InstallSummary, app_config: &dyn AppConfig) -> Result<()> {
    println!("{}", summary.headline);
    for row in &summary.rows {
        match &row.name {
            Some(name) => println!("  {} [{}]: {}", name, row.mime_type, row.status),
            None => println!("  {}: {}", row.mime_type, row.status),
        }
        if let Some(url) = &row.manual_url {
            println!("    Install manually from {}", url);
        }
    }

    if summary.needs_restart {
        println!("Restart the application to finish installing the plugins.");
    }
    if !summary.missing_mime_types().is_empty() {
        println!(
            "More information about missing plugins: {}",
            summary.missing_plugins_url(app_config)?
        );
    }
    if summary.should_reload_page() {
        println!("Reload the page to use the new plugins.");
    }
    Ok(())
}
