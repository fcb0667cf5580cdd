mod find;
mod lookup;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use clap_verbosity_flag::{InfoLevel, Verbosity};

use crate::commands::{find::FindArgs, lookup::LookupArgs};
use crate::config::DefaultAppConfig;
use crate::models::PluginRequest;
use crate::services::{CatalogLookupService, HttpLookupService, LookupService};

#[derive(Parser)]
#[command(
    about = "A CLI tool to find and install plugins for missing content types",
    version,
    author,
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
    #[command(flatten)]
    pub verbosity: Verbosity<InfoLevel>,
}

#[derive(Subcommand)]
pub enum Commands {
    Find(FindArgs),
    Lookup(LookupArgs),
}

/// Arguments shared by every command that resolves mime types.
#[derive(Args, Debug)]
pub struct RequestArgs {
    #[arg(
        required = true,
        help = "Mime types with no plugin to handle them, e.g. \"application/x-shockwave-flash\""
    )]
    mime_types: Vec<String>,
    #[arg(
        long,
        help = "Plugin page of the content, offered as the manual install location"
    )]
    plugins_page: Option<String>,
    #[arg(
        long,
        help = "Resolve plugins from a local JSON catalog instead of the plugin finder service"
    )]
    catalog: Option<PathBuf>,
}

impl RequestArgs {
    pub fn requests(&self) -> Vec<PluginRequest> {
        self.mime_types
            .iter()
            .map(|mime_type| PluginRequest::new(mime_type.as_str(), self.plugins_page.clone()))
            .collect()
    }

    pub fn lookup_service(&self, app_config: &DefaultAppConfig) -> Result<Arc<dyn LookupService>> {
        Ok(match &self.catalog {
            Some(path) => Arc::new(CatalogLookupService::from_file(Path::new(path))?),
            None => Arc::new(HttpLookupService::new(app_config.clone())),
        })
    }
}

pub async fn handle(command: &Commands) -> Result<()> {
    match command {
        Commands::Find(find_args) => {
            find::handle(find_args).await?;
        }
        Commands::Lookup(lookup_args) => {
            lookup::handle(lookup_args).await?;
        }
    }

    Ok(())
}
