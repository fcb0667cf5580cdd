use std::fmt;

use tokio::sync::mpsc;

use crate::models::PluginRecord;

/// One entry of the batch handed to the install service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallItem {
    pub id: String,
    pub package_location: String,
    pub package_hash: Option<String>,
}

impl InstallItem {
    /// `None` when the record has no package to install.
    pub fn from_record(record: &PluginRecord) -> Option<Self> {
        let package_location = record.install_package_location.clone()?;
        Some(Self {
            id: record.id.clone(),
            package_location,
            package_hash: record.install_package_hash.clone(),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallPhase {
    DownloadStart,
    DownloadDone,
    InstallStart,
    InstallDone,
}

impl InstallPhase {
    pub fn position(&self) -> u64 {
        match self {
            InstallPhase::DownloadStart => 0,
            InstallPhase::DownloadDone => 1,
            InstallPhase::InstallStart => 2,
            InstallPhase::InstallDone => 3,
        }
    }
}

impl fmt::Display for InstallPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            InstallPhase::DownloadStart => "download started",
            InstallPhase::DownloadDone => "download finished",
            InstallPhase::InstallStart => "install started",
            InstallPhase::InstallDone => "install finished",
        };
        f.write_str(label)
    }
}

/// Progress report for a single batch item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallEvent {
    pub id: String,
    pub phase: InstallPhase,
    pub error: Option<String>,
}

impl InstallEvent {
    pub fn new(id: impl Into<String>, phase: InstallPhase) -> Self {
        Self {
            id: id.into(),
            phase,
            error: None,
        }
    }

    pub fn done(id: impl Into<String>, error: Option<String>) -> Self {
        Self {
            id: id.into(),
            phase: InstallPhase::InstallDone,
            error,
        }
    }
}

pub type InstallEventSender = mpsc::UnboundedSender<InstallEvent>;
