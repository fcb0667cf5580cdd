mod install;
mod plugin_record;
mod plugin_request;
mod summary;

pub use install::{InstallEvent, InstallEventSender, InstallItem, InstallPhase};
pub use plugin_record::{LookupResponse, NotFoundRecord, PluginRecord};
pub use plugin_request::PluginRequest;
pub use summary::{InstallSummary, PluginStatus, SummaryHeadline, SummaryRow};
