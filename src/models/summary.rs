use std::fmt;

use anyhow::{Context, Result};
use url::Url;

use crate::config::AppConfig;

/// Outcome of a single request after the wizard finished.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PluginStatus {
    Success,
    Failed(String),
    LicenseDeclined,
    PackageUnavailable,
    PluginNotFound,
    /// The plugin was found but the user unchecked it.
    NotSelected,
}

impl PluginStatus {
    /// Statuses that end up in the "more information" link.
    pub fn is_missing(&self) -> bool {
        matches!(
            self,
            PluginStatus::Failed(_) | PluginStatus::PackageUnavailable | PluginStatus::PluginNotFound
        )
    }
}

impl fmt::Display for PluginStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PluginStatus::Success => f.write_str("installed"),
            PluginStatus::Failed(reason) => write!(f, "failed ({})", reason),
            PluginStatus::LicenseDeclined => f.write_str("license not accepted"),
            PluginStatus::PackageUnavailable => f.write_str("no installer available"),
            PluginStatus::PluginNotFound => f.write_str("unknown plugin"),
            PluginStatus::NotSelected => f.write_str("skipped"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryRow {
    pub mime_type: String,
    pub plugin_id: Option<String>,
    pub name: Option<String>,
    pub status: PluginStatus,
    pub manual_url: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummaryHeadline {
    NoPluginsFound,
    NoPluginsInstalled,
    PluginsInstalled,
}

impl fmt::Display for SummaryHeadline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = match self {
            SummaryHeadline::NoPluginsFound => "No suitable plugins were found.",
            SummaryHeadline::NoPluginsInstalled => "No plugins were installed.",
            SummaryHeadline::PluginsInstalled => "The following plugins were processed:",
        };
        f.write_str(message)
    }
}

/// Result page of the wizard, one row per request in registration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallSummary {
    pub rows: Vec<SummaryRow>,
    pub success_count: usize,
    pub needs_restart: bool,
    pub headline: SummaryHeadline,
}

impl InstallSummary {
    pub fn missing_mime_types(&self) -> Vec<&str> {
        self.rows
            .iter()
            .filter(|row| row.status.is_missing())
            .map(|row| row.mime_type.as_str())
            .collect()
    }

    pub fn should_reload_page(&self) -> bool {
        self.success_count > 0
    }

    /// Link to the finder's page about the plugins that could not be installed.
    pub fn missing_plugins_url(&self, config: &dyn AppConfig) -> Result<Url> {
        let mut params = vec![("action", "missingplugins")];
        params.extend(self.missing_mime_types().into_iter().map(|m| ("mimetype", m)));
        params.push(("appID", config.get_app_id()));
        params.push(("appVersion", config.get_app_version()));
        params.push(("clientOS", config.get_client_os()));
        params.push(("chromeLocale", config.get_chrome_locale()));

        Url::parse_with_params(config.get_finder_base_url(), params).with_context(|| {
            format!(
                "Invalid plugin finder URL: {}",
                config.get_finder_base_url()
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DefaultAppConfig;

    fn row(mime_type: &str, status: PluginStatus) -> SummaryRow {
        SummaryRow {
            mime_type: mime_type.to_string(),
            plugin_id: None,
            name: None,
            status,
            manual_url: None,
        }
    }

    fn summary(rows: Vec<SummaryRow>, success_count: usize) -> InstallSummary {
        InstallSummary {
            rows,
            success_count,
            needs_restart: false,
            headline: SummaryHeadline::PluginsInstalled,
        }
    }

    #[test]
    fn test_missing_mime_types() {
        let summary = summary(
            vec![
                row("a/ok", PluginStatus::Success),
                row("a/failed", PluginStatus::Failed("boom".to_string())),
                row("a/declined", PluginStatus::LicenseDeclined),
                row("a/unavailable", PluginStatus::PackageUnavailable),
                row("a/unknown", PluginStatus::PluginNotFound),
                row("a/skipped", PluginStatus::NotSelected),
            ],
            1,
        );
        assert_eq!(
            summary.missing_mime_types(),
            vec!["a/failed", "a/unavailable", "a/unknown"]
        );
    }

    #[test]
    fn test_should_reload_page() {
        assert!(summary(vec![], 1).should_reload_page());
        assert!(!summary(vec![], 0).should_reload_page());
    }

    #[test]
    fn test_missing_plugins_url() {
        let config = DefaultAppConfig::new(
            Some("https://finder.example.com/plugins/".to_string()),
            None,
            Some("app-id".to_string()),
            Some("1.0".to_string()),
            Some("Linux".to_string()),
            Some("en-US".to_string()),
        );
        let summary = summary(
            vec![
                row("application/x-foo", PluginStatus::PluginNotFound),
                row("application/x-bar", PluginStatus::Success),
            ],
            1,
        );

        let url = summary.missing_plugins_url(&config).unwrap();
        assert_eq!(
            url.as_str(),
            "https://finder.example.com/plugins/?action=missingplugins&mimetype=application%2Fx-foo&appID=app-id&appVersion=1.0&clientOS=Linux&chromeLocale=en-US"
        );
    }

    #[test]
    fn test_status_display() {
        assert_eq!(PluginStatus::Success.to_string(), "installed");
        assert_eq!(
            PluginStatus::Failed("hash mismatch".to_string()).to_string(),
            "failed (hash mismatch)"
        );
    }
}
