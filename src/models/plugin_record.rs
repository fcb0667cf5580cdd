use serde_derive::Deserialize;

use crate::models::PluginRequest;

/// Plugin finder response for a single mime type.
///
/// The finder reports "no plugin" with a `pid` of `-1`. Boolean flags arrive
/// either as JSON booleans or as the strings `"true"`/`"false"`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LookupResponse {
    #[serde(deserialize_with = "deserialize_pid")]
    pub pid: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(rename = "IconUrl", default)]
    pub icon_url: Option<String>,
    #[serde(rename = "XPILocation", default)]
    pub xpi_location: Option<String>,
    #[serde(rename = "XPIHash", default)]
    pub xpi_hash: Option<String>,
    #[serde(rename = "licenseURL", default)]
    pub license_url: Option<String>,
    #[serde(rename = "manualInstallationURL", default)]
    pub manual_installation_url: Option<String>,
    #[serde(
        rename = "InstallerShowsUI",
        default,
        deserialize_with = "deserialize_flag"
    )]
    pub installer_shows_ui: bool,
    #[serde(rename = "needsRestart", default, deserialize_with = "deserialize_flag")]
    pub needs_restart: bool,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrNumber {
    String(String),
    Number(i64),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrBool {
    String(String),
    Bool(bool),
}

fn deserialize_pid<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value: StringOrNumber = serde::Deserialize::deserialize(deserializer)?;
    Ok(match value {
        StringOrNumber::String(s) => s,
        StringOrNumber::Number(n) => n.to_string(),
    })
}

fn deserialize_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value: StringOrBool = serde::Deserialize::deserialize(deserializer)?;
    Ok(match value {
        StringOrBool::String(s) => s.eq_ignore_ascii_case("true"),
        StringOrBool::Bool(b) => b,
    })
}

impl LookupResponse {
    pub fn is_not_found(&self) -> bool {
        let pid = self.pid.trim();
        pid.is_empty() || pid == "-1"
    }
}

/// A plugin the finder resolved for one of the requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginRecord {
    pub id: String,
    pub name: String,
    pub version: Option<String>,
    pub icon_url: Option<String>,
    pub install_package_location: Option<String>,
    pub install_package_hash: Option<String>,
    pub license_url: Option<String>,
    pub manual_install_url: Option<String>,
    pub requires_ui_during_install: bool,
    pub needs_restart_after_install: bool,
    pub requested_mime_type: String,
    pub selected_for_install: bool,
    pub license_accepted: bool,
    pub last_error: Option<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl PluginRecord {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        requested_mime_type: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            version: None,
            icon_url: None,
            install_package_location: None,
            install_package_hash: None,
            license_url: None,
            manual_install_url: None,
            requires_ui_during_install: false,
            needs_restart_after_install: false,
            requested_mime_type: requested_mime_type.into(),
            selected_for_install: true,
            license_accepted: true,
            last_error: None,
        }
    }

    /// Builds a record from a finder response, or `None` when the finder had no
    /// plugin for the request.
    pub fn from_response(request: &PluginRequest, response: LookupResponse) -> Option<Self> {
        if response.is_not_found() {
            return None;
        }

        let mut record = PluginRecord::new(
            response.pid.trim(),
            response.name,
            request.mime_type.clone(),
        )
        .with_version(response.version)
        .with_package(response.xpi_location, response.xpi_hash)
        .with_license(response.license_url);

        record.icon_url = non_empty(response.icon_url);
        record.manual_install_url = non_empty(response.manual_installation_url);
        record.requires_ui_during_install = response.installer_shows_ui;
        record.needs_restart_after_install = response.needs_restart;
        Some(record)
    }

    pub fn with_version(mut self, version: Option<String>) -> Self {
        self.version = non_empty(version);
        self
    }

    pub fn with_package(mut self, location: Option<String>, hash: Option<String>) -> Self {
        self.install_package_location = non_empty(location);
        self.install_package_hash = non_empty(hash);
        self
    }

    /// A plugin that comes with a license starts out not accepted.
    pub fn with_license(mut self, license_url: Option<String>) -> Self {
        self.license_url = non_empty(license_url);
        self.license_accepted = self.license_url.is_none();
        self
    }

    #[cfg(test)]
    pub fn with_needs_restart(mut self, needs_restart: bool) -> Self {
        self.needs_restart_after_install = needs_restart;
        self
    }

    pub fn has_license(&self) -> bool {
        self.license_url.is_some()
    }

    pub fn is_eligible_for_install(&self) -> bool {
        self.selected_for_install && self.license_accepted && self.install_package_location.is_some()
    }

    pub fn display_name(&self) -> String {
        match &self.version {
            Some(version) => format!("{} {}", self.name, version),
            None => self.name.clone(),
        }
    }
}

/// A request the finder could not resolve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotFoundRecord {
    pub requested_mime_type: String,
    pub plugins_page: Option<String>,
}

impl From<&PluginRequest> for NotFoundRecord {
    fn from(request: &PluginRequest) -> Self {
        Self {
            requested_mime_type: request.mime_type.clone(),
            plugins_page: request.plugins_page.clone(),
        }
    }
}
