use serde_derive::Deserialize;

use std::env;
use std::path::PathBuf;

const DEFAULT_FINDER_BASE_URL: &str = "https://pfs.mozilla.org/plugins/";
const DEFAULT_PLUGINS_FOLDER_PATH: &str = "plugins";
const DEFAULT_APP_ID: &str = "{ec8030f7-c20a-464f-9b0e-13a3a9e97384}";
const DEFAULT_CHROME_LOCALE: &str = "en-US";

/// Application configuration settings
#[derive(Debug, Clone, Deserialize)]
pub struct DefaultAppConfig {
    /// FINDER_BASE_URL environment variable
    finder_base_url: String,
    /// PLUGINS_FOLDER_PATH environment variable
    plugins_folder_path: String,
    /// APP_ID environment variable
    app_id: String,
    /// APP_VERSION environment variable
    app_version: String,
    /// CLIENT_OS environment variable
    client_os: String,
    /// CHROME_LOCALE environment variable
    chrome_locale: String,
}

impl DefaultAppConfig {
    pub fn new(
        finder_base_url: Option<String>,
        plugins_folder_path: Option<String>,
        app_id: Option<String>,
        app_version: Option<String>,
        client_os: Option<String>,
        chrome_locale: Option<String>,
    ) -> DefaultAppConfig {
        DefaultAppConfig {
            finder_base_url: finder_base_url.unwrap_or(DEFAULT_FINDER_BASE_URL.to_string()),
            plugins_folder_path: plugins_folder_path
                .unwrap_or(DEFAULT_PLUGINS_FOLDER_PATH.to_string()),
            app_id: app_id.unwrap_or(DEFAULT_APP_ID.to_string()),
            app_version: app_version.unwrap_or(env!("CARGO_PKG_VERSION").to_string()),
            client_os: client_os.unwrap_or(env::consts::OS.to_string()),
            chrome_locale: chrome_locale.unwrap_or(DEFAULT_CHROME_LOCALE.to_string()),
        }
    }

    /// Reads every setting from its environment variable, falling back to the
    /// default for unset or empty ones.
    pub fn from_env() -> DefaultAppConfig {
        let var = |name: &str| env::var(name).ok().filter(|value| !value.is_empty());
        DefaultAppConfig::new(
            var("FINDER_BASE_URL"),
            var("PLUGINS_FOLDER_PATH"),
            var("APP_ID"),
            var("APP_VERSION"),
            var("CLIENT_OS"),
            var("CHROME_LOCALE"),
        )
    }
}

impl Default for DefaultAppConfig {
    fn default() -> Self {
        DefaultAppConfig::new(None, None, None, None, None, None)
    }
}

impl AppConfig for DefaultAppConfig {
    fn get_finder_base_url(&self) -> &str {
        &self.finder_base_url
    }

    fn get_plugins_folder_path(&self) -> PathBuf {
        PathBuf::from(self.plugins_folder_path.as_str())
    }

    fn get_app_id(&self) -> &str {
        &self.app_id
    }

    fn get_app_version(&self) -> &str {
        &self.app_version
    }

    fn get_client_os(&self) -> &str {
        &self.client_os
    }

    fn get_chrome_locale(&self) -> &str {
        &self.chrome_locale
    }
}

#[cfg_attr(test, mockall::automock)]
pub trait AppConfig: Send + Sync + 'static {
    fn get_finder_base_url(&self) -> &str;
    fn get_plugins_folder_path(&self) -> PathBuf;
    fn get_app_id(&self) -> &str;
    fn get_app_version(&self) -> &str;
    fn get_client_os(&self) -> &str;
    fn get_chrome_locale(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_app_config() {
        let config = DefaultAppConfig::default();
        assert_eq!(config.get_finder_base_url(), DEFAULT_FINDER_BASE_URL);
        assert_eq!(config.get_plugins_folder_path(), PathBuf::from("plugins"));
        assert_eq!(config.get_app_id(), DEFAULT_APP_ID);
        assert_eq!(config.get_app_version(), env!("CARGO_PKG_VERSION"));
        assert_eq!(config.get_client_os(), env::consts::OS);
        assert_eq!(config.get_chrome_locale(), "en-US");
    }

    #[test]
    fn test_new_app_config_overrides() {
        let config = DefaultAppConfig::new(
            Some("http://localhost:8080/".to_string()),
            Some("/tmp/plugins".to_string()),
            None,
            Some("3.0".to_string()),
            Some("WINNT".to_string()),
            Some("fi-FI".to_string()),
        );
        assert_eq!(config.get_finder_base_url(), "http://localhost:8080/");
        assert_eq!(config.get_plugins_folder_path(), PathBuf::from("/tmp/plugins"));
        assert_eq!(config.get_app_id(), DEFAULT_APP_ID);
        assert_eq!(config.get_app_version(), "3.0");
        assert_eq!(config.get_client_os(), "WINNT");
        assert_eq!(config.get_chrome_locale(), "fi-FI");
    }

    #[test]
    fn test_mock_app_config() {
        let mut config = MockAppConfig::new();
        config
            .expect_get_plugins_folder_path()
            .returning(|| PathBuf::from("mocked"));
        assert_eq!(config.get_plugins_folder_path(), PathBuf::from("mocked"));
    }
}
