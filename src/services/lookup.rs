use anyhow::{Result, anyhow};
use async_trait::async_trait;
use tracing::{error, info};
use url::Url;

use crate::config::{AppConfig, DefaultAppConfig};
use crate::models::{LookupResponse, PluginRecord, PluginRequest};

/// Resolves plugin metadata for a missing mime type.
///
/// `Ok(None)` means the finder knows no plugin for the request; an error
/// means the lookup itself failed. The wizard treats both as "not found".
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LookupService: Send + Sync {
    async fn lookup(&self, request: &PluginRequest) -> Result<Option<PluginRecord>>;
}

/// Queries the plugin finder web service.
#[derive(Debug, Clone)]
pub struct HttpLookupService {
    app_config: DefaultAppConfig,
    client: reqwest::Client,
}

impl HttpLookupService {
    pub fn new(app_config: DefaultAppConfig) -> Self {
        Self {
            app_config,
            client: reqwest::Client::new(),
        }
    }

    pub fn get_url(&self, request: &PluginRequest) -> Result<Url> {
        let params = [
            ("mimetype", request.mime_type.as_str()),
            ("appID", self.app_config.get_app_id()),
            ("appVersion", self.app_config.get_app_version()),
            ("clientOS", self.app_config.get_client_os()),
            ("chromeLocale", self.app_config.get_chrome_locale()),
        ];
        Ok(Url::parse_with_params(
            self.app_config.get_finder_base_url(),
            params,
        )?)
    }
}

impl Default for HttpLookupService {
    fn default() -> Self {
        HttpLookupService::new(DefaultAppConfig::default())
    }
}

#[async_trait]
impl LookupService for HttpLookupService {
    async fn lookup(&self, request: &PluginRequest) -> Result<Option<PluginRecord>> {
        let url = self.get_url(request)?;

        let response = match self.client.get(url.as_str()).send().await {
            Ok(response) => {
                info!("[GET] {} [{}]", url, response.status());
                response
            }
            Err(e) => {
                match e.status() {
                    Some(status) => error!("[GET] {} [{}] - Error: {}", url, status, e),
                    None => error!("[GET] {} - Error: {}", url, e),
                }
                return Err(anyhow!("Failed to look up plugin: {}", e));
            }
        };

        let data = response
            .error_for_status()
            .map_err(|e| anyhow!("Plugin finder rejected the request: {}", e))?
            .json::<LookupResponse>()
            .await?;

        Ok(PluginRecord::from_response(request, data))
    }
}
