use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::debug;
use url::Url;

use crate::models::{LookupResponse, PluginRecord, PluginRequest};
use crate::services::LookupService;

/// Lookup service backed by a JSON file mapping mime types to finder
/// responses, e.g.
///
/// ```json
/// { "application/x-foo": { "pid": "foo", "name": "Foo", "XPILocation": "foo.zip" } }
/// ```
#[derive(Debug, Clone)]
pub struct CatalogLookupService {
    path: PathBuf,
    entries: HashMap<String, LookupResponse>,
}

impl CatalogLookupService {
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read plugin catalog: {}", path.display()))?;
        let entries = Self::parse(&content)
            .with_context(|| format!("Failed to parse plugin catalog: {}", path.display()))?;
        debug!(
            "Loaded {} catalog entries from {}",
            entries.len(),
            path.display()
        );
        Ok(Self {
            path: path.to_path_buf(),
            entries,
        })
    }

    pub fn parse(content: &str) -> Result<HashMap<String, LookupResponse>> {
        Ok(serde_json::from_str(content)?)
    }

    /// Relative package paths are relative to the catalog file.
    fn resolve_location(&self, location: String) -> String {
        let has_scheme = Url::parse(&location).is_ok_and(|url| url.scheme().len() > 1);
        if has_scheme || Path::new(&location).is_absolute() {
            return location;
        }
        match self.path.parent() {
            Some(dir) => dir.join(&location).to_string_lossy().into_owned(),
            None => location,
        }
    }
}

#[async_trait]
impl LookupService for CatalogLookupService {
    async fn lookup(&self, request: &PluginRequest) -> Result<Option<PluginRecord>> {
        debug!(
            "Looking up {} in catalog {}",
            request.mime_type,
            self.path.display()
        );
        Ok(self
            .entries
            .get(&request.mime_type)
            .cloned()
            .and_then(|response| PluginRecord::from_response(request, response))
            .map(|mut record| {
                record.install_package_location = record
                    .install_package_location
                    .take()
                    .map(|location| self.resolve_location(location));
                record
            }))
    }
}
