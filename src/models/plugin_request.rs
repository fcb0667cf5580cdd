/// A missing plugin reported by the host page.
///
/// One request exists per distinct mime type. `plugins_page` is the page the
/// embedding document pointed at (the `pluginspage` attribute), used as the
/// manual install fallback in the summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginRequest {
    pub mime_type: String,
    pub plugins_page: Option<String>,
}

impl PluginRequest {
    pub fn new(mime_type: impl Into<String>, plugins_page: Option<String>) -> Self {
        Self {
            mime_type: mime_type.into(),
            plugins_page: plugins_page.filter(|page| !page.is_empty()),
        }
    }
}
