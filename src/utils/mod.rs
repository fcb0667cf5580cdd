pub struct Utils;

use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

const ID_HASH_LENGTH: usize = 8;

impl Utils {
    /// Folder a plugin is unpacked into: `<plugins_folder>/<id>`
    ///
    /// Plugin ids come from the finder, so anything outside `[A-Za-z0-9._-]`
    /// is replaced with `_` and the id can never leave the plugins folder.
    /// A rewritten id gets a short hash of the raw id appended, so two ids
    /// never share a folder.
    ///
    /// e.g. ```plugin_install_folder(Path::new("plugins"), "adobe/flash") // returns "plugins/adobe_flash-<hash>"```
    pub fn plugin_install_folder(plugins_folder: &Path, plugin_id: &str) -> PathBuf {
        plugins_folder.join(Self::plugin_folder_name(plugin_id))
    }

    pub fn plugin_folder_name(plugin_id: &str) -> String {
        let sanitized = Self::sanitize_plugin_id(plugin_id);
        if sanitized == plugin_id {
            return sanitized;
        }
        let digest = format!("{:x}", Sha256::digest(plugin_id.as_bytes()));
        format!("{}-{}", sanitized, &digest[..ID_HASH_LENGTH])
    }

    pub fn sanitize_plugin_id(plugin_id: &str) -> String {
        let sanitized: String = plugin_id
            .trim()
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                    c
                } else {
                    '_'
                }
            })
            .collect();

        if sanitized.is_empty() || sanitized.chars().all(|c| c == '.') {
            return format!("plugin{}", sanitized.replace('.', "_"));
        }
        sanitized
    }
}
