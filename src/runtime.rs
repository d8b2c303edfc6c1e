//! Runtime settings exposed to handlers.

use crate::UploadsConfig;

/// Read-only view of server settings, looked up by key.
pub trait RuntimeSettings: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
}

/// Upload limits from the `[uploads]` section.
///
/// Answers `upload_max_filesize` and `post_max_size`; every other key is
/// unknown.
///
/// ```rust
/// use page_routes::{RuntimeSettings, UploadLimits, UploadsConfig};
///
/// let limits = UploadLimits::new(UploadsConfig::default());
/// assert_eq!(limits.get("upload_max_filesize").as_deref(), Some("2M"));
/// assert_eq!(limits.get("memory_limit"), None);
/// ```
#[derive(Debug, Clone, Default)]
pub struct UploadLimits {
    config: UploadsConfig,
}

impl UploadLimits {
    pub fn new(config: UploadsConfig) -> Self {
        Self { config }
    }
}

impl RuntimeSettings for UploadLimits {
    fn get(&self, key: &str) -> Option<String> {
        let value = self.config.get(key).map(str::to_string);
        if value.is_none() {
            tracing::debug!(key = %key, "Unknown runtime setting");
        }
        value
    }
}
