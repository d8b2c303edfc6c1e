//! Feature flags.

use {crate::FeaturesConfig, dashmap::DashMap};

/// Answers whether a named feature is switched on.
///
/// Handlers call this on every request, so implementations must reflect
/// changes made at runtime.
pub trait FeatureFlags: Send + Sync {
    fn is_enabled(&self, flag: &str) -> bool;
}

/// Feature flags seeded from `[features]` that can be toggled at runtime.
///
/// ```rust
/// use page_routes::{ConfigFeatureFlags, FeatureFlags, FeaturesConfig, REGISTRATION};
///
/// let flags = ConfigFeatureFlags::from_config(&FeaturesConfig::default());
/// assert!(flags.is_enabled(REGISTRATION));
///
/// flags.set(REGISTRATION, false);
/// assert!(!flags.is_enabled(REGISTRATION));
/// ```
#[derive(Debug, Default)]
pub struct ConfigFeatureFlags {
    flags: DashMap<String, bool>,
}

impl ConfigFeatureFlags {
    pub fn from_config(config: &FeaturesConfig) -> Self {
        Self {
            flags: config
                .flags
                .iter()
                .map(|(flag, enabled)| (flag.clone(), *enabled))
                .collect(),
        }
    }

    /// Switches a flag on or off. Unknown flags are added.
    pub fn set(&self, flag: &str, enabled: bool) {
        let previous = self.flags.insert(flag.to_string(), enabled);
        if previous != Some(enabled) {
            tracing::info!(flag = %flag, enabled, "Feature flag changed");
        }
    }
}

impl FeatureFlags for ConfigFeatureFlags {
    fn is_enabled(&self, flag: &str) -> bool {
        self.flags.get(flag).is_some_and(|enabled| *enabled)
    }
}

impl FeatureFlags for FeaturesConfig {
    fn is_enabled(&self, flag: &str) -> bool {
        FeaturesConfig::is_enabled(self, flag)
    }
}
