use {serde::Deserialize, std::collections::BTreeMap};

/// Flag that controls whether visitors may create an account.
pub const REGISTRATION: &str = "registration";

///
/// Initial values for the feature flags.
///
/// ```toml
/// [features]
/// registration = true
/// two_factor = false
/// ```
///
/// Flags that are not listed are disabled. When the section is missing
/// altogether, only `registration` is enabled.
///
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct FeaturesConfig {
    pub flags: BTreeMap<String, bool>,
}

impl FeaturesConfig {
    /// Returns the configured value for a flag, false when absent.
    pub fn is_enabled(&self, flag: &str) -> bool {
        self.flags.get(flag).copied().unwrap_or(false)
    }

    /// Sets the initial value of a flag.
    #[must_use]
    pub fn with_flag(mut self, flag: impl Into<String>, enabled: bool) -> Self {
        self.flags.insert(flag.into(), enabled);
        self
    }
}

impl Default for FeaturesConfig {
    fn default() -> Self {
        Self {
            flags: BTreeMap::from([(REGISTRATION.to_string(), true)]),
        }
    }
}
