use {
    crate::{Error, Result},
    serde::Deserialize,
};

///
/// Settings for the page renderer.
///
/// ```toml
/// [pages]
/// title = "Acme"
/// asset_version = "{{ ASSET_VERSION }}"
/// root_element_id = "app"
/// ```
///
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct PagesConfig {
    /// Document title of the HTML shell. Defaults to "App".
    #[serde(default = "PagesConfig::default_title")]
    pub title: String,

    /// Version of the front-end assets. Clients that report a different
    /// version receive a 409 and reload. Defaults to "1".
    #[serde(default = "PagesConfig::default_asset_version")]
    pub asset_version: String,

    /// `id` of the element the front-end mounts into. Defaults to "app".
    #[serde(default = "PagesConfig::default_root_element_id")]
    pub root_element_id: String,
}

impl PagesConfig {
    fn default_title() -> String {
        "App".into()
    }

    fn default_asset_version() -> String {
        "1".into()
    }

    fn default_root_element_id() -> String {
        "app".into()
    }

    pub fn validate(&self) -> Result<()> {
        let id = &self.root_element_id;
        if id.is_empty()
            || !id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(Error::config(format!(
                "[pages] root_element_id \"{id}\" must be a non-empty HTML id (letters, digits, '-' or '_')."
            )));
        }
        Ok(())
    }
}

impl Default for PagesConfig {
    fn default() -> Self {
        Self {
            title: Self::default_title(),
            asset_version: Self::default_asset_version(),
            root_element_id: Self::default_root_element_id(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(PagesConfig::default().validate().is_ok());
    }

    #[test]
    fn test_root_element_id_must_be_plain() {
        let pages = PagesConfig {
            root_element_id: "app\" onload=\"x".into(),
            ..PagesConfig::default()
        };
        assert!(pages.validate().is_err());
    }
}
