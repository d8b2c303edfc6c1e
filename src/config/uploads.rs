use {
    crate::{Error, Result, utils::parse_size_shorthand},
    serde::Deserialize,
};

pub const UPLOAD_MAX_FILESIZE: &str = "upload_max_filesize";
pub const POST_MAX_SIZE: &str = "post_max_size";

///
/// Upload limits reported by the `/max-upload` endpoint.
///
/// Values are kept verbatim as strings in shorthand notation (`"2M"`,
/// `"512K"`, `"0"` for unlimited) so clients see exactly what the operator
/// configured.
///
/// ```toml
/// [uploads]
/// upload_max_filesize = "64M"
/// post_max_size = "64M"
/// ```
///
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct UploadsConfig {
    /// Largest single uploaded file. Defaults to "2M".
    #[serde(default = "UploadsConfig::default_upload_max_filesize")]
    pub upload_max_filesize: String,

    /// Largest request body. Defaults to "8M".
    #[serde(default = "UploadsConfig::default_post_max_size")]
    pub post_max_size: String,
}

impl UploadsConfig {
    fn default_upload_max_filesize() -> String {
        "2M".into()
    }

    fn default_post_max_size() -> String {
        "8M".into()
    }

    /// Looks up a limit by its key.
    pub fn get(&self, key: &str) -> Option<&str> {
        match key {
            UPLOAD_MAX_FILESIZE => Some(&self.upload_max_filesize),
            POST_MAX_SIZE => Some(&self.post_max_size),
            _ => None,
        }
    }

    /// Both limits must be valid shorthand sizes. A body limit smaller than
    /// the file limit makes the file limit unreachable, which is only
    /// logged since it is a legal (if odd) setup.
    pub fn validate(&self) -> Result<()> {
        let upload = parse_size_shorthand(&self.upload_max_filesize).ok_or_else(|| {
            Error::config(format!(
                "[uploads] upload_max_filesize \"{}\" is not a valid size. Examples: \"2M\", \"512K\", \"1048576\"",
                self.upload_max_filesize
            ))
        })?;
        let post = parse_size_shorthand(&self.post_max_size).ok_or_else(|| {
            Error::config(format!(
                "[uploads] post_max_size \"{}\" is not a valid size. Examples: \"8M\", \"1G\"",
                self.post_max_size
            ))
        })?;

        let (upload, post) = (upload.as_u64(), post.as_u64());
        if upload > 0 && post > 0 && post < upload {
            tracing::warn!(
                upload_max_filesize = %self.upload_max_filesize,
                post_max_size = %self.post_max_size,
                "post_max_size is smaller than upload_max_filesize"
            );
        }

        Ok(())
    }
}

impl Default for UploadsConfig {
    fn default() -> Self {
        Self {
            upload_max_filesize: Self::default_upload_max_filesize(),
            post_max_size: Self::default_post_max_size(),
        }
    }
}
