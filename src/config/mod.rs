//!
//! Configuration structures for wiring up the page server.
//!
//! A configuration can be created in several ways:
//! - From an environment-specific TOML file via `Config::from_rust_env` or `Config::from_toml_file`
//! - From a TOML string via `Config::from_toml` or `str::parse`
//! - Constructed programmatically via the builder methods on `Config`
//!
//! In both TOML-based methods, environment variables can be referenced using
//! the {{ VAR_NAME }} syntax and are substituted before parsing, which keeps
//! passwords and API keys out of the TOML files.
//!
//! Configuration is split into logical sections, each with its own struct:
//!
//! - `HttpConfig` for the HTTP server
//! - `LoggingConfig` for log output
//! - `FeaturesConfig` for the initial feature flags
//! - `UploadsConfig` for the upload limits served at `/max-upload`
//! - `PagesConfig` for the page renderer
//! - `AuthConfig` for the `auth` and `verified` guards
//!
mod auth;
mod features;
mod http;
mod logging;
mod pages;
mod uploads;

pub use auth::*;
pub use features::*;
pub use http::*;
pub use logging::*;
pub use pages::*;
pub use uploads::*;

pub use byte_unit::Byte;

use {
    crate::{Error, Result, utils::replace_handlebars_with_env},
    serde::Deserialize,
    std::{env, fs, str::FromStr, time::Duration},
};

#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub features: FeaturesConfig,
    #[serde(default)]
    pub uploads: UploadsConfig,
    #[serde(default)]
    pub pages: PagesConfig,
    #[serde(default)]
    pub auth: AuthConfig,
}

impl Config {
    ///
    /// Loads the configuration from `config/{RUST_ENV}.toml`, falling back to
    /// the built-in defaults when RUST_ENV is unset or the file cannot be read.
    ///
    pub fn from_rust_env_or_default() -> Config {
        match Self::from_rust_env() {
            Ok(config) => config,
            Err(err) => {
                tracing::debug!("Using default configuration: {err}");
                Config::default()
            }
        }
    }

    ///
    /// Loads the configuration from a file based on the RUST_ENV environment variable.
    ///
    pub fn from_rust_env() -> Result<Config> {
        Self::from_toml_file(env::var("RUST_ENV")?)
    }

    ///
    /// Given an environment name, loads "config/{env}.toml", substitutes any
    /// environment variables, and parses the result.
    ///
    pub fn from_toml_file(env: impl AsRef<str>) -> Result<Config> {
        let path = format!("config/{}.toml", env.as_ref());
        let text = fs::read_to_string(path)?;
        Self::from_toml(&text)
    }

    ///
    /// Parses a configuration string in TOML format into a Config struct.
    ///
    pub fn from_toml(toml_str: &str) -> Result<Config> {
        toml_str.parse()
    }

    /// Sets the HTTP server bind address of the HttpConfig.
    pub fn with_bind_addr<S: AsRef<str>>(mut self, addr: S) -> Self {
        self.http.bind_addr = addr.as_ref().into();
        self
    }

    /// Sets the HTTP server bind port of the HttpConfig.
    pub fn with_bind_port(mut self, port: u16) -> Self {
        self.http.bind_port = port;
        self
    }

    /// Sets the request timeout duration of the HttpConfig.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.http.request_timeout = Some(timeout);
        self
    }

    /// Sets the graceful shutdown timeout of the HttpConfig.
    pub fn with_shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.http.shutdown_timeout = timeout;
        self
    }

    /// Activates all standard middleware layers except the specified ones.
    pub fn with_excluded_middlewares(mut self, middlewares: Vec<HttpMiddleware>) -> Self {
        self.http.middleware = Some(HttpMiddlewareConfig::Exclude(middlewares));
        self
    }

    /// Sets the log format of the LoggingConfig.
    pub fn with_log_format(mut self, format: LogFormat) -> Self {
        self.logging.format = format;
        self
    }

    /// Sets the initial value of a feature flag.
    pub fn with_feature(mut self, flag: &str, enabled: bool) -> Self {
        self.features = self.features.with_flag(flag, enabled);
        self
    }

    /// Sets both upload limits.
    pub fn with_upload_limits(mut self, upload_max_filesize: &str, post_max_size: &str) -> Self {
        self.uploads.upload_max_filesize = upload_max_filesize.into();
        self.uploads.post_max_size = post_max_size.into();
        self
    }

    /// Sets the front-end asset version reported by the page renderer.
    pub fn with_asset_version(mut self, version: &str) -> Self {
        self.pages.asset_version = version.into();
        self
    }

    /// Adds a user that the `auth` guard accepts.
    pub fn with_user(mut self, username: &str, password: &str, email_verified: bool) -> Self {
        self.auth.users.push(AuthUser {
            username: username.into(),
            password: crate::Sensitive::from(password),
            email_verified,
        });
        self
    }

    /// Ensures that every section holds usable values.
    pub fn validate(&self) -> Result<()> {
        self.http.validate()?;
        self.logging.validate()?;
        self.uploads.validate()?;
        self.pages.validate()?;
        self.auth.validate()?;
        Ok(())
    }

    ///
    /// Sets up the tracing subscriber for logging based on the LoggingConfig.
    ///
    /// NOTE: This should be called early during startup to ensure logging is configured
    ///       before any log messages are emitted.
    ///
    pub fn setup_tracing(&self) {
        use tracing_subscriber::{EnvFilter, prelude::*};
        let env_filter = EnvFilter::from_default_env();
        match self.logging.format {
            LogFormat::Json => {
                let _ = tracing_subscriber::registry()
                    .with(tracing_subscriber::fmt::layer().json())
                    .with(env_filter)
                    .try_init();
            }
            LogFormat::Default => {
                let _ = tracing_subscriber::registry()
                    .with(tracing_subscriber::fmt::layer())
                    .with(env_filter)
                    .try_init();
            }
            LogFormat::Compact => {
                let _ = tracing_subscriber::registry()
                    .with(tracing_subscriber::fmt::layer().compact())
                    .with(env_filter)
                    .try_init();
            }
            LogFormat::Pretty => {
                let _ = tracing_subscriber::registry()
                    .with(tracing_subscriber::fmt::layer().pretty())
                    .with(env_filter)
                    .try_init();
            }
        }
    }
}

///
/// Parses a configuration string with references to environment variables
/// by substituting them and then parsing the resulting TOML.
///
impl FromStr for Config {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self> {
        let config_file = replace_handlebars_with_env(s);
        let config = toml::from_str::<Config>(&config_file)?;
        Ok(config)
    }
}
