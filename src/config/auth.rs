//! Credentials and redirect targets for the `auth` and `verified` guards.
//!
//! # Example
//!
//! ```toml
//! [auth]
//! mode = "either"  # "basic", "api_key" or "either"
//! api_key_header = "X-API-Key"
//! login_route = "/login"
//! verification_route = "/verify-email"
//!
//! [[auth.users]]
//! username = "taylor"
//! password = "{{ TAYLOR_PASSWORD }}"
//! email_verified = true
//!
//! [[auth.api_keys]]
//! key = "{{ API_KEY }}"
//! name = "frontend-service"
//! ```

use crate::{Error, Result, utils::Sensitive};
use serde::Deserialize;

/// Determines which credential types the `auth` guard accepts.
#[derive(Debug, Clone, Copy, Deserialize, Default, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum AuthMode {
    /// Only HTTP Basic Auth (RFC 7617) is accepted.
    Basic,
    /// Only API Key authentication is accepted.
    ApiKey,
    /// Either HTTP Basic Auth or API Key is accepted (default).
    #[default]
    Either,
}

/// A single user credential.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthUser {
    pub username: String,
    pub password: Sensitive<String>,
    /// Whether the user has confirmed their email address.
    /// Unverified users pass `auth` but are stopped by `verified`.
    #[serde(default)]
    pub email_verified: bool,
}

/// A single API key credential. API key identities always count as verified.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthApiKey {
    pub key: Sensitive<String>,
    /// Optional friendly name for logging and auditing purposes.
    #[serde(default)]
    pub name: Option<String>,
}

/// The `[auth]` configuration section.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    #[serde(default)]
    pub mode: AuthMode,

    /// Header name for API key authentication. Defaults to "X-API-Key".
    #[serde(default = "AuthConfig::default_api_key_header")]
    pub api_key_header: String,

    /// Where unauthenticated browser requests are redirected.
    /// Defaults to "/login".
    #[serde(default = "AuthConfig::default_login_route")]
    pub login_route: String,

    /// Where unverified browser requests are redirected.
    /// Defaults to "/verify-email".
    #[serde(default = "AuthConfig::default_verification_route")]
    pub verification_route: String,

    #[serde(default)]
    pub users: Vec<AuthUser>,

    #[serde(default)]
    pub api_keys: Vec<AuthApiKey>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            mode: AuthMode::default(),
            api_key_header: Self::default_api_key_header(),
            login_route: Self::default_login_route(),
            verification_route: Self::default_verification_route(),
            users: Vec::new(),
            api_keys: Vec::new(),
        }
    }
}

impl AuthConfig {
    fn default_api_key_header() -> String {
        "X-API-Key".to_string()
    }

    fn default_login_route() -> String {
        "/login".to_string()
    }

    fn default_verification_route() -> String {
        "/verify-email".to_string()
    }

    /// Validates the auth configuration.
    ///
    /// An empty credential list is allowed; every guarded request is then
    /// denied.
    pub fn validate(&self) -> Result<()> {
        for (key, route) in [
            ("login_route", &self.login_route),
            ("verification_route", &self.verification_route),
        ] {
            if !route.starts_with('/') {
                return Err(Error::invalid_input(format!(
                    "[auth] {key} must be an absolute path starting with '/', got \"{route}\"."
                )));
            }
        }

        for user in &self.users {
            if user.username.trim().is_empty() {
                return Err(Error::invalid_input("Auth username cannot be empty."));
            }
            if user.username.contains(':') {
                return Err(Error::invalid_input(format!(
                    "Auth username \"{}\" cannot contain ':'.",
                    user.username
                )));
            }
            if user.password.0.is_empty() {
                return Err(Error::invalid_input(
                    "Auth password cannot be empty. Use {{ ENV_VAR }} for secrets.",
                ));
            }
        }

        for api_key in &self.api_keys {
            if api_key.key.0.is_empty() {
                return Err(Error::invalid_input(
                    "API key cannot be empty. Use {{ ENV_VAR }} for secrets.",
                ));
            }
        }

        if self.api_key_header.trim().is_empty() {
            return Err(Error::invalid_input("API key header name cannot be empty."));
        }

        if self.users.is_empty() && self.api_keys.is_empty() {
            tracing::warn!("No [auth] credentials configured; guarded routes will deny every request");
        }

        Ok(())
    }
}
