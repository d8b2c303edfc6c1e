//! The `auth` guard: HTTP Basic Auth and API key credentials.

use {
    super::{AuthMethod, AuthenticatedUser, Guard, GuardDecision, expects_json, json_message, redirect_found},
    crate::{AuthConfig, AuthMode, Error},
    axum::{
        extract::Request,
        http::{HeaderMap, HeaderValue, StatusCode, header},
        response::{IntoResponse, Response},
    },
    base64::{Engine, engine::general_purpose::STANDARD as BASE64},
};

/// Requires valid credentials from `[[auth.users]]` or `[[auth.api_keys]]`.
///
/// On success the [`AuthenticatedUser`] is stored in the request extensions
/// and recorded as the `user` of the request span. On failure, clients that
/// expect JSON get `401 {"message": "Unauthenticated."}` and everyone else is
/// redirected to the login route.
#[derive(Debug, Clone)]
pub struct AuthGuard {
    config: AuthConfig,
}

impl AuthGuard {
    pub fn new(config: AuthConfig) -> Self {
        Self { config }
    }

    /// Looks for credentials the configured mode accepts.
    ///
    /// `Ok(None)` means no valid credentials were presented; `Err` carries a
    /// 400 for a malformed header.
    #[allow(clippy::result_large_err)]
    pub(crate) fn authenticate(
        &self,
        headers: &HeaderMap,
    ) -> Result<Option<AuthenticatedUser>, Response> {
        if matches!(self.config.mode, AuthMode::Basic | AuthMode::Either)
            && let Some(user) = self.try_basic_auth(headers)?
        {
            return Ok(Some(user));
        }

        if matches!(self.config.mode, AuthMode::ApiKey | AuthMode::Either)
            && let Some(user) = self.try_api_key(headers)?
        {
            return Ok(Some(user));
        }

        Ok(None)
    }

    #[allow(clippy::result_large_err)]
    fn try_basic_auth(&self, headers: &HeaderMap) -> Result<Option<AuthenticatedUser>, Response> {
        let auth_header = match headers.get(header::AUTHORIZATION) {
            Some(value) => value.to_str().map_err(|_| bad_request_response())?,
            None => return Ok(None),
        };

        let Some(encoded) = auth_header.strip_prefix("Basic ") else {
            return Ok(None);
        };

        let decoded = BASE64.decode(encoded).map_err(|_| bad_request_response())?;
        let credentials = String::from_utf8(decoded).map_err(|_| bad_request_response())?;
        let (username, password) = credentials
            .split_once(':')
            .ok_or_else(bad_request_response)?;

        let user = self.config.users.iter().find(|user| {
            user.username == username
                && constant_time_compare(password.as_bytes(), user.password.0.as_bytes())
        });

        Ok(user.map(|user| AuthenticatedUser {
            method: AuthMethod::BasicAuth,
            name: user.username.clone(),
            email_verified: user.email_verified,
        }))
    }

    #[allow(clippy::result_large_err)]
    fn try_api_key(&self, headers: &HeaderMap) -> Result<Option<AuthenticatedUser>, Response> {
        let api_key = match headers.get(self.config.api_key_header.as_str()) {
            Some(value) => value.to_str().map_err(|_| bad_request_response())?,
            None => return Ok(None),
        };

        let key = self
            .config
            .api_keys
            .iter()
            .find(|key| constant_time_compare(api_key.as_bytes(), key.key.0.as_bytes()));

        Ok(key.map(|key| AuthenticatedUser {
            method: AuthMethod::ApiKey,
            name: key.name.clone().unwrap_or_else(|| "api-key".to_string()),
            email_verified: true,
        }))
    }

    fn unauthenticated(&self, headers: &HeaderMap) -> Response {
        if !expects_json(headers) {
            return redirect_found(&self.config.login_route);
        }

        let mut response = json_message(StatusCode::UNAUTHORIZED, "Unauthenticated.");
        if matches!(self.config.mode, AuthMode::Basic | AuthMode::Either) {
            response.headers_mut().insert(
                header::WWW_AUTHENTICATE,
                HeaderValue::from_static("Basic realm=\"app\""),
            );
        }
        response
    }
}

impl Guard for AuthGuard {
    fn check(&self, request: &mut Request) -> GuardDecision {
        if request.extensions().get::<AuthenticatedUser>().is_some() {
            return GuardDecision::Allow;
        }

        match self.authenticate(request.headers()) {
            Ok(Some(user)) => {
                tracing::debug!(method = ?user.method, name = %user.name, "Request authenticated");
                tracing::Span::current().record("user", user.name.as_str());
                request.extensions_mut().insert(user);
                GuardDecision::Allow
            }
            Ok(None) => GuardDecision::Deny(self.unauthenticated(request.headers())),
            Err(response) => GuardDecision::Deny(response),
        }
    }
}

fn constant_time_compare(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b.iter()).fold(0, |acc, (x, y)| acc | (x ^ y)) == 0
}

fn bad_request_response() -> Response {
    Error::invalid_input("Invalid authentication format").into_response()
}
