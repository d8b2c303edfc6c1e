//! Route guards.
//!
//! A guard inspects a request before the handler runs and either lets it
//! through or answers it directly. Routes refer to guards by id (`"auth"`,
//! `"verified"`); a [`GuardRegistry`] maps those ids to implementations when
//! the route table is turned into a router.
//!
//! Guards run in the order their groups declared them and the first denial
//! wins, so `["auth", "verified"]` never checks verification for an
//! anonymous request.

mod auth;
mod verified;

pub use auth::AuthGuard;
pub use verified::VerifiedGuard;

use {
    crate::{AuthConfig, Error, Result},
    axum::{
        Json,
        extract::Request,
        http::{HeaderMap, HeaderValue, StatusCode, header},
        middleware::Next,
        response::{IntoResponse, Response},
    },
    serde_json::json,
    std::{collections::HashMap, fmt, sync::Arc},
};

/// Id of the guard that requires an authenticated user.
pub const AUTH: &str = "auth";

/// Id of the guard that requires a verified email address.
pub const VERIFIED: &str = "verified";

/// Outcome of a guard check.
#[derive(Debug)]
pub enum GuardDecision {
    Allow,
    /// Stop here and send this response instead of running the handler.
    Deny(Response),
}

/// A check that runs before a guarded handler.
///
/// Guards may add data to the request extensions for later guards and the
/// handler, which is how `auth` hands the [`AuthenticatedUser`] to `verified`.
///
/// Closures taking `&mut Request` are guards too:
///
/// ```rust
/// use page_routes::{GuardDecision, GuardRegistry};
/// use axum::{extract::Request, http::StatusCode, response::IntoResponse};
///
/// let guards = GuardRegistry::new().with_guard("admin", |request: &mut Request| {
///     if request.headers().contains_key("x-admin") {
///         GuardDecision::Allow
///     } else {
///         GuardDecision::Deny(StatusCode::FORBIDDEN.into_response())
///     }
/// });
/// assert!(guards.contains("admin"));
/// ```
pub trait Guard: Send + Sync + 'static {
    fn check(&self, request: &mut Request) -> GuardDecision;
}

impl<F> Guard for F
where
    F: Fn(&mut Request) -> GuardDecision + Send + Sync + 'static,
{
    fn check(&self, request: &mut Request) -> GuardDecision {
        self(request)
    }
}

/// The identity established by the `auth` guard.
///
/// Available to handlers behind `auth` through `Extension<AuthenticatedUser>`.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthenticatedUser {
    pub method: AuthMethod,
    /// Username (Basic Auth) or API key name.
    pub name: String,
    pub email_verified: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AuthMethod {
    /// HTTP Basic Auth (RFC 7617).
    BasicAuth,
    ApiKey,
}

/// Maps guard ids to guard implementations.
#[derive(Clone, Default)]
pub struct GuardRegistry {
    guards: HashMap<String, Arc<dyn Guard>>,
}

impl GuardRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `auth` and `verified` backed by the `[auth]` section.
    pub fn from_config(config: &AuthConfig) -> Self {
        Self::new()
            .with_guard(AUTH, AuthGuard::new(config.clone()))
            .with_guard(VERIFIED, VerifiedGuard::new(&config.verification_route))
    }

    /// Adds or replaces the guard registered under `id`.
    #[must_use]
    pub fn with_guard(mut self, id: &str, guard: impl Guard) -> Self {
        self.guards.insert(id.to_string(), Arc::new(guard));
        self
    }

    pub fn contains(&self, id: &str) -> bool {
        self.guards.contains_key(id)
    }

    /// Resolves a list of guard ids into a runnable chain.
    ///
    /// # Errors
    ///
    /// `UnknownGuard` for the first id that is not registered.
    pub fn chain(&self, ids: &[String]) -> Result<GuardChain> {
        let guards = ids
            .iter()
            .map(|id| {
                self.guards
                    .get(id)
                    .map(|guard| (id.clone(), Arc::clone(guard)))
                    .ok_or_else(|| Error::unknown_guard(id))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(GuardChain { guards })
    }
}

impl fmt::Debug for GuardRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut ids: Vec<&str> = self.guards.keys().map(String::as_str).collect();
        ids.sort_unstable();
        f.debug_struct("GuardRegistry").field("guards", &ids).finish()
    }
}

/// The guards of one route, resolved and in order.
pub struct GuardChain {
    guards: Vec<(String, Arc<dyn Guard>)>,
}

impl GuardChain {
    pub fn is_empty(&self) -> bool {
        self.guards.is_empty()
    }

    pub fn len(&self) -> usize {
        self.guards.len()
    }

    /// Runs every guard, then the rest of the stack if all of them allow.
    pub async fn run(&self, mut request: Request, next: Next) -> Response {
        for (id, guard) in &self.guards {
            if let GuardDecision::Deny(response) = guard.check(&mut request) {
                tracing::info!(
                    guard = %id,
                    status = response.status().as_u16(),
                    "Request denied by guard"
                );
                return response;
            }
        }
        next.run(request).await
    }
}

/// Whether the client asked for a JSON answer rather than a page.
///
/// Page-protocol requests (`X-Inertia`) are navigations and get redirects.
pub(crate) fn expects_json(headers: &HeaderMap) -> bool {
    if headers.contains_key(crate::pages::X_INERTIA) {
        return false;
    }
    headers
        .get(header::ACCEPT)
        .and_then(|accept| accept.to_str().ok())
        .and_then(|accept| accept.split(',').next())
        .is_some_and(|first| first.contains("/json") || first.contains("+json"))
}

/// A JSON body of the form `{"message": "..."}`.
pub(crate) fn json_message(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "message": message }))).into_response()
}

/// A `302 Found` redirect.
///
/// Falls back to a 500 when `location` is not a valid header value.
pub fn redirect_found(location: &str) -> Response {
    match HeaderValue::from_str(location) {
        Ok(value) => (StatusCode::FOUND, [(header::LOCATION, value)]).into_response(),
        Err(_) => Error::internal(format!("Invalid redirect location {location:?}")).into_response(),
    }
}
