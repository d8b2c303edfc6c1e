//! The HTTP server around a [`RouteTable`].

mod middleware;
mod serve;
#[cfg(test)]
mod tests;

use {
    crate::{Config, Error, GuardRegistry, HttpMiddleware, Result, RouteTable, normalize_path},
    axum::{
        Router,
        http::{HeaderValue, Method, StatusCode, Uri, header},
        response::{IntoResponse, Response},
    },
    std::sync::Arc,
};

/// Serves a [`RouteTable`] with configuration-driven middleware.
///
/// Created from a finished table and the guards its routes refer to; the
/// table stays available through [`PageServer::table`] for lookups such as
/// [`RouteTable::url_for`].
///
/// Requests the table does not know get a JSON 404. A request whose path is
/// not canonical (a trailing slash, repeated leading slashes) but whose
/// canonical form is registered is redirected (308) to the canonical path.
///
/// ```rust,no_run
/// use page_routes::{AppState, Config, GuardRegistry, PageServer, web};
///
/// # async fn example() -> page_routes::Result<()> {
/// let config = Config::default();
/// let state = AppState::from_config(&config);
/// let guards = GuardRegistry::from_config(&config.auth);
///
/// PageServer::new(config, state, web::route_table()?, &guards)?
///     .setup_middleware()
///     .start()
///     .await
/// # }
/// ```
pub struct PageServer<S = ()> {
    pub(crate) config: Config,
    pub(crate) state: S,
    pub(crate) table: Arc<RouteTable<S>>,
    pub(crate) inner: Router<S>,
}

impl<S> PageServer<S>
where
    S: Clone + Send + Sync + 'static,
{
    /// Creates the server.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Configuration validation fails
    /// - A route names a guard missing from `guards` (`UnknownGuard`)
    pub fn new(config: Config, state: S, table: RouteTable<S>, guards: &GuardRegistry) -> Result<Self> {
        config.validate()?;

        let table = Arc::new(table);
        let inner = table
            .into_router(guards)?
            .fallback(unmatched(Arc::clone(&table)))
            .method_not_allowed_fallback(unmatched(Arc::clone(&table)));

        tracing::debug!(routes = table.len(), ?guards, "Page server created");

        Ok(Self {
            config,
            state,
            table,
            inner,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn table(&self) -> &RouteTable<S> {
        &self.table
    }

    /// Returns true if the given middleware should be installed.
    pub(crate) fn is_middleware_enabled(&self, middleware: HttpMiddleware) -> bool {
        self.config.http.is_middleware_enabled(middleware)
    }

    /// Consumes the server and returns the underlying `axum::Router`.
    ///
    /// The state has not been applied yet; use [`PageServer::into_router`]
    /// for a router that can serve requests directly.
    pub fn into_inner(self) -> Router<S> {
        self.inner
    }

    /// Consumes the server and returns a router with the state applied.
    pub fn into_router(self) -> Router {
        self.inner.with_state(self.state)
    }
}

/// Fallback handler for requests no route matched.
fn unmatched<S>(
    table: Arc<RouteTable<S>>,
) -> impl Fn(Method, Uri) -> std::future::Ready<Response> + Clone + Send + Sync + 'static
where
    S: Send + Sync + 'static,
{
    move |method: Method, uri: Uri| std::future::ready(unmatched_response(&table, &method, &uri))
}

fn unmatched_response<S>(table: &RouteTable<S>, method: &Method, uri: &Uri) -> Response {
    let path = uri.path();
    let mut location = normalize_path(path);
    if location != path && table.dispatch(method, path).is_ok() {
        if let Some(query) = uri.query() {
            location.push('?');
            location.push_str(query);
        }
        return match HeaderValue::from_str(&location) {
            Ok(location) => {
                (StatusCode::PERMANENT_REDIRECT, [(header::LOCATION, location)]).into_response()
            }
            Err(_) => Error::internal("Unable to build redirect location").into_response(),
        };
    }

    Error::not_found(format!("No route for {method} {path}")).into_response()
}
