//! Route definitions and the entries stored in a route table.

use {
    crate::{Error, Result},
    axum::{
        handler::Handler,
        routing::{MethodFilter, MethodRouter, on},
    },
    http::Method,
    std::fmt,
};

/// A route waiting to be registered with a [`RouteTableBuilder`](super::RouteTableBuilder).
///
/// `handler` is the symbolic identifier reported by [`RouteTable::dispatch`](super::RouteTable::dispatch);
/// the callable handler is kept alongside it as an axum `MethodRouter`.
///
/// ```rust
/// use page_routes::Route;
///
/// let route: Route<()> = Route::get("/health", "health", || async { "OK" }).name("health");
/// assert_eq!(route.path(), "/health");
/// ```
pub struct Route<S = ()> {
    method: Method,
    path: String,
    handler: String,
    name: Option<String>,
    method_router: MethodRouter<S>,
}

impl<S> Route<S>
where
    S: Clone + Send + Sync + 'static,
{
    /// Creates a route for an arbitrary method.
    ///
    /// Fails with `InvalidInput` for methods axum cannot route (extension methods).
    pub fn new<H, T>(method: Method, path: &str, handler_id: &str, handler: H) -> Result<Self>
    where
        H: Handler<T, S>,
        T: 'static,
    {
        let filter = method_filter(&method)?;
        Ok(Self::with_method_router(
            method,
            path,
            handler_id,
            on(filter, handler),
        ))
    }

    pub fn get<H, T>(path: &str, handler_id: &str, handler: H) -> Self
    where
        H: Handler<T, S>,
        T: 'static,
    {
        Self::with_method_router(
            Method::GET,
            path,
            handler_id,
            axum::routing::get(handler),
        )
    }

    pub fn post<H, T>(path: &str, handler_id: &str, handler: H) -> Self
    where
        H: Handler<T, S>,
        T: 'static,
    {
        Self::with_method_router(
            Method::POST,
            path,
            handler_id,
            axum::routing::post(handler),
        )
    }

    pub fn put<H, T>(path: &str, handler_id: &str, handler: H) -> Self
    where
        H: Handler<T, S>,
        T: 'static,
    {
        Self::with_method_router(Method::PUT, path, handler_id, axum::routing::put(handler))
    }

    pub fn patch<H, T>(path: &str, handler_id: &str, handler: H) -> Self
    where
        H: Handler<T, S>,
        T: 'static,
    {
        Self::with_method_router(
            Method::PATCH,
            path,
            handler_id,
            axum::routing::patch(handler),
        )
    }

    pub fn delete<H, T>(path: &str, handler_id: &str, handler: H) -> Self
    where
        H: Handler<T, S>,
        T: 'static,
    {
        Self::with_method_router(
            Method::DELETE,
            path,
            handler_id,
            axum::routing::delete(handler),
        )
    }

    fn with_method_router(
        method: Method,
        path: &str,
        handler_id: &str,
        method_router: MethodRouter<S>,
    ) -> Self {
        Self {
            method,
            path: normalize_path(path),
            handler: handler_id.to_string(),
            name: None,
            method_router,
        }
    }

    /// Names the route for reverse lookup with [`RouteTable::url_for`](super::RouteTable::url_for).
    #[must_use]
    pub fn name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    /// The canonical path of this route.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub(crate) fn into_entry(self, guards: Vec<String>) -> RouteEntry<S> {
        RouteEntry {
            method: self.method,
            path: self.path,
            handler: self.handler,
            name: self.name,
            guards,
            method_router: self.method_router,
        }
    }
}

/// A registered route together with the guards it inherited from its groups.
pub struct RouteEntry<S = ()> {
    pub(crate) method: Method,
    pub(crate) path: String,
    pub(crate) handler: String,
    pub(crate) name: Option<String>,
    pub(crate) guards: Vec<String>,
    pub(crate) method_router: MethodRouter<S>,
}

impl<S> RouteEntry<S> {
    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Symbolic identifier of the handler.
    pub fn handler(&self) -> &str {
        &self.handler
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Guard ids in execution order, outermost group first.
    pub fn guards(&self) -> &[String] {
        &self.guards
    }

    /// The name used for this route in logs: its name, or the handler id.
    pub(crate) fn label(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.handler)
    }
}

impl<S> fmt::Debug for RouteEntry<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteEntry")
            .field("method", &self.method)
            .field("path", &self.path)
            .field("handler", &self.handler)
            .field("name", &self.name)
            .field("guards", &self.guards)
            .finish_non_exhaustive()
    }
}

/// Brings a path into canonical form: a leading `/` and no trailing `/`
/// except for the root itself. The query string, if any, is dropped.
///
/// ```rust
/// use page_routes::normalize_path;
///
/// assert_eq!(normalize_path("dashboard"), "/dashboard");
/// assert_eq!(normalize_path("/settings/profile/"), "/settings/profile");
/// assert_eq!(normalize_path("/max-upload?x=1"), "/max-upload");
/// assert_eq!(normalize_path(""), "/");
/// ```
pub fn normalize_path(path: &str) -> String {
    let path = path.split_once('?').map_or(path, |(path, _)| path);
    let trimmed = path.trim_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        format!("/{trimmed}")
    }
}

fn method_filter(method: &Method) -> Result<MethodFilter> {
    let filter = match *method {
        Method::GET => MethodFilter::GET,
        Method::POST => MethodFilter::POST,
        Method::PUT => MethodFilter::PUT,
        Method::PATCH => MethodFilter::PATCH,
        Method::DELETE => MethodFilter::DELETE,
        Method::HEAD => MethodFilter::HEAD,
        Method::OPTIONS => MethodFilter::OPTIONS,
        Method::TRACE => MethodFilter::TRACE,
        Method::CONNECT => MethodFilter::CONNECT,
        _ => {
            return Err(Error::invalid_input(format!(
                "Method {method} cannot be routed"
            )));
        }
    };
    Ok(filter)
}
