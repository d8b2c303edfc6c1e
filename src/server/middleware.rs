//! Standard middleware layers: logging, timeouts, request ids and panic recovery.

use {
    super::PageServer,
    crate::{Error, HttpMiddleware, RequestIdGenerator},
    axum::{
        body::Body,
        http::{HeaderName, Request, StatusCode},
        response::{IntoResponse, Response},
    },
    tower_http::{
        catch_panic::CatchPanicLayer,
        request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
        timeout::TimeoutLayer,
        trace::TraceLayer,
    },
};

const X_REQUEST_ID: &str = "x-request-id";

impl<S> PageServer<S>
where
    S: Clone + Send + Sync + 'static,
{
    /// Installs every enabled middleware layer in order.
    ///
    /// Layers are added from innermost to outermost; the last one added runs
    /// first on incoming requests:
    ///
    /// ```rust,no_run
    /// # use page_routes::{Config, GuardRegistry, PageServer, RouteTableBuilder};
    /// # fn example() -> page_routes::Result<()> {
    /// # let table = RouteTableBuilder::<()>::new().build()?;
    /// let server = PageServer::new(Config::default(), (), table, &GuardRegistry::new())?
    ///     .setup_logging()     // request span with `route` and `user` fields
    ///     .setup_timeout()     // 408 after `http.request_timeout`
    ///     .setup_request_id()  // before logging so the span sees the id
    ///     .setup_catch_panic(); // outermost
    /// # Ok(())
    /// # }
    /// ```
    #[must_use]
    pub fn setup_middleware(self) -> Self {
        const PACKAGE_NAME: &str = env!("CARGO_PKG_NAME");
        const VERSION: &str = env!("CARGO_PKG_VERSION");
        tracing::info!("Starting {PACKAGE_NAME} version {VERSION}...");

        self.setup_logging()
            .setup_timeout()
            .setup_request_id()
            .setup_catch_panic()
    }

    /// Sets up HTTP request/response logging.
    ///
    /// Every request runs inside an `http_request` span carrying the method,
    /// uri and request id. Two more fields are filled in later: `route` with
    /// the matched route's name (or handler id), and `user` once the `auth`
    /// guard has identified the caller.
    #[must_use]
    pub fn setup_logging(mut self) -> Self {
        if !self.is_middleware_enabled(HttpMiddleware::Logging) {
            return self;
        }

        self.inner = self.inner.layer(TraceLayer::new_for_http().make_span_with(
            |request: &Request<Body>| {
                let request_id = request
                    .headers()
                    .get(X_REQUEST_ID)
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("unknown");

                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = %request_id,
                    route = tracing::field::Empty,
                    user = tracing::field::Empty,
                )
            },
        ));
        self
    }

    /// Answers 408 Request Timeout when a request runs longer than
    /// `http.request_timeout`. Does nothing when no timeout is configured.
    #[must_use]
    pub fn setup_timeout(mut self) -> Self {
        if !self.is_middleware_enabled(HttpMiddleware::Timeout) {
            return self;
        }

        if let Some(timeout) = self.config.http.request_timeout {
            self.inner = self.inner.layer(TimeoutLayer::with_status_code(
                StatusCode::REQUEST_TIMEOUT,
                timeout,
            ));
        }
        self
    }

    /// Keeps an incoming `x-request-id` or generates a UUIDv7 one, and copies
    /// it onto the response.
    #[must_use]
    pub fn setup_request_id(mut self) -> Self {
        if !self.is_middleware_enabled(HttpMiddleware::RequestId) {
            return self;
        }

        let x_request_id = HeaderName::from_static(X_REQUEST_ID);
        self.inner = self
            .inner
            .layer(SetRequestIdLayer::new(
                x_request_id.clone(),
                RequestIdGenerator,
            ))
            .layer(PropagateRequestIdLayer::new(x_request_id));
        self
    }

    /// Turns a panicking handler into a 500 response and keeps serving.
    #[must_use]
    pub fn setup_catch_panic(mut self) -> Self {
        if !self.is_middleware_enabled(HttpMiddleware::CatchPanic) {
            return self;
        }

        self.inner = self.inner.layer(CatchPanicLayer::custom(
            |err: Box<dyn std::any::Any + Send + 'static>| -> Response {
                let msg = if let Some(s) = err.downcast_ref::<String>() {
                    s.as_str()
                } else if let Some(s) = err.downcast_ref::<&str>() {
                    s
                } else {
                    "unknown panic payload"
                };

                tracing::error!("Service panicked: {}", msg);
                Error::internal("Internal Server Error").into_response()
            },
        ));
        self
    }
}
