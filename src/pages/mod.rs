//! Server-rendered pages.
//!
//! Handlers describe a page as a front-end component name plus props and
//! hand it to a [`PageRenderer`], which decides how it reaches the client.
//! [`InertiaRenderer`] speaks the Inertia protocol: a JSON page object for
//! client-side navigations and an HTML shell for the first visit.

mod inertia;

pub use inertia::InertiaRenderer;

use {
    axum::{
        extract::FromRequestParts,
        http::{HeaderMap, Method, Uri, request::Parts},
        response::Response,
    },
    serde::Serialize,
    serde_json::{Map, Value},
    std::convert::Infallible,
};

/// Marks a client-side navigation.
pub const X_INERTIA: &str = "x-inertia";
/// Asset version the client was built against.
pub const X_INERTIA_VERSION: &str = "x-inertia-version";
/// Where the client should reload after a version mismatch.
pub const X_INERTIA_LOCATION: &str = "x-inertia-location";

/// A page to render: the front-end component and its props.
///
/// `url` and `version` are filled in by the renderer.
///
/// ```rust
/// use page_routes::Page;
///
/// let page = Page::new("welcome").with_prop("canRegister", true);
/// assert_eq!(page.props["canRegister"], true);
/// ```
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Page {
    pub component: String,
    pub props: Map<String, Value>,
    pub url: String,
    pub version: String,
}

impl Page {
    pub fn new(component: &str) -> Self {
        Self {
            component: component.to_string(),
            props: Map::new(),
            url: String::new(),
            version: String::new(),
        }
    }

    #[must_use]
    pub fn with_prop(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.props.insert(key.to_string(), value.into());
        self
    }
}

/// The parts of the request a renderer looks at.
///
/// Extracted in handlers like any other extractor; it never rejects.
#[derive(Debug, Clone)]
pub struct PageContext {
    pub method: Method,
    pub uri: Uri,
    pub headers: HeaderMap,
}

impl PageContext {
    /// Path and query of the request, as reported in the page object.
    pub fn url(&self) -> &str {
        self.uri
            .path_and_query()
            .map_or_else(|| self.uri.path(), |pq| pq.as_str())
    }

    /// Whether the request is a client-side page navigation.
    pub fn is_inertia(&self) -> bool {
        self.headers
            .get(X_INERTIA)
            .is_some_and(|value| value.as_bytes().eq_ignore_ascii_case(b"true"))
    }
}

impl<S> FromRequestParts<S> for PageContext
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> std::result::Result<Self, Self::Rejection> {
        Ok(Self {
            method: parts.method.clone(),
            uri: parts.uri.clone(),
            headers: parts.headers.clone(),
        })
    }
}

/// Turns a [`Page`] into a response for the given request.
pub trait PageRenderer: Send + Sync {
    fn render(&self, cx: &PageContext, page: Page) -> Response;
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn context(uri: &str) -> PageContext {
        PageContext {
            method: Method::GET,
            uri: uri.parse().unwrap(),
            headers: HeaderMap::new(),
        }
    }

    #[test]
    fn test_page_serializes_in_protocol_shape() {
        let mut page = Page::new("dashboard");
        page.url = "/dashboard".to_string();
        page.version = "1".to_string();

        let json = serde_json::to_value(&page).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "component": "dashboard",
                "props": {},
                "url": "/dashboard",
                "version": "1",
            })
        );
    }

    #[test]
    fn test_context_url_keeps_query() {
        assert_eq!(context("/settings/profile?tab=2").url(), "/settings/profile?tab=2");
        assert_eq!(context("/").url(), "/");
    }

    #[test]
    fn test_is_inertia() {
        let mut cx = context("/");
        assert!(!cx.is_inertia());

        cx.headers.insert(X_INERTIA, HeaderValue::from_static("true"));
        assert!(cx.is_inertia());
    }
}
