use {
    super::{Page, PageContext, PageRenderer, X_INERTIA, X_INERTIA_LOCATION, X_INERTIA_VERSION},
    crate::{Error, PagesConfig},
    axum::{
        Json,
        http::{HeaderValue, Method, StatusCode, header},
        response::{Html, IntoResponse, Response},
    },
};

/// Renders pages with the Inertia protocol.
///
/// - `X-Inertia: true` requests get the page object as JSON.
/// - Navigations made with stale assets (`X-Inertia-Version` differs) get a
///   409 with `X-Inertia-Location`, which makes the client do a full reload.
/// - Other requests get an HTML document whose root element carries the
///   page object in its `data-page` attribute.
#[derive(Debug, Clone)]
pub struct InertiaRenderer {
    title: String,
    version: String,
    root_element_id: String,
}

impl InertiaRenderer {
    pub fn from_config(config: &PagesConfig) -> Self {
        Self {
            title: config.title.clone(),
            version: config.asset_version.clone(),
            root_element_id: config.root_element_id.clone(),
        }
    }

    fn is_stale(&self, cx: &PageContext) -> bool {
        let client_version = cx
            .headers
            .get(X_INERTIA_VERSION)
            .map(HeaderValue::as_bytes)
            .unwrap_or_default();
        cx.method == Method::GET && client_version != self.version.as_bytes()
    }

    fn html_shell(&self, page_json: &str) -> String {
        format!(
            "<!DOCTYPE html>\n\
             <html lang=\"en\">\n\
             <head>\n\
             <meta charset=\"utf-8\">\n\
             <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
             <title>{title}</title>\n\
             </head>\n\
             <body>\n\
             <div id=\"{id}\" data-page=\"{page}\"></div>\n\
             </body>\n\
             </html>\n",
            title = escape_html(&self.title),
            id = self.root_element_id,
            page = escape_html(page_json),
        )
    }
}

impl PageRenderer for InertiaRenderer {
    fn render(&self, cx: &PageContext, page: Page) -> Response {
        let page = Page {
            url: cx.url().to_string(),
            version: self.version.clone(),
            ..page
        };

        let mut response = if cx.is_inertia() {
            if self.is_stale(cx) {
                tracing::debug!(url = %page.url, "Asset version changed, asking client to reload");
                return match HeaderValue::from_str(&page.url) {
                    Ok(location) => {
                        (StatusCode::CONFLICT, [(X_INERTIA_LOCATION, location)]).into_response()
                    }
                    Err(err) => Error::from(err).into_response(),
                };
            }

            let mut response = Json(&page).into_response();
            response
                .headers_mut()
                .insert(X_INERTIA, HeaderValue::from_static("true"));
            response
        } else {
            match serde_json::to_string(&page) {
                Ok(json) => Html(self.html_shell(&json)).into_response(),
                Err(err) => return Error::from(err).into_response(),
            }
        };

        response
            .headers_mut()
            .insert(header::VARY, HeaderValue::from_static("X-Inertia"));
        response
    }
}

/// Escapes text for use in HTML content and double- or single-quoted attributes.
fn escape_html(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            c => escaped.push(c),
        }
    }
    escaped
}
