//! The application's routes and handlers.
//!
//! | Method | Path          | Name         | Guards             |
//! |--------|---------------|--------------|--------------------|
//! | GET    | `/`           | `home`       |                    |
//! | GET    | `/max-upload` | `max-upload` |                    |
//! | GET    | `/dashboard`  | `dashboard`  | `auth`, `verified` |
//!
//! followed by the routes of [`settings`].

pub mod settings;

use {
    crate::{
        AUTH, Config, ConfigFeatureFlags, FeatureFlags, InertiaRenderer, POST_MAX_SIZE, Page,
        PageContext, PageRenderer, REGISTRATION, Result, Route, RouteTable, RouteTableBuilder,
        RuntimeSettings, UPLOAD_MAX_FILESIZE, UploadLimits, VERIFIED,
    },
    axum::{Json, extract::State, response::Response},
    serde::{Deserialize, Serialize},
    std::sync::Arc,
};

/// Collaborators shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub renderer: Arc<dyn PageRenderer>,
    pub features: Arc<dyn FeatureFlags>,
    pub runtime: Arc<dyn RuntimeSettings>,
}

impl AppState {
    pub fn new(
        renderer: Arc<dyn PageRenderer>,
        features: Arc<dyn FeatureFlags>,
        runtime: Arc<dyn RuntimeSettings>,
    ) -> Self {
        Self {
            renderer,
            features,
            runtime,
        }
    }

    /// Builds the configuration-backed collaborators.
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            Arc::new(InertiaRenderer::from_config(&config.pages)),
            Arc::new(ConfigFeatureFlags::from_config(&config.features)),
            Arc::new(UploadLimits::new(config.uploads.clone())),
        )
    }
}

/// Body of `GET /max-upload`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MaxUploadResponse {
    pub upload_max_filesize: String,
    pub post_max_size: String,
}

/// `GET /` renders the welcome page.
///
/// `canRegister` is read from the flag on every request.
pub async fn home(State(state): State<AppState>, cx: PageContext) -> Response {
    let can_register = state.features.is_enabled(REGISTRATION);
    state
        .renderer
        .render(&cx, Page::new("welcome").with_prop("canRegister", can_register))
}

/// `GET /max-upload` reports the upload limits.
///
/// A limit the runtime does not know is reported as an empty string.
pub async fn max_upload(State(state): State<AppState>) -> Json<MaxUploadResponse> {
    let setting = |key: &str| state.runtime.get(key).unwrap_or_default();
    Json(MaxUploadResponse {
        upload_max_filesize: setting(UPLOAD_MAX_FILESIZE),
        post_max_size: setting(POST_MAX_SIZE),
    })
}

/// `GET /dashboard`.
pub async fn dashboard(State(state): State<AppState>, cx: PageContext) -> Response {
    state.renderer.render(&cx, Page::new("dashboard"))
}

/// Builds the application's route table.
///
/// # Errors
///
/// `DuplicateRoute` if two routes share a method and path or a name.
pub fn route_table() -> Result<RouteTable<AppState>> {
    let mut routes = RouteTableBuilder::new();
    routes
        .register(Route::get("/", "home", home).name("home"))?
        .register(Route::get("/max-upload", "max_upload", max_upload).name("max-upload"))?
        .group(&[AUTH, VERIFIED], |routes| {
            routes.register(Route::get("/dashboard", "dashboard", dashboard).name("dashboard"))?;
            Ok(())
        })?
        .include(settings::routes)?;
    routes.build()
}
