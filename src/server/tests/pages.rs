//! The application routes served through PageServer.

use super::{basic_auth, body_json, body_string, create_test_app, create_test_config};
use crate::{
    AppState, ConfigFeatureFlags, GuardRegistry, InertiaRenderer, PageServer, REGISTRATION,
    RuntimeSettings, UploadLimits, X_INERTIA, X_INERTIA_LOCATION, X_INERTIA_VERSION, web,
};
use axum::{
    body::Body,
    http::{Request, StatusCode, header},
};
use std::sync::Arc;
use tower::ServiceExt;
use tracing_test::traced_test;

fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

fn inertia_get(uri: &str) -> Request<Body> {
    Request::get(uri)
        .header(X_INERTIA, "true")
        .header(X_INERTIA_VERSION, "v7")
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn test_home_renders_welcome_shell() {
    let app = create_test_app(create_test_config());

    let response = app.oneshot(get("/")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::VARY], "X-Inertia");
    let html = body_string(response).await;
    assert!(html.contains("&quot;component&quot;:&quot;welcome&quot;"));
    assert!(html.contains("&quot;canRegister&quot;:true"));
}

#[tokio::test]
async fn test_home_reports_registration_disabled() {
    let config = create_test_config().with_feature(REGISTRATION, false);
    let app = create_test_app(config);

    let response = app.oneshot(inertia_get("/")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let page = body_json(response).await;
    assert_eq!(page["component"], "welcome");
    assert_eq!(page["props"]["canRegister"], false);
    assert_eq!(page["url"], "/");
    assert_eq!(page["version"], "v7");
}

#[tokio::test]
async fn test_home_reads_flag_on_every_request() {
    let config = create_test_config();
    let flags = Arc::new(ConfigFeatureFlags::from_config(&config.features));
    let state = AppState::new(
        Arc::new(InertiaRenderer::from_config(&config.pages)),
        flags.clone(),
        Arc::new(UploadLimits::new(config.uploads.clone())),
    );
    let guards = GuardRegistry::from_config(&config.auth);
    let app = PageServer::new(config, state, web::route_table().unwrap(), &guards)
        .unwrap()
        .into_router();

    let page = body_json(app.clone().oneshot(inertia_get("/")).await.unwrap()).await;
    assert_eq!(page["props"]["canRegister"], true);

    flags.set(REGISTRATION, false);

    let page = body_json(app.oneshot(inertia_get("/")).await.unwrap()).await;
    assert_eq!(page["props"]["canRegister"], false);
}

#[tokio::test]
async fn test_stale_client_is_asked_to_reload() {
    let app = create_test_app(create_test_config());

    let response = app
        .oneshot(
            Request::get("/")
                .header(X_INERTIA, "true")
                .header(X_INERTIA_VERSION, "v6")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(response.headers()[X_INERTIA_LOCATION], "/");
}

#[tokio::test]
async fn test_max_upload_reports_configured_limits() {
    let app = create_test_app(create_test_config());

    let response = app.oneshot(get("/max-upload")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await,
        serde_json::json!({ "upload_max_filesize": "64M", "post_max_size": "128M" })
    );
}

struct PartialSettings;

impl RuntimeSettings for PartialSettings {
    fn get(&self, key: &str) -> Option<String> {
        (key == "post_max_size").then(|| "8M".to_string())
    }
}

#[tokio::test]
async fn test_max_upload_reports_unknown_limit_as_empty() {
    let config = create_test_config();
    let state = AppState::new(
        Arc::new(InertiaRenderer::from_config(&config.pages)),
        Arc::new(ConfigFeatureFlags::from_config(&config.features)),
        Arc::new(PartialSettings),
    );
    let guards = GuardRegistry::from_config(&config.auth);
    let app = PageServer::new(config, state, web::route_table().unwrap(), &guards)
        .unwrap()
        .into_router();

    let response = app.oneshot(get("/max-upload")).await.unwrap();

    assert_eq!(
        body_json(response).await,
        serde_json::json!({ "upload_max_filesize": "", "post_max_size": "8M" })
    );
}

#[tokio::test]
async fn test_dashboard_redirects_guest_to_login() {
    let app = create_test_app(create_test_config());

    let response = app.oneshot(get("/dashboard")).await.unwrap();

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(response.headers()[header::LOCATION], "/login");
}

#[tokio::test]
async fn test_dashboard_rejects_json_guest_with_401() {
    let app = create_test_app(create_test_config());

    let response = app
        .oneshot(
            Request::get("/dashboard")
                .header(header::ACCEPT, "application/json")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(response.headers().contains_key(header::WWW_AUTHENTICATE));
    assert_eq!(body_json(response).await["message"], "Unauthenticated.");
}

#[tokio::test]
async fn test_dashboard_redirects_unverified_user() {
    let app = create_test_app(create_test_config());

    let response = app
        .oneshot(
            Request::get("/dashboard")
                .header(header::AUTHORIZATION, basic_auth("jordan", "hunter2"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(response.headers()[header::LOCATION], "/verify-email");
}

#[tokio::test]
async fn test_dashboard_rejects_unverified_json_client_with_403() {
    let app = create_test_app(create_test_config());

    let response = app
        .oneshot(
            Request::get("/dashboard")
                .header(header::AUTHORIZATION, basic_auth("jordan", "hunter2"))
                .header(header::ACCEPT, "application/json")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_dashboard_renders_for_verified_user() {
    let app = create_test_app(create_test_config());

    let response = app
        .oneshot(
            Request::get("/dashboard")
                .header(header::AUTHORIZATION, basic_auth("taylor", "secret"))
                .header(X_INERTIA, "true")
                .header(X_INERTIA_VERSION, "v7")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["component"], "dashboard");
}

#[tokio::test]
async fn test_settings_only_need_authentication() {
    let app = create_test_app(create_test_config());

    let response = app
        .clone()
        .oneshot(
            Request::get("/settings")
                .header(header::AUTHORIZATION, basic_auth("jordan", "hunter2"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(response.headers()[header::LOCATION], "/settings/profile");

    let response = app
        .oneshot(
            Request::get("/settings/profile")
                .header(header::AUTHORIZATION, basic_auth("jordan", "hunter2"))
                .header(X_INERTIA, "true")
                .header(X_INERTIA_VERSION, "v7")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["component"], "settings/profile");
}

#[tokio::test]
async fn test_settings_redirect_guest_to_login() {
    let app = create_test_app(create_test_config());

    let response = app.oneshot(get("/settings/password")).await.unwrap();

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(response.headers()[header::LOCATION], "/login");
}

#[tokio::test]
async fn test_unknown_path_is_json_404() {
    let app = create_test_app(create_test_config());

    let response = app.oneshot(get("/nope")).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["error_code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_unregistered_method_is_404() {
    let app = create_test_app(create_test_config());

    let response = app
        .oneshot(Request::post("/max-upload").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["error_code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_head_is_served_by_get_route() {
    let app = create_test_app(create_test_config());

    let response = app
        .oneshot(Request::head("/max-upload").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_trailing_slash_redirects_to_registered_path() {
    let app = create_test_app(create_test_config());

    let response = app
        .oneshot(get("/max-upload/?verbose=1"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::PERMANENT_REDIRECT);
    assert_eq!(response.headers()[header::LOCATION], "/max-upload?verbose=1");
}

#[tokio::test]
async fn test_repeated_leading_slashes_redirect_to_registered_path() {
    let app = create_test_app(create_test_config());

    let response = app.oneshot(get("//max-upload")).await.unwrap();

    assert_eq!(response.status(), StatusCode::PERMANENT_REDIRECT);
    assert_eq!(response.headers()[header::LOCATION], "/max-upload");
}

#[tokio::test]
async fn test_canonical_path_with_wrong_method_is_not_redirected() {
    let app = create_test_app(create_test_config());

    let response = app
        .oneshot(Request::delete("/dashboard").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_trailing_slash_on_unknown_path_is_404() {
    let app = create_test_app(create_test_config());

    let response = app.oneshot(get("/nope/")).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[traced_test]
async fn test_guard_denial_is_logged() {
    let app = create_test_app(create_test_config());

    let response = app.oneshot(get("/dashboard")).await.unwrap();

    assert_eq!(response.status(), StatusCode::FOUND);
    assert!(logs_contain("Request denied by guard"));
    assert!(logs_contain("guard=auth"));
}

#[tokio::test]
#[traced_test]
async fn test_authenticated_user_is_recorded_in_span() {
    let app = create_test_app(create_test_config());

    let response = app
        .oneshot(
            Request::get("/dashboard")
                .header(header::AUTHORIZATION, basic_auth("taylor", "secret"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(logs_contain("Request authenticated"));
    assert!(logs_contain("name=taylor"));
}
