//! Tests for PageServer
//!
//! `pages` drives the application routes end to end through the router;
//! `middleware` covers the standard layers.

mod pages;

use crate::{AppState, Config, GuardRegistry, PageServer, web};
use axum::{Router, body::Body, response::Response};
use base64::{Engine, engine::general_purpose::STANDARD as BASE64};

/// A configuration with one verified and one unverified user.
pub(crate) fn create_test_config() -> Config {
    Config::default()
        .with_user("taylor", "secret", true)
        .with_user("jordan", "hunter2", false)
        .with_upload_limits("64M", "128M")
        .with_asset_version("v7")
}

/// The application routes behind the standard middleware.
pub(crate) fn create_test_app(config: Config) -> Router {
    let state = AppState::from_config(&config);
    let guards = GuardRegistry::from_config(&config.auth);
    PageServer::new(config, state, web::route_table().unwrap(), &guards)
        .unwrap()
        .setup_middleware()
        .into_router()
}

pub(crate) fn basic_auth(username: &str, password: &str) -> String {
    format!("Basic {}", BASE64.encode(format!("{username}:{password}")))
}

pub(crate) async fn body_string(response: Response<Body>) -> String {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8_lossy(&body).to_string()
}

pub(crate) async fn body_json(response: Response<Body>) -> serde_json::Value {
    serde_json::from_str(&body_string(response).await).unwrap()
}
