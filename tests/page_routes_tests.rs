//! Integration tests for the page routes.
//!
//! These tests start a server on a random port and make real HTTP requests.
//!
//! ## Test Coverage
//!
//! - `test_config_file_loads`: `config/test.toml` parses and validates
//! - `test_home_page_shell`: `/` answers with the HTML shell and `canRegister`
//! - `test_max_upload_json`: `/max-upload` reports the configured limits
//! - `test_dashboard_guards`: guest, unverified and verified access to `/dashboard`
//! - `test_api_key_is_verified`: API keys pass both `auth` and `verified`
//! - `test_settings_redirect`: `/settings` forwards to the profile page
//! - `test_trailing_slash_redirect`: `/dashboard/` is redirected before any guard runs
//! - `test_not_found_is_json`: unknown paths get a JSON 404
//! - `test_graceful_shutdown`: the server stops once the shutdown signal fires

use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use page_routes::{AppState, Config, GuardRegistry, PageServer, web};
use reqwest::{Client, StatusCode, redirect};
use std::time::Duration;
use tokio::{net::TcpListener, sync::oneshot};

fn create_test_config() -> Config {
    Config::from_toml_file("test").expect("Failed to load config/test.toml")
}

/// Start a test server with the given config
async fn start_test_server(config: Config) -> (u16, tokio::task::JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind to random port");
    let port = listener.local_addr().unwrap().port();

    let state = AppState::from_config(&config);
    let guards = GuardRegistry::from_config(&config.auth);
    let server = PageServer::new(config, state, web::route_table().unwrap(), &guards)
        .expect("Failed to create PageServer")
        .setup_middleware();

    let handle = tokio::spawn(async move {
        server.serve(listener).await.expect("Server failed to run");
    });

    tokio::time::sleep(Duration::from_millis(100)).await;

    (port, handle)
}

fn client() -> Client {
    Client::builder()
        .redirect(redirect::Policy::none())
        .build()
        .unwrap()
}

fn basic_auth_header(username: &str, password: &str) -> String {
    let credentials = BASE64.encode(format!("{}:{}", username, password));
    format!("Basic {}", credentials)
}

#[test]
fn test_config_file_loads() {
    let config = create_test_config();
    config.validate().expect("config/test.toml should validate");

    assert_eq!(config.http.bind_port, 0);
    assert!(!config.features.is_enabled("registration"));
    assert_eq!(config.auth.users.len(), 2);
}

#[tokio::test]
async fn test_home_page_shell() {
    let (port, server_handle) = start_test_server(create_test_config()).await;

    let response = client()
        .get(format!("http://127.0.0.1:{}/", port))
        .send()
        .await
        .expect("Request failed");

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));
    let html = response.text().await.unwrap();
    assert!(html.starts_with("<!DOCTYPE html>"));
    assert!(html.contains("&quot;canRegister&quot;:false"));

    server_handle.abort();
}

#[tokio::test]
async fn test_max_upload_json() {
    let (port, server_handle) = start_test_server(create_test_config()).await;

    let response = client()
        .get(format!("http://127.0.0.1:{}/max-upload", port))
        .send()
        .await
        .expect("Request failed");

    assert_eq!(response.status(), StatusCode::OK);
    let body: web::MaxUploadResponse =
        serde_json::from_str(&response.text().await.unwrap()).unwrap();
    assert_eq!(
        body,
        web::MaxUploadResponse {
            upload_max_filesize: "2M".to_string(),
            post_max_size: "8M".to_string(),
        }
    );

    server_handle.abort();
}

#[tokio::test]
async fn test_dashboard_guards() {
    let (port, server_handle) = start_test_server(create_test_config()).await;
    let url = format!("http://127.0.0.1:{}/dashboard", port);
    let client = client();

    let guest = client.get(&url).send().await.expect("Request failed");
    assert_eq!(guest.status(), StatusCode::FOUND);
    assert_eq!(guest.headers()["location"], "/login");

    let unverified = client
        .get(&url)
        .header("Authorization", basic_auth_header("jordan", "hunter2"))
        .send()
        .await
        .expect("Request failed");
    assert_eq!(unverified.status(), StatusCode::FOUND);
    assert_eq!(unverified.headers()["location"], "/verify-email");

    let wrong_password = client
        .get(&url)
        .header("Authorization", basic_auth_header("taylor", "wrong"))
        .header("Accept", "application/json")
        .send()
        .await
        .expect("Request failed");
    assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);

    let verified = client
        .get(&url)
        .header("Authorization", basic_auth_header("taylor", "secret"))
        .header("X-Inertia", "true")
        .header("X-Inertia-Version", "test")
        .send()
        .await
        .expect("Request failed");
    assert_eq!(verified.status(), StatusCode::OK);
    let page: serde_json::Value = serde_json::from_str(&verified.text().await.unwrap()).unwrap();
    assert_eq!(page["component"], "dashboard");

    server_handle.abort();
}

#[tokio::test]
async fn test_api_key_is_verified() {
    let (port, server_handle) = start_test_server(create_test_config()).await;

    let response = client()
        .get(format!("http://127.0.0.1:{}/dashboard", port))
        .header("X-API-Key", "test-api-key-12345")
        .send()
        .await
        .expect("Request failed");

    assert_eq!(response.status(), StatusCode::OK);

    server_handle.abort();
}

#[tokio::test]
async fn test_settings_redirect() {
    let (port, server_handle) = start_test_server(create_test_config()).await;

    let response = client()
        .get(format!("http://127.0.0.1:{}/settings", port))
        .header("Authorization", basic_auth_header("jordan", "hunter2"))
        .send()
        .await
        .expect("Request failed");

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(response.headers()["location"], "/settings/profile");

    server_handle.abort();
}

#[tokio::test]
async fn test_trailing_slash_redirect() {
    let (port, server_handle) = start_test_server(create_test_config()).await;

    let response = client()
        .get(format!("http://127.0.0.1:{}/dashboard/", port))
        .send()
        .await
        .expect("Request failed");

    assert_eq!(response.status(), StatusCode::PERMANENT_REDIRECT);
    assert_eq!(response.headers()["location"], "/dashboard");

    server_handle.abort();
}

#[tokio::test]
async fn test_not_found_is_json() {
    let (port, server_handle) = start_test_server(create_test_config()).await;

    let response = client()
        .get(format!("http://127.0.0.1:{}/register", port))
        .send()
        .await
        .expect("Request failed");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: serde_json::Value = serde_json::from_str(&response.text().await.unwrap()).unwrap();
    assert_eq!(body["error_code"], "NOT_FOUND");

    server_handle.abort();
}

#[tokio::test]
async fn test_graceful_shutdown() {
    let config = create_test_config();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    let state = AppState::from_config(&config);
    let guards = GuardRegistry::from_config(&config.auth);
    let server = PageServer::new(config, state, web::route_table().unwrap(), &guards).unwrap();

    let (tx, rx) = oneshot::channel::<()>();
    let handle = tokio::spawn(server.serve_with_shutdown(listener, async move {
        let _ = rx.await;
    }));
    tokio::time::sleep(Duration::from_millis(100)).await;

    let response = client()
        .get(format!("http://127.0.0.1:{}/max-upload", port))
        .send()
        .await
        .expect("Request failed");
    assert_eq!(response.status(), StatusCode::OK);
    drop(response);

    tx.send(()).unwrap();
    let result = tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("Server did not stop")
        .unwrap();
    assert!(result.is_ok());
}
