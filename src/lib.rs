//! # page-routes
//!
//! The route table of a server-rendered single-page application, served with
//! Axum and configured through TOML.
//!
//! Routes are registered into a [`RouteTableBuilder`], optionally inside
//! guarded groups, and frozen into an immutable [`RouteTable`]. The table
//! dispatches `(method, path)` pairs on its own and also turns itself into an
//! `axum::Router` whose guarded routes run their guards before the handler.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use page_routes::{AppState, Config, GuardRegistry, PageServer, Result, web};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = Config::from_rust_env_or_default();  // config/{RUST_ENV}.toml
//!     config.setup_tracing();
//!
//!     let state = AppState::from_config(&config);
//!     let guards = GuardRegistry::from_config(&config.auth);
//!
//!     PageServer::new(config, state, web::route_table()?, &guards)?
//!         .setup_middleware()
//!         .start()
//!         .await
//! }
//! ```
//!
//! # Routes
//!
//! | Method | Path                   | Guards             | Response                        |
//! |--------|------------------------|--------------------|---------------------------------|
//! | GET    | `/`                    |                    | `welcome` page, `canRegister`   |
//! | GET    | `/max-upload`          |                    | upload limits as JSON           |
//! | GET    | `/dashboard`           | `auth`, `verified` | `dashboard` page                |
//! | GET    | `/settings`            | `auth`             | 302 to `/settings/profile`      |
//! | GET    | `/settings/profile`    | `auth`             | `settings/profile` page         |
//! | GET    | `/settings/password`   | `auth`             | `settings/password` page        |
//! | GET    | `/settings/appearance` | `auth`             | `settings/appearance` page      |
//!
//! # Building a table
//!
//! ```rust
//! use page_routes::{AUTH, ErrorKind, Route, RouteTableBuilder};
//! use http::Method;
//!
//! let mut routes = RouteTableBuilder::<()>::new();
//! routes
//!     .register(Route::get("/", "home", || async { "home" }))?
//!     .group(&[AUTH], |routes| {
//!         routes.register(Route::get("/inbox", "inbox", || async { "inbox" }))?;
//!         Ok(())
//!     })?;
//!
//! // Same method and path twice
//! let err = routes
//!     .register(Route::get("/", "home_again", || async { "again" }))
//!     .err()
//!     .unwrap();
//! assert_eq!(err.kind(), ErrorKind::DuplicateRoute);
//!
//! let table = routes.build()?;
//! let inbox = table.dispatch(&Method::GET, "/inbox/")?;
//! assert_eq!(inbox.handler(), "inbox");
//! assert_eq!(inbox.guards(), [AUTH]);
//! # Ok::<(), page_routes::Error>(())
//! ```
//!
//! # Error Handling
//!
//! The library uses a custom [`Result`] type. Errors convert to structured JSON responses:
//!
//! ```json
//! {
//!   "error_code": "NOT_FOUND",
//!   "message": "No route for GET /missing"
//! }
//! ```

mod config;
mod error;
mod features;
mod guards;
mod pages;
mod routing;
mod runtime;
mod server;
mod utils;

pub mod web;

pub use config::*;
pub use error::*;
pub use features::*;
pub use guards::*;
pub use pages::*;
pub use routing::*;
pub use runtime::*;
pub use server::*;
pub use utils::*;
pub use web::AppState;

pub type Result<T> = std::result::Result<T, Error>;
