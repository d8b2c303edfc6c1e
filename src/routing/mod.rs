//! The route table: registration, guard groups, dispatch.
//!
//! Routes are collected by a [`RouteTableBuilder`] during startup and frozen
//! into an immutable [`RouteTable`]. Guards are attached to each
//! [`RouteEntry`] as plain ids; they only become middleware when the table
//! is turned into an axum router with [`RouteTable::into_router`].
//!
//! - [`route`] - `Route` definitions and stored `RouteEntry` values
//! - [`builder`] - `RouteTableBuilder` with `register`, `group` and `include`
//! - [`table`] - `RouteTable` with `dispatch`, `url_for` and `into_router`

mod builder;
mod route;
mod table;

pub use builder::{RouteSource, RouteTableBuilder};
pub use route::{Route, RouteEntry, normalize_path};
pub use table::{Dispatch, RouteTable};
