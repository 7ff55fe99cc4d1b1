//! HTTP API handlers for arena-ui

pub mod catalog;
pub mod health;
pub mod session;
pub mod ui;

pub use catalog::catalog_routes;
pub use health::health_routes;
pub use session::session_routes;
pub use ui::{serve_app_js, serve_index};
