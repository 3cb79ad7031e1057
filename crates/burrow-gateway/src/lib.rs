//! HTTP adapter for the Burrow short-link registry.
//!
//! Translates plain-text HTTP requests into [`Registry`](burrow_core::Registry)
//! calls and registry errors into status codes.

pub mod app;
pub mod error;
pub mod handlers;
pub mod model;
pub mod state;

pub use app::App;
pub use state::AppState;
