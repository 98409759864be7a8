//! Lead management REST service
//!
//! - `api` - HTTP server, routes, session auth
//! - `core` - configuration, CLI, storage paths, shutdown
//! - `data` - SQLite persistence and the lead filter builder
//! - `utils` - small shared helpers

pub mod api;
mod app;
pub mod core;
pub mod data;
pub mod utils;
