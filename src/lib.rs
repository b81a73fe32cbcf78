// ============================================================================
// Heroes API
// ============================================================================
//
// Layers, outermost first:
//   app / handlers  -> HTTP routing, request validation, status mapping
//   service         -> existence checks and partial-update rules
//   repository      -> per-request gateway to SQLite, PostgreSQL or memory
//   db              -> store construction, schema, session factory

pub mod app;
pub mod config;
pub mod db;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod logging;
pub mod models;
pub mod repository;
pub mod service;
pub mod state;

pub use app::build_router;
pub use db::Database;
pub use state::AppState;
