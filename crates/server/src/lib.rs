//! # Injury Hub Server
//!
//! HTTP surface over the query façade and the tool dispatcher.

pub mod routes;

pub use routes::{router, ApiError, AppState};
