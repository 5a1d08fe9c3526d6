//! HTTP surface of the Nuts node dashboard.
//!
//! Serves the cached facts and transaction series computed by the
//! [`dashboard`] crate, the static frontend, a liveness probe and Prometheus
//! metrics.

pub mod config;
pub mod cors;
pub mod error;
pub mod routes;
pub mod state;

pub use config::ServerConfig;
pub use error::ApiError;
pub use state::AppState;
