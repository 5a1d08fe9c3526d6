//! Polling cache and aggregation core of the Nuts node dashboard.
//!
//! Samples a single Nuts node, turns its diagnostics and transaction history
//! into compact summaries, and keeps the latest summaries in short-lived
//! in-memory snapshots so dashboard traffic does not reach the node directly.
//!
//! # Modules
//!
//! - [`cache`]: TTL snapshot cache with single-flight refresh ([`SnapshotCache`])
//! - [`envelope`]: signing-time extraction from compact JWS envelopes
//! - [`transactions`]: page walker over the node's transaction list
//! - [`aggregate`]: day-bucket aggregation into a time series
//! - [`diagnostics`]: diagnostics document mapping into [`Fact`]s
//! - [`node`]: upstream client seam ([`NodeApi`]) and its `reqwest` implementation
//! - [`dashboard`]: the two cached data kinds served to the frontend
//! - [`metrics`]: Prometheus metrics for cache and upstream activity

pub mod aggregate;
pub mod cache;
pub mod constants;
pub mod dashboard;
pub mod diagnostics;
pub mod envelope;
pub mod error;
pub mod metrics;
pub mod node;
pub mod transactions;

pub use aggregate::{aggregate, CountPerMoment};
pub use cache::{CacheEntry, Clock, SnapshotCache, SystemClock};
pub use constants::*;
pub use dashboard::Dashboard;
pub use diagnostics::{DiagnosticsSnapshot, Fact};
pub use envelope::TransactionRecord;
pub use error::{DashboardError, EnvelopeError};
pub use node::{HttpNodeClient, NodeApi};
pub use transactions::PageWalker;
