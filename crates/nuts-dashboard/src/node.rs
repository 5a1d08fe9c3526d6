//! Upstream Nuts node client.
//!
//! [`NodeApi`] is the seam between the dashboard and the node; the production
//! implementation is [`HttpNodeClient`]. Each call is a single request with no
//! retries. Dropping the returned future aborts the request in flight.

use bytes::Bytes;
use std::future::Future;
use std::time::Duration;

use crate::constants::{DEFAULT_UPSTREAM_TIMEOUT, DIAGNOSTICS_PATH, TRANSACTIONS_PATH};
use crate::diagnostics::DiagnosticsSnapshot;
use crate::error::DashboardError;
use crate::metrics::{UPSTREAM_LATENCY, UPSTREAM_REQUESTS};

/// Read access to the Nuts node.
///
/// Implementations must be thread-safe (`Send + Sync`).
pub trait NodeApi: Send + Sync {
    /// Fetch and decode the diagnostics document.
    fn diagnostics(
        &self,
    ) -> impl Future<Output = Result<DiagnosticsSnapshot, DashboardError>> + Send;

    /// Fetch the envelopes in the half-open window `[start, end)`.
    fn transactions(
        &self,
        start: u64,
        end: u64,
    ) -> impl Future<Output = Result<Vec<String>, DashboardError>> + Send;
}

/// [`NodeApi`] over HTTP.
#[derive(Debug, Clone)]
pub struct HttpNodeClient {
    client: reqwest::Client,
    status_base: String,
    internal_base: String,
    debug: bool,
}

impl HttpNodeClient {
    /// Build a client with its own connection pool and the default request deadline.
    pub fn new(status_base: &str, internal_base: &str) -> Result<Self, DashboardError> {
        Self::with_timeout(status_base, internal_base, DEFAULT_UPSTREAM_TIMEOUT)
    }

    pub fn with_client(client: reqwest::Client, status_base: &str, internal_base: &str) -> Self {
        Self {
            client,
            status_base: status_base.trim_end_matches('/').to_string(),
            internal_base: internal_base.trim_end_matches('/').to_string(),
            debug: false,
        }
    }

    /// Build a client whose requests time out after `timeout`.
    pub fn with_timeout(
        status_base: &str,
        internal_base: &str,
        timeout: Duration,
    ) -> Result<Self, DashboardError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DashboardError::UpstreamUnavailable(format!("http client: {e}")))?;
        Ok(Self::with_client(client, status_base, internal_base))
    }

    /// Log raw diagnostics bodies as they arrive.
    pub fn debug(mut self, enabled: bool) -> Self {
        self.debug = enabled;
        self
    }

    pub fn status_base(&self) -> &str {
        &self.status_base
    }

    pub fn internal_base(&self) -> &str {
        &self.internal_base
    }

    /// Send a GET and return the body of a successful response.
    async fn get_bytes(
        &self,
        endpoint: &'static str,
        request: reqwest::RequestBuilder,
    ) -> Result<Bytes, DashboardError> {
        let timer = UPSTREAM_LATENCY.start_timer();
        let result: Result<Bytes, DashboardError> = async {
            let resp = request.send().await.map_err(|e| {
                DashboardError::UpstreamUnavailable(format!("{endpoint} request failed: {e}"))
            })?;

            let status = resp.status();
            if !status.is_success() {
                return Err(DashboardError::UpstreamStatus {
                    endpoint,
                    status: status.as_u16(),
                });
            }

            resp.bytes().await.map_err(|e| {
                DashboardError::UpstreamUnavailable(format!("{endpoint} body read failed: {e}"))
            })
        }
        .await;
        timer.observe_duration();

        let outcome = match &result {
            Ok(_) => "ok",
            Err(DashboardError::UpstreamStatus { .. }) => "status",
            Err(_) => "error",
        };
        UPSTREAM_REQUESTS.with_label_values(&[endpoint, outcome]).inc();
        result
    }
}

impl NodeApi for HttpNodeClient {
    async fn diagnostics(&self) -> Result<DiagnosticsSnapshot, DashboardError> {
        let url = format!("{}{}", self.status_base, DIAGNOSTICS_PATH);
        let request = self.client.get(&url).header("Accept", "application/json");
        let body = self.get_bytes("diagnostics", request).await?;

        if self.debug {
            tracing::info!(body = %String::from_utf8_lossy(&body), "status response");
        }

        serde_json::from_slice(&body).map_err(|e| {
            UPSTREAM_REQUESTS
                .with_label_values(&["diagnostics", "malformed"])
                .inc();
            DashboardError::MalformedResponse(format!("diagnostics: {e}"))
        })
    }

    async fn transactions(&self, start: u64, end: u64) -> Result<Vec<String>, DashboardError> {
        let url = format!("{}{}", self.internal_base, TRANSACTIONS_PATH);
        let request = self
            .client
            .get(&url)
            .query(&[("start", start), ("end", end)]);
        let body = self.get_bytes("transactions", request).await?;

        serde_json::from_slice(&body).map_err(|e| {
            UPSTREAM_REQUESTS
                .with_label_values(&["transactions", "malformed"])
                .inc();
            DashboardError::MalformedResponse(format!(
                "transaction page [{start}, {end}) is not a list of strings: {e}"
            ))
        })
    }
}
