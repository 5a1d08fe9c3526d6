use thiserror::Error;

/// Errors returned while refreshing dashboard data from the node.
#[derive(Debug, Clone, Error)]
pub enum DashboardError {
    #[error("upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("upstream returned HTTP {status} for {endpoint}")]
    UpstreamStatus { endpoint: &'static str, status: u16 },

    #[error("malformed response: {0}")]
    MalformedResponse(String),

    #[error("invalid transaction envelope: {0}")]
    Envelope(#[from] EnvelopeError),

    #[error("transaction walk exceeded {0} pages")]
    PageLimitExceeded(u64),
}

impl DashboardError {
    /// Whether the failure lies with the node (transport, status, endless pagination)
    /// rather than with the data it returned.
    pub fn is_upstream_failure(&self) -> bool {
        matches!(
            self,
            DashboardError::UpstreamUnavailable(_)
                | DashboardError::UpstreamStatus { .. }
                | DashboardError::PageLimitExceeded(_)
        )
    }
}

/// Errors decoding a single transaction envelope.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EnvelopeError {
    /// Wrong segment count, or a header that is not base64-encoded JSON.
    /// Aborts the whole transaction walk.
    #[error("structurally invalid envelope: {0}")]
    StructuralInvalid(String),

    /// Header lacks a usable signing time. The record is skipped.
    #[error("envelope header has no usable signing time")]
    MissingTimestamp,
}
