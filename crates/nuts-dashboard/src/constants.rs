use std::time::Duration;

/// Maximum age of a cached snapshot before the next read recomputes it.
pub const CACHE_TTL: Duration = Duration::from_secs(10);

/// Number of envelopes requested per transaction page.
pub const PAGE_SIZE: u64 = 1000;

/// Default ceiling on the number of pages a single walk may request.
pub const DEFAULT_MAX_PAGES: u64 = 10_000;

/// Default deadline for a single upstream request.
pub const DEFAULT_UPSTREAM_TIMEOUT: Duration = Duration::from_secs(30);

/// Diagnostics path on the node's status base URL.
pub const DIAGNOSTICS_PATH: &str = "/status/diagnostics";

/// Transaction list path on the node's internal base URL.
pub const TRANSACTIONS_PATH: &str = "/internal/network/v1/transaction";

/// Header claim holding the signing time (Unix seconds).
pub const SIGNING_TIME_CLAIM: &str = "sigt";
