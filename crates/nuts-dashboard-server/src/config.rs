use std::env;
use std::time::Duration;

use url::Url;

use dashboard::{DEFAULT_MAX_PAGES, DEFAULT_UPSTREAM_TIMEOUT};

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_WEB_DIR: &str = "web";
const DEFAULT_RATE_LIMIT_RPM: u32 = 600;

#[derive(Clone)]
pub struct ServerConfig {
    /// Title shown above the facts
    pub title: String,
    /// Base URL of the node's status API (`/status/diagnostics`)
    pub status_url: String,
    /// Base URL of the node's internal API (`/internal/network/v1/transaction`)
    pub internal_url: String,
    /// Log raw diagnostics responses
    pub debug: bool,
    /// Page ceiling per transaction walk (None = unbounded)
    pub max_pages: Option<u64>,
    /// Directory holding the static frontend
    pub web_dir: String,
    /// Deadline for each request to the node
    pub upstream_timeout: Duration,
    /// Server port
    pub port: u16,
    /// CORS allowed origins
    pub allowed_origins: Vec<String>,
    /// Rate limit requests per minute, per client IP
    pub rate_limit_rpm: u32,
    /// Bearer token required for /metrics (None = public)
    pub metrics_token: Option<String>,
}

impl std::fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerConfig")
            .field("title", &self.title)
            .field("status_url", &self.status_url)
            .field("internal_url", &self.internal_url)
            .field("debug", &self.debug)
            .field("max_pages", &self.max_pages)
            .field("web_dir", &self.web_dir)
            .field("upstream_timeout", &self.upstream_timeout)
            .field("port", &self.port)
            .field("allowed_origins", &self.allowed_origins)
            .field("rate_limit_rpm", &self.rate_limit_rpm)
            .field(
                "metrics_token",
                &self.metrics_token.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.is_empty());

        // Required: title and node address
        let title = var("DASHBOARD_TITLE").ok_or(ConfigError::MissingRequired("DASHBOARD_TITLE"))?;
        let status_url = var("DASHBOARD_NODE_ADDR")
            .ok_or(ConfigError::MissingRequired("DASHBOARD_NODE_ADDR"))?;
        let status_url = parse_base_url(&status_url)?;

        // Optional: internal API address, defaults to the status address
        let internal_url = match var("DASHBOARD_NODE_INTERNAL_ADDR") {
            Some(addr) => parse_base_url(&addr)?,
            None => status_url.clone(),
        };

        let debug = var("DASHBOARD_DEBUG")
            .map(|v| v == "1" || v == "true")
            .unwrap_or(false);

        // 0 disables the ceiling
        let max_pages = match var("DASHBOARD_MAX_PAGES") {
            Some(raw) => {
                let n: u64 = raw
                    .parse()
                    .map_err(|_| ConfigError::InvalidNumber("DASHBOARD_MAX_PAGES", raw))?;
                (n > 0).then_some(n)
            }
            None => Some(DEFAULT_MAX_PAGES),
        };

        let web_dir = var("DASHBOARD_WEB_DIR").unwrap_or_else(|| DEFAULT_WEB_DIR.to_string());

        let upstream_timeout = match var("DASHBOARD_UPSTREAM_TIMEOUT_SECS") {
            Some(raw) => raw
                .parse()
                .ok()
                .filter(|secs: &u64| *secs > 0)
                .map(Duration::from_secs)
                .ok_or(ConfigError::InvalidNumber("DASHBOARD_UPSTREAM_TIMEOUT_SECS", raw))?,
            None => DEFAULT_UPSTREAM_TIMEOUT,
        };

        let port = var("PORT")
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_PORT);

        let allowed_origins: Vec<String> = var("ALLOWED_ORIGINS")
            .map(|origins| {
                origins
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        let rate_limit_rpm = var("RATE_LIMIT_RPM")
            .and_then(|s| s.parse().ok())
            .filter(|rpm: &u32| *rpm > 0)
            .unwrap_or(DEFAULT_RATE_LIMIT_RPM);

        let metrics_token = var("METRICS_TOKEN");

        Ok(Self {
            title,
            status_url,
            internal_url,
            debug,
            max_pages,
            web_dir,
            upstream_timeout,
            port,
            allowed_origins,
            rate_limit_rpm,
            metrics_token,
        })
    }
}

/// Validate an http(s) base URL and drop trailing slashes.
fn parse_base_url(raw: &str) -> Result<String, ConfigError> {
    let parsed = Url::parse(raw).map_err(|_| ConfigError::InvalidUrl(raw.to_string()))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidUrl(raw.to_string()));
    }
    Ok(raw.trim_end_matches('/').to_string())
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingRequired(&'static str),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    #[error("invalid number for {0}: {1}")]
    InvalidNumber(&'static str, String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<ServerConfig, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::from_lookup(|key| map.get(key).cloned())
    }

    const REQUIRED: [(&str, &str); 2] = [
        ("DASHBOARD_TITLE", "Nuts development network"),
        ("DASHBOARD_NODE_ADDR", "http://nuts-node:1323/"),
    ];

    #[test]
    fn test_defaults() {
        let config = load(&REQUIRED).unwrap();
        assert_eq!(config.title, "Nuts development network");
        assert_eq!(config.status_url, "http://nuts-node:1323");
        assert_eq!(config.internal_url, config.status_url);
        assert!(!config.debug);
        assert_eq!(config.max_pages, Some(DEFAULT_MAX_PAGES));
        assert_eq!(config.port, 8080);
        assert_eq!(config.web_dir, "web");
        assert_eq!(config.upstream_timeout, Duration::from_secs(30));
        assert!(config.allowed_origins.is_empty());
        assert!(config.metrics_token.is_none());
    }

    #[test]
    fn test_missing_title() {
        let err = load(&[("DASHBOARD_NODE_ADDR", "http://localhost:1323")]).unwrap_err();
        assert!(matches!(err, ConfigError::MissingRequired("DASHBOARD_TITLE")));
    }

    #[test]
    fn test_empty_node_addr_is_missing() {
        let err = load(&[("DASHBOARD_TITLE", "t"), ("DASHBOARD_NODE_ADDR", "")]).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::MissingRequired("DASHBOARD_NODE_ADDR")
        ));
    }

    #[test]
    fn test_invalid_node_addr() {
        for addr in ["nuts-node:1323", "ftp://nuts-node", "not a url"] {
            let err = load(&[("DASHBOARD_TITLE", "t"), ("DASHBOARD_NODE_ADDR", addr)]).unwrap_err();
            assert!(matches!(err, ConfigError::InvalidUrl(_)), "addr: {addr}");
        }
    }

    #[test]
    fn test_overrides() {
        let mut vars = REQUIRED.to_vec();
        vars.extend([
            ("DASHBOARD_NODE_INTERNAL_ADDR", "http://nuts-node:8081"),
            ("DASHBOARD_DEBUG", "1"),
            ("DASHBOARD_MAX_PAGES", "0"),
            ("DASHBOARD_UPSTREAM_TIMEOUT_SECS", "5"),
            ("PORT", "9090"),
            ("ALLOWED_ORIGINS", "https://a.example, https://b.example,"),
            ("METRICS_TOKEN", "s3cret"),
        ]);
        let config = load(&vars).unwrap();
        assert_eq!(config.internal_url, "http://nuts-node:8081");
        assert!(config.debug);
        assert_eq!(config.max_pages, None);
        assert_eq!(config.upstream_timeout, Duration::from_secs(5));
        assert_eq!(config.port, 9090);
        assert_eq!(
            config.allowed_origins,
            vec!["https://a.example", "https://b.example"]
        );
        assert_eq!(config.metrics_token.as_deref(), Some("s3cret"));
    }

    #[test]
    fn test_invalid_max_pages() {
        let mut vars = REQUIRED.to_vec();
        vars.push(("DASHBOARD_MAX_PAGES", "lots"));
        let err = load(&vars).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidNumber("DASHBOARD_MAX_PAGES", _)
        ));
    }

    #[test]
    fn test_debug_redacts_metrics_token() {
        let mut vars = REQUIRED.to_vec();
        vars.push(("METRICS_TOKEN", "s3cret"));
        let config = load(&vars).unwrap();
        let printed = format!("{config:?}");
        assert!(!printed.contains("s3cret"));
        assert!(printed.contains("[REDACTED]"));
    }
}
