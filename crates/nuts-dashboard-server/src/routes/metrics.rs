use actix_web::{web, HttpRequest, HttpResponse};
use dashboard::NodeApi;

use crate::state::AppState;

/// Constant-time byte comparison that does not leak input lengths.
/// Both inputs are hashed to fixed-length digests before comparison.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    use sha2::{Digest, Sha256};
    let ha = Sha256::digest(a);
    let hb = Sha256::digest(b);
    let mut result = 0u8;
    for (x, y) in ha.iter().zip(hb.iter()) {
        result |= x ^ y;
    }
    result == 0
}

/// GET /metrics - Prometheus metrics (bearer-gated when METRICS_TOKEN is set)
pub async fn metrics<N: NodeApi + 'static>(
    req: HttpRequest,
    state: web::Data<AppState<N>>,
) -> HttpResponse {
    if let Some(ref expected_token) = state.config.metrics_token {
        let authorized = req
            .headers()
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(|token| constant_time_eq(token.as_bytes(), expected_token.as_bytes()))
            .unwrap_or(false);

        if !authorized {
            return HttpResponse::Unauthorized().json(serde_json::json!({
                "error": "unauthorized",
                "message": "Valid Bearer token required for /metrics"
            }));
        }
    }

    match dashboard::metrics::metrics_output() {
        Ok(output) => HttpResponse::Ok()
            .content_type("text/plain; version=0.0.4")
            .body(output),
        Err(e) => {
            tracing::error!("Failed to encode metrics: {}", e);
            HttpResponse::InternalServerError().body("Failed to encode metrics")
        }
    }
}

pub fn configure<N: NodeApi + 'static>(cfg: &mut web::ServiceConfig) {
    cfg.route("/metrics", web::get().to(metrics::<N>));
}
