//! CORS configuration for the dashboard server.

use actix_cors::Cors;

/// Build the CORS middleware from allowed origins.
///
/// The bundled frontend is same-origin; listed origins may additionally read
/// the JSON endpoints. `*` admits any origin.
pub fn build_cors(allowed_origins: &[String]) -> Cors {
    let allowed = allowed_origins.to_vec();
    Cors::default()
        .allowed_origin_fn(move |origin, _req_head| {
            let origin_str = origin.to_str().unwrap_or("");
            allowed.iter().any(|a| a == "*" || a == origin_str)
        })
        .allowed_methods(vec!["GET", "OPTIONS"])
        .allowed_headers(vec![
            actix_web::http::header::AUTHORIZATION,
            actix_web::http::header::ACCEPT,
        ])
        .max_age(3600)
}
