use actix_governor::{Governor, GovernorConfigBuilder};
use actix_web::{middleware::Logger, web, App, HttpServer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use dashboard::{metrics::register_metrics, Dashboard, HttpNodeClient};
use dashboard_server::{config::ServerConfig, cors::build_cors, routes, state::AppState};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,actix_web=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Invalid configuration: {e}");
            std::process::exit(1);
        }
    };
    let port = config.port;
    let allowed_origins = config.allowed_origins.clone();
    let rate_limit_rpm = config.rate_limit_rpm;
    let web_dir = config.web_dir.clone();

    tracing::info!("Using Nuts node status base URL: {}", config.status_url);
    tracing::info!("Using Nuts node internal base URL: {}", config.internal_url);
    match config.max_pages {
        Some(max) => tracing::info!("Transaction walk limited to {max} pages"),
        None => tracing::warn!("Transaction walk page limit disabled"),
    }
    if config.debug {
        tracing::info!("Debug mode: raw diagnostics responses will be logged");
    }
    if config.metrics_token.is_none() {
        tracing::warn!("METRICS_TOKEN not set, /metrics endpoint is publicly accessible");
    }

    // Register Prometheus metrics
    register_metrics();

    let node = HttpNodeClient::with_timeout(
        &config.status_url,
        &config.internal_url,
        config.upstream_timeout,
    )
    .map_err(std::io::Error::other)?
    .debug(config.debug);
    let dashboard = Dashboard::new(node).max_pages(config.max_pages);

    // Create shared state
    let state_data = web::Data::new(AppState::new(config, dashboard));

    // Configure rate limiter
    let governor_conf = GovernorConfigBuilder::default()
        .requests_per_minute(rate_limit_rpm as u64)
        .finish()
        .ok_or_else(|| std::io::Error::other("invalid rate limiter config"))?;

    if std::path::Path::new(&web_dir).is_dir() {
        tracing::info!("Serving frontend from: {}", web_dir);
    } else {
        tracing::warn!("Frontend directory {} not found, / will return 404", web_dir);
    }

    tracing::info!("Starting nuts-dashboard on port {}", port);

    // Start HTTP server
    HttpServer::new(move || {
        App::new()
            .app_data(state_data.clone())
            .wrap(Logger::default().exclude("/status"))
            .wrap(build_cors(&allowed_origins))
            .wrap(Governor::new(&governor_conf))
            .configure(routes::configure::<HttpNodeClient>)
            // Static frontend last (catch-all)
            .service(actix_files::Files::new("/", &web_dir).index_file("index.html"))
    })
    .bind(("0.0.0.0", port))?
    .run()
    .await
}
