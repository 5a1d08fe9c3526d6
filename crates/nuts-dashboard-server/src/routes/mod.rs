pub mod data;
pub mod metrics;
pub mod status;

use actix_web::web;
use dashboard::NodeApi;

/// Mount every dashboard route except the static frontend.
pub fn configure<N: NodeApi + 'static>(cfg: &mut web::ServiceConfig) {
    status::configure(cfg);
    metrics::configure::<N>(cfg);
    data::configure::<N>(cfg);
}
