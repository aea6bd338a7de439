// HTTP routes configuration

use super::handlers::{health_handler, message_handler, metrics_handler, proxy_handler};
use crate::config::AppConfig;
use crate::error::Result;
use crate::worker::CacheWorker;
use axum::routing::{get, post};
use axum::Router;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;
use url::Url;

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub origin: Url,
    pub worker: CacheWorker,
}

pub fn create_router(config: AppConfig, worker: CacheWorker) -> Result<Router> {
    let origin = config.origin_url()?;
    let state = AppState {
        config,
        origin,
        worker,
    };

    let app = Router::new()
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .route("/worker/message", post(message_handler))
        // Everything else is an intercepted fetch
        .fallback(proxy_handler)
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .with_state(state);

    Ok(app)
}
