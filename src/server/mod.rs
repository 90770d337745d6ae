//! HTTP service
//!
//! Exposes the batch, streaming, retry and location endpoints over one shared
//! [`Coordinator`]. Every route answers its wrong methods with a JSON 405.

mod error;
mod routes;

pub use error::ApiError;
pub use routes::{LocationParams, RetryBody, RetryResponse, SearchParams};

use crate::config::Config;
use crate::crawler::Coordinator;
use axum::extract::Request;
use axum::http::header::CONTENT_TYPE;
use axum::http::{Method, StatusCode};
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// State shared by every handler
#[derive(Clone)]
pub struct AppState {
    pub coordinator: Arc<Coordinator>,

    /// Interval between keep-alive comments on event streams
    pub keep_alive: Duration,
}

impl AppState {
    pub fn new(coordinator: Coordinator) -> Self {
        let keep_alive = Duration::from_secs(coordinator.config().server.keep_alive_secs);
        Self {
            coordinator: Arc::new(coordinator),
            keep_alive,
        }
    }
}

/// Builds the application router
pub fn router(state: AppState) -> Router {
    let allow_any_origin = state.coordinator.config().server.cors_allow_any_origin;

    let router = Router::new()
        .route(
            "/api/run-search",
            post(routes::run_search)
                .options(routes::preflight)
                .fallback(routes::post_only),
        )
        .route(
            "/api/run-search-sse",
            get(routes::run_search_sse)
                .options(routes::preflight)
                .fallback(routes::get_only),
        )
        .route(
            "/api/retry-scrape",
            post(routes::retry_scrape)
                .options(routes::preflight)
                .fallback(routes::post_only),
        )
        .route(
            "/api/proxy-locations",
            get(routes::proxy_locations)
                .options(routes::preflight)
                .fallback(routes::get_only),
        )
        .with_state(state);

    let router = if allow_any_origin {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([CONTENT_TYPE]);
        router
            .layer(cors)
            .layer(middleware::from_fn(no_content_preflight))
    } else {
        router
    };

    router.layer(TraceLayer::new_for_http())
}

/// Answers preflights with 204 like the route handlers do
///
/// The CORS layer short-circuits every `OPTIONS` request with an empty 200.
async fn no_content_preflight(request: Request, next: Next) -> Response {
    let is_preflight = request.method() == Method::OPTIONS;
    let mut response = next.run(request).await;
    if is_preflight && response.status() == StatusCode::OK {
        *response.status_mut() = StatusCode::NO_CONTENT;
    }
    response
}

/// Binds the configured address and serves until the process is stopped
pub async fn serve(config: Config) -> crate::Result<()> {
    let bind = config.server.bind.clone();
    let coordinator = Coordinator::from_config(config)?;
    let app = router(AppState::new(coordinator));

    let listener = tokio::net::TcpListener::bind(&bind).await?;
    tracing::info!(address = %bind, "Listening");

    axum::serve(listener, app).await?;
    Ok(())
}
