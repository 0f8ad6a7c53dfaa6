pub mod assets;
pub mod auth;
pub mod bootstrap;
pub mod config;
pub mod db;
pub mod email;
pub mod error;
pub mod models;
pub mod rate_limit;
pub mod routes;
pub mod state;
pub mod upload;
pub mod validation;

use std::time::Duration;

use axum::extract::DefaultBodyLimit;
use axum::http::{HeaderName, HeaderValue};
use axum::Router;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::state::SharedState;

const LIMITER_SWEEP: Duration = Duration::from_secs(15 * 60);

pub fn build_app(state: SharedState) -> Router {
    let max_body_size = state.config.max_body_size;

    Router::new()
        .merge(routes::api_routes())
        .route("/health", axum::routing::get(health))
        .fallback(routes::not_found)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive())
                .layer(SetResponseHeaderLayer::overriding(
                    HeaderName::from_static("x-content-type-options"),
                    HeaderValue::from_static("nosniff"),
                ))
                .layer(SetResponseHeaderLayer::overriding(
                    HeaderName::from_static("x-frame-options"),
                    HeaderValue::from_static("DENY"),
                ))
                .layer(SetResponseHeaderLayer::overriding(
                    HeaderName::from_static("referrer-policy"),
                    HeaderValue::from_static("strict-origin-when-cross-origin"),
                ))
                .layer(DefaultBodyLimit::max(max_body_size)),
        )
        .with_state(state)
}

/// Periodically drop expired rate limiter entries.
pub fn spawn_limiter_sweeper(state: SharedState) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(LIMITER_SWEEP);
        loop {
            interval.tick().await;
            state.submission_limiter.cleanup(LIMITER_SWEEP);
            state.login_limiter.cleanup(LIMITER_SWEEP);
            tracing::debug!("Rate limiter entries swept");
        }
    })
}

async fn health() -> &'static str {
    "ok"
}
