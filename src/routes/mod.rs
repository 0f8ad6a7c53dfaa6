pub mod auth;
pub mod contacts;
pub mod projects;
pub mod quotes;

use axum::http::{Method, StatusCode, Uri};
use axum::response::IntoResponse;
use axum::routing::{get, post, put};
use axum::Json;
use axum::Router;
use serde_json::json;

use crate::state::SharedState;
use crate::validation::Checks;

pub fn api_routes() -> Router<SharedState> {
    Router::new()
        // Auth
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/me", get(auth::me))
        // Projects
        .route("/api/projects", get(projects::list).post(projects::create))
        .route(
            "/api/projects/{id}",
            get(projects::get)
                .put(projects::update)
                .delete(projects::delete),
        )
        // Quotes
        .route("/api/quotes", get(quotes::list).post(quotes::create))
        .route("/api/quotes/{id}", get(quotes::get))
        .route("/api/quotes/{id}/status", put(quotes::update_status))
        // Contact
        .route("/api/contact", get(contacts::list).post(contacts::create))
}

pub async fn not_found(method: Method, uri: Uri) -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "error": "Route not found",
            "path": uri.path(),
            "method": method.as_str(),
        })),
    )
}

const DEFAULT_LIMIT: i64 = 10;
const MAX_LIMIT: i64 = 100;

/// A validated `page` / `limit` pair from the query string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub page: i64,
    pub limit: i64,
}

impl Page {
    /// Parse the raw query values; bad values are reported on `checks`.
    pub fn parse(page: Option<&str>, limit: Option<&str>, checks: &mut Checks) -> Self {
        let page = match page.map(str::trim).filter(|s| !s.is_empty()) {
            None => 1,
            Some(raw) => match raw.parse::<i64>() {
                Ok(n) if n >= 1 => n,
                _ => {
                    checks.push("page", "page must be a positive integer");
                    1
                }
            },
        };

        let limit = match limit.map(str::trim).filter(|s| !s.is_empty()) {
            None => DEFAULT_LIMIT,
            Some(raw) => match raw.parse::<i64>() {
                Ok(n) if (1..=MAX_LIMIT).contains(&n) => n,
                _ => {
                    checks.push("limit", format!("limit must be between 1 and {MAX_LIMIT}"));
                    DEFAULT_LIMIT
                }
            },
        };

        Self { page, limit }
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }

    /// The `pagination` envelope for a result set of `total` rows.
    pub fn envelope(&self, total: i64) -> serde_json::Value {
        json!({
            "page": self.page,
            "limit": self.limit,
            "total": total,
            "pages": (total + self.limit - 1) / self.limit,
        })
    }
}
