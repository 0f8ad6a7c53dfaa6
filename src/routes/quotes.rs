use std::net::SocketAddr;

use axum::extract::{ConnectInfo, Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use bytes::Bytes;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use uuid::Uuid;

use super::Page;
use crate::auth::extractor::AuthAdmin;
use crate::db;
use crate::db::quotes::NewQuote;
use crate::error::AppError;
use crate::models::QuoteStatus;
use crate::rate_limit::FormKind;
use crate::state::SharedState;
use crate::upload;
use crate::validation::Checks;

const EMAIL_WARNING: &str = "Email notification may be delayed.";

pub async fn create(
    State(state): State<SharedState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, Json<Value>), AppError> {
    if let Err(retry_after) = state.submission_limiter.check(FormKind::Quote, addr.ip()) {
        return Err(AppError::RateLimited(format!(
            "Too many submissions. Try again in {retry_after} seconds."
        )));
    }

    let body = upload::read_fields(&headers, &body)?;
    let new_quote = validate_quote(&body)?;
    let quote = db::quotes::create(&state.pool, &new_quote).await?;
    tracing::info!("Quote {} received from {}", quote.id, quote.email);

    let delivered = match &state.notifier {
        Some(notifier) => match notifier.notify_quote(&quote).await {
            Ok(()) => true,
            Err(e) => {
                tracing::error!("Quote {} notification failed: {e}", quote.id);
                false
            }
        },
        None => {
            tracing::warn!("Quote {} stored without notification: SMTP not configured", quote.id);
            false
        }
    };

    let mut response = json!({
        "success": true,
        "message": "Quote request submitted successfully",
        "quoteId": quote.id,
    });
    if !delivered {
        response["warning"] = json!(EMAIL_WARNING);
    }

    Ok((StatusCode::CREATED, Json(response)))
}

#[derive(Deserialize)]
pub struct ListParams {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub status: Option<String>,
}

pub async fn list(
    _auth: AuthAdmin,
    State(state): State<SharedState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Value>, AppError> {
    let mut checks = Checks::new();
    let page = Page::parse(params.page.as_deref(), params.limit.as_deref(), &mut checks);
    let status = match params.status.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        None => None,
        Some(raw) => {
            let parsed = QuoteStatus::parse(raw);
            if parsed.is_none() {
                checks.push("status", "status must be one of new, read, archived");
            }
            parsed
        }
    };
    checks.finish()?;

    let (quotes, total) = tokio::try_join!(
        db::quotes::list(&state.pool, status, page.limit, page.offset()),
        db::quotes::count(&state.pool, status),
    )?;

    Ok(Json(json!({
        "quotes": quotes,
        "pagination": page.envelope(total),
    })))
}

pub async fn get(
    auth: AuthAdmin,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let mut quote = db::quotes::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Quote not found".to_string()))?;

    // First admin read marks the quote as read.
    if quote.status == QuoteStatus::New {
        quote = db::quotes::set_status(&state.pool, id, QuoteStatus::Read)
            .await?
            .ok_or_else(|| AppError::NotFound("Quote not found".to_string()))?;
        tracing::info!("Quote {} marked read by {}", quote.id, auth.email);
    }

    Ok(Json(json!({ "quote": quote })))
}

pub async fn update_status(
    auth: AuthAdmin,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Value>, AppError> {
    let body = upload::read_fields(&headers, &body)?;
    let next = body
        .get("status")
        .and_then(Value::as_str)
        .and_then(|s| QuoteStatus::parse(s.trim()))
        .ok_or_else(|| AppError::BadRequest("Invalid status".to_string()))?;

    let current = db::quotes::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Quote not found".to_string()))?;

    if !current.status.can_transition_to(next) {
        return Err(AppError::BadRequest(format!(
            "Invalid status transition: {} -> {}",
            current.status, next
        )));
    }

    let quote = db::quotes::set_status(&state.pool, id, next)
        .await?
        .ok_or_else(|| AppError::NotFound("Quote not found".to_string()))?;

    tracing::info!(
        "Quote {} moved {} -> {} by {}",
        quote.id,
        current.status,
        next,
        auth.email
    );

    Ok(Json(json!({
        "success": true,
        "message": "Quote status updated",
        "quote": quote,
    })))
}

fn validate_quote(body: &Map<String, Value>) -> Result<NewQuote, AppError> {
    let mut checks = Checks::new();
    let first_name = checks.required_text(body, "firstName", 1, 50);
    let last_name = checks.required_text(body, "lastName", 1, 50);
    let email = checks.email(body, "email");
    let phone = checks.required_text(body, "phone", 10, 20);
    let location = checks.required_text(body, "location", 1, 100);
    let project_type = checks.required_text(body, "projectType", 1, 100);
    let budget = checks.required_text(body, "budget", 1, 100);
    let timeline = checks.required_text(body, "timeline", 1, 100);
    let description = checks.required_text(body, "description", 20, 2000);
    let has_plans = checks.flag(body, "hasPlans");
    let newsletter = checks.flag(body, "newsletter");
    checks.finish()?;

    Ok(NewQuote {
        first_name: first_name.unwrap_or_default(),
        last_name: last_name.unwrap_or_default(),
        email: email.unwrap_or_default(),
        phone: phone.unwrap_or_default(),
        location: location.unwrap_or_default(),
        project_type: project_type.unwrap_or_default(),
        budget: budget.unwrap_or_default(),
        timeline: timeline.unwrap_or_default(),
        description: description.unwrap_or_default(),
        has_plans,
        newsletter,
    })
}
