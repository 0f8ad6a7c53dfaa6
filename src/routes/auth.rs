use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use bytes::Bytes;
use serde_json::{json, Value};

use crate::auth::extractor::AuthAdmin;
use crate::auth::jwt::{encode_token, Claims};
use crate::auth::password;
use crate::db;
use crate::error::AppError;
use crate::state::SharedState;
use crate::upload;
use crate::validation::Checks;

pub async fn login(
    State(state): State<SharedState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Value>, AppError> {
    let body = upload::read_fields(&headers, &body)?;

    let mut checks = Checks::new();
    let email = checks.email(&body, "email");
    let password = checks.required_raw(&body, "password", 1024);
    checks.finish()?;
    let (email, password) = (email.unwrap_or_default(), password.unwrap_or_default());

    // Rate limit check
    if state.login_limiter.check(&email).is_err() {
        return Err(AppError::RateLimited(
            "Too many login attempts. Please try again later.".to_string(),
        ));
    }

    let Some(admin) = db::admins::find_by_email(&state.pool, &email).await? else {
        state.login_limiter.record_failure(&email);
        return Err(AppError::InvalidCredentials);
    };

    let valid = password::verify_async(password, admin.password_hash.clone())
        .await
        .map_err(AppError::Internal)?;

    if !valid {
        state.login_limiter.record_failure(&email);
        tracing::info!("Failed login for {email}");
        return Err(AppError::InvalidCredentials);
    }

    state.login_limiter.reset(&email);

    let claims = Claims::new(admin.id, admin.email.clone(), state.config.jwt_ttl);
    let token = encode_token(&claims, &state.config.jwt_secret).map_err(AppError::Internal)?;

    tracing::info!("Admin {} logged in", admin.email);

    Ok(Json(json!({
        "success": true,
        "token": token,
        "admin": {
            "id": admin.id,
            "email": admin.email,
            "name": admin.name,
            "role": admin.role,
        },
    })))
}

pub async fn me(
    auth: AuthAdmin,
    State(state): State<SharedState>,
) -> Result<Json<Value>, AppError> {
    let admin = db::admins::find_by_id(&state.pool, auth.id)
        .await?
        .ok_or(AppError::Unauthorized)?;

    Ok(Json(json!({
        "admin": {
            "id": admin.id,
            "email": admin.email,
            "name": admin.name,
            "role": admin.role,
            "createdAt": admin.created_at,
        },
    })))
}
