use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use uuid::Uuid;

use crate::auth::jwt;
use crate::db;
use crate::error::AppError;
use crate::state::SharedState;

/// The admin behind a verified bearer token, re-read from storage on every
/// request.
#[derive(Debug, Clone)]
pub struct AuthAdmin {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub role: String,
}

impl FromRequestParts<SharedState> for AuthAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &SharedState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .ok_or(AppError::Unauthorized)?
            .to_str()
            .map_err(|_| AppError::Unauthorized)?;

        let token = header.strip_prefix("Bearer ").unwrap_or(header).trim();
        if token.is_empty() {
            return Err(AppError::Unauthorized);
        }

        let claims = jwt::decode_token(token, &state.config.jwt_secret).map_err(|e| {
            tracing::debug!("Rejected bearer token: {e}");
            AppError::Unauthorized
        })?;

        let admin = db::admins::find_by_id(&state.pool, claims.sub)
            .await?
            .ok_or(AppError::Unauthorized)?;

        Ok(AuthAdmin {
            id: admin.id,
            email: admin.email,
            name: admin.name,
            role: admin.role,
        })
    }
}
