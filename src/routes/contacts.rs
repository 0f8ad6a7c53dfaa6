use std::net::SocketAddr;

use axum::extract::{ConnectInfo, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use bytes::Bytes;
use serde_json::{json, Map, Value};

use crate::auth::extractor::AuthAdmin;
use crate::db;
use crate::db::contacts::NewContact;
use crate::error::AppError;
use crate::models::ContactMethod;
use crate::rate_limit::FormKind;
use crate::state::SharedState;
use crate::upload;
use crate::validation::Checks;

pub async fn create(
    State(state): State<SharedState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, Json<Value>), AppError> {
    if let Err(retry_after) = state.submission_limiter.check(FormKind::Contact, addr.ip()) {
        return Err(AppError::RateLimited(format!(
            "Too many submissions. Try again in {retry_after} seconds."
        )));
    }

    let body = upload::read_fields(&headers, &body)?;
    let new_contact = validate_contact(&body)?;
    let contact = db::contacts::create(&state.pool, &new_contact).await?;
    tracing::info!("Contact message {} received", contact.id);

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Thank you for your message. We will get back to you soon.",
            "data": contact,
        })),
    ))
}

pub async fn list(
    _auth: AuthAdmin,
    State(state): State<SharedState>,
) -> Result<Json<Value>, AppError> {
    let contacts = db::contacts::list(&state.pool).await?;
    Ok(Json(json!({
        "success": true,
        "data": contacts,
    })))
}

fn validate_contact(body: &Map<String, Value>) -> Result<NewContact, AppError> {
    let present = |field: &str| {
        body.get(field)
            .and_then(Value::as_str)
            .is_some_and(|s| !s.trim().is_empty())
    };
    if !(present("name") && present("email") && present("message")) {
        return Err(AppError::BadRequest(
            "Name, email and message are required.".to_string(),
        ));
    }

    let mut checks = Checks::new();
    let name = checks.required_text(body, "name", 1, 100);
    let email = checks.email(body, "email");
    let message = checks.required_text(body, "message", 1, 5000);
    let phone = checks.optional_text(body, "phone", 1, 30);
    let service = checks.optional_text(body, "service", 1, 100);
    let contact_method = match body.get("contactMethod") {
        None | Some(Value::Null) => ContactMethod::Email,
        Some(Value::String(s)) if s.trim().is_empty() => ContactMethod::Email,
        Some(Value::String(s)) => ContactMethod::parse(s.trim()).unwrap_or_else(|| {
            checks.push("contactMethod", "contactMethod must be one of email, phone, whatsapp");
            ContactMethod::Email
        }),
        Some(_) => {
            checks.push("contactMethod", "contactMethod must be a string");
            ContactMethod::Email
        }
    };
    checks.finish()?;

    Ok(NewContact {
        name: name.unwrap_or_default(),
        email: email.unwrap_or_default(),
        phone,
        service,
        message: message.unwrap_or_default(),
        contact_method,
    })
}
