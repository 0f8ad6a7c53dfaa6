//! Request body intake: multipart forms with image files for project writes,
//! and plain JSON / urlencoded bodies everywhere. Files stay in memory.

use axum::http::header::CONTENT_TYPE;
use axum::http::HeaderMap;
use bytes::Bytes;
use serde_json::{Map, Value};

use crate::error::AppError;

/// Multipart field that carries image files.
pub const FILE_FIELD: &str = "images";
pub const MAX_FILES: usize = 10;
pub const MAX_FILE_BYTES: usize = 5 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub content_type: String,
    pub data: Bytes,
}

#[derive(Debug, Default)]
pub struct FormPayload {
    pub fields: Map<String, Value>,
    pub files: Vec<UploadedFile>,
}

/// Read a request body according to its `Content-Type`.
pub async fn read_payload(headers: &HeaderMap, body: Bytes) -> Result<FormPayload, AppError> {
    let content_type = headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok());

    if content_type.is_some_and(|ct| ct.starts_with("multipart/form-data")) {
        parse_multipart(headers, body).await
    } else {
        Ok(FormPayload {
            fields: parse_body(content_type, &body)?,
            files: Vec::new(),
        })
    }
}

/// Field map of a JSON or urlencoded body, keyed off the `Content-Type`
/// header. Used by the routes that never take files.
pub fn read_fields(headers: &HeaderMap, body: &[u8]) -> Result<Map<String, Value>, AppError> {
    let content_type = headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok());
    parse_body(content_type, body)
}

/// Parse a JSON or urlencoded body into a field map.
pub fn parse_body(content_type: Option<&str>, body: &[u8]) -> Result<Map<String, Value>, AppError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Map::new());
    }

    let ct = content_type.unwrap_or("application/json");
    let value = if ct.contains("application/x-www-form-urlencoded") {
        parse_form_urlencoded(body)?
    } else {
        serde_json::from_slice(body)
            .map_err(|e| AppError::BadRequest(format!("Invalid JSON: {e}")))?
    };

    match value {
        Value::Object(map) => Ok(map),
        _ => Err(AppError::BadRequest(
            "Request body must be an object".to_string(),
        )),
    }
}

fn parse_form_urlencoded(body: &[u8]) -> Result<Value, AppError> {
    let mut map = Map::new();
    for (k, v) in form_urlencoded::parse(body) {
        insert_text(&mut map, k.into_owned(), v.into_owned());
    }
    Ok(Value::Object(map))
}

/// Parse a multipart body with multer. Image files under [`FILE_FIELD`] are
/// buffered; every other part must be text.
pub async fn parse_multipart(headers: &HeaderMap, body: Bytes) -> Result<FormPayload, AppError> {
    let boundary = headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|ct| multer::parse_boundary(ct).ok())
        .ok_or_else(|| AppError::BadRequest("Missing multipart boundary".to_string()))?;

    let constraints = multer::Constraints::new()
        .size_limit(multer::SizeLimit::new().per_field(MAX_FILE_BYTES as u64));
    let stream = futures_util::stream::once(async { Ok::<_, std::io::Error>(body) });
    let mut multipart = multer::Multipart::with_constraints(stream, boundary, constraints);

    let mut payload = FormPayload::default();
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();

        let Some(file_name) = field.file_name().map(str::to_string) else {
            let value = field.text().await.map_err(multipart_error)?;
            insert_text(&mut payload.fields, name, value);
            continue;
        };

        if name != FILE_FIELD {
            return Err(AppError::BadRequest(format!("Unexpected file field: {name}")));
        }
        if payload.files.len() >= MAX_FILES {
            return Err(AppError::BadRequest(format!(
                "Too many files (max {MAX_FILES})"
            )));
        }

        let content_type = field
            .content_type()
            .map(|m| m.essence_str().to_string())
            .unwrap_or_default();
        if !content_type.starts_with("image/") {
            return Err(AppError::BadRequest(
                "Only image files are allowed".to_string(),
            ));
        }

        let data = field.bytes().await.map_err(multipart_error)?;
        payload.files.push(UploadedFile {
            file_name,
            content_type,
            data,
        });
    }

    Ok(payload)
}

fn multipart_error(err: multer::Error) -> AppError {
    match err {
        multer::Error::FieldSizeExceeded { .. } => {
            AppError::BadRequest("File too large (max 5MB)".to_string())
        }
        other => AppError::BadRequest(format!("Malformed multipart body: {other}")),
    }
}

// A repeated text field becomes an array, in arrival order.
fn insert_text(map: &mut Map<String, Value>, name: String, value: String) {
    match map.get_mut(&name) {
        None => {
            map.insert(name, Value::String(value));
        }
        Some(Value::Array(items)) => items.push(Value::String(value)),
        Some(existing) => {
            let first = existing.take();
            *existing = Value::Array(vec![first, Value::String(value)]);
        }
    }
}
