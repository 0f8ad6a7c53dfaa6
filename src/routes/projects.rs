use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use bytes::Bytes;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use uuid::Uuid;

use super::Page;
use crate::assets::uploader;
use crate::assets::AssetStore;
use crate::auth::extractor::AuthAdmin;
use crate::db;
use crate::db::projects::{ListFilter, NewProject, ProjectChanges};
use crate::error::AppError;
use crate::state::SharedState;
use crate::upload::{self, UploadedFile};
use crate::validation::Checks;

const TITLE_MAX: usize = 200;
const LOCATION_MAX: usize = 100;
const CATEGORY_MAX: usize = 50;
const DESCRIPTION_MIN: usize = 20;
const DESCRIPTION_MAX: usize = 2000;

#[derive(Deserialize)]
pub struct ListParams {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub category: Option<String>,
    pub location: Option<String>,
}

pub async fn list(
    State(state): State<SharedState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Value>, AppError> {
    let mut checks = Checks::new();
    let page = Page::parse(params.page.as_deref(), params.limit.as_deref(), &mut checks);
    checks.finish()?;

    let filter = ListFilter {
        category: non_blank(params.category),
        location: non_blank(params.location),
    };

    let (projects, total) = tokio::try_join!(
        db::projects::list(&state.pool, &filter, page.limit, page.offset()),
        db::projects::count(&state.pool, &filter),
    )?;

    Ok(Json(json!({
        "projects": projects,
        "pagination": page.envelope(total),
    })))
}

pub async fn get(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let project = db::projects::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Project not found".to_string()))?;
    Ok(Json(json!({ "project": project })))
}

pub async fn create(
    auth: AuthAdmin,
    State(state): State<SharedState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let payload = upload::read_payload(&headers, body).await?;

    let mut checks = Checks::new();
    let title = checks.required_text(&payload.fields, "title", 1, TITLE_MAX);
    let location = checks.required_text(&payload.fields, "location", 1, LOCATION_MAX);
    let category = checks.required_text(&payload.fields, "category", 1, CATEGORY_MAX);
    let description =
        checks.required_text(&payload.fields, "description", DESCRIPTION_MIN, DESCRIPTION_MAX);
    let body_images = body_images(&payload.fields, &mut checks);
    checks.finish()?;
    let (title, location, category, description) = (
        title.unwrap_or_default(),
        location.unwrap_or_default(),
        category.unwrap_or_default(),
        description.unwrap_or_default(),
    );

    let resolved = resolve_images(&state, &payload.files, body_images).await?;
    let Some(resolved) = resolved.filter(|r| !r.images.is_empty()) else {
        return Err(AppError::BadRequest("At least one image is required".to_string()));
    };

    let new_project = NewProject {
        title: &title,
        location: &location,
        category: &category,
        description: &description,
        images: &resolved.images,
        asset_ids: &resolved.asset_ids,
    };

    let project = match db::projects::create(&state.pool, &new_project).await {
        Ok(project) => project,
        Err(e) => {
            release(&state, &resolved.asset_ids).await;
            return Err(e.into());
        }
    };

    tracing::info!(
        "Project {} created by {} with {} image(s)",
        project.id,
        auth.email,
        project.images.len()
    );

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Project created successfully",
            "project": project,
        })),
    ))
}

pub async fn update(
    auth: AuthAdmin,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Value>, AppError> {
    let payload = upload::read_payload(&headers, body).await?;

    let mut checks = Checks::new();
    let mut changes = ProjectChanges {
        title: checks.optional_text(&payload.fields, "title", 1, TITLE_MAX),
        location: checks.optional_text(&payload.fields, "location", 1, LOCATION_MAX),
        category: checks.optional_text(&payload.fields, "category", 1, CATEGORY_MAX),
        description: checks.optional_text(
            &payload.fields,
            "description",
            DESCRIPTION_MIN,
            DESCRIPTION_MAX,
        ),
        ..Default::default()
    };
    let body_images = body_images(&payload.fields, &mut checks);
    checks.finish()?;

    let existing = db::projects::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Project not found".to_string()))?;

    let mut fresh_ids: Vec<String> = Vec::new();
    let mut superseded: Vec<String> = Vec::new();

    if let Some(resolved) = resolve_images(&state, &payload.files, body_images).await? {
        if resolved.images.is_empty() {
            return Err(AppError::BadRequest("At least one image is required".to_string()));
        }

        // Assets this service uploaded stay owned while a kept URL still
        // points at them.
        let (kept, dropped): (Vec<String>, Vec<String>) = existing
            .asset_ids
            .iter()
            .cloned()
            .partition(|public_id| {
                resolved
                    .images
                    .iter()
                    .any(|url| url.contains(public_id.as_str()))
            });

        fresh_ids = resolved.asset_ids.clone();
        superseded = dropped;

        let mut asset_ids = kept;
        asset_ids.extend(resolved.asset_ids);
        changes.images = Some(resolved.images);
        changes.asset_ids = Some(asset_ids);
    }

    let project = match db::projects::update(&state.pool, id, &changes).await {
        Ok(Some(project)) => project,
        Ok(None) => {
            release(&state, &fresh_ids).await;
            return Err(AppError::NotFound("Project not found".to_string()));
        }
        Err(e) => {
            release(&state, &fresh_ids).await;
            return Err(e.into());
        }
    };

    release(&state, &superseded).await;

    tracing::info!("Project {} updated by {}", project.id, auth.email);

    Ok(Json(json!({
        "success": true,
        "message": "Project updated successfully",
        "project": project,
    })))
}

pub async fn delete(
    auth: AuthAdmin,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let project = db::projects::delete(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Project not found".to_string()))?;

    release(&state, &project.asset_ids).await;

    tracing::info!("Project {} deleted by {}", project.id, auth.email);

    Ok(Json(json!({
        "success": true,
        "message": "Project deleted successfully",
    })))
}

/// The image list a write resolved to, with the ids of assets uploaded for it.
#[derive(Debug, Default, PartialEq)]
struct ResolvedImages {
    images: Vec<String>,
    asset_ids: Vec<String>,
}

/// Uploaded files win over the body `images` field. `None` means the request
/// said nothing about images.
async fn resolve_images(
    state: &SharedState,
    files: &[UploadedFile],
    body_images: Option<Vec<String>>,
) -> Result<Option<ResolvedImages>, AppError> {
    if files.is_empty() {
        return Ok(body_images.map(|images| ResolvedImages {
            images,
            asset_ids: Vec::new(),
        }));
    }

    let store = asset_store(state)?;
    let stored = uploader::upload_all(store.as_ref(), files, state.config.upload_delay)
        .await
        .map_err(AppError::Upstream)?;

    let (images, asset_ids) = stored
        .into_iter()
        .map(|asset| (asset.url, asset.public_id))
        .unzip();

    Ok(Some(ResolvedImages { images, asset_ids }))
}

/// Read the body `images` field: an array of URLs, a JSON-encoded array, or
/// a single URL. Blank entries are dropped; every other entry must be an
/// absolute http(s) URL.
fn body_images(fields: &Map<String, Value>, checks: &mut Checks) -> Option<Vec<String>> {
    let raw = match fields.get(upload::FILE_FIELD) {
        None | Some(Value::Null) => return None,
        Some(value) => value,
    };

    let list = match raw {
        Value::Array(items) => url_list(items, checks),
        Value::String(s) if s.trim_start().starts_with('[') => {
            match serde_json::from_str::<Vec<Value>>(s) {
                Ok(items) => url_list(&items, checks),
                Err(_) => {
                    checks.push("images", "images must be a list of URLs");
                    Vec::new()
                }
            }
        }
        Value::String(s) => vec![s.trim().to_string()],
        _ => {
            checks.push("images", "images must be a list of URLs");
            Vec::new()
        }
    };

    let list: Vec<String> = list.into_iter().filter(|url| !url.is_empty()).collect();
    if !list.iter().all(|url| is_web_url(url)) {
        checks.push("images", "images must be a list of URLs");
        return Some(Vec::new());
    }
    Some(list)
}

fn is_web_url(raw: &str) -> bool {
    match reqwest::Url::parse(raw) {
        Ok(url) => matches!(url.scheme(), "http" | "https") && url.host_str().is_some_and(|h| !h.is_empty()),
        Err(_) => false,
    }
}

fn url_list(items: &[Value], checks: &mut Checks) -> Vec<String> {
    let mut urls = Vec::with_capacity(items.len());
    for item in items {
        match item {
            Value::String(s) => urls.push(s.trim().to_string()),
            _ => {
                checks.push("images", "images must be a list of URLs");
                return Vec::new();
            }
        }
    }
    urls
}

fn asset_store(state: &SharedState) -> Result<Arc<dyn AssetStore>, AppError> {
    state
        .assets
        .clone()
        .ok_or_else(|| AppError::Upstream("Missing asset store configuration".to_string()))
}

/// Best-effort deletion of remote assets no row refers to any more.
async fn release(state: &SharedState, public_ids: &[String]) {
    if public_ids.is_empty() {
        return;
    }
    match &state.assets {
        Some(store) => uploader::cleanup(store.as_ref(), public_ids).await,
        None => tracing::warn!(
            "Cannot release {} asset(s): asset store not configured",
            public_ids.len()
        ),
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}
