use sqlx::PgPool;
use uuid::Uuid;

use crate::models::Project;

pub struct NewProject<'a> {
    pub title: &'a str,
    pub location: &'a str,
    pub category: &'a str,
    pub description: &'a str,
    pub images: &'a [String],
    pub asset_ids: &'a [String],
}

/// Column changes for an update. `None` leaves the column untouched;
/// `images` and `asset_ids` are always replaced together.
#[derive(Debug, Default)]
pub struct ProjectChanges {
    pub title: Option<String>,
    pub location: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub images: Option<Vec<String>>,
    pub asset_ids: Option<Vec<String>>,
}

#[derive(Debug, Default)]
pub struct ListFilter {
    pub category: Option<String>,
    pub location: Option<String>,
}

impl ListFilter {
    fn patterns(&self) -> (Option<String>, Option<String>) {
        (
            self.category.as_deref().map(super::contains_pattern),
            self.location.as_deref().map(super::contains_pattern),
        )
    }
}

pub async fn create(pool: &PgPool, project: &NewProject<'_>) -> Result<Project, sqlx::Error> {
    sqlx::query_as::<_, Project>(
        "INSERT INTO projects (title, location, category, description, images, asset_ids)
         VALUES ($1, $2, $3, $4, $5, $6) RETURNING *",
    )
    .bind(project.title)
    .bind(project.location)
    .bind(project.category)
    .bind(project.description)
    .bind(project.images)
    .bind(project.asset_ids)
    .fetch_one(pool)
    .await
}

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Project>, sqlx::Error> {
    sqlx::query_as::<_, Project>("SELECT * FROM projects WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn list(
    pool: &PgPool,
    filter: &ListFilter,
    limit: i64,
    offset: i64,
) -> Result<Vec<Project>, sqlx::Error> {
    let (category, location) = filter.patterns();
    sqlx::query_as::<_, Project>(
        "SELECT * FROM projects
         WHERE ($1::text IS NULL OR category ILIKE $1)
           AND ($2::text IS NULL OR location ILIKE $2)
         ORDER BY created_at DESC, id DESC
         LIMIT $3 OFFSET $4",
    )
    .bind(category)
    .bind(location)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await
}

pub async fn count(pool: &PgPool, filter: &ListFilter) -> Result<i64, sqlx::Error> {
    let (category, location) = filter.patterns();
    let row: (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM projects
         WHERE ($1::text IS NULL OR category ILIKE $1)
           AND ($2::text IS NULL OR location ILIKE $2)",
    )
    .bind(category)
    .bind(location)
    .fetch_one(pool)
    .await?;
    Ok(row.0)
}

pub async fn update(
    pool: &PgPool,
    id: Uuid,
    changes: &ProjectChanges,
) -> Result<Option<Project>, sqlx::Error> {
    sqlx::query_as::<_, Project>(
        "UPDATE projects SET
            title = COALESCE($2, title),
            location = COALESCE($3, location),
            category = COALESCE($4, category),
            description = COALESCE($5, description),
            images = COALESCE($6, images),
            asset_ids = COALESCE($7, asset_ids),
            updated_at = now()
         WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(changes.title.as_deref())
    .bind(changes.location.as_deref())
    .bind(changes.category.as_deref())
    .bind(changes.description.as_deref())
    .bind(changes.images.as_deref())
    .bind(changes.asset_ids.as_deref())
    .fetch_optional(pool)
    .await
}

/// Delete a project, returning the removed row so its assets can be released.
pub async fn delete(pool: &PgPool, id: Uuid) -> Result<Option<Project>, sqlx::Error> {
    sqlx::query_as::<_, Project>("DELETE FROM projects WHERE id = $1 RETURNING *")
        .bind(id)
        .fetch_optional(pool)
        .await
}
