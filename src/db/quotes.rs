use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{Quote, QuoteStatus};

#[derive(Debug)]
pub struct NewQuote {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub location: String,
    pub project_type: String,
    pub budget: String,
    pub timeline: String,
    pub description: String,
    pub has_plans: bool,
    pub newsletter: bool,
}

pub async fn create(pool: &PgPool, quote: &NewQuote) -> Result<Quote, sqlx::Error> {
    sqlx::query_as::<_, Quote>(
        "INSERT INTO quotes (first_name, last_name, email, phone, location, project_type,
                             budget, timeline, description, has_plans, newsletter)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) RETURNING *",
    )
    .bind(&quote.first_name)
    .bind(&quote.last_name)
    .bind(&quote.email)
    .bind(&quote.phone)
    .bind(&quote.location)
    .bind(&quote.project_type)
    .bind(&quote.budget)
    .bind(&quote.timeline)
    .bind(&quote.description)
    .bind(quote.has_plans)
    .bind(quote.newsletter)
    .fetch_one(pool)
    .await
}

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Quote>, sqlx::Error> {
    sqlx::query_as::<_, Quote>("SELECT * FROM quotes WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn list(
    pool: &PgPool,
    status: Option<QuoteStatus>,
    limit: i64,
    offset: i64,
) -> Result<Vec<Quote>, sqlx::Error> {
    sqlx::query_as::<_, Quote>(
        "SELECT * FROM quotes
         WHERE ($1::text IS NULL OR status = $1)
         ORDER BY created_at DESC, id DESC
         LIMIT $2 OFFSET $3",
    )
    .bind(status.map(|s| s.as_str()))
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await
}

pub async fn count(pool: &PgPool, status: Option<QuoteStatus>) -> Result<i64, sqlx::Error> {
    let row: (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM quotes WHERE ($1::text IS NULL OR status = $1)")
            .bind(status.map(|s| s.as_str()))
            .fetch_one(pool)
            .await?;
    Ok(row.0)
}

pub async fn set_status(
    pool: &PgPool,
    id: Uuid,
    status: QuoteStatus,
) -> Result<Option<Quote>, sqlx::Error> {
    sqlx::query_as::<_, Quote>(
        "UPDATE quotes SET status = $2, updated_at = now() WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(status.as_str())
    .fetch_optional(pool)
    .await
}
