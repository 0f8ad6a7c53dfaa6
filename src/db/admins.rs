use sqlx::PgPool;
use uuid::Uuid;

use crate::models::Admin;

pub async fn create(
    pool: &PgPool,
    email: &str,
    password_hash: &str,
    name: &str,
    role: &str,
) -> Result<Admin, sqlx::Error> {
    sqlx::query_as::<_, Admin>(
        "INSERT INTO admins (email, password_hash, name, role)
         VALUES ($1, $2, $3, $4) RETURNING *",
    )
    .bind(email.trim().to_lowercase())
    .bind(password_hash)
    .bind(name.trim())
    .bind(role)
    .fetch_one(pool)
    .await
}

pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<Admin>, sqlx::Error> {
    sqlx::query_as::<_, Admin>("SELECT * FROM admins WHERE email = $1")
        .bind(email.trim().to_lowercase())
        .fetch_optional(pool)
        .await
}

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Admin>, sqlx::Error> {
    sqlx::query_as::<_, Admin>("SELECT * FROM admins WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn count_all(pool: &PgPool) -> Result<i64, sqlx::Error> {
    let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM admins")
        .fetch_one(pool)
        .await?;
    Ok(row.0)
}
