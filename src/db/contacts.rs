use sqlx::PgPool;

use crate::models::{Contact, ContactMethod};

#[derive(Debug)]
pub struct NewContact {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub service: Option<String>,
    pub message: String,
    pub contact_method: ContactMethod,
}

pub async fn create(pool: &PgPool, contact: &NewContact) -> Result<Contact, sqlx::Error> {
    sqlx::query_as::<_, Contact>(
        "INSERT INTO contacts (name, email, phone, service, message, contact_method)
         VALUES ($1, $2, $3, $4, $5, $6) RETURNING *",
    )
    .bind(&contact.name)
    .bind(&contact.email)
    .bind(contact.phone.as_deref())
    .bind(contact.service.as_deref())
    .bind(&contact.message)
    .bind(contact.contact_method.as_str())
    .fetch_one(pool)
    .await
}

pub async fn list(pool: &PgPool) -> Result<Vec<Contact>, sqlx::Error> {
    sqlx::query_as::<_, Contact>("SELECT * FROM contacts ORDER BY created_at DESC")
        .fetch_all(pool)
        .await
}
