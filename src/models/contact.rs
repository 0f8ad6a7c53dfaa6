use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub service: Option<String>,
    pub message: String,
    pub contact_method: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactMethod {
    Email,
    Phone,
    WhatsApp,
}

impl ContactMethod {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "email" => Some(ContactMethod::Email),
            "phone" => Some(ContactMethod::Phone),
            "whatsapp" => Some(ContactMethod::WhatsApp),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ContactMethod::Email => "email",
            ContactMethod::Phone => "phone",
            ContactMethod::WhatsApp => "whatsapp",
        }
    }
}
