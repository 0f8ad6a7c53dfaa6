use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    #[serde(rename = "_id")]
    pub id: Uuid,
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
    #[sqlx(try_from = "String")]
    pub status: QuoteStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Review state of a quote request.
///
/// Nothing moves back to `New`: a quote becomes `Read` the first time an
/// admin opens it and may be archived (or un-archived to `Read`) from any
/// state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuoteStatus {
    New,
    Read,
    Archived,
}

impl QuoteStatus {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "new" => Some(QuoteStatus::New),
            "read" => Some(QuoteStatus::Read),
            "archived" => Some(QuoteStatus::Archived),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            QuoteStatus::New => "new",
            QuoteStatus::Read => "read",
            QuoteStatus::Archived => "archived",
        }
    }

    pub fn can_transition_to(&self, next: QuoteStatus) -> bool {
        match (self, next) {
            (_, QuoteStatus::New) => false,
            (_, QuoteStatus::Read) => true,
            (_, QuoteStatus::Archived) => true,
        }
    }
}

impl std::fmt::Display for QuoteStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug)]
pub struct UnknownStatus(pub String);

impl std::fmt::Display for UnknownStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown quote status '{}'", self.0)
    }
}

impl std::error::Error for UnknownStatus {}

impl TryFrom<String> for QuoteStatus {
    type Error = UnknownStatus;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        QuoteStatus::parse(&value).ok_or(UnknownStatus(value))
    }
}
