use serde::Serialize;
use sqlx::FromRow;
use time::{Date, OffsetDateTime};

use super::dto::optional_date;

/// Registration record as stored in the `registrations` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct Registration {
    pub id: i64,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "optional_date::serialize"
    )]
    pub date_of_birth: Option<Date>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Validated, normalized fields written on create and update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRegistration {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub date_of_birth: Option<Date>,
}
