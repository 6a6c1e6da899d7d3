use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// Diary entry in the database.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Diary {
    pub id: Uuid,
    pub user_id: Uuid, // owner
    pub content: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}
