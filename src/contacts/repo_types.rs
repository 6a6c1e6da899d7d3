use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// Emergency / notification contact owned by a user.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Contact {
    pub id: Uuid,
    #[serde(skip_serializing)]
    pub user_id: Uuid,
    pub email: Option<String>,
    pub phone: Option<String>,
}

/// A validated contact awaiting insertion; at least one field is set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewContact {
    pub email: Option<String>,
    pub phone: Option<String>,
}
