use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::users::repo_types::{TimerStatus, User};

/// Public part of the user returned to the client.
#[derive(Debug, Serialize)]
pub struct PublicUser {
    pub id: Uuid,
    pub email: String,
    pub nickname: String,
    pub timer_status: TimerStatus,
    pub timer_idle_threshold_sec: i32,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub last_active_at: OffsetDateTime,
    /// False for accounts created through Google only.
    pub has_password: bool,
}

impl From<User> for PublicUser {
    fn from(u: User) -> Self {
        Self {
            has_password: u.password_hash.is_some(),
            id: u.id,
            email: u.email,
            nickname: u.nickname,
            timer_status: u.timer_status,
            timer_idle_threshold_sec: u.timer_idle_threshold_sec,
            created_at: u.created_at,
            last_active_at: u.last_active_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    #[serde(default)]
    pub nickname: String,
}

#[derive(Debug, Serialize)]
pub struct PreferencesResponse {
    pub timer_status: TimerStatus,
    pub timer_idle_threshold_sec: i32,
}

impl From<&User> for PreferencesResponse {
    fn from(u: &User) -> Self {
        Self {
            timer_status: u.timer_status,
            timer_idle_threshold_sec: u.timer_idle_threshold_sec,
        }
    }
}

/// Status arrives as a string so unknown values surface as a 400, not a
/// deserialization failure.
#[derive(Debug, Deserialize)]
pub struct UpdatePreferencesRequest {
    pub timer_status: Option<String>,
    pub timer_idle_threshold_sec: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

impl SuccessResponse {
    pub fn ok() -> Self {
        Self { success: true }
    }
}
