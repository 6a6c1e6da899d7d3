use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

pub const DEFAULT_IDLE_THRESHOLD_SEC: i32 = 300;

/// Idle-detection preference shown by the writing timer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "timer_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TimerStatus {
    #[default]
    Active,
    Paused,
    Inactive,
}

/// User record in the database.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub nickname: String,
    #[serde(skip_serializing)]
    pub password_hash: Option<String>, // None for Google-only accounts
    pub timer_status: TimerStatus,
    pub timer_idle_threshold_sec: i32,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub last_active_at: OffsetDateTime,
}

/// Insert payload for a new account.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub nickname: String,
    pub password_hash: Option<String>,
}

/// Partial preference update; `None` keeps the stored value.
#[derive(Debug, Clone, Copy, Default)]
pub struct PreferencesPatch {
    pub timer_status: Option<TimerStatus>,
    pub timer_idle_threshold_sec: Option<i32>,
}

impl std::str::FromStr for TimerStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "active" => Ok(TimerStatus::Active),
            "paused" => Ok(TimerStatus::Paused),
            "inactive" => Ok(TimerStatus::Inactive),
            other => Err(format!("unknown timer status '{other}'")),
        }
    }
}
