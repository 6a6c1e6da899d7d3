use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::state::AppState;
use crate::users::dto::UpdatePreferencesRequest;
use crate::users::repo_types::{PreferencesPatch, TimerStatus, User};

pub const MIN_IDLE_THRESHOLD_SEC: i64 = 30;
pub const MAX_IDLE_THRESHOLD_SEC: i64 = 24 * 60 * 60;

/// Loads the authenticated user; a valid token for a deleted account is a 401.
pub async fn current_user(state: &AppState, user_id: Uuid) -> AppResult<User> {
    state
        .store
        .find_user_by_id(user_id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("User not found".into()))
}

pub fn preferences_patch(req: UpdatePreferencesRequest) -> AppResult<PreferencesPatch> {
    if req.timer_status.is_none() && req.timer_idle_threshold_sec.is_none() {
        return Err(AppError::validation(
            "Provide timer_status and/or timer_idle_threshold_sec",
        ));
    }

    let timer_status = req
        .timer_status
        .map(|s| s.parse::<TimerStatus>())
        .transpose()
        .map_err(AppError::Validation)?;

    let timer_idle_threshold_sec = match req.timer_idle_threshold_sec {
        Some(sec) if !(MIN_IDLE_THRESHOLD_SEC..=MAX_IDLE_THRESHOLD_SEC).contains(&sec) => {
            return Err(AppError::validation(format!(
                "timer_idle_threshold_sec must be between {MIN_IDLE_THRESHOLD_SEC} and {MAX_IDLE_THRESHOLD_SEC}"
            )));
        }
        Some(sec) => Some(sec as i32),
        None => None,
    };

    Ok(PreferencesPatch {
        timer_status,
        timer_idle_threshold_sec,
    })
}
