use tracing::warn;
use uuid::Uuid;

use crate::diary::repo_types::Diary;
use crate::error::{AppError, AppResult};
use crate::state::AppState;

pub const MAX_CONTENT_CHARS: usize = 10_000;

pub fn validate_content(content: &str) -> AppResult<()> {
    if content.trim().is_empty() {
        return Err(AppError::validation("Content is required"));
    }
    if content.chars().count() > MAX_CONTENT_CHARS {
        return Err(AppError::validation(format!(
            "Content must be at most {MAX_CONTENT_CHARS} characters"
        )));
    }
    Ok(())
}

/// Fetches a diary and checks it belongs to `user_id`: 404 if absent,
/// 403 if owned by someone else.
pub async fn owned_diary(state: &AppState, user_id: Uuid, id: Uuid) -> AppResult<Diary> {
    let diary = state
        .store
        .find_diary(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Diary not found".into()))?;
    if diary.user_id != user_id {
        warn!(%user_id, diary_id = %id, owner = %diary.user_id, "diary ownership check failed");
        return Err(AppError::Forbidden("You do not have access to this diary".into()));
    }
    Ok(diary)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_rules() {
        assert!(validate_content("").is_err());
        assert!(validate_content(" \n\t ").is_err());
        assert!(validate_content("Dear diary").is_ok());
        assert!(validate_content(&"a".repeat(MAX_CONTENT_CHARS)).is_ok());
        assert!(validate_content(&"a".repeat(MAX_CONTENT_CHARS + 1)).is_err());
    }
}
