use lazy_static::lazy_static;
use regex::Regex;

use crate::error::AppError;

pub const MIN_PASSWORD_LEN: usize = 8;
pub const MAX_PASSWORD_LEN: usize = 128;
pub const MAX_NICKNAME_CHARS: usize = 30;

lazy_static! {
    static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// Trimmed, lower-cased form used for storage and lookups.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub fn validate_password(password: &str) -> Result<(), AppError> {
    let len = password.chars().count();
    if len < MIN_PASSWORD_LEN {
        return Err(AppError::validation(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    if len > MAX_PASSWORD_LEN {
        return Err(AppError::validation(format!(
            "Password must be at most {MAX_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

/// Returns the trimmed nickname.
pub fn validate_nickname(nickname: &str) -> Result<String, AppError> {
    let nickname = nickname.trim();
    if nickname.is_empty() {
        return Err(AppError::validation("Nickname is required"));
    }
    if nickname.chars().count() > MAX_NICKNAME_CHARS {
        return Err(AppError::validation(format!(
            "Nickname must be at most {MAX_NICKNAME_CHARS} characters"
        )));
    }
    Ok(nickname.to_string())
}

/// Nickname for a fresh OAuth account: the profile name if usable,
/// otherwise the email's local part.
pub fn oauth_nickname(name: Option<&str>, email: &str) -> String {
    let candidate = name
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| email.split('@').next().unwrap_or(email));
    candidate.chars().take(MAX_NICKNAME_CHARS).collect()
}
