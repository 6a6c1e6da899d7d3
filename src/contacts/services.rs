use lazy_static::lazy_static;
use regex::Regex;

use crate::auth::services::{is_valid_email, normalize_email};
use crate::contacts::dto::ContactInput;
use crate::contacts::repo_types::NewContact;
use crate::error::{AppError, AppResult};

pub const MAX_CONTACTS: usize = 10;

lazy_static! {
    static ref PHONE_RE: Regex = Regex::new(r"^\+?[0-9][0-9\- ]{6,19}$").unwrap();
}

fn non_blank(v: Option<String>) -> Option<String> {
    v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

/// Turns the submitted list into rows to insert. Blank fields count as absent.
pub fn validate_contacts(inputs: Vec<ContactInput>) -> AppResult<Vec<NewContact>> {
    if inputs.len() > MAX_CONTACTS {
        return Err(AppError::validation(format!(
            "At most {MAX_CONTACTS} contacts are allowed"
        )));
    }

    inputs
        .into_iter()
        .enumerate()
        .map(|(i, input)| {
            let email = non_blank(input.email).map(|e| normalize_email(&e));
            let phone = non_blank(input.phone);

            if email.is_none() && phone.is_none() {
                return Err(AppError::validation(format!(
                    "Contact {} needs an email or a phone number",
                    i + 1
                )));
            }
            if let Some(e) = &email {
                if !is_valid_email(e) {
                    return Err(AppError::validation(format!("Contact {} has an invalid email", i + 1)));
                }
            }
            if let Some(p) = &phone {
                if !PHONE_RE.is_match(p) {
                    return Err(AppError::validation(format!(
                        "Contact {} has an invalid phone number",
                        i + 1
                    )));
                }
            }
            Ok(NewContact { email, phone })
        })
        .collect()
}
