use serde::{Deserialize, Serialize};

use crate::contacts::repo_types::Contact;

#[derive(Debug, Deserialize)]
pub struct ContactInput {
    pub email: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SaveContactsRequest {
    #[serde(default)]
    pub contacts: Vec<ContactInput>,
}

#[derive(Debug, Serialize)]
pub struct ContactsResponse {
    pub contacts: Vec<Contact>,
}
