use axum::{extract::State, routing::get, Json, Router};
use tracing::{info, instrument};

use super::dto::{ContactsResponse, SaveContactsRequest};
use super::services::validate_contacts;
use crate::{
    auth::extractors::AuthUser, error::AppResult, extract::JsonBody, state::AppState,
};

pub fn contact_routes() -> Router<AppState> {
    Router::new().route(
        "/user/contacts",
        get(list_contacts).put(save_contacts).post(save_contacts),
    )
}

#[instrument(skip(state))]
pub async fn list_contacts(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> AppResult<Json<ContactsResponse>> {
    let contacts = state.store.list_contacts(user_id).await?;
    Ok(Json(ContactsResponse { contacts }))
}

/// Replaces the whole contact list.
#[instrument(skip(state, payload))]
pub async fn save_contacts(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    JsonBody(payload): JsonBody<SaveContactsRequest>,
) -> AppResult<Json<ContactsResponse>> {
    let rows = validate_contacts(payload.contacts)?;
    let contacts = state.store.replace_contacts(user_id, rows).await?;
    info!(%user_id, count = contacts.len(), "contacts replaced");
    Ok(Json(ContactsResponse { contacts }))
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    use crate::test_support::{call, signup, TestApp};

    #[tokio::test]
    async fn save_replaces_previous_list() {
        let app = TestApp::new();
        let cookie = signup(&app.router, "me@example.com").await;

        let res = call(&app.router, Method::GET, "/api/user/contacts", Some(&cookie), None).await;
        assert_eq!(res.status, StatusCode::OK);
        assert!(res.body["contacts"].as_array().unwrap().is_empty());

        let res = call(
            &app.router,
            Method::PUT,
            "/api/user/contacts",
            Some(&cookie),
            Some(json!({ "contacts": [
                { "email": "mom@example.com" },
                { "phone": "010-1234-5678" }
            ]})),
        )
        .await;
        assert_eq!(res.status, StatusCode::OK);
        assert_eq!(res.body["contacts"].as_array().unwrap().len(), 2);
        assert!(res.body["contacts"][0].get("user_id").is_none());

        let res = call(
            &app.router,
            Method::PUT,
            "/api/user/contacts",
            Some(&cookie),
            Some(json!({ "contacts": [{ "email": "sister@example.com", "phone": "" }] })),
        )
        .await;
        assert_eq!(res.status, StatusCode::OK);

        let res = call(&app.router, Method::GET, "/api/user/contacts", Some(&cookie), None).await;
        let contacts = res.body["contacts"].as_array().unwrap();
        assert_eq!(contacts.len(), 1);
        assert_eq!(contacts[0]["email"], "sister@example.com");
        assert!(contacts[0]["phone"].is_null());
    }

    #[tokio::test]
    async fn invalid_list_leaves_contacts_untouched() {
        let app = TestApp::new();
        let cookie = signup(&app.router, "me@example.com").await;
        call(
            &app.router,
            Method::PUT,
            "/api/user/contacts",
            Some(&cookie),
            Some(json!({ "contacts": [{ "email": "mom@example.com" }] })),
        )
        .await;

        let res = call(
            &app.router,
            Method::PUT,
            "/api/user/contacts",
            Some(&cookie),
            Some(json!({ "contacts": [{ "email": "ok@example.com" }, {}] })),
        )
        .await;
        assert_eq!(res.status, StatusCode::BAD_REQUEST);

        let res = call(&app.router, Method::GET, "/api/user/contacts", Some(&cookie), None).await;
        assert_eq!(res.body["contacts"][0]["email"], "mom@example.com");
    }

    #[tokio::test]
    async fn contacts_are_per_user() {
        let app = TestApp::new();
        let a = signup(&app.router, "a@example.com").await;
        let b = signup(&app.router, "b@example.com").await;
        call(
            &app.router,
            Method::POST,
            "/api/user/contacts",
            Some(&a),
            Some(json!({ "contacts": [{ "email": "friend@example.com" }] })),
        )
        .await;
        let res = call(&app.router, Method::GET, "/api/user/contacts", Some(&b), None).await;
        assert!(res.body["contacts"].as_array().unwrap().is_empty());
    }
}
