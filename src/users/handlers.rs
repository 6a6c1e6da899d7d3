use axum::{
    extract::State,
    http::HeaderMap,
    routing::get,
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{
    auth::{cookies, extractors::AuthUser, services::validate_nickname},
    error::{AppError, AppResult},
    extract::JsonBody,
    state::AppState,
    users::{
        dto::{
            PreferencesResponse, PublicUser, SuccessResponse, UpdatePreferencesRequest,
            UpdateProfileRequest,
        },
        services::{current_user, preferences_patch},
    },
};

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/user",
            get(get_profile).patch(update_profile).delete(delete_account),
        )
        .route(
            "/user/preferences",
            get(get_preferences)
                .put(update_preferences)
                .patch(update_preferences),
        )
}

#[instrument(skip(state))]
pub async fn get_profile(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> AppResult<Json<PublicUser>> {
    let user = current_user(&state, user_id).await?;
    Ok(Json(user.into()))
}

#[instrument(skip(state, payload))]
pub async fn update_profile(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    JsonBody(payload): JsonBody<UpdateProfileRequest>,
) -> AppResult<Json<PublicUser>> {
    let nickname = validate_nickname(&payload.nickname)?;
    let user = state
        .store
        .update_nickname(user_id, &nickname)
        .await?
        .ok_or_else(|| AppError::Unauthorized("User not found".into()))?;
    info!(%user_id, "nickname updated");
    Ok(Json(user.into()))
}

/// Account withdrawal: contacts, diaries and the user row go together.
#[instrument(skip(state))]
pub async fn delete_account(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> AppResult<(HeaderMap, Json<SuccessResponse>)> {
    if !state.store.delete_user(user_id).await? {
        warn!(%user_id, "withdrawal for missing user");
        return Err(AppError::NotFound("User not found".into()));
    }

    let mut headers = HeaderMap::new();
    cookies::set_cookie(
        &mut headers,
        cookies::clear_auth_cookie(state.config.cookie_secure),
    )?;
    info!(%user_id, "account withdrawn");
    Ok((headers, Json(SuccessResponse::ok())))
}

#[instrument(skip(state))]
pub async fn get_preferences(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> AppResult<Json<PreferencesResponse>> {
    let user = current_user(&state, user_id).await?;
    Ok(Json(PreferencesResponse::from(&user)))
}

#[instrument(skip(state, payload))]
pub async fn update_preferences(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    JsonBody(payload): JsonBody<UpdatePreferencesRequest>,
) -> AppResult<Json<PreferencesResponse>> {
    let patch = preferences_patch(payload)?;
    let user = state
        .store
        .update_preferences(user_id, patch)
        .await?
        .ok_or_else(|| AppError::Unauthorized("User not found".into()))?;
    info!(
        %user_id,
        timer_status = ?user.timer_status,
        threshold = user.timer_idle_threshold_sec,
        "preferences updated"
    );
    Ok(Json(PreferencesResponse::from(&user)))
}

#[cfg(test)]
mod tests {
    use axum::http::{header, Method, StatusCode};
    use serde_json::json;

    use crate::test_support::{call, signup, TestApp};

    #[tokio::test]
    async fn profile_requires_auth() {
        let app = TestApp::new();
        let res = call(&app.router, Method::GET, "/api/user", None, None).await;
        assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn profile_hides_password_hash() {
        let app = TestApp::new();
        let cookie = signup(&app.router, "writer@example.com").await;
        let res = call(&app.router, Method::GET, "/api/user", Some(&cookie), None).await;
        assert_eq!(res.status, StatusCode::OK);
        assert_eq!(res.body["email"], "writer@example.com");
        assert_eq!(res.body["has_password"], true);
        assert!(res.body.get("password_hash").is_none());
    }

    #[tokio::test]
    async fn nickname_can_be_changed() {
        let app = TestApp::new();
        let cookie = signup(&app.router, "writer@example.com").await;
        let res = call(
            &app.router,
            Method::PATCH,
            "/api/user",
            Some(&cookie),
            Some(json!({ "nickname": "  Pen Name " })),
        )
        .await;
        assert_eq!(res.status, StatusCode::OK);
        assert_eq!(res.body["nickname"], "Pen Name");

        let res = call(
            &app.router,
            Method::PATCH,
            "/api/user",
            Some(&cookie),
            Some(json!({ "nickname": "" })),
        )
        .await;
        assert_eq!(res.status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn preferences_default_and_persist() {
        let app = TestApp::new();
        let cookie = signup(&app.router, "writer@example.com").await;

        let res = call(&app.router, Method::GET, "/api/user/preferences", Some(&cookie), None).await;
        assert_eq!(res.status, StatusCode::OK);
        assert_eq!(res.body["timer_status"], "active");
        assert_eq!(res.body["timer_idle_threshold_sec"], 300);

        let res = call(
            &app.router,
            Method::PUT,
            "/api/user/preferences",
            Some(&cookie),
            Some(json!({ "timer_status": "paused", "timer_idle_threshold_sec": 900 })),
        )
        .await;
        assert_eq!(res.status, StatusCode::OK);

        let res = call(&app.router, Method::GET, "/api/user/preferences", Some(&cookie), None).await;
        assert_eq!(res.body["timer_status"], "paused");
        assert_eq!(res.body["timer_idle_threshold_sec"], 900);

        // partial update keeps the other field
        let res = call(
            &app.router,
            Method::PATCH,
            "/api/user/preferences",
            Some(&cookie),
            Some(json!({ "timer_status": "inactive" })),
        )
        .await;
        assert_eq!(res.body["timer_status"], "inactive");
        assert_eq!(res.body["timer_idle_threshold_sec"], 900);
    }

    #[tokio::test]
    async fn invalid_preferences_are_rejected() {
        let app = TestApp::new();
        let cookie = signup(&app.router, "writer@example.com").await;
        for body in [
            json!({ "timer_status": "snoozing" }),
            json!({ "timer_idle_threshold_sec": 5 }),
            json!({}),
        ] {
            let res = call(
                &app.router,
                Method::PUT,
                "/api/user/preferences",
                Some(&cookie),
                Some(body),
            )
            .await;
            assert_eq!(res.status, StatusCode::BAD_REQUEST);
            assert!(res.body["error"].is_string());
        }
    }

    #[tokio::test]
    async fn withdrawal_cascades_and_clears_cookie() {
        let app = TestApp::new();
        let cookie = signup(&app.router, "leaving@example.com").await;
        let other = signup(&app.router, "staying@example.com").await;

        for c in [&cookie, &other] {
            let res = call(
                &app.router,
                Method::POST,
                "/api/diary",
                Some(c),
                Some(json!({ "content": "today" })),
            )
            .await;
            assert_eq!(res.status, StatusCode::CREATED);
        }
        call(
            &app.router,
            Method::PUT,
            "/api/user/contacts",
            Some(&cookie),
            Some(json!({ "contacts": [{ "email": "mom@example.com" }] })),
        )
        .await;

        let leaving = app
            .state
            .store
            .find_user_by_email("leaving@example.com")
            .await
            .unwrap()
            .unwrap();

        let res = call(&app.router, Method::DELETE, "/api/user", Some(&cookie), None).await;
        assert_eq!(res.status, StatusCode::OK);
        assert_eq!(res.body["success"], true);
        let set_cookie = res.headers.get(header::SET_COOKIE).unwrap().to_str().unwrap();
        assert!(set_cookie.starts_with("auth-token="));
        assert!(set_cookie.contains("Max-Age=0"));

        let store = &app.state.store;
        assert!(store.find_user_by_id(leaving.id).await.unwrap().is_none());
        assert!(store.list_diaries(leaving.id, 100, 0).await.unwrap().is_empty());
        assert!(store.list_contacts(leaving.id).await.unwrap().is_empty());

        // the other account is untouched
        let res = call(&app.router, Method::GET, "/api/diary", Some(&other), None).await;
        assert_eq!(res.body.as_array().unwrap().len(), 1);

        // the old token no longer resolves to a user
        let res = call(&app.router, Method::GET, "/api/user", Some(&cookie), None).await;
        assert_eq!(res.status, StatusCode::UNAUTHORIZED);
        let res = call(&app.router, Method::DELETE, "/api/user", Some(&cookie), None).await;
        assert_eq!(res.status, StatusCode::NOT_FOUND);
    }
}
