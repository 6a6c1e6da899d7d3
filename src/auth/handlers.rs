use axum::{
    extract::{FromRef, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
    Json, Router,
};
use rand::{distributions::Alphanumeric, Rng};
use tracing::{error, info, instrument, warn};

use crate::{
    auth::{
        cookies,
        dto::{AuthResponse, GoogleCallbackQuery, LoginRequest, SignupRequest},
        extractors::AuthUser,
        jwt::JwtKeys,
        password::{hash_password_blocking, verify_password_blocking},
        services::{
            is_valid_email, normalize_email, oauth_nickname, validate_nickname, validate_password,
        },
    },
    error::{AppError, AppResult},
    extract::{JsonBody, QueryParams},
    state::AppState,
    users::{
        dto::{PublicUser, SuccessResponse},
        repo_types::{NewUser, User},
        services::current_user,
    },
};

const INVALID_CREDENTIALS: &str = "Invalid email or password";

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/signup", post(signup))
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
        .route("/auth/me", get(me))
        .route("/auth/google", get(google_start))
        .route("/auth/google/callback", get(google_callback))
}

/// Headers carrying a fresh `auth-token` cookie for `user`.
fn session_headers(state: &AppState, user: &User) -> AppResult<HeaderMap> {
    let token = JwtKeys::from_ref(state).sign(user.id, &user.email)?;
    let mut headers = HeaderMap::new();
    cookies::set_cookie(
        &mut headers,
        cookies::auth_cookie(&token, state.config.jwt.ttl_days, state.config.cookie_secure),
    )?;
    Ok(headers)
}

#[instrument(skip(state, payload))]
pub async fn signup(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<SignupRequest>,
) -> AppResult<(StatusCode, HeaderMap, Json<AuthResponse>)> {
    let email = normalize_email(&payload.email);
    if !is_valid_email(&email) {
        warn!(email = %email, "invalid email");
        return Err(AppError::validation("Invalid email"));
    }
    validate_password(&payload.password)?;
    let nickname = validate_nickname(&payload.nickname)?;

    // Ensure email is not taken; the unique index still guards the race.
    if state.store.find_user_by_email(&email).await?.is_some() {
        warn!(email = %email, "email already registered");
        return Err(AppError::Conflict("Email already registered".into()));
    }

    let hash = hash_password_blocking(payload.password).await?;
    let user = state
        .store
        .create_user(NewUser {
            email,
            nickname,
            password_hash: Some(hash),
        })
        .await?;

    let headers = session_headers(&state, &user)?;
    info!(user_id = %user.id, email = %user.email, "user registered");
    Ok((
        StatusCode::CREATED,
        headers,
        Json(AuthResponse { user: user.into() }),
    ))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<LoginRequest>,
) -> AppResult<(HeaderMap, Json<AuthResponse>)> {
    let email = normalize_email(&payload.email);
    if email.is_empty() || payload.password.is_empty() {
        return Err(AppError::validation("Email and password are required"));
    }

    let Some(user) = state.store.find_user_by_email(&email).await? else {
        warn!(email = %email, "login unknown email");
        return Err(AppError::Unauthorized(INVALID_CREDENTIALS.into()));
    };

    let Some(hash) = user.password_hash.clone() else {
        warn!(user_id = %user.id, "password login on oauth-only account");
        return Err(AppError::Unauthorized(INVALID_CREDENTIALS.into()));
    };

    let ok = match verify_password_blocking(payload.password, hash).await {
        Ok(ok) => ok,
        Err(e) => {
            // An unparseable stored hash can never match.
            error!(error = %e, user_id = %user.id, "verify_password failed");
            false
        }
    };
    if !ok {
        warn!(user_id = %user.id, "login invalid password");
        return Err(AppError::Unauthorized(INVALID_CREDENTIALS.into()));
    }

    state.store.touch_last_active(user.id).await?;
    let user = current_user(&state, user.id).await?;

    let headers = session_headers(&state, &user)?;
    info!(user_id = %user.id, "user logged in");
    Ok((headers, Json(AuthResponse { user: user.into() })))
}

#[instrument(skip(state))]
pub async fn logout(State(state): State<AppState>) -> AppResult<(HeaderMap, Json<SuccessResponse>)> {
    let mut headers = HeaderMap::new();
    cookies::set_cookie(
        &mut headers,
        cookies::clear_auth_cookie(state.config.cookie_secure),
    )?;
    Ok((headers, Json(SuccessResponse::ok())))
}

#[instrument(skip(state))]
pub async fn me(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> AppResult<Json<PublicUser>> {
    let user = current_user(&state, user_id).await?;
    Ok(Json(user.into()))
}

fn login_error_redirect(state: &AppState, code: &str) -> Response {
    Redirect::temporary(&format!("{}/login?error={}", state.config.app_base_url, code))
        .into_response()
}

/// Starts the consent flow with a random `state` bound to a short-lived cookie.
#[instrument(skip(state))]
pub async fn google_start(State(state): State<AppState>) -> AppResult<Response> {
    let Some(google) = state.google.clone() else {
        return Ok(login_error_redirect(&state, "oauth_not_configured"));
    };

    let csrf: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(32)
        .map(char::from)
        .collect();
    let url = google.authorize_url(&csrf)?;

    let mut headers = HeaderMap::new();
    cookies::set_cookie(
        &mut headers,
        cookies::oauth_state_cookie(&csrf, state.config.cookie_secure),
    )?;
    Ok((headers, Redirect::temporary(&url)).into_response())
}

#[instrument(skip(state, query, req_headers))]
pub async fn google_callback(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<GoogleCallbackQuery>,
    req_headers: HeaderMap,
) -> AppResult<Response> {
    if let Some(err) = query.error.as_deref() {
        warn!(error = %err, "google oauth denied");
        return Ok(login_error_redirect(&state, "oauth_denied"));
    }
    let Some(code) = query.code.as_deref().map(str::trim).filter(|c| !c.is_empty()) else {
        warn!("google callback without code");
        return Ok(login_error_redirect(&state, "missing_code"));
    };
    let Some(google) = state.google.clone() else {
        return Ok(login_error_redirect(&state, "oauth_not_configured"));
    };

    // The flow must have started at google_start, which set the state cookie.
    let expected = cookies::read_cookie(&req_headers, cookies::OAUTH_STATE_COOKIE)
        .filter(|s| !s.is_empty());
    match (expected.as_deref(), query.state.as_deref()) {
        (Some(expected), Some(got)) if expected == got => {}
        (None, _) => {
            warn!("google callback without state cookie");
            return Ok(login_error_redirect(&state, "invalid_state"));
        }
        _ => {
            warn!("google callback state mismatch");
            return Ok(login_error_redirect(&state, "invalid_state"));
        }
    }

    let access_token = match google.exchange_code(code).await {
        Ok(t) => t,
        Err(e) => {
            warn!(error = %e, "google code exchange failed");
            return Ok(login_error_redirect(&state, "token_exchange_failed"));
        }
    };

    let profile = match google.fetch_profile(&access_token).await {
        Ok(p) if p.verified_email && !p.email.trim().is_empty() => p,
        Ok(_) => {
            warn!("google profile without verified email");
            return Ok(login_error_redirect(&state, "profile_fetch_failed"));
        }
        Err(e) => {
            warn!(error = %e, "google profile fetch failed");
            return Ok(login_error_redirect(&state, "profile_fetch_failed"));
        }
    };

    let email = normalize_email(&profile.email);
    let nickname = oauth_nickname(profile.name.as_deref(), &email);
    let user = state.store.upsert_oauth_user(&email, &nickname).await?;

    let mut headers = session_headers(&state, &user)?;
    cookies::set_cookie(
        &mut headers,
        cookies::clear_oauth_state_cookie(state.config.cookie_secure),
    )?;
    info!(user_id = %user.id, "google login");
    let target = format!("{}/diary", state.config.app_base_url);
    Ok((headers, Redirect::temporary(&target)).into_response())
}
