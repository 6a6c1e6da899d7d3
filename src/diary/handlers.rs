use axum::{
    extract::State,
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::{info, instrument};
use uuid::Uuid;

use super::dto::{DiaryRequest, Pagination};
use super::services::{owned_diary, validate_content};
use crate::{
    auth::extractors::AuthUser,
    diary::repo_types::Diary,
    error::{AppError, AppResult},
    extract::{JsonBody, PathParam, QueryParams},
    state::AppState,
    users::dto::SuccessResponse,
};

pub fn diary_routes() -> Router<AppState> {
    Router::new()
        .route("/diary", get(list_diaries).post(create_diary))
        .route(
            "/diary/:id",
            get(get_diary).put(update_diary).delete(delete_diary),
        )
}

#[instrument(skip(state))]
pub async fn list_diaries(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    QueryParams(p): QueryParams<Pagination>,
) -> AppResult<Json<Vec<Diary>>> {
    let (limit, offset) = p.clamped();
    let rows = state.store.list_diaries(user_id, limit, offset).await?;
    Ok(Json(rows))
}

#[instrument(skip(state, payload))]
pub async fn create_diary(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    JsonBody(payload): JsonBody<DiaryRequest>,
) -> AppResult<(StatusCode, Json<Diary>)> {
    validate_content(&payload.content)?;
    let diary = state.store.create_diary(user_id, &payload.content).await?;
    state.store.touch_last_active(user_id).await?;
    info!(%user_id, diary_id = %diary.id, "diary created");
    Ok((StatusCode::CREATED, Json(diary)))
}

#[instrument(skip(state))]
pub async fn get_diary(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    PathParam(id): PathParam<Uuid>,
) -> AppResult<Json<Diary>> {
    Ok(Json(owned_diary(&state, user_id, id).await?))
}

#[instrument(skip(state, payload))]
pub async fn update_diary(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    PathParam(id): PathParam<Uuid>,
    JsonBody(payload): JsonBody<DiaryRequest>,
) -> AppResult<Json<Diary>> {
    validate_content(&payload.content)?;
    owned_diary(&state, user_id, id).await?;
    let diary = state
        .store
        .update_diary(id, &payload.content)
        .await?
        .ok_or_else(|| AppError::NotFound("Diary not found".into()))?;
    state.store.touch_last_active(user_id).await?;
    info!(%user_id, diary_id = %id, "diary updated");
    Ok(Json(diary))
}

#[instrument(skip(state))]
pub async fn delete_diary(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    PathParam(id): PathParam<Uuid>,
) -> AppResult<Json<SuccessResponse>> {
    owned_diary(&state, user_id, id).await?;
    if !state.store.delete_diary(id).await? {
        return Err(AppError::NotFound("Diary not found".into()));
    }
    state.store.touch_last_active(user_id).await?;
    info!(%user_id, diary_id = %id, "diary deleted");
    Ok(Json(SuccessResponse::ok()))
}
