use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Serialize;
use uuid::Uuid;

use duomatch_shared::errors::AppResult;
use duomatch_shared::types::api::ApiResponse;
use duomatch_shared::types::auth::AuthUser;
use duomatch_shared::types::pagination::{Paginated, PaginationParams};

use crate::models::Notification;
use crate::services::notification_service;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct UnreadCount {
    pub unread: i64,
}

#[derive(Debug, Serialize)]
pub struct MarkedRead {
    pub marked: usize,
}

pub async fn list_notifications(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<ApiResponse<Paginated<Notification>>>> {
    let (items, total) = notification_service::list_notifications(
        &state.db,
        auth.id,
        params.limit() as i64,
        params.offset() as i64,
    )?;

    let paginated = Paginated::new(items, total as u64, &params);
    Ok(Json(ApiResponse::ok(paginated)))
}

pub async fn unread_count(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> AppResult<Json<ApiResponse<UnreadCount>>> {
    let unread = notification_service::count_unread(&state.db, auth.id)?;
    Ok(Json(ApiResponse::ok(UnreadCount { unread })))
}

pub async fn mark_all_read(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> AppResult<Json<ApiResponse<MarkedRead>>> {
    let marked = notification_service::mark_all_read(&state.db, auth.id)?;
    Ok(Json(ApiResponse::ok(MarkedRead { marked })))
}

pub async fn mark_read(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(notification_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Notification>>> {
    let notification = notification_service::mark_read(&state.db, notification_id, auth.id)?;
    Ok(Json(ApiResponse::ok(notification)))
}
