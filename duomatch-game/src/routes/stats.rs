use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::Json;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use duomatch_shared::errors::{AppError, AppResult, ErrorCode};
use duomatch_shared::types::api::ApiResponse;
use duomatch_shared::types::auth::AuthUser;
use duomatch_shared::types::pagination::PaginationParams;

use crate::models::{MatchScoreAggregate, PointTransaction, UserStats};
use crate::schema::{match_score_aggregates, point_transactions, user_stats};
use crate::AppState;

const LEADERBOARD_CACHE_TTL: u64 = 60;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LeaderboardEntry {
    pub rank: u64,
    pub user_id: Uuid,
    pub total_points: i32,
    pub games_played: i32,
    pub longest_streak: i32,
}

// --- Match aggregate ---

pub async fn get_match_aggregate(
    State(state): State<Arc<AppState>>,
    _auth: AuthUser,
    Path(match_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<MatchScoreAggregate>>> {
    let mut conn = state.db.get()
        .map_err(|e| AppError::internal(format!("db pool error: {e}")))?;

    let aggregate = match_score_aggregates::table
        .find(match_id)
        .first::<MatchScoreAggregate>(&mut conn)
        .optional()?
        .ok_or_else(|| {
            AppError::new(ErrorCode::StatsNotFound, "no completed sessions for this match yet")
        })?;

    Ok(Json(ApiResponse::ok(aggregate)))
}

// --- User lifetime stats ---

pub async fn get_user_stats(
    State(state): State<Arc<AppState>>,
    _auth: AuthUser,
    Path(user_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<UserStats>>> {
    let mut conn = state.db.get()
        .map_err(|e| AppError::internal(format!("db pool error: {e}")))?;

    let stats = user_stats::table
        .find(user_id)
        .first::<UserStats>(&mut conn)
        .optional()?
        .ok_or_else(|| AppError::new(ErrorCode::StatsNotFound, "this user has not played yet"))?;

    Ok(Json(ApiResponse::ok(stats)))
}

// --- Leaderboard (top total points, cached) ---

pub async fn get_leaderboard(
    State(state): State<Arc<AppState>>,
    _auth: AuthUser,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<ApiResponse<Vec<LeaderboardEntry>>>> {
    let cache_key = format!("game:leaderboard:{}:{}", params.page, params.limit());

    if let Ok(Some(cached)) = state.redis.get(&cache_key).await {
        if let Ok(entries) = serde_json::from_str::<Vec<LeaderboardEntry>>(&cached) {
            return Ok(Json(ApiResponse::ok(entries)));
        }
    }

    let mut conn = state.db.get()
        .map_err(|e| AppError::internal(format!("db pool error: {e}")))?;

    let offset = params.offset() as i64;
    let limit = params.limit() as i64;

    let rows = user_stats::table
        .order((user_stats::total_points.desc(), user_stats::games_played.desc()))
        .offset(offset)
        .limit(limit)
        .load::<UserStats>(&mut conn)?;

    let entries: Vec<LeaderboardEntry> = rows
        .into_iter()
        .enumerate()
        .map(|(i, s)| LeaderboardEntry {
            rank: params.offset() + i as u64 + 1,
            user_id: s.user_id,
            total_points: s.total_points,
            games_played: s.games_played,
            longest_streak: s.longest_streak,
        })
        .collect();

    if let Ok(serialized) = serde_json::to_string(&entries) {
        let _ = state.redis.set(&cache_key, &serialized, LEADERBOARD_CACHE_TTL).await;
    }

    Ok(Json(ApiResponse::ok(entries)))
}

// --- Point ledger for the caller ---

pub async fn list_point_transactions(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<ApiResponse<Vec<PointTransaction>>>> {
    let mut conn = state.db.get()
        .map_err(|e| AppError::internal(format!("db pool error: {e}")))?;

    let entries = point_transactions::table
        .filter(point_transactions::user_id.eq(auth.id))
        .order(point_transactions::created_at.desc())
        .offset(params.offset() as i64)
        .limit(params.limit() as i64)
        .load::<PointTransaction>(&mut conn)?;

    Ok(Json(ApiResponse::ok(entries)))
}
