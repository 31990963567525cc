use std::str::FromStr;
use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::Utc;
use diesel::prelude::*;
use serde::Deserialize;
use uuid::Uuid;

use duomatch_shared::errors::{AppError, AppResult, ErrorCode};
use duomatch_shared::types::api::ApiResponse;
use duomatch_shared::types::auth::AuthUser;
use duomatch_shared::types::pagination::{Paginated, PaginationParams};

use crate::decision::{resolve_status, side_of, Decision, MatchStatus, Side};
use crate::events::publisher;
use crate::models::Match;
use crate::schema::matches;
use crate::AppState;

// --- Request / response types ---

#[derive(Debug, Deserialize)]
pub struct SubmitDecisionRequest {
    pub decision: String,
}

#[derive(Debug, Deserialize)]
pub struct MatchFilterParams {
    #[serde(default = "default_page")]
    pub page: u64,
    #[serde(default = "default_per_page")]
    pub per_page: u64,
    pub status: Option<String>,
}

fn default_page() -> u64 { 1 }
fn default_per_page() -> u64 { 20 }

impl MatchFilterParams {
    fn pagination(&self) -> PaginationParams {
        PaginationParams {
            page: self.page,
            per_page: self.per_page,
        }
    }
}

fn parse_decision(value: Option<&str>) -> Option<Decision> {
    value.and_then(|s| Decision::from_str(s).ok())
}

// --- Submit decision ---

pub async fn submit_decision(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(match_id): Path<Uuid>,
    Json(body): Json<SubmitDecisionRequest>,
) -> AppResult<Json<ApiResponse<Match>>> {
    let decision = Decision::from_str(&body.decision).map_err(|_| {
        AppError::new(
            ErrorCode::ValidationError,
            "decision must be 'accepted' or 'rejected'",
        )
    })?;

    let mut conn = state.db.get()
        .map_err(|e| AppError::internal(format!("db pool error: {e}")))?;

    // The row lock serializes concurrent submissions from both sides; the
    // status filter on the update is the backstop against overwriting an
    // already-resolved match.
    let updated: Match = conn.transaction::<_, AppError, _>(|conn| {
        let m = matches::table
            .find(match_id)
            .for_update()
            .first::<Match>(conn)
            .optional()?
            .ok_or_else(|| AppError::new(ErrorCode::MatchNotFound, "match not found"))?;

        let side = side_of(m.player_a_id, m.player_b_id, auth.id).ok_or_else(|| {
            AppError::new(
                ErrorCode::NotMatchParticipant,
                "you are not a participant in this match",
            )
        })?;

        let status = MatchStatus::from_str(&m.status)
            .map_err(|e| AppError::internal(format!("corrupt match status: {e}")))?;
        if status != MatchStatus::Pending {
            return Err(AppError::new(
                ErrorCode::MatchAlreadyDecided,
                "this match has already been decided",
            ));
        }

        let (a_decision, b_decision) = match side {
            Side::A => (Some(decision), parse_decision(m.player_b_decision.as_deref())),
            Side::B => (parse_decision(m.player_a_decision.as_deref()), Some(decision)),
        };
        let new_status = resolve_status(a_decision, b_decision);

        let now = Utc::now();
        let matched_at = if new_status == MatchStatus::Accepted {
            Some(now)
        } else {
            m.matched_at
        };

        let guarded = matches::table
            .find(match_id)
            .filter(matches::status.eq(MatchStatus::Pending.as_str()));

        let updated = match side {
            Side::A => diesel::update(guarded)
                .set((
                    matches::player_a_decision.eq(Some(decision.as_str())),
                    matches::status.eq(new_status.as_str()),
                    matches::matched_at.eq(matched_at),
                    matches::updated_at.eq(now),
                ))
                .get_result::<Match>(conn)
                .optional()?,
            Side::B => diesel::update(guarded)
                .set((
                    matches::player_b_decision.eq(Some(decision.as_str())),
                    matches::status.eq(new_status.as_str()),
                    matches::matched_at.eq(matched_at),
                    matches::updated_at.eq(now),
                ))
                .get_result::<Match>(conn)
                .optional()?,
        };

        updated.ok_or_else(|| {
            AppError::new(
                ErrorCode::MatchAlreadyDecided,
                "this match has already been decided",
            )
        })
    })?;

    publisher::publish_decision_submitted(&state.rabbitmq, match_id, auth.id, decision.as_str())
        .await;

    if updated.status != MatchStatus::Pending.as_str() {
        publisher::publish_match_resolved(&state.rabbitmq, &updated).await;
    }

    Ok(Json(ApiResponse::ok(updated)))
}

// --- List the caller's matches ---

pub async fn list_matches(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Query(params): Query<MatchFilterParams>,
) -> AppResult<Json<ApiResponse<Paginated<Match>>>> {
    let mut conn = state.db.get()
        .map_err(|e| AppError::internal(format!("db pool error: {e}")))?;

    let pagination = params.pagination();
    let offset = pagination.offset() as i64;
    let limit = pagination.limit() as i64;

    let participant = matches::player_a_id
        .eq(auth.id)
        .or(matches::player_b_id.eq(auth.id));

    let (items, total): (Vec<Match>, i64) = if let Some(ref status) = params.status {
        let items = matches::table
            .filter(participant)
            .filter(matches::status.eq(status))
            .order(matches::created_at.desc())
            .offset(offset)
            .limit(limit)
            .load::<Match>(&mut conn)?;

        let total: i64 = matches::table
            .filter(participant)
            .filter(matches::status.eq(status))
            .count()
            .get_result(&mut conn)?;

        (items, total)
    } else {
        let items = matches::table
            .filter(participant)
            .order(matches::created_at.desc())
            .offset(offset)
            .limit(limit)
            .load::<Match>(&mut conn)?;

        let total: i64 = matches::table
            .filter(participant)
            .count()
            .get_result(&mut conn)?;

        (items, total)
    };

    let paginated = Paginated::new(items, total as u64, &pagination);
    Ok(Json(ApiResponse::ok(paginated)))
}

// --- Get one match ---

pub async fn get_match(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(match_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Match>>> {
    let mut conn = state.db.get()
        .map_err(|e| AppError::internal(format!("db pool error: {e}")))?;

    let m = matches::table
        .find(match_id)
        .first::<Match>(&mut conn)
        .optional()?
        .ok_or_else(|| AppError::new(ErrorCode::MatchNotFound, "match not found"))?;

    if side_of(m.player_a_id, m.player_b_id, auth.id).is_none() {
        return Err(AppError::new(
            ErrorCode::NotMatchParticipant,
            "you are not a participant in this match",
        ));
    }

    Ok(Json(ApiResponse::ok(m)))
}
