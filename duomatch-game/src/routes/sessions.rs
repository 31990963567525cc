use std::str::FromStr;
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use chrono::Utc;
use diesel::prelude::*;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use duomatch_shared::errors::{AppError, AppResult, ErrorCode};
use duomatch_shared::types::api::ApiResponse;
use duomatch_shared::types::auth::AuthUser;

use crate::events::publisher;
use crate::lifecycle::{merge_game_state, SessionStatus};
use crate::models::{
    Game, GameSession, MatchRef, MatchScoreAggregate, NewGameSession, NewMatchScoreAggregate,
    NewPointTransaction, NewUserStats, UserStats,
};
use crate::schema::{game_sessions, games, match_score_aggregates, matches, point_transactions, user_stats};
use crate::scoring;
use crate::AppState;

// --- Request types ---

#[derive(Debug, Deserialize)]
pub struct CreateSessionRequest {
    pub match_id: Uuid,
    pub game_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct AdvanceStateRequest {
    pub state: serde_json::Value,
}

#[derive(Debug, Deserialize, Validate)]
pub struct EndSessionRequest {
    pub player_a_score: i32,
    pub player_b_score: i32,
    #[validate(range(min = 0, max = 100, message = "cooperation_score must be between 0 and 100"))]
    pub cooperation_score: i32,
    pub final_state: Option<serde_json::Value>,
}

fn is_session_participant(session: &GameSession, user_id: Uuid) -> bool {
    session.player_a_id == user_id || session.player_b_id == user_id
}

// --- Create session ---

pub async fn create_session(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Json(body): Json<CreateSessionRequest>,
) -> AppResult<Json<ApiResponse<GameSession>>> {
    let mut conn = state.db.get()
        .map_err(|e| AppError::internal(format!("db pool error: {e}")))?;

    // Locking the match row serializes concurrent session creation for the
    // same match, which is what makes the one-active-session check safe.
    let session: GameSession = conn.transaction::<_, AppError, _>(|conn| {
        let m = matches::table
            .find(body.match_id)
            .for_update()
            .first::<MatchRef>(conn)
            .optional()?
            .ok_or_else(|| AppError::new(ErrorCode::MatchNotFound, "match not found"))?;

        if m.player_a_id != auth.id && m.player_b_id != auth.id {
            return Err(AppError::new(
                ErrorCode::NotMatchParticipant,
                "you are not a participant in this match",
            ));
        }

        if m.status != "accepted" && m.status != "completed" {
            return Err(AppError::new(
                ErrorCode::MatchNotAccepted,
                "sessions require a mutually accepted match",
            ));
        }

        let game = games::table
            .find(body.game_id)
            .first::<Game>(conn)
            .optional()?
            .ok_or_else(|| AppError::new(ErrorCode::GameNotFound, "game not found"))?;

        if !game.is_active {
            return Err(AppError::new(ErrorCode::GameInactive, "this game is not currently active"));
        }

        let active: i64 = game_sessions::table
            .filter(game_sessions::match_id.eq(body.match_id))
            .filter(game_sessions::status.eq_any(SessionStatus::active_statuses()))
            .count()
            .get_result(conn)?;

        if active > 0 {
            return Err(AppError::new(
                ErrorCode::ActiveSessionExists,
                "an active session already exists for this match",
            ));
        }

        let new_session = NewGameSession {
            match_id: body.match_id,
            game_id: body.game_id,
            player_a_id: m.player_a_id,
            player_b_id: m.player_b_id,
            status: SessionStatus::Waiting.as_str().to_string(),
            game_state: serde_json::json!({}),
        };

        let session: GameSession = diesel::insert_into(game_sessions::table)
            .values(&new_session)
            .get_result(conn)?;

        Ok(session)
    })?;

    publisher::publish_session_created(&state.rabbitmq, &session).await;

    Ok(Json(ApiResponse::ok(session)))
}

// --- Advance game state ---

pub async fn advance_state(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(session_id): Path<Uuid>,
    Json(body): Json<AdvanceStateRequest>,
) -> AppResult<Json<ApiResponse<GameSession>>> {
    let mut conn = state.db.get()
        .map_err(|e| AppError::internal(format!("db pool error: {e}")))?;

    let session: GameSession = conn.transaction::<_, AppError, _>(|conn| {
        let s = game_sessions::table
            .find(session_id)
            .for_update()
            .first::<GameSession>(conn)
            .optional()?
            .ok_or_else(|| AppError::new(ErrorCode::SessionNotFound, "session not found"))?;

        if !is_session_participant(&s, auth.id) {
            return Err(AppError::new(
                ErrorCode::NotSessionParticipant,
                "you are not a participant in this session",
            ));
        }

        let status = SessionStatus::from_str(&s.status)
            .map_err(|e| AppError::internal(format!("corrupt session status: {e}")))?;
        if status.is_terminal() {
            return Err(AppError::new(
                ErrorCode::SessionAlreadyEnded,
                "this session has already ended",
            ));
        }

        let merged = merge_game_state(&s.game_state, &body.state);

        // The first update is what actually starts the game.
        let updated: GameSession = if status == SessionStatus::Waiting {
            diesel::update(game_sessions::table.find(session_id))
                .set((
                    game_sessions::status.eq(SessionStatus::InProgress.as_str()),
                    game_sessions::started_at.eq(Some(Utc::now())),
                    game_sessions::game_state.eq(&merged),
                ))
                .get_result(conn)?
        } else {
            diesel::update(game_sessions::table.find(session_id))
                .set(game_sessions::game_state.eq(&merged))
                .get_result(conn)?
        };

        Ok(updated)
    })?;

    Ok(Json(ApiResponse::ok(session)))
}

// --- End session ---

pub async fn end_session(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(session_id): Path<Uuid>,
    Json(body): Json<EndSessionRequest>,
) -> AppResult<Json<ApiResponse<GameSession>>> {
    body.validate().map_err(|e| AppError::Validation(e.to_string()))?;

    let mut conn = state.db.get()
        .map_err(|e| AppError::internal(format!("db pool error: {e}")))?;

    // The session flip, both aggregate folds and the ledger rows commit or
    // roll back together; a session can never be completed with stale totals.
    let session: GameSession = conn.transaction::<_, AppError, _>(|conn| {
        let s = game_sessions::table
            .find(session_id)
            .for_update()
            .first::<GameSession>(conn)
            .optional()?
            .ok_or_else(|| AppError::new(ErrorCode::SessionNotFound, "session not found"))?;

        if !is_session_participant(&s, auth.id) {
            return Err(AppError::new(
                ErrorCode::NotSessionParticipant,
                "you are not a participant in this session",
            ));
        }

        let status = SessionStatus::from_str(&s.status)
            .map_err(|e| AppError::internal(format!("corrupt session status: {e}")))?;
        if status.is_terminal() {
            return Err(AppError::new(
                ErrorCode::SessionAlreadyEnded,
                "this session has already ended",
            ));
        }

        let now = Utc::now();
        let duo = scoring::duo_score(body.player_a_score, body.player_b_score, body.cooperation_score);
        let minutes = scoring::duration_minutes(s.started_at, now);
        let final_state = match body.final_state {
            Some(ref patch) => merge_game_state(&s.game_state, patch),
            None => s.game_state.clone(),
        };

        let completed = diesel::update(
            game_sessions::table
                .find(session_id)
                .filter(game_sessions::status.eq_any(SessionStatus::active_statuses())),
        )
        .set((
            game_sessions::status.eq(SessionStatus::Completed.as_str()),
            game_sessions::player_a_score.eq(Some(body.player_a_score)),
            game_sessions::player_b_score.eq(Some(body.player_b_score)),
            game_sessions::cooperation_score.eq(Some(body.cooperation_score)),
            game_sessions::duo_score.eq(Some(duo)),
            game_sessions::game_state.eq(&final_state),
            game_sessions::completed_at.eq(Some(now)),
            game_sessions::duration_minutes.eq(Some(minutes)),
        ))
        .get_result::<GameSession>(conn)
        .optional()?
        .ok_or_else(|| {
            AppError::new(ErrorCode::SessionAlreadyEnded, "this session has already ended")
        })?;

        // Match aggregate: materialize the row, lock it, fold once.
        diesel::insert_into(match_score_aggregates::table)
            .values(&NewMatchScoreAggregate {
                match_id: s.match_id,
                games_played: 0,
                total_cooperation: 0,
                avg_cooperation: 0.0,
                total_duo_score: 0,
                last_played_at: now,
            })
            .on_conflict(match_score_aggregates::match_id)
            .do_nothing()
            .execute(conn)?;

        let current_aggregate = match_score_aggregates::table
            .find(s.match_id)
            .for_update()
            .first::<MatchScoreAggregate>(conn)?;

        let fold = scoring::fold_match_aggregate(&current_aggregate, body.cooperation_score, duo);
        diesel::update(match_score_aggregates::table.find(s.match_id))
            .set((
                match_score_aggregates::games_played.eq(fold.games_played),
                match_score_aggregates::total_cooperation.eq(fold.total_cooperation),
                match_score_aggregates::avg_cooperation.eq(fold.avg_cooperation),
                match_score_aggregates::total_duo_score.eq(fold.total_duo_score),
                match_score_aggregates::last_played_at.eq(now),
                match_score_aggregates::updated_at.eq(now),
            ))
            .execute(conn)?;

        // Per-player lifetime stats and point ledger entries.
        for player_id in [s.player_a_id, s.player_b_id] {
            diesel::insert_into(user_stats::table)
                .values(&NewUserStats::empty(player_id))
                .on_conflict(user_stats::user_id)
                .do_nothing()
                .execute(conn)?;

            let current_stats = user_stats::table
                .find(player_id)
                .for_update()
                .first::<UserStats>(conn)?;

            let fold = scoring::fold_user_stats(&current_stats, body.cooperation_score, minutes, duo);
            diesel::update(user_stats::table.find(player_id))
                .set((
                    user_stats::games_played.eq(fold.games_played),
                    user_stats::total_cooperation.eq(fold.total_cooperation),
                    user_stats::avg_cooperation.eq(fold.avg_cooperation),
                    user_stats::total_play_minutes.eq(fold.total_play_minutes),
                    user_stats::current_streak.eq(fold.current_streak),
                    user_stats::longest_streak.eq(fold.longest_streak),
                    user_stats::total_points.eq(fold.total_points),
                    user_stats::updated_at.eq(now),
                ))
                .execute(conn)?;

            diesel::insert_into(point_transactions::table)
                .values(&NewPointTransaction {
                    user_id: player_id,
                    amount: duo,
                    reason: "game_session".to_string(),
                    reference_id: Some(session_id),
                })
                .execute(conn)?;
        }

        Ok(completed)
    })?;

    publisher::publish_session_completed(&state.rabbitmq, &session).await;

    Ok(Json(ApiResponse::ok(session)))
}

// --- Get session ---

pub async fn get_session(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(session_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<GameSession>>> {
    let mut conn = state.db.get()
        .map_err(|e| AppError::internal(format!("db pool error: {e}")))?;

    let session = game_sessions::table
        .find(session_id)
        .first::<GameSession>(&mut conn)
        .optional()?
        .ok_or_else(|| AppError::new(ErrorCode::SessionNotFound, "session not found"))?;

    if !is_session_participant(&session, auth.id) {
        return Err(AppError::new(
            ErrorCode::NotSessionParticipant,
            "you are not a participant in this session",
        ));
    }

    Ok(Json(ApiResponse::ok(session)))
}

// --- List active games ---

pub async fn list_games(
    State(state): State<Arc<AppState>>,
    _auth: AuthUser,
) -> AppResult<Json<ApiResponse<Vec<Game>>>> {
    let mut conn = state.db.get()
        .map_err(|e| AppError::internal(format!("db pool error: {e}")))?;

    let active_games = games::table
        .filter(games::is_active.eq(true))
        .order(games::name.asc())
        .load::<Game>(&mut conn)?;

    Ok(Json(ApiResponse::ok(active_games)))
}
