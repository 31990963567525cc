use std::str::FromStr;
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use duomatch_shared::errors::{AppError, AppResult, ErrorCode};
use duomatch_shared::types::api::ApiResponse;
use duomatch_shared::types::auth::AuthUser;

use crate::events::publisher;
use crate::ladder::{self, LadderViolation, RevealLevel};
use crate::models::{Match, NewProfileReveal, ProfileReveal};
use crate::schema::{matches, profile_reveals};
use crate::AppState;

// --- Request / response types ---

#[derive(Debug, Deserialize)]
pub struct RequestRevealPayload {
    pub target_id: Uuid,
    pub level: String,
}

#[derive(Debug, Serialize)]
pub struct DirectionStatus {
    pub granted_levels: Vec<String>,
    pub current_level: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RevealStatusResponse {
    pub outgoing: DirectionStatus,
    pub incoming: DirectionStatus,
    pub mutual_levels: Vec<String>,
}

fn parse_levels(reveals: &[ProfileReveal]) -> Vec<RevealLevel> {
    reveals
        .iter()
        .filter_map(|r| match RevealLevel::from_str(&r.reveal_level) {
            Ok(level) => Some(level),
            Err(_) => {
                tracing::warn!(reveal_id = %r.id, level = %r.reveal_level, "unknown reveal level in store");
                None
            }
        })
        .collect()
}

// --- Request a reveal ---

pub async fn request_reveal(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Json(body): Json<RequestRevealPayload>,
) -> AppResult<Json<ApiResponse<ProfileReveal>>> {
    let level = RevealLevel::from_str(&body.level).map_err(|_| {
        AppError::new(
            ErrorCode::ValidationError,
            "level must be one of 'bio', 'voice', 'photo'",
        )
    })?;

    if auth.id == body.target_id {
        return Err(AppError::new(
            ErrorCode::CannotRevealSelf,
            "you cannot reveal your profile to yourself",
        ));
    }

    let mut conn = state.db.get()
        .map_err(|e| AppError::internal(format!("db pool error: {e}")))?;

    // Insert and counterpart mutual flip happen in one transaction so the two
    // directional rows can never disagree about mutuality. Locking the pair's
    // match row serializes crossing reveal requests between the two users.
    let reveal: ProfileReveal = conn.transaction::<_, AppError, _>(|conn| {
        let qualifying = matches::table
            .filter(
                matches::player_a_id
                    .eq(auth.id)
                    .and(matches::player_b_id.eq(body.target_id))
                    .or(matches::player_a_id
                        .eq(body.target_id)
                        .and(matches::player_b_id.eq(auth.id))),
            )
            .filter(matches::status.eq_any(["accepted", "completed"]))
            .for_update()
            .first::<Match>(conn)
            .optional()?;

        if qualifying.is_none() {
            return Err(AppError::new(
                ErrorCode::NoQualifyingMatch,
                "no accepted match exists with this user",
            ));
        }

        let existing = profile_reveals::table
            .filter(profile_reveals::revealer_id.eq(auth.id))
            .filter(profile_reveals::revealed_to_id.eq(body.target_id))
            .order(profile_reveals::created_at.asc())
            .load::<ProfileReveal>(conn)?;

        ladder::validate_request(&parse_levels(&existing), level).map_err(|v| match v {
            LadderViolation::AlreadyGranted { level } => AppError::new(
                ErrorCode::RevealAlreadyGranted,
                format!("'{level}' has already been revealed to this user"),
            ),
            LadderViolation::OutOfOrder { next_required } => AppError::new(
                ErrorCode::RevealOutOfOrder,
                format!("reveal levels unlock in order; request '{next_required}' first"),
            ),
        })?;

        let counterpart = profile_reveals::table
            .filter(profile_reveals::revealer_id.eq(body.target_id))
            .filter(profile_reveals::revealed_to_id.eq(auth.id))
            .filter(profile_reveals::reveal_level.eq(level.as_str()))
            .first::<ProfileReveal>(conn)
            .optional()?;

        let new_reveal = NewProfileReveal {
            revealer_id: auth.id,
            revealed_to_id: body.target_id,
            reveal_level: level.as_str().to_string(),
            is_mutual: counterpart.is_some(),
        };

        let reveal: ProfileReveal = diesel::insert_into(profile_reveals::table)
            .values(&new_reveal)
            .get_result(conn)?;

        if let Some(ref counterpart) = counterpart {
            diesel::update(profile_reveals::table.find(counterpart.id))
                .set(profile_reveals::is_mutual.eq(true))
                .execute(conn)?;
        }

        Ok(reveal)
    })?;

    publisher::publish_reveal_granted(&state.rabbitmq, &reveal).await;

    Ok(Json(ApiResponse::ok(reveal)))
}

// --- Reveal status between the caller and a target ---

pub async fn get_reveal_status(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(target_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<RevealStatusResponse>>> {
    let mut conn = state.db.get()
        .map_err(|e| AppError::internal(format!("db pool error: {e}")))?;

    let outgoing_rows = profile_reveals::table
        .filter(profile_reveals::revealer_id.eq(auth.id))
        .filter(profile_reveals::revealed_to_id.eq(target_id))
        .order(profile_reveals::created_at.asc())
        .load::<ProfileReveal>(&mut conn)?;

    let incoming_rows = profile_reveals::table
        .filter(profile_reveals::revealer_id.eq(target_id))
        .filter(profile_reveals::revealed_to_id.eq(auth.id))
        .order(profile_reveals::created_at.asc())
        .load::<ProfileReveal>(&mut conn)?;

    let outgoing = parse_levels(&outgoing_rows);
    let incoming = parse_levels(&incoming_rows);

    let response = RevealStatusResponse {
        mutual_levels: ladder::mutual_levels(&outgoing, &incoming)
            .into_iter()
            .map(|l| l.as_str().to_string())
            .collect(),
        outgoing: DirectionStatus {
            current_level: ladder::current_level(&outgoing).map(|l| l.as_str().to_string()),
            granted_levels: outgoing.iter().map(|l| l.as_str().to_string()).collect(),
        },
        incoming: DirectionStatus {
            current_level: ladder::current_level(&incoming).map(|l| l.as_str().to_string()),
            granted_levels: incoming.iter().map(|l| l.as_str().to_string()).collect(),
        },
    };

    Ok(Json(ApiResponse::ok(response)))
}
