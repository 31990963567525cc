use std::str::FromStr;
use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::Utc;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use duomatch_shared::errors::{AppError, AppResult, ErrorCode};
use duomatch_shared::middleware::ModeratorUser;
use duomatch_shared::types::api::ApiResponse;
use duomatch_shared::types::event::ModerationActionType;
use duomatch_shared::types::pagination::{Paginated, PaginationParams};

use crate::actions::{report_outcome, suspension_expires_at, AppealStatus};
use crate::events::publisher;
use crate::models::{
    Appeal, ModerationAction, NewModerationAction, NewUserAccount, NewUserSuspension, Report,
    UserSuspension,
};
use crate::schema::{appeals, moderation_actions, reports, user_accounts, user_suspensions};
use crate::AppState;

// --- Request / response types ---

#[derive(Debug, Deserialize)]
pub struct StatusFilterParams {
    #[serde(default = "default_page")]
    pub page: u64,
    #[serde(default = "default_per_page")]
    pub per_page: u64,
    pub status: Option<String>,
}

fn default_page() -> u64 { 1 }
fn default_per_page() -> u64 { 20 }

impl StatusFilterParams {
    fn pagination(&self) -> PaginationParams {
        PaginationParams {
            page: self.page,
            per_page: self.per_page,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct ApplyActionRequest {
    pub action_type: String,
    #[validate(length(min = 1, max = 2000, message = "reason is required"))]
    pub reason: String,
    pub duration_hours: Option<i32>,
    #[serde(default = "default_notify")]
    pub notify: bool,
}

fn default_notify() -> bool { true }

#[derive(Debug, Deserialize, Validate)]
pub struct ReviewAppealRequest {
    pub decision: String, // "approved" or "denied"
    #[validate(length(max = 5000))]
    pub notes: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ApplyActionResponse {
    pub action: ModerationAction,
    pub report: Report,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suspension: Option<UserSuspension>,
}

#[derive(Debug, Serialize)]
pub struct DashboardStats {
    pub pending_reports: i64,
    pub active_suspensions: i64,
    pub open_appeals: i64,
    pub reports_today: i64,
}

/// Flips the account-status projection, creating the row on first contact.
fn set_account_status(
    conn: &mut PgConnection,
    user_id: Uuid,
    status: &str,
) -> Result<(), diesel::result::Error> {
    diesel::insert_into(user_accounts::table)
        .values(&NewUserAccount {
            id: user_id,
            status: status.to_string(),
        })
        .on_conflict(user_accounts::id)
        .do_update()
        .set((
            user_accounts::status.eq(status),
            user_accounts::updated_at.eq(Utc::now()),
        ))
        .execute(conn)?;
    Ok(())
}

// --- List reports (paginated, optional status filter) ---

pub async fn list_reports(
    State(state): State<Arc<AppState>>,
    _moderator: ModeratorUser,
    Query(params): Query<StatusFilterParams>,
) -> AppResult<Json<ApiResponse<Paginated<Report>>>> {
    let mut conn = state.db.get()
        .map_err(|e| AppError::internal(format!("db pool error: {e}")))?;

    let pagination = params.pagination();
    let offset = pagination.offset() as i64;
    let limit = pagination.limit() as i64;

    let (items, total): (Vec<Report>, i64) = if let Some(ref status) = params.status {
        let items = reports::table
            .filter(reports::status.eq(status))
            .order(reports::created_at.desc())
            .offset(offset)
            .limit(limit)
            .load::<Report>(&mut conn)?;

        let total: i64 = reports::table
            .filter(reports::status.eq(status))
            .count()
            .get_result(&mut conn)?;

        (items, total)
    } else {
        let items = reports::table
            .order(reports::created_at.desc())
            .offset(offset)
            .limit(limit)
            .load::<Report>(&mut conn)?;

        let total: i64 = reports::table.count().get_result(&mut conn)?;

        (items, total)
    };

    let paginated = Paginated::new(items, total as u64, &pagination);
    Ok(Json(ApiResponse::ok(paginated)))
}

// --- Get report details ---

pub async fn get_report(
    State(state): State<Arc<AppState>>,
    _moderator: ModeratorUser,
    Path(report_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Report>>> {
    let mut conn = state.db.get()
        .map_err(|e| AppError::internal(format!("db pool error: {e}")))?;

    let report = reports::table
        .find(report_id)
        .first::<Report>(&mut conn)
        .optional()?
        .ok_or_else(|| AppError::new(ErrorCode::ReportNotFound, "report not found"))?;

    Ok(Json(ApiResponse::ok(report)))
}

// --- Apply a moderation action to a report ---

pub async fn apply_action(
    State(state): State<Arc<AppState>>,
    moderator: ModeratorUser,
    Path(report_id): Path<Uuid>,
    Json(body): Json<ApplyActionRequest>,
) -> AppResult<Json<ApiResponse<ApplyActionResponse>>> {
    body.validate().map_err(|e| AppError::Validation(e.to_string()))?;

    let action_type = ModerationActionType::from_str(&body.action_type).map_err(|_| {
        AppError::new(
            ErrorCode::ValidationError,
            "action_type must be one of: warning, mute, suspend, ban, dismiss, escalate",
        )
    })?;

    let mut conn = state.db.get()
        .map_err(|e| AppError::internal(format!("db pool error: {e}")))?;

    let now = Utc::now();
    let expires_at = suspension_expires_at(now, body.duration_hours);

    let (action, report, suspension) = conn.transaction::<_, AppError, _>(|conn| {
        let report = reports::table
            .find(report_id)
            .for_update()
            .first::<Report>(conn)
            .optional()?
            .ok_or_else(|| AppError::new(ErrorCode::ReportNotFound, "report not found"))?;

        // Escalated reports can still be actioned by a second pass.
        if report.status != "pending" && report.status != "escalated" {
            return Err(AppError::new(
                ErrorCode::ReportAlreadyResolved,
                "this report has already been resolved",
            ));
        }

        let action: ModerationAction = diesel::insert_into(moderation_actions::table)
            .values(&NewModerationAction {
                report_id,
                moderator_id: moderator.0.id,
                target_user_id: report.reported_id,
                action_type: action_type.to_string(),
                reason: body.reason.clone(),
                duration_hours: body.duration_hours,
            })
            .get_result(conn)?;

        let outcome = report_outcome(action_type);
        let updated_report: Report = diesel::update(reports::table.find(report_id))
            .set((
                reports::status.eq(outcome.as_str()),
                reports::resolved_at.eq(Some(now)),
            ))
            .get_result(conn)?;

        let suspension = match action_type {
            ModerationActionType::Suspend => {
                let suspension: UserSuspension = diesel::insert_into(user_suspensions::table)
                    .values(&NewUserSuspension {
                        user_id: report.reported_id,
                        action_id: Some(action.id),
                        reason: body.reason.clone(),
                        expires_at,
                        is_active: true,
                    })
                    .get_result(conn)?;
                set_account_status(conn, report.reported_id, "suspended")?;
                Some(suspension)
            }
            ModerationActionType::Ban => {
                set_account_status(conn, report.reported_id, "banned")?;
                None
            }
            ModerationActionType::Warning
            | ModerationActionType::Mute
            | ModerationActionType::Dismiss
            | ModerationActionType::Escalate => None,
        };

        Ok((action, updated_report, suspension))
    })?;

    if body.notify {
        publisher::publish_action_applied(&state.rabbitmq, &action, action_type, expires_at).await;
    }

    Ok(Json(ApiResponse::ok(ApplyActionResponse {
        action,
        report,
        suspension,
    })))
}

// --- List appeals (paginated, optional status filter) ---

pub async fn list_appeals(
    State(state): State<Arc<AppState>>,
    _moderator: ModeratorUser,
    Query(params): Query<StatusFilterParams>,
) -> AppResult<Json<ApiResponse<Paginated<Appeal>>>> {
    let mut conn = state.db.get()
        .map_err(|e| AppError::internal(format!("db pool error: {e}")))?;

    let pagination = params.pagination();
    let offset = pagination.offset() as i64;
    let limit = pagination.limit() as i64;

    let (items, total): (Vec<Appeal>, i64) = if let Some(ref status) = params.status {
        let items = appeals::table
            .filter(appeals::status.eq(status))
            .order(appeals::created_at.asc())
            .offset(offset)
            .limit(limit)
            .load::<Appeal>(&mut conn)?;

        let total: i64 = appeals::table
            .filter(appeals::status.eq(status))
            .count()
            .get_result(&mut conn)?;

        (items, total)
    } else {
        let items = appeals::table
            .order(appeals::created_at.asc())
            .offset(offset)
            .limit(limit)
            .load::<Appeal>(&mut conn)?;

        let total: i64 = appeals::table.count().get_result(&mut conn)?;

        (items, total)
    };

    let paginated = Paginated::new(items, total as u64, &pagination);
    Ok(Json(ApiResponse::ok(paginated)))
}

// --- Review an appeal ---

pub async fn review_appeal(
    State(state): State<Arc<AppState>>,
    moderator: ModeratorUser,
    Path(appeal_id): Path<Uuid>,
    Json(body): Json<ReviewAppealRequest>,
) -> AppResult<Json<ApiResponse<Appeal>>> {
    body.validate().map_err(|e| AppError::Validation(e.to_string()))?;

    let decision = match body.decision.as_str() {
        "approved" => AppealStatus::Approved,
        "denied" => AppealStatus::Denied,
        _ => {
            return Err(AppError::new(
                ErrorCode::ValidationError,
                "decision must be 'approved' or 'denied'",
            ))
        }
    };

    let mut conn = state.db.get()
        .map_err(|e| AppError::internal(format!("db pool error: {e}")))?;

    let now = Utc::now();

    let appeal: Appeal = conn.transaction::<_, AppError, _>(|conn| {
        let appeal = appeals::table
            .find(appeal_id)
            .for_update()
            .first::<Appeal>(conn)
            .optional()?
            .ok_or_else(|| AppError::new(ErrorCode::AppealNotFound, "appeal not found"))?;

        let status = AppealStatus::from_str(&appeal.status)
            .map_err(|e| AppError::internal(format!("corrupt appeal status: {e}")))?;
        if !status.is_open() {
            return Err(AppError::new(
                ErrorCode::AppealAlreadyDecided,
                "this appeal has already been decided",
            ));
        }

        let updated: Appeal = diesel::update(
            appeals::table
                .find(appeal_id)
                .filter(appeals::status.eq_any(AppealStatus::open_statuses())),
        )
        .set((
            appeals::status.eq(decision.as_str()),
            appeals::reviewer_id.eq(Some(moderator.0.id)),
            appeals::review_notes.eq(body.notes.clone()),
            appeals::reviewed_at.eq(Some(now)),
        ))
        .get_result(conn)
        .optional()?
        .ok_or_else(|| {
            AppError::new(ErrorCode::AppealAlreadyDecided, "this appeal has already been decided")
        })?;

        // Approval reinstates the user in the same transaction; denial leaves
        // suspension and account untouched.
        if decision == AppealStatus::Approved {
            let suspension = user_suspensions::table
                .find(appeal.suspension_id)
                .for_update()
                .first::<UserSuspension>(conn)
                .optional()?
                .ok_or_else(|| {
                    AppError::new(ErrorCode::SuspensionNotFound, "suspension not found")
                })?;

            diesel::update(user_suspensions::table.find(suspension.id))
                .set(user_suspensions::is_active.eq(false))
                .execute(conn)?;

            set_account_status(conn, suspension.user_id, "active")?;
        }

        Ok(updated)
    })?;

    publisher::publish_appeal_decided(
        &state.rabbitmq,
        &appeal,
        decision == AppealStatus::Approved,
    )
    .await;

    Ok(Json(ApiResponse::ok(appeal)))
}

// --- Dashboard stats ---

pub async fn get_stats(
    State(state): State<Arc<AppState>>,
    _moderator: ModeratorUser,
) -> AppResult<Json<ApiResponse<DashboardStats>>> {
    let mut conn = state.db.get()
        .map_err(|e| AppError::internal(format!("db pool error: {e}")))?;

    let pending_reports: i64 = reports::table
        .filter(reports::status.eq("pending"))
        .count()
        .get_result(&mut conn)?;

    let active_suspensions: i64 = user_suspensions::table
        .filter(user_suspensions::is_active.eq(true))
        .count()
        .get_result(&mut conn)?;

    let open_appeals: i64 = appeals::table
        .filter(appeals::status.eq_any(AppealStatus::open_statuses()))
        .count()
        .get_result(&mut conn)?;

    let today_start = Utc::now().date_naive().and_hms_opt(0, 0, 0).unwrap();
    let today_start_utc = today_start.and_utc();

    let reports_today: i64 = reports::table
        .filter(reports::created_at.ge(today_start_utc))
        .count()
        .get_result(&mut conn)?;

    Ok(Json(ApiResponse::ok(DashboardStats {
        pending_reports,
        active_suspensions,
        open_appeals,
        reports_today,
    })))
}
