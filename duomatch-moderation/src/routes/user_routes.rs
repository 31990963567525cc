use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use diesel::prelude::*;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use duomatch_shared::errors::{AppError, AppResult, ErrorCode};
use duomatch_shared::types::api::ApiResponse;
use duomatch_shared::types::auth::AuthUser;

use crate::actions::AppealStatus;
use crate::events::publisher;
use crate::models::{Appeal, NewAppeal, NewReport, Report, UserSuspension};
use crate::schema::{appeals, reports, user_suspensions};
use crate::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateReportRequest {
    pub reported_id: Uuid,
    #[validate(length(min = 1, max = 50, message = "report_type is required"))]
    pub report_type: String,
    #[validate(length(min = 1, max = 2000, message = "reason is required"))]
    pub reason: String,
    pub context: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateAppealRequest {
    pub suspension_id: Uuid,
    #[validate(length(min = 1, max = 5000, message = "appeal body is required"))]
    pub body: String,
}

// --- Create report ---

pub async fn create_report(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Json(body): Json<CreateReportRequest>,
) -> AppResult<Json<ApiResponse<Report>>> {
    body.validate().map_err(|e| AppError::Validation(e.to_string()))?;

    if auth.id == body.reported_id {
        return Err(AppError::new(ErrorCode::CannotReportSelf, "you cannot report yourself"));
    }

    let mut conn = state.db.get()
        .map_err(|e| AppError::internal(format!("db pool error: {e}")))?;

    // One pending report per reporter/reported pair
    let existing: i64 = reports::table
        .filter(reports::reporter_id.eq(auth.id))
        .filter(reports::reported_id.eq(body.reported_id))
        .filter(reports::status.eq("pending"))
        .count()
        .get_result(&mut conn)?;

    if existing > 0 {
        return Err(AppError::new(
            ErrorCode::DuplicateReport,
            "you already have a pending report against this user",
        ));
    }

    let new_report = NewReport {
        reporter_id: auth.id,
        reported_id: body.reported_id,
        report_type: body.report_type.clone(),
        reason: body.reason,
        context: body.context,
    };

    let report: Report = diesel::insert_into(reports::table)
        .values(&new_report)
        .get_result(&mut conn)?;

    publisher::publish_report_created(
        &state.rabbitmq,
        report.id,
        report.reporter_id,
        report.reported_id,
        &report.report_type,
    )
    .await;

    Ok(Json(ApiResponse::ok(report)))
}

// --- File an appeal against an active suspension ---

pub async fn create_appeal(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Json(body): Json<CreateAppealRequest>,
) -> AppResult<Json<ApiResponse<Appeal>>> {
    body.validate().map_err(|e| AppError::Validation(e.to_string()))?;

    let mut conn = state.db.get()
        .map_err(|e| AppError::internal(format!("db pool error: {e}")))?;

    // The suspension row lock serializes concurrent filings against the
    // one-open-appeal rule.
    let appeal: Appeal = conn.transaction::<_, AppError, _>(|conn| {
        let suspension = user_suspensions::table
            .find(body.suspension_id)
            .for_update()
            .first::<UserSuspension>(conn)
            .optional()?
            .ok_or_else(|| AppError::new(ErrorCode::SuspensionNotFound, "suspension not found"))?;

        if suspension.user_id != auth.id {
            return Err(AppError::forbidden("you can only appeal your own suspension"));
        }

        if !suspension.is_active {
            return Err(AppError::new(
                ErrorCode::SuspensionNotActive,
                "this suspension is no longer active",
            ));
        }

        let open: i64 = appeals::table
            .filter(appeals::suspension_id.eq(body.suspension_id))
            .filter(appeals::status.eq_any(AppealStatus::open_statuses()))
            .count()
            .get_result(conn)?;

        if open > 0 {
            return Err(AppError::new(
                ErrorCode::DuplicateAppeal,
                "an appeal for this suspension is already open",
            ));
        }

        let new_appeal = NewAppeal {
            user_id: auth.id,
            suspension_id: body.suspension_id,
            body: body.body.clone(),
            status: AppealStatus::Pending.as_str().to_string(),
        };

        let appeal: Appeal = diesel::insert_into(appeals::table)
            .values(&new_appeal)
            .get_result(conn)?;

        Ok(appeal)
    })?;

    Ok(Json(ApiResponse::ok(appeal)))
}

// --- The caller's suspensions ---

pub async fn my_suspensions(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> AppResult<Json<ApiResponse<Vec<UserSuspension>>>> {
    let mut conn = state.db.get()
        .map_err(|e| AppError::internal(format!("db pool error: {e}")))?;

    let suspensions = user_suspensions::table
        .filter(user_suspensions::user_id.eq(auth.id))
        .order(user_suspensions::created_at.desc())
        .load::<UserSuspension>(&mut conn)?;

    Ok(Json(ApiResponse::ok(suspensions)))
}
