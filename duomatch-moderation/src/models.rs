use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::Serialize;
use uuid::Uuid;

use crate::schema::{appeals, moderation_actions, reports, user_accounts, user_suspensions};

// --- Report ---

#[derive(Debug, Queryable, Identifiable, Serialize, Clone)]
#[diesel(table_name = reports)]
pub struct Report {
    pub id: Uuid,
    pub reporter_id: Uuid,
    pub reported_id: Uuid,
    pub report_type: String,
    pub reason: String,
    pub context: Option<String>,
    pub status: String,
    pub resolved_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = reports)]
pub struct NewReport {
    pub reporter_id: Uuid,
    pub reported_id: Uuid,
    pub report_type: String,
    pub reason: String,
    pub context: Option<String>,
}

// --- ModerationAction (append-only) ---

#[derive(Debug, Queryable, Identifiable, Serialize, Clone)]
#[diesel(table_name = moderation_actions)]
pub struct ModerationAction {
    pub id: Uuid,
    pub report_id: Uuid,
    pub moderator_id: Uuid,
    pub target_user_id: Uuid,
    pub action_type: String,
    pub reason: String,
    pub duration_hours: Option<i32>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = moderation_actions)]
pub struct NewModerationAction {
    pub report_id: Uuid,
    pub moderator_id: Uuid,
    pub target_user_id: Uuid,
    pub action_type: String,
    pub reason: String,
    pub duration_hours: Option<i32>,
}

// --- UserSuspension ---

#[derive(Debug, Queryable, Identifiable, Serialize, Clone)]
#[diesel(table_name = user_suspensions)]
pub struct UserSuspension {
    pub id: Uuid,
    pub user_id: Uuid,
    pub action_id: Option<Uuid>,
    pub reason: String,
    pub expires_at: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = user_suspensions)]
pub struct NewUserSuspension {
    pub user_id: Uuid,
    pub action_id: Option<Uuid>,
    pub reason: String,
    pub expires_at: Option<DateTime<Utc>>,
    pub is_active: bool,
}

// --- Appeal ---

#[derive(Debug, Queryable, Identifiable, Serialize, Clone)]
#[diesel(table_name = appeals)]
pub struct Appeal {
    pub id: Uuid,
    pub user_id: Uuid,
    pub suspension_id: Uuid,
    pub body: String,
    pub status: String,
    pub reviewer_id: Option<Uuid>,
    pub review_notes: Option<String>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = appeals)]
pub struct NewAppeal {
    pub user_id: Uuid,
    pub suspension_id: Uuid,
    pub body: String,
    pub status: String,
}

// --- UserAccount (status projection) ---

#[derive(Debug, Queryable, Identifiable, Serialize, Clone)]
#[diesel(table_name = user_accounts)]
pub struct UserAccount {
    pub id: Uuid,
    pub status: String,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = user_accounts)]
pub struct NewUserAccount {
    pub id: Uuid,
    pub status: String,
}
