use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::Serialize;
use uuid::Uuid;

use crate::schema::{matches, profile_reveals};

// --- Match ---

#[derive(Debug, Queryable, Identifiable, Serialize, Clone)]
#[diesel(table_name = matches)]
pub struct Match {
    pub id: Uuid,
    pub player_a_id: Uuid,
    pub player_b_id: Uuid,
    pub status: String,
    pub player_a_decision: Option<String>,
    pub player_b_decision: Option<String>,
    pub compatibility_score: f64,
    pub matched_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// --- ProfileReveal ---

#[derive(Debug, Queryable, Identifiable, Serialize, Clone)]
#[diesel(table_name = profile_reveals)]
pub struct ProfileReveal {
    pub id: Uuid,
    pub revealer_id: Uuid,
    pub revealed_to_id: Uuid,
    pub reveal_level: String,
    pub is_mutual: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = profile_reveals)]
pub struct NewProfileReveal {
    pub revealer_id: Uuid,
    pub revealed_to_id: Uuid,
    pub reveal_level: String,
    pub is_mutual: bool,
}
