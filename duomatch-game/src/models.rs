use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::Serialize;
use uuid::Uuid;

use crate::schema::{game_sessions, games, match_score_aggregates, matches, point_transactions, user_stats};

// --- Game ---

#[derive(Debug, Queryable, Identifiable, Serialize, Clone)]
#[diesel(table_name = games)]
pub struct Game {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

// --- GameSession ---

#[derive(Debug, Queryable, Identifiable, Serialize, Clone)]
#[diesel(table_name = game_sessions)]
pub struct GameSession {
    pub id: Uuid,
    pub match_id: Uuid,
    pub game_id: Uuid,
    pub player_a_id: Uuid,
    pub player_b_id: Uuid,
    pub status: String,
    pub player_a_score: Option<i32>,
    pub player_b_score: Option<i32>,
    pub cooperation_score: Option<i32>,
    pub duo_score: Option<i32>,
    pub game_state: serde_json::Value,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub duration_minutes: Option<i32>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = game_sessions)]
pub struct NewGameSession {
    pub match_id: Uuid,
    pub game_id: Uuid,
    pub player_a_id: Uuid,
    pub player_b_id: Uuid,
    pub status: String,
    pub game_state: serde_json::Value,
}

// --- MatchScoreAggregate ---

#[derive(Debug, Queryable, Serialize, Clone)]
#[diesel(table_name = match_score_aggregates)]
pub struct MatchScoreAggregate {
    pub match_id: Uuid,
    pub games_played: i32,
    pub total_cooperation: i32,
    pub avg_cooperation: f64,
    pub total_duo_score: i32,
    pub last_played_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = match_score_aggregates)]
pub struct NewMatchScoreAggregate {
    pub match_id: Uuid,
    pub games_played: i32,
    pub total_cooperation: i32,
    pub avg_cooperation: f64,
    pub total_duo_score: i32,
    pub last_played_at: DateTime<Utc>,
}

// --- UserStats ---

#[derive(Debug, Queryable, Serialize, Clone)]
#[diesel(table_name = user_stats)]
pub struct UserStats {
    pub user_id: Uuid,
    pub games_played: i32,
    pub total_cooperation: i32,
    pub avg_cooperation: f64,
    pub total_play_minutes: i32,
    pub current_streak: i32,
    pub longest_streak: i32,
    pub total_points: i32,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = user_stats)]
pub struct NewUserStats {
    pub user_id: Uuid,
    pub games_played: i32,
    pub total_cooperation: i32,
    pub avg_cooperation: f64,
    pub total_play_minutes: i32,
    pub current_streak: i32,
    pub longest_streak: i32,
    pub total_points: i32,
}

impl NewUserStats {
    pub fn empty(user_id: Uuid) -> Self {
        Self {
            user_id,
            games_played: 0,
            total_cooperation: 0,
            avg_cooperation: 0.0,
            total_play_minutes: 0,
            current_streak: 0,
            longest_streak: 0,
            total_points: 0,
        }
    }
}

// --- PointTransaction ---

#[derive(Debug, Queryable, Identifiable, Serialize, Clone)]
#[diesel(table_name = point_transactions)]
pub struct PointTransaction {
    pub id: Uuid,
    pub user_id: Uuid,
    pub amount: i32,
    pub reason: String,
    pub reference_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = point_transactions)]
pub struct NewPointTransaction {
    pub user_id: Uuid,
    pub amount: i32,
    pub reason: String,
    pub reference_id: Option<Uuid>,
}

// --- MatchRef (read-only view of the match service's table) ---

#[derive(Debug, Queryable, Clone)]
#[diesel(table_name = matches)]
pub struct MatchRef {
    pub id: Uuid,
    pub player_a_id: Uuid,
    pub player_b_id: Uuid,
    pub status: String,
}
