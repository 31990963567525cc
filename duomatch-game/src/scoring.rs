//! Duo scoring and aggregate folding. All pure; the session route applies the
//! results inside its transaction.

use chrono::{DateTime, Utc};

use crate::models::{MatchScoreAggregate, UserStats};

/// Combined score for a completed session. Cooperation carries 60% of the
/// weight, the mean of the two raw scores the remaining 40%.
pub fn duo_score(player_a_score: i32, player_b_score: i32, cooperation_score: i32) -> i32 {
    let performance = (player_a_score + player_b_score) as f64 / 2.0;
    (cooperation_score as f64 * 0.6 + performance * 0.4).round() as i32
}

/// Play time in whole minutes. Sessions ended straight from `waiting` never
/// started, so they contribute zero.
pub fn duration_minutes(started_at: Option<DateTime<Utc>>, ended_at: DateTime<Utc>) -> i32 {
    match started_at {
        Some(started) => (ended_at - started).num_minutes().max(0) as i32,
        None => 0,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AggregateFold {
    pub games_played: i32,
    pub total_cooperation: i32,
    pub avg_cooperation: f64,
    pub total_duo_score: i32,
}

/// Folds one completed session into a match's running totals.
pub fn fold_match_aggregate(
    current: &MatchScoreAggregate,
    cooperation_score: i32,
    duo_score: i32,
) -> AggregateFold {
    let games_played = current.games_played + 1;
    let total_cooperation = current.total_cooperation + cooperation_score;
    AggregateFold {
        games_played,
        total_cooperation,
        avg_cooperation: total_cooperation as f64 / games_played as f64,
        total_duo_score: current.total_duo_score + duo_score,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StatsFold {
    pub games_played: i32,
    pub total_cooperation: i32,
    pub avg_cooperation: f64,
    pub total_play_minutes: i32,
    pub current_streak: i32,
    pub longest_streak: i32,
    pub total_points: i32,
}

/// Folds one completed session into a player's lifetime stats. The streak
/// increments on every completed session; there is no reset rule, so this is
/// the single place one would land.
pub fn fold_user_stats(
    current: &UserStats,
    cooperation_score: i32,
    play_minutes: i32,
    duo_score: i32,
) -> StatsFold {
    let games_played = current.games_played + 1;
    let total_cooperation = current.total_cooperation + cooperation_score;
    let current_streak = current.current_streak + 1;
    StatsFold {
        games_played,
        total_cooperation,
        avg_cooperation: total_cooperation as f64 / games_played as f64,
        total_play_minutes: current.total_play_minutes + play_minutes,
        current_streak,
        longest_streak: current.longest_streak.max(current_streak),
        total_points: current.total_points + duo_score,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use uuid::Uuid;

    fn aggregate(games: i32, total_coop: i32, total_duo: i32) -> MatchScoreAggregate {
        MatchScoreAggregate {
            match_id: Uuid::now_v7(),
            games_played: games,
            total_cooperation: total_coop,
            avg_cooperation: if games == 0 { 0.0 } else { total_coop as f64 / games as f64 },
            total_duo_score: total_duo,
            last_played_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn stats(games: i32, streak: i32, longest: i32, points: i32) -> UserStats {
        UserStats {
            user_id: Uuid::now_v7(),
            games_played: games,
            total_cooperation: games * 50,
            avg_cooperation: 50.0,
            total_play_minutes: games * 10,
            current_streak: streak,
            longest_streak: longest,
            total_points: points,
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn duo_score_weighs_cooperation_at_sixty_percent() {
        // 80 * 0.6 + ((50 + 70) / 2) * 0.4 = 48 + 24
        assert_eq!(duo_score(50, 70, 80), 72);
    }

    #[test]
    fn duo_score_rounds_to_nearest() {
        // 75 * 0.6 + ((60 + 61) / 2) * 0.4 = 45 + 24.2 = 69.2
        assert_eq!(duo_score(60, 61, 75), 69);
        // 99 * 0.6 + ((99 + 100) / 2) * 0.4 = 59.4 + 39.8 = 99.2
        assert_eq!(duo_score(99, 100, 99), 99);
        assert_eq!(duo_score(100, 100, 100), 100);
        assert_eq!(duo_score(0, 0, 0), 0);
    }

    #[test]
    fn duration_floors_to_minutes_and_never_goes_negative() {
        let now = Utc::now();
        assert_eq!(duration_minutes(Some(now - Duration::seconds(359)), now), 5);
        assert_eq!(duration_minutes(Some(now - Duration::seconds(59)), now), 0);
        assert_eq!(duration_minutes(Some(now + Duration::seconds(30)), now), 0);
        assert_eq!(duration_minutes(None, now), 0);
    }

    #[test]
    fn first_session_creates_the_running_average() {
        let fold = fold_match_aggregate(&aggregate(0, 0, 0), 80, 72);
        assert_eq!(fold.games_played, 1);
        assert_eq!(fold.total_cooperation, 80);
        assert_eq!(fold.avg_cooperation, 80.0);
        assert_eq!(fold.total_duo_score, 72);
    }

    #[test]
    fn aggregate_average_is_total_over_games() {
        let fold = fold_match_aggregate(&aggregate(2, 120, 140), 90, 80);
        assert_eq!(fold.games_played, 3);
        assert_eq!(fold.total_cooperation, 210);
        assert_eq!(fold.avg_cooperation, 70.0);
        assert_eq!(fold.total_duo_score, 220);
    }

    #[test]
    fn streak_increments_on_every_completed_session() {
        let fold = fold_user_stats(&stats(4, 4, 4, 300), 80, 12, 72);
        assert_eq!(fold.current_streak, 5);
        assert_eq!(fold.longest_streak, 5);
        assert_eq!(fold.games_played, 5);
        assert_eq!(fold.total_points, 372);
    }

    #[test]
    fn longest_streak_is_a_running_max() {
        let fold = fold_user_stats(&stats(10, 2, 8, 500), 60, 5, 50);
        assert_eq!(fold.current_streak, 3);
        assert_eq!(fold.longest_streak, 8);
    }

    #[test]
    fn play_minutes_accumulate() {
        let fold = fold_user_stats(&stats(2, 2, 2, 100), 70, 25, 60);
        assert_eq!(fold.total_play_minutes, 45);
    }
}
