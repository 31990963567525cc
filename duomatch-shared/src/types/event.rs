use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// RabbitMQ event envelope wrapping all domain events.
///
/// Routing key format: `duomatch.{domain}.{entity}.{action}`
/// Example: `duomatch.match.decision.submitted`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event<T: Serialize> {
    pub id: Uuid,
    pub source: String,
    pub event_type: String,
    pub timestamp: DateTime<Utc>,
    pub correlation_id: Option<Uuid>,
    pub user_id: Option<Uuid>,
    pub data: T,
}

impl<T: Serialize> Event<T> {
    pub fn new(source: impl Into<String>, event_type: impl Into<String>, data: T) -> Self {
        Self {
            id: Uuid::now_v7(),
            source: source.into(),
            event_type: event_type.into(),
            timestamp: Utc::now(),
            correlation_id: None,
            user_id: None,
            data,
        }
    }

    pub fn with_user(mut self, user_id: Uuid) -> Self {
        self.user_id = Some(user_id);
        self
    }

    pub fn with_correlation(mut self, correlation_id: Uuid) -> Self {
        self.correlation_id = Some(correlation_id);
        self
    }
}

/// RabbitMQ routing keys
pub mod routing_keys {
    // Match events
    pub const MATCH_DECISION_SUBMITTED: &str = "duomatch.match.decision.submitted";
    pub const MATCH_RESOLVED: &str = "duomatch.match.resolved";

    // Reveal events
    pub const REVEAL_GRANTED: &str = "duomatch.reveal.level.granted";

    // Game events
    pub const GAME_SESSION_CREATED: &str = "duomatch.game.session.created";
    pub const GAME_SESSION_COMPLETED: &str = "duomatch.game.session.completed";

    // Moderation events
    pub const MODERATION_REPORT_CREATED: &str = "duomatch.moderation.report.created";
    pub const MODERATION_ACTION_APPLIED: &str = "duomatch.moderation.action.applied";
    pub const MODERATION_APPEAL_DECIDED: &str = "duomatch.moderation.appeal.decided";
}

/// The closed set of moderation actions. Serialized into event payloads and
/// matched exhaustively wherever an action maps to downstream behavior, so an
/// unhandled variant is a compile error rather than a silent fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModerationActionType {
    Warning,
    Mute,
    Suspend,
    Ban,
    Dismiss,
    Escalate,
}

impl std::fmt::Display for ModerationActionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ModerationActionType::Warning => "warning",
            ModerationActionType::Mute => "mute",
            ModerationActionType::Suspend => "suspend",
            ModerationActionType::Ban => "ban",
            ModerationActionType::Dismiss => "dismiss",
            ModerationActionType::Escalate => "escalate",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for ModerationActionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "warning" => Ok(ModerationActionType::Warning),
            "mute" => Ok(ModerationActionType::Mute),
            "suspend" => Ok(ModerationActionType::Suspend),
            "ban" => Ok(ModerationActionType::Ban),
            "dismiss" => Ok(ModerationActionType::Dismiss),
            "escalate" => Ok(ModerationActionType::Escalate),
            _ => Err(format!("unknown action type: {s}")),
        }
    }
}

/// Common event data payloads
pub mod payloads {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Serialize};
    use uuid::Uuid;

    use super::ModerationActionType;

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct DecisionSubmitted {
        pub match_id: Uuid,
        pub user_id: Uuid,
        pub decision: String,
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct MatchResolved {
        pub match_id: Uuid,
        pub player_a_id: Uuid,
        pub player_b_id: Uuid,
        pub status: String,
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct RevealGranted {
        pub reveal_id: Uuid,
        pub revealer_id: Uuid,
        pub revealed_to_id: Uuid,
        pub level: String,
        pub is_mutual: bool,
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct SessionCreated {
        pub session_id: Uuid,
        pub match_id: Uuid,
        pub game_id: Uuid,
        pub player_a_id: Uuid,
        pub player_b_id: Uuid,
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct SessionCompleted {
        pub session_id: Uuid,
        pub match_id: Uuid,
        pub player_a_id: Uuid,
        pub player_b_id: Uuid,
        pub duo_score: i32,
        pub cooperation_score: i32,
        pub duration_minutes: i32,
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct ReportCreated {
        pub report_id: Uuid,
        pub reporter_id: Uuid,
        pub reported_id: Uuid,
        pub report_type: String,
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct ActionApplied {
        pub action_id: Uuid,
        pub report_id: Uuid,
        pub target_user_id: Uuid,
        pub action_type: ModerationActionType,
        pub reason: String,
        pub duration_hours: Option<i32>,
        pub expires_at: Option<DateTime<Utc>>,
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct AppealDecided {
        pub appeal_id: Uuid,
        pub user_id: Uuid,
        pub suspension_id: Uuid,
        pub approved: bool,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn action_type_round_trips_through_strings() {
        for action in [
            ModerationActionType::Warning,
            ModerationActionType::Mute,
            ModerationActionType::Suspend,
            ModerationActionType::Ban,
            ModerationActionType::Dismiss,
            ModerationActionType::Escalate,
        ] {
            let parsed = ModerationActionType::from_str(&action.to_string()).unwrap();
            assert_eq!(parsed, action);
        }
    }

    #[test]
    fn unknown_action_type_is_rejected() {
        assert!(ModerationActionType::from_str("shadowban").is_err());
    }

    #[test]
    fn action_type_serializes_lowercase() {
        let json = serde_json::to_string(&ModerationActionType::Escalate).unwrap();
        assert_eq!(json, "\"escalate\"");
    }
}
