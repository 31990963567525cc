//! Session state machine: waiting -> in_progress -> completed | abandoned.
//! The first state update moves a waiting session to in_progress; completed
//! and abandoned are terminal.

use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Waiting,
    InProgress,
    Completed,
    Abandoned,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Waiting => "waiting",
            SessionStatus::InProgress => "in_progress",
            SessionStatus::Completed => "completed",
            SessionStatus::Abandoned => "abandoned",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionStatus::Completed | SessionStatus::Abandoned)
    }

    /// Statuses that count as "active" for the one-session-per-match rule.
    pub fn active_statuses() -> [&'static str; 2] {
        ["waiting", "in_progress"]
    }
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for SessionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "waiting" => Ok(SessionStatus::Waiting),
            "in_progress" => Ok(SessionStatus::InProgress),
            "completed" => Ok(SessionStatus::Completed),
            "abandoned" => Ok(SessionStatus::Abandoned),
            _ => Err(format!("unknown session status: {s}")),
        }
    }
}

/// Shallow-merges a state patch into the stored game state. Patch keys win;
/// a non-object patch replaces the state wholesale.
pub fn merge_game_state(current: &Value, patch: &Value) -> Value {
    match (current, patch) {
        (Value::Object(base), Value::Object(update)) => {
            let mut merged = base.clone();
            for (key, value) in update {
                merged.insert(key.clone(), value.clone());
            }
            Value::Object(merged)
        }
        _ => patch.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::str::FromStr;

    #[test]
    fn completed_and_abandoned_are_terminal() {
        assert!(!SessionStatus::Waiting.is_terminal());
        assert!(!SessionStatus::InProgress.is_terminal());
        assert!(SessionStatus::Completed.is_terminal());
        assert!(SessionStatus::Abandoned.is_terminal());
    }

    #[test]
    fn status_strings_round_trip() {
        for status in [
            SessionStatus::Waiting,
            SessionStatus::InProgress,
            SessionStatus::Completed,
            SessionStatus::Abandoned,
        ] {
            assert_eq!(SessionStatus::from_str(status.as_str()).unwrap(), status);
        }
    }

    #[test]
    fn merge_overwrites_and_preserves_keys() {
        let current = json!({"round": 1, "board": [0, 0], "turn": "a"});
        let patch = json!({"round": 2, "turn": "b"});
        let merged = merge_game_state(&current, &patch);
        assert_eq!(merged, json!({"round": 2, "board": [0, 0], "turn": "b"}));
    }

    #[test]
    fn non_object_patch_replaces_state() {
        let current = json!({"round": 1});
        let merged = merge_game_state(&current, &json!(null));
        assert_eq!(merged, json!(null));
    }

    #[test]
    fn merge_into_empty_state_takes_the_patch() {
        let merged = merge_game_state(&json!({}), &json!({"round": 1}));
        assert_eq!(merged, json!({"round": 1}));
    }
}
