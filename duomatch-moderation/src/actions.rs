//! Pure moderation state-machine pieces: what each action does to the report,
//! when a suspension expires, and which appeal states are still open.

use chrono::{DateTime, Duration, Utc};

use duomatch_shared::types::event::ModerationActionType;

/// The report status an action resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportOutcome {
    Dismissed,
    Escalated,
    Resolved,
}

impl ReportOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportOutcome::Dismissed => "dismissed",
            ReportOutcome::Escalated => "escalated",
            ReportOutcome::Resolved => "resolved",
        }
    }
}

/// Exhaustive action-to-outcome mapping; a new action variant will not compile
/// without a slot here.
pub fn report_outcome(action: ModerationActionType) -> ReportOutcome {
    match action {
        ModerationActionType::Dismiss => ReportOutcome::Dismissed,
        ModerationActionType::Escalate => ReportOutcome::Escalated,
        ModerationActionType::Warning
        | ModerationActionType::Mute
        | ModerationActionType::Suspend
        | ModerationActionType::Ban => ReportOutcome::Resolved,
    }
}

/// Suspension end time. No duration means indefinite (until appealed or
/// lifted).
pub fn suspension_expires_at(
    now: DateTime<Utc>,
    duration_hours: Option<i32>,
) -> Option<DateTime<Utc>> {
    duration_hours.map(|hours| now + Duration::hours(hours as i64))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppealStatus {
    Pending,
    UnderReview,
    Approved,
    Denied,
}

impl AppealStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppealStatus::Pending => "pending",
            AppealStatus::UnderReview => "under_review",
            AppealStatus::Approved => "approved",
            AppealStatus::Denied => "denied",
        }
    }

    /// Appeals only transition out of pending/under_review.
    pub fn is_open(&self) -> bool {
        matches!(self, AppealStatus::Pending | AppealStatus::UnderReview)
    }

    /// Statuses the review update is allowed to replace.
    pub fn open_statuses() -> [&'static str; 2] {
        ["pending", "under_review"]
    }
}

impl std::fmt::Display for AppealStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for AppealStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(AppealStatus::Pending),
            "under_review" => Ok(AppealStatus::UnderReview),
            "approved" => Ok(AppealStatus::Approved),
            "denied" => Ok(AppealStatus::Denied),
            _ => Err(format!("unknown appeal status: {s}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn dismiss_and_escalate_map_to_their_own_statuses() {
        assert_eq!(report_outcome(ModerationActionType::Dismiss), ReportOutcome::Dismissed);
        assert_eq!(report_outcome(ModerationActionType::Escalate), ReportOutcome::Escalated);
    }

    #[test]
    fn punitive_actions_resolve_the_report() {
        for action in [
            ModerationActionType::Warning,
            ModerationActionType::Mute,
            ModerationActionType::Suspend,
            ModerationActionType::Ban,
        ] {
            assert_eq!(report_outcome(action), ReportOutcome::Resolved, "{action}");
        }
    }

    #[test]
    fn suspension_expiry_is_offset_by_whole_hours() {
        let now = Utc::now();
        let expires = suspension_expires_at(now, Some(48)).unwrap();
        assert_eq!(expires - now, Duration::hours(48));
        assert_eq!(suspension_expires_at(now, None), None);
    }

    #[test]
    fn only_pending_and_under_review_appeals_are_open() {
        assert!(AppealStatus::Pending.is_open());
        assert!(AppealStatus::UnderReview.is_open());
        assert!(!AppealStatus::Approved.is_open());
        assert!(!AppealStatus::Denied.is_open());
    }

    #[test]
    fn appeal_status_strings_round_trip() {
        for status in [
            AppealStatus::Pending,
            AppealStatus::UnderReview,
            AppealStatus::Approved,
            AppealStatus::Denied,
        ] {
            assert_eq!(AppealStatus::from_str(status.as_str()).unwrap(), status);
        }
    }
}
