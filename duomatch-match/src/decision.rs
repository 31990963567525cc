use uuid::Uuid;

/// One participant's verdict on a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Accepted,
    Rejected,
}

impl Decision {
    pub fn as_str(&self) -> &'static str {
        match self {
            Decision::Accepted => "accepted",
            Decision::Rejected => "rejected",
        }
    }
}

impl std::fmt::Display for Decision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Decision {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "accepted" => Ok(Decision::Accepted),
            "rejected" => Ok(Decision::Rejected),
            _ => Err(format!("unknown decision: {s}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchStatus {
    Pending,
    Accepted,
    Rejected,
    Expired,
    Completed,
}

impl MatchStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchStatus::Pending => "pending",
            MatchStatus::Accepted => "accepted",
            MatchStatus::Rejected => "rejected",
            MatchStatus::Expired => "expired",
            MatchStatus::Completed => "completed",
        }
    }
}

impl std::fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for MatchStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(MatchStatus::Pending),
            "accepted" => Ok(MatchStatus::Accepted),
            "rejected" => Ok(MatchStatus::Rejected),
            "expired" => Ok(MatchStatus::Expired),
            "completed" => Ok(MatchStatus::Completed),
            _ => Err(format!("unknown match status: {s}")),
        }
    }
}

/// Which decision column the acting user owns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    A,
    B,
}

/// Maps an acting user to their side of the pairing. Returns `None` for
/// non-participants.
pub fn side_of(player_a_id: Uuid, player_b_id: Uuid, user_id: Uuid) -> Option<Side> {
    if user_id == player_a_id {
        Some(Side::A)
    } else if user_id == player_b_id {
        Some(Side::B)
    } else {
        None
    }
}

/// Match status is a pure function of the two decisions: any rejection
/// resolves the match rejected, two acceptances resolve it accepted, anything
/// else leaves it pending.
pub fn resolve_status(a: Option<Decision>, b: Option<Decision>) -> MatchStatus {
    match (a, b) {
        (Some(Decision::Rejected), _) | (_, Some(Decision::Rejected)) => MatchStatus::Rejected,
        (Some(Decision::Accepted), Some(Decision::Accepted)) => MatchStatus::Accepted,
        _ => MatchStatus::Pending,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn undecided_matches_stay_pending() {
        assert_eq!(resolve_status(None, None), MatchStatus::Pending);
        assert_eq!(resolve_status(Some(Decision::Accepted), None), MatchStatus::Pending);
        assert_eq!(resolve_status(None, Some(Decision::Accepted)), MatchStatus::Pending);
    }

    #[test]
    fn any_rejection_resolves_rejected() {
        assert_eq!(resolve_status(Some(Decision::Rejected), None), MatchStatus::Rejected);
        assert_eq!(resolve_status(None, Some(Decision::Rejected)), MatchStatus::Rejected);
        assert_eq!(
            resolve_status(Some(Decision::Accepted), Some(Decision::Rejected)),
            MatchStatus::Rejected
        );
        assert_eq!(
            resolve_status(Some(Decision::Rejected), Some(Decision::Rejected)),
            MatchStatus::Rejected
        );
    }

    #[test]
    fn mutual_acceptance_resolves_accepted() {
        assert_eq!(
            resolve_status(Some(Decision::Accepted), Some(Decision::Accepted)),
            MatchStatus::Accepted
        );
    }

    #[test]
    fn side_maps_participants_and_rejects_strangers() {
        let a = Uuid::now_v7();
        let b = Uuid::now_v7();
        let stranger = Uuid::now_v7();

        assert_eq!(side_of(a, b, a), Some(Side::A));
        assert_eq!(side_of(a, b, b), Some(Side::B));
        assert_eq!(side_of(a, b, stranger), None);
    }

    #[test]
    fn status_strings_round_trip() {
        for status in [
            MatchStatus::Pending,
            MatchStatus::Accepted,
            MatchStatus::Rejected,
            MatchStatus::Expired,
            MatchStatus::Completed,
        ] {
            assert_eq!(MatchStatus::from_str(status.as_str()).unwrap(), status);
        }
    }
}
