//! The profile reveal ladder: an ordered unlock sequence per direction of a
//! matched pair. Levels must be requested strictly in ascending order and a
//! granted level cannot be requested again.

/// Ordered reveal levels. Adding a level means adding a variant and a slot in
/// [`LADDER`], which keeps every match below exhaustive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealLevel {
    Bio,
    Voice,
    Photo,
}

/// The unlock order.
pub const LADDER: [RevealLevel; 3] = [RevealLevel::Bio, RevealLevel::Voice, RevealLevel::Photo];

impl RevealLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RevealLevel::Bio => "bio",
            RevealLevel::Voice => "voice",
            RevealLevel::Photo => "photo",
        }
    }

    /// Position in the ladder.
    pub fn index(&self) -> usize {
        match self {
            RevealLevel::Bio => 0,
            RevealLevel::Voice => 1,
            RevealLevel::Photo => 2,
        }
    }
}

impl std::fmt::Display for RevealLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for RevealLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "bio" => Ok(RevealLevel::Bio),
            "voice" => Ok(RevealLevel::Voice),
            "photo" => Ok(RevealLevel::Photo),
            _ => Err(format!("unknown reveal level: {s}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LadderViolation {
    /// The requested level was already granted for this direction.
    AlreadyGranted { level: RevealLevel },
    /// A lower level must be granted first.
    OutOfOrder { next_required: RevealLevel },
}

/// The highest granted level for a direction, if any.
pub fn current_level(granted: &[RevealLevel]) -> Option<RevealLevel> {
    granted.iter().copied().max_by_key(|l| l.index())
}

/// Validates a reveal request against the direction's already-granted levels.
/// Requests must target exactly the next rung of the ladder.
pub fn validate_request(
    granted: &[RevealLevel],
    requested: RevealLevel,
) -> Result<(), LadderViolation> {
    let current_index = current_level(granted).map(|l| l.index() as i64).unwrap_or(-1);
    let requested_index = requested.index() as i64;

    if requested_index <= current_index {
        return Err(LadderViolation::AlreadyGranted { level: requested });
    }
    if requested_index > current_index + 1 {
        let next_required = LADDER[(current_index + 1) as usize];
        return Err(LadderViolation::OutOfOrder { next_required });
    }
    Ok(())
}

/// Levels granted in both directions, in ladder order.
pub fn mutual_levels(outgoing: &[RevealLevel], incoming: &[RevealLevel]) -> Vec<RevealLevel> {
    LADDER
        .iter()
        .copied()
        .filter(|l| outgoing.contains(l) && incoming.contains(l))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_pair_must_start_at_bio() {
        let err = validate_request(&[], RevealLevel::Photo).unwrap_err();
        assert_eq!(err, LadderViolation::OutOfOrder { next_required: RevealLevel::Bio });

        let err = validate_request(&[], RevealLevel::Voice).unwrap_err();
        assert_eq!(err, LadderViolation::OutOfOrder { next_required: RevealLevel::Bio });

        assert!(validate_request(&[], RevealLevel::Bio).is_ok());
    }

    #[test]
    fn next_rung_is_accepted() {
        assert!(validate_request(&[RevealLevel::Bio], RevealLevel::Voice).is_ok());
        assert!(validate_request(
            &[RevealLevel::Bio, RevealLevel::Voice],
            RevealLevel::Photo
        )
        .is_ok());
    }

    #[test]
    fn regranting_a_level_is_an_error_not_a_noop() {
        let err = validate_request(&[RevealLevel::Bio], RevealLevel::Bio).unwrap_err();
        assert_eq!(err, LadderViolation::AlreadyGranted { level: RevealLevel::Bio });

        let err = validate_request(
            &[RevealLevel::Bio, RevealLevel::Voice],
            RevealLevel::Bio,
        )
        .unwrap_err();
        assert_eq!(err, LadderViolation::AlreadyGranted { level: RevealLevel::Bio });
    }

    #[test]
    fn skipping_a_rung_names_the_required_level() {
        let err = validate_request(&[RevealLevel::Bio], RevealLevel::Photo).unwrap_err();
        assert_eq!(err, LadderViolation::OutOfOrder { next_required: RevealLevel::Voice });
    }

    #[test]
    fn current_level_is_the_highest_granted() {
        assert_eq!(current_level(&[]), None);
        assert_eq!(current_level(&[RevealLevel::Bio]), Some(RevealLevel::Bio));
        assert_eq!(
            current_level(&[RevealLevel::Bio, RevealLevel::Voice]),
            Some(RevealLevel::Voice)
        );
    }

    #[test]
    fn mutual_levels_is_the_ordered_intersection() {
        let outgoing = [RevealLevel::Bio, RevealLevel::Voice];
        let incoming = [RevealLevel::Bio];
        assert_eq!(mutual_levels(&outgoing, &incoming), vec![RevealLevel::Bio]);

        let both = [RevealLevel::Bio, RevealLevel::Voice, RevealLevel::Photo];
        assert_eq!(mutual_levels(&both, &both).len(), 3);

        assert!(mutual_levels(&outgoing, &[]).is_empty());
    }
}
