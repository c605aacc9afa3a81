pub mod game;
pub mod payout;
pub mod resolution;
pub mod standing;

pub use game::{GameStatus, ReportedScore, SettledScore, settle};
pub use payout::{Distribution, Entrant, Fees, Payout, WinnerTier, compute_payout};
pub use resolution::{FinalGame, PickResolution, resolve_pick};
pub use standing::{BuybackDecision, SettingsError, Standing};

/// A record that can never be valid, no matter how often it is re-read.
/// Such records are surfaced to an operator and never repaired by guessing.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum IntegrityViolation {
    #[error("a team cannot play against itself")]
    SameTeam,

    #[error("invalid score reported: {0}")]
    InvalidScore(i64),

    #[error("both teams are reported as winner")]
    ContradictoryWinners,

    #[error("declared result disagrees with the score {home_score}-{away_score}")]
    WinnerDisagreesWithScore { home_score: u32, away_score: u32 },

    #[error("team appears in {0} final games of the same week")]
    DuplicateGame(usize),
}

/// A pick counts as a strike exactly when its team is known to have lost.
pub fn is_strike(team_won: Option<bool>) -> bool {
    team_won == Some(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_strike() {
        assert!(is_strike(Some(false)));
        assert!(!is_strike(Some(true)));
        assert!(!is_strike(None));
    }
}
