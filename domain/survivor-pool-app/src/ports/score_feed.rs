use chrono::{DateTime, Utc};
use survivor_core::ReportedScore;

use crate::domain::SeasonYear;

/// One game as delivered by a score feed. Abbreviations are the feed's own
/// and may differ from the canonical ones.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FeedGame {
    pub external_id: String,
    pub home_abbreviation: String,
    pub away_abbreviation: String,
    pub home_score: Option<i64>,
    pub away_score: Option<i64>,
    pub completed: bool,
    pub home_winner: Option<bool>,
    pub away_winner: Option<bool>,
    pub kickoff: Option<DateTime<Utc>>,
}

impl FeedGame {
    pub fn reported_score(&self) -> ReportedScore {
        ReportedScore {
            completed: self.completed,
            home_score: self.home_score,
            away_score: self.away_score,
            home_winner: self.home_winner,
            away_winner: self.away_winner,
        }
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum FeedError {
    #[error("score feed unavailable: {0}")]
    Unavailable(String),
    #[error("malformed score feed data: {0}")]
    Malformed(String),
}

#[async_trait::async_trait]
pub trait ScoreFeed {
    async fn fetch_week(
        &self,
        season_year: SeasonYear,
        week_number: u32,
    ) -> Result<Vec<FeedGame>, FeedError>;
}
