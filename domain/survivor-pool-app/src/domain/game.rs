use chrono::{DateTime, Utc};
use survivor_core::{FinalGame, GameStatus, IntegrityViolation, SettledScore};

use crate::domain::{GameId, RepoError, SeasonYear, TeamId, WeekId};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Game {
    pub id: GameId,
    pub external_id: String,
    pub week_id: WeekId,
    pub home_team_id: TeamId,
    pub away_team_id: TeamId,
    pub status: GameStatus,
    pub home_score: Option<u32>,
    pub away_score: Option<u32>,
    pub home_won: Option<bool>,
    pub away_won: Option<bool>,
    pub kickoff: Option<DateTime<Utc>>,
}

impl Game {
    pub fn involves(&self, team_id: TeamId) -> bool {
        self.home_team_id == team_id || self.away_team_id == team_id
    }

    pub fn as_final(&self) -> Option<FinalGame<TeamId>> {
        (self.status == GameStatus::Final).then(|| FinalGame {
            home: self.home_team_id,
            away: self.away_team_id,
            home_won: self.home_won,
            away_won: self.away_won,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GameUpsert {
    pub external_id: String,
    pub week_id: WeekId,
    pub home_team_id: TeamId,
    pub away_team_id: TeamId,
    pub score: SettledScore,
    pub kickoff: Option<DateTime<Utc>>,
}

impl GameUpsert {
    pub fn validate(&self) -> Result<(), IntegrityViolation> {
        if self.home_team_id == self.away_team_id {
            return Err(IntegrityViolation::SameTeam);
        }
        if self.score.home_won == Some(true) && self.score.away_won == Some(true) {
            return Err(IntegrityViolation::ContradictoryWinners);
        }
        Ok(())
    }

    /// Whether storing this upsert would change `game`.
    pub fn differs_from(&self, game: &Game) -> bool {
        game.week_id != self.week_id
            || game.home_team_id != self.home_team_id
            || game.away_team_id != self.away_team_id
            || game.status != self.score.status
            || game.home_score != self.score.home_score
            || game.away_score != self.score.away_score
            || game.home_won != self.score.home_won
            || game.away_won != self.score.away_won
            || (self.kickoff.is_some() && game.kickoff != self.kickoff)
    }

    pub fn into_game(self, id: GameId, previous_kickoff: Option<DateTime<Utc>>) -> Game {
        Game {
            id,
            external_id: self.external_id,
            week_id: self.week_id,
            home_team_id: self.home_team_id,
            away_team_id: self.away_team_id,
            status: self.score.status,
            home_score: self.score.home_score,
            away_score: self.score.away_score,
            home_won: self.score.home_won,
            away_won: self.score.away_won,
            kickoff: self.kickoff.or(previous_kickoff),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UpsertOutcome {
    Created,
    Updated,
    Unchanged,
}

#[derive(Debug, Clone)]
pub enum RepoUpsertError {
    Conflict(String),
    StorageError(String),
}

impl std::fmt::Display for RepoUpsertError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RepoUpsertError::Conflict(e) => write!(f, "Resource conflict: {}", e),
            RepoUpsertError::StorageError(e) => write!(f, "Storage error: {}", e),
        }
    }
}

impl std::error::Error for RepoUpsertError {}

#[async_trait::async_trait]
pub trait GameRepository {
    /// Inserts or updates the game with the upsert's external id.
    ///
    /// Fails with a conflict when the upsert would put one of its teams into a
    /// second game of the same week.
    async fn upsert_game(&self, game: GameUpsert) -> Result<(GameId, UpsertOutcome), RepoUpsertError>;
    async fn list_games_for_week(&self, week_id: WeekId) -> Result<Vec<Game>, RepoError>;
    async fn list_final_games(&self, season_year: Option<SeasonYear>)
    -> Result<Vec<Game>, RepoError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upsert(home_won: Option<bool>) -> GameUpsert {
        GameUpsert {
            external_id: "401547353".to_string(),
            week_id: WeekId(1),
            home_team_id: TeamId(1),
            away_team_id: TeamId(2),
            score: SettledScore {
                status: GameStatus::Final,
                home_score: Some(21),
                away_score: Some(17),
                home_won,
                away_won: home_won.map(|won| !won),
            },
            kickoff: None,
        }
    }

    #[test]
    fn test_validate_rejects_same_team() {
        let mut game = upsert(Some(true));
        assert!(game.validate().is_ok());
        game.away_team_id = TeamId(1);
        assert_eq!(game.validate(), Err(IntegrityViolation::SameTeam));
    }

    #[test]
    fn test_differs_from_detects_winner_change() {
        let stored = upsert(Some(true)).into_game(GameId(7), None);
        assert!(!upsert(Some(true)).differs_from(&stored));
        assert!(upsert(Some(false)).differs_from(&stored));
    }

    #[test]
    fn test_only_final_games_resolve() {
        let mut game = upsert(Some(true)).into_game(GameId(7), None);
        assert!(game.as_final().is_some());
        game.status = GameStatus::InProgress;
        assert!(game.as_final().is_none());
    }
}
