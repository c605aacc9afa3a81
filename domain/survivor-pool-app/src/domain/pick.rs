use crate::domain::{
    PickId, PlayerId, RepoError, RepoRetrieveError, RepoUpdateError, SeasonYear, TeamId, WeekId,
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Pick {
    pub id: PickId,
    pub player_id: PlayerId,
    pub week_id: WeekId,
    pub team_id: TeamId,
    pub team_won: Option<bool>,
    pub is_strike: bool,
}

impl Pick {
    pub fn is_resolved(&self) -> bool {
        self.team_won.is_some()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewPick {
    pub player_id: PlayerId,
    pub week_id: WeekId,
    pub team_id: TeamId,
}

#[derive(Debug, Clone)]
pub enum PickWriteError {
    NotFound,
    TeamAlreadyUsed,
    WeekAlreadyPicked,
    StorageError(String),
}

impl std::fmt::Display for PickWriteError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PickWriteError::NotFound => write!(f, "Pick not found"),
            PickWriteError::TeamAlreadyUsed => write!(f, "Team already used this season"),
            PickWriteError::WeekAlreadyPicked => write!(f, "Week already picked"),
            PickWriteError::StorageError(e) => write!(f, "Storage error: {}", e),
        }
    }
}

impl std::error::Error for PickWriteError {}

/// Store for picks. Implementations enforce one pick per (player, week) and
/// one use of a team per player atomically on write.
#[async_trait::async_trait]
pub trait PickRepository {
    async fn create_pick(&self, pick: NewPick) -> Result<PickId, PickWriteError>;
    async fn get_pick(&self, id: PickId) -> Result<Pick, RepoRetrieveError>;
    /// Switches the team of a pick and clears its result.
    async fn change_pick_team(&self, id: PickId, team_id: TeamId) -> Result<(), PickWriteError>;
    async fn list_picks(&self, season_year: Option<SeasonYear>) -> Result<Vec<Pick>, RepoError>;
    async fn list_player_picks(&self, player_id: PlayerId) -> Result<Vec<Pick>, RepoError>;
    async fn list_week_picks(&self, week_id: WeekId) -> Result<Vec<Pick>, RepoError>;
    async fn delete_pick(&self, id: PickId) -> Result<(), RepoUpdateError>;
    /// Stores a result; `is_strike` is derived from `team_won`.
    async fn set_pick_result(
        &self,
        id: PickId,
        team_won: Option<bool>,
    ) -> Result<(), RepoUpdateError>;
}
