use std::{collections::HashMap, sync::Arc};

use crate::{
    domain::{
        PickId, PlayerId, RepoRetrieveError, RepoUpdateError, SeasonYear,
        pick::{NewPick, Pick, PickRepository, PickWriteError},
        player::PlayerRepository,
        settings::PoolSettingsRepository,
        standing::evaluate,
        team::{Team, TeamDirectory, TeamRepository},
        week::WeekRepository,
    },
    workflow::standings::recompute::{
        RecomputeStandingsUseCase, StandingReport, StandingsError, player_error, settings_error,
    },
};

/// A pick of a week together with the names needed to show it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WeekPick {
    pub pick: Pick,
    pub player_name: String,
    pub team_abbreviation: String,
}

#[derive(Debug, thiserror::Error)]
pub enum SubmitPickError {
    #[error("unknown team {0}")]
    UnknownTeam(String),
    #[error("week {week_number} of season {season_year} does not exist")]
    UnknownWeek {
        season_year: SeasonYear,
        week_number: u32,
    },
    #[error("pick {0} does not exist")]
    PickNotFound(PickId),
    #[error("player {0} is eliminated")]
    PlayerEliminated(PlayerId),
    #[error("{0} was already used by this player")]
    TeamAlreadyUsed(String),
    #[error("player already has a pick for week {0}")]
    WeekAlreadyPicked(u32),
    #[error(transparent)]
    Standings(#[from] StandingsError),
    #[error("storage error: {0}")]
    Storage(String),
}

#[async_trait::async_trait]
pub trait PickUseCase {
    async fn submit_pick(
        &self,
        player_id: PlayerId,
        week_number: u32,
        team_abbreviation: &str,
    ) -> Result<PickId, SubmitPickError>;
    /// Manual correction of a pick's team. The result is cleared and the
    /// player recomputed; the next resolution pass fills the result in again.
    async fn change_pick(
        &self,
        pick_id: PickId,
        team_abbreviation: &str,
    ) -> Result<StandingReport, SubmitPickError>;
    /// Removes a pick entered by mistake and recomputes the player.
    async fn delete_pick(&self, pick_id: PickId) -> Result<StandingReport, SubmitPickError>;
    /// All picks of one week, ordered by player name.
    async fn list_week_picks(
        &self,
        season_year: SeasonYear,
        week_number: u32,
    ) -> Result<Vec<WeekPick>, SubmitPickError>;
}

pub struct PickUseCaseImpl<
    T: TeamRepository,
    W: WeekRepository,
    K: PickRepository,
    P: PlayerRepository,
    S: PoolSettingsRepository,
    R: RecomputeStandingsUseCase,
> {
    team_repository: Arc<T>,
    week_repository: Arc<W>,
    pick_repository: Arc<K>,
    player_repository: Arc<P>,
    settings_repository: Arc<S>,
    recompute_standings_use_case: Arc<R>,
}

impl<
    T: TeamRepository,
    W: WeekRepository,
    K: PickRepository,
    P: PlayerRepository,
    S: PoolSettingsRepository,
    R: RecomputeStandingsUseCase,
> PickUseCaseImpl<T, W, K, P, S, R>
{
    pub fn new(
        team_repository: Arc<T>,
        week_repository: Arc<W>,
        pick_repository: Arc<K>,
        player_repository: Arc<P>,
        settings_repository: Arc<S>,
        recompute_standings_use_case: Arc<R>,
    ) -> Self {
        Self {
            team_repository,
            week_repository,
            pick_repository,
            player_repository,
            settings_repository,
            recompute_standings_use_case,
        }
    }
}

impl<
    T: TeamRepository + Send + Sync + 'static,
    W: WeekRepository + Send + Sync + 'static,
    K: PickRepository + Send + Sync + 'static,
    P: PlayerRepository + Send + Sync + 'static,
    S: PoolSettingsRepository + Send + Sync + 'static,
    R: RecomputeStandingsUseCase + Send + Sync + 'static,
> PickUseCaseImpl<T, W, K, P, S, R>
{
    async fn resolve_team(&self, abbreviation: &str) -> Result<Team, SubmitPickError> {
        let directory = TeamDirectory::load(self.team_repository.as_ref())
            .await
            .map_err(|e| SubmitPickError::Storage(e.to_string()))?;
        directory
            .resolve(abbreviation)
            .cloned()
            .ok_or_else(|| SubmitPickError::UnknownTeam(abbreviation.to_string()))
    }

    async fn load_pick(&self, pick_id: PickId) -> Result<Pick, SubmitPickError> {
        self.pick_repository
            .get_pick(pick_id)
            .await
            .map_err(|e| match e {
                RepoRetrieveError::NotFound => SubmitPickError::PickNotFound(pick_id),
                RepoRetrieveError::StorageError(e) => SubmitPickError::Storage(e),
            })
    }
}

#[async_trait::async_trait]
impl<
    T: TeamRepository + Send + Sync + 'static,
    W: WeekRepository + Send + Sync + 'static,
    K: PickRepository + Send + Sync + 'static,
    P: PlayerRepository + Send + Sync + 'static,
    S: PoolSettingsRepository + Send + Sync + 'static,
    R: RecomputeStandingsUseCase + Send + Sync + 'static,
> PickUseCase for PickUseCaseImpl<T, W, K, P, S, R>
{
    async fn submit_pick(
        &self,
        player_id: PlayerId,
        week_number: u32,
        team_abbreviation: &str,
    ) -> Result<PickId, SubmitPickError> {
        let player = self
            .player_repository
            .get_player(player_id)
            .await
            .map_err(|e| player_error(player_id, e))?;
        let team = self.resolve_team(team_abbreviation).await?;

        // Weeks are looked up in the player's own season only.
        let week = match self
            .week_repository
            .find_week(player.season_year, week_number)
            .await
        {
            Ok(week) => week,
            Err(RepoRetrieveError::NotFound) => {
                return Err(SubmitPickError::UnknownWeek {
                    season_year: player.season_year,
                    week_number,
                });
            }
            Err(RepoRetrieveError::StorageError(e)) => return Err(SubmitPickError::Storage(e)),
        };

        let settings = self
            .settings_repository
            .get_settings(player.season_year)
            .await
            .map_err(|e| settings_error(player.season_year, e))?;
        let picks = self
            .pick_repository
            .list_player_picks(player_id)
            .await
            .map_err(|e| SubmitPickError::Storage(e.to_string()))?;
        if evaluate(&player, &picks, settings.max_strikes)
            .standing
            .is_eliminated()
        {
            return Err(SubmitPickError::PlayerEliminated(player_id));
        }

        let pick_id = self
            .pick_repository
            .create_pick(NewPick {
                player_id,
                week_id: week.id,
                team_id: team.id,
            })
            .await
            .map_err(|e| match e {
                PickWriteError::TeamAlreadyUsed => {
                    SubmitPickError::TeamAlreadyUsed(team.abbreviation.clone())
                }
                PickWriteError::WeekAlreadyPicked => SubmitPickError::WeekAlreadyPicked(week_number),
                PickWriteError::NotFound => StandingsError::PlayerNotFound(player_id).into(),
                PickWriteError::StorageError(e) => SubmitPickError::Storage(e),
            })?;

        log::info!(
            "Player {} ({}) picked {} for week {}",
            player_id,
            player.name,
            team.abbreviation,
            week_number
        );
        Ok(pick_id)
    }

    async fn change_pick(
        &self,
        pick_id: PickId,
        team_abbreviation: &str,
    ) -> Result<StandingReport, SubmitPickError> {
        let pick = self.load_pick(pick_id).await?;
        let team = self.resolve_team(team_abbreviation).await?;

        if pick.team_id != team.id {
            self.pick_repository
                .change_pick_team(pick_id, team.id)
                .await
                .map_err(|e| match e {
                    PickWriteError::TeamAlreadyUsed => {
                        SubmitPickError::TeamAlreadyUsed(team.abbreviation.clone())
                    }
                    PickWriteError::NotFound => SubmitPickError::PickNotFound(pick_id),
                    PickWriteError::WeekAlreadyPicked => {
                        SubmitPickError::Storage("unexpected week conflict".to_string())
                    }
                    PickWriteError::StorageError(e) => SubmitPickError::Storage(e),
                })?;
            log::info!(
                "Pick {} of player {} changed to {}",
                pick_id,
                pick.player_id,
                team.abbreviation
            );
        }

        Ok(self
            .recompute_standings_use_case
            .recompute_player_state(pick.player_id)
            .await?)
    }

    async fn delete_pick(&self, pick_id: PickId) -> Result<StandingReport, SubmitPickError> {
        let pick = self.load_pick(pick_id).await?;
        self.pick_repository
            .delete_pick(pick_id)
            .await
            .map_err(|e| match e {
                RepoUpdateError::NotFound => SubmitPickError::PickNotFound(pick_id),
                RepoUpdateError::Conflict => {
                    SubmitPickError::Storage("unexpected conflict".to_string())
                }
                RepoUpdateError::StorageError(e) => SubmitPickError::Storage(e),
            })?;
        log::info!(
            "Deleted pick {} of player {} (week {}, team {})",
            pick_id,
            pick.player_id,
            pick.week_id,
            pick.team_id
        );

        Ok(self
            .recompute_standings_use_case
            .recompute_player_state(pick.player_id)
            .await?)
    }

    async fn list_week_picks(
        &self,
        season_year: SeasonYear,
        week_number: u32,
    ) -> Result<Vec<WeekPick>, SubmitPickError> {
        let week = self
            .week_repository
            .find_week(season_year, week_number)
            .await
            .map_err(|e| match e {
                RepoRetrieveError::NotFound => SubmitPickError::UnknownWeek {
                    season_year,
                    week_number,
                },
                RepoRetrieveError::StorageError(e) => SubmitPickError::Storage(e),
            })?;
        let picks = self
            .pick_repository
            .list_week_picks(week.id)
            .await
            .map_err(|e| SubmitPickError::Storage(e.to_string()))?;
        let players: HashMap<PlayerId, String> = self
            .player_repository
            .list_players(season_year)
            .await
            .map_err(|e| SubmitPickError::Storage(e.to_string()))?
            .into_iter()
            .map(|player| (player.id, player.name))
            .collect();
        let teams = TeamDirectory::load(self.team_repository.as_ref())
            .await
            .map_err(|e| SubmitPickError::Storage(e.to_string()))?;

        let mut week_picks: Vec<WeekPick> = picks
            .into_iter()
            .map(|pick| WeekPick {
                player_name: players
                    .get(&pick.player_id)
                    .cloned()
                    .unwrap_or_else(|| pick.player_id.to_string()),
                team_abbreviation: teams
                    .get(pick.team_id)
                    .map(|team| team.abbreviation.clone())
                    .unwrap_or_else(|| pick.team_id.to_string()),
                pick,
            })
            .collect();
        week_picks.sort_by(|a, b| a.player_name.cmp(&b.player_name));
        Ok(week_picks)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use crate::{
        testing::MockPoolStore,
        workflow::standings::recompute::RecomputeStandingsUseCaseImpl,
    };

    use super::*;

    type Recompute = RecomputeStandingsUseCaseImpl<MockPoolStore, MockPoolStore, MockPoolStore>;
    type Picks = PickUseCaseImpl<
        MockPoolStore,
        MockPoolStore,
        MockPoolStore,
        MockPoolStore,
        MockPoolStore,
        Recompute,
    >;

    fn use_case(store: &MockPoolStore) -> Arc<Picks> {
        let store = Arc::new(store.clone());
        let recompute = Arc::new(RecomputeStandingsUseCaseImpl::new(
            store.clone(),
            store.clone(),
            store.clone(),
        ));
        Arc::new(PickUseCaseImpl::new(
            store.clone(),
            store.clone(),
            store.clone(),
            store.clone(),
            store,
            recompute,
        ))
    }

    #[tokio::test]
    async fn test_submit_pick_validation() {
        let store = MockPoolStore::seeded();
        let player = store.insert_player(2024, "A");
        let picks = use_case(&store);

        let first = picks.submit_pick(player, 1, "kc").await.unwrap();
        assert_eq!(store.pick(first).team_id, store.team("KC"));

        assert!(matches!(
            picks.submit_pick(player, 2, "KC").await,
            Err(SubmitPickError::TeamAlreadyUsed(team)) if team == "KC"
        ));
        assert!(matches!(
            picks.submit_pick(player, 1, "BUF").await,
            Err(SubmitPickError::WeekAlreadyPicked(1))
        ));
        assert!(matches!(
            picks.submit_pick(player, 2, "XYZ").await,
            Err(SubmitPickError::UnknownTeam(_))
        ));
        assert!(matches!(
            picks.submit_pick(player, 23, "BUF").await,
            Err(SubmitPickError::UnknownWeek { week_number: 23, .. })
        ));
        assert!(matches!(
            picks.submit_pick(PlayerId(404), 2, "BUF").await,
            Err(SubmitPickError::Standings(StandingsError::PlayerNotFound(_)))
        ));
    }

    #[tokio::test]
    async fn test_pick_outside_player_season_is_rejected() {
        let store = MockPoolStore::seeded();
        let player = store.insert_player(2023, "Last year");
        assert!(matches!(
            use_case(&store).submit_pick(player, 1, "KC").await,
            Err(SubmitPickError::UnknownWeek {
                season_year: 2023,
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_eliminated_player_cannot_pick() {
        let store = MockPoolStore::seeded();
        let player = store.insert_player(2024, "A");
        for (week, team) in [(1, "KC"), (2, "BUF"), (3, "SF")] {
            let pick = store.insert_pick(player, store.week(2024, week), store.team(team));
            store.set_pick_result(pick, Some(false)).await.unwrap();
        }
        assert!(matches!(
            use_case(&store).submit_pick(player, 4, "DAL").await,
            Err(SubmitPickError::PlayerEliminated(_))
        ));
    }

    #[tokio::test]
    async fn test_concurrent_submissions_never_reuse_a_team() {
        let store = MockPoolStore::seeded();
        let player = store.insert_player(2024, "A");
        let picks = use_case(&store);

        let handles: Vec<_> = (1..=6)
            .map(|week| {
                let picks = picks.clone();
                tokio::spawn(async move { picks.submit_pick(player, week, "PHI").await })
            })
            .collect();
        let mut accepted = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => accepted += 1,
                Err(e) => assert!(matches!(e, SubmitPickError::TeamAlreadyUsed(_))),
            }
        }
        assert_eq!(accepted, 1);

        let stored = store.list_player_picks(player).await.unwrap();
        let teams: HashSet<_> = stored.iter().map(|p| p.team_id).collect();
        assert_eq!(teams.len(), stored.len());
    }

    #[tokio::test]
    async fn test_change_pick_resets_result_and_recomputes() {
        let store = MockPoolStore::seeded();
        let player = store.insert_player(2024, "A");
        let picks = use_case(&store);
        let pick = picks.submit_pick(player, 1, "KC").await.unwrap();
        picks.submit_pick(player, 2, "BUF").await.unwrap();
        store.set_pick_result(pick, Some(false)).await.unwrap();

        assert!(matches!(
            picks.change_pick(pick, "BUF").await,
            Err(SubmitPickError::TeamAlreadyUsed(_))
        ));

        let report = picks.change_pick(pick, "DET").await.unwrap();
        assert_eq!(report.after.strikes, 0);
        let changed = store.pick(pick);
        assert_eq!(changed.team_id, store.team("DET"));
        assert_eq!(changed.team_won, None);
        assert!(!changed.is_strike);

        assert!(matches!(
            picks.change_pick(PickId(404), "DET").await,
            Err(SubmitPickError::PickNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_misplaced_pick_and_recompute() {
        let store = MockPoolStore::seeded();
        let player = store.insert_player(2024, "A");
        let picks = use_case(&store);
        picks.submit_pick(player, 1, "KC").await.unwrap();
        let wrong_week = picks.submit_pick(player, 3, "BUF").await.unwrap();
        store.set_pick_result(wrong_week, Some(false)).await.unwrap();
        store.update_player(player, |p| p.strikes = 1);

        let report = picks.delete_pick(wrong_week).await.unwrap();
        assert_eq!(report.after.strikes, 0);
        assert_eq!(store.player(player).strikes, 0);
        assert_eq!(store.list_player_picks(player).await.unwrap().len(), 1);

        // the team and the week are free again
        picks.submit_pick(player, 2, "BUF").await.unwrap();
        assert!(matches!(
            picks.delete_pick(wrong_week).await,
            Err(SubmitPickError::PickNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_list_week_picks() {
        let store = MockPoolStore::seeded();
        let zed = store.insert_player(2024, "Zed");
        let amy = store.insert_player(2024, "Amy");
        let picks = use_case(&store);
        picks.submit_pick(zed, 1, "KC").await.unwrap();
        picks.submit_pick(amy, 1, "SF").await.unwrap();
        picks.submit_pick(amy, 2, "BUF").await.unwrap();

        let week_one = picks.list_week_picks(2024, 1).await.unwrap();
        let rows: Vec<(&str, &str)> = week_one
            .iter()
            .map(|p| (p.player_name.as_str(), p.team_abbreviation.as_str()))
            .collect();
        assert_eq!(rows, vec![("Amy", "SF"), ("Zed", "KC")]);
        assert!(picks.list_week_picks(2024, 3).await.unwrap().is_empty());
        assert!(matches!(
            picks.list_week_picks(2024, 30).await,
            Err(SubmitPickError::UnknownWeek { week_number: 30, .. })
        ));
    }
}
