use std::sync::Arc;

use survivor_core::Standing;

use crate::domain::{
    PlayerId, RepoRetrieveError, SeasonYear,
    pick::PickRepository,
    player::{Player, PlayerRepository, PlayerState},
    settings::{PoolSettings, PoolSettingsRepository},
    standing::evaluate,
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StandingReport {
    pub player_id: PlayerId,
    pub name: String,
    pub before: PlayerState,
    pub after: PlayerState,
    pub standing: Standing,
    /// The stored strike count did not match the player's strike picks.
    pub repaired_strikes: bool,
}

impl StandingReport {
    pub fn changed(&self) -> bool {
        self.before != self.after
    }
}

#[derive(Debug, Default)]
pub struct SeasonStandingsSummary {
    pub reports: Vec<StandingReport>,
    pub failed: Vec<(PlayerId, StandingsError)>,
}

impl SeasonStandingsSummary {
    pub fn changed(&self) -> impl Iterator<Item = &StandingReport> {
        self.reports.iter().filter(|report| report.changed())
    }

    pub fn buyback_pending(&self) -> impl Iterator<Item = &StandingReport> {
        self.reports
            .iter()
            .filter(|report| report.standing == Standing::BuybackPending)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StandingsError {
    #[error("player {0} does not exist")]
    PlayerNotFound(PlayerId),
    #[error("no pool settings for season {0}")]
    SettingsMissing(SeasonYear),
    #[error("storage error: {0}")]
    Storage(String),
}

pub(crate) fn settings_error(season_year: SeasonYear, e: RepoRetrieveError) -> StandingsError {
    match e {
        RepoRetrieveError::NotFound => StandingsError::SettingsMissing(season_year),
        RepoRetrieveError::StorageError(e) => StandingsError::Storage(e),
    }
}

pub(crate) fn player_error(player_id: PlayerId, e: RepoRetrieveError) -> StandingsError {
    match e {
        RepoRetrieveError::NotFound => StandingsError::PlayerNotFound(player_id),
        RepoRetrieveError::StorageError(e) => StandingsError::Storage(e),
    }
}

#[async_trait::async_trait]
pub trait RecomputeStandingsUseCase {
    async fn recompute_player_state(
        &self,
        player_id: PlayerId,
    ) -> Result<StandingReport, StandingsError>;
    async fn recompute_players(&self, player_ids: &[PlayerId]) -> SeasonStandingsSummary;
    async fn recompute_season(
        &self,
        season_year: SeasonYear,
    ) -> Result<SeasonStandingsSummary, StandingsError>;
}

pub struct RecomputeStandingsUseCaseImpl<
    P: PlayerRepository,
    K: PickRepository,
    S: PoolSettingsRepository,
> {
    player_repository: Arc<P>,
    pick_repository: Arc<K>,
    settings_repository: Arc<S>,
}

impl<P: PlayerRepository, K: PickRepository, S: PoolSettingsRepository>
    RecomputeStandingsUseCaseImpl<P, K, S>
{
    pub fn new(
        player_repository: Arc<P>,
        pick_repository: Arc<K>,
        settings_repository: Arc<S>,
    ) -> Self {
        Self {
            player_repository,
            pick_repository,
            settings_repository,
        }
    }
}

impl<
    P: PlayerRepository + Send + Sync + 'static,
    K: PickRepository + Send + Sync + 'static,
    S: PoolSettingsRepository + Send + Sync + 'static,
> RecomputeStandingsUseCaseImpl<P, K, S>
{
    async fn recompute(
        &self,
        player: Player,
        settings: &PoolSettings,
    ) -> Result<StandingReport, StandingsError> {
        let picks = self
            .pick_repository
            .list_player_picks(player.id)
            .await
            .map_err(|e| StandingsError::Storage(e.to_string()))?;
        let evaluation = evaluate(&player, &picks, settings.max_strikes);
        let before = player.state();
        let after = evaluation.state();

        if before != after {
            self.player_repository
                .save_player_state(player.id, after)
                .await
                .map_err(|e| StandingsError::Storage(e.to_string()))?;
        }
        if before.strikes != after.strikes {
            log::warn!(
                "Repaired strike count of player {} ({}): stored {}, actual {}",
                player.id,
                player.name,
                before.strikes,
                after.strikes
            );
        }
        if before.is_eliminated != after.is_eliminated {
            log::info!(
                "Player {} ({}) is now {}",
                player.id,
                player.name,
                evaluation.standing
            );
        }

        Ok(StandingReport {
            player_id: player.id,
            repaired_strikes: before.strikes != after.strikes,
            name: player.name,
            before,
            after,
            standing: evaluation.standing,
        })
    }

    async fn load_settings(&self, season_year: SeasonYear) -> Result<PoolSettings, StandingsError> {
        self.settings_repository
            .get_settings(season_year)
            .await
            .map_err(|e| settings_error(season_year, e))
    }
}

#[async_trait::async_trait]
impl<
    P: PlayerRepository + Send + Sync + 'static,
    K: PickRepository + Send + Sync + 'static,
    S: PoolSettingsRepository + Send + Sync + 'static,
> RecomputeStandingsUseCase for RecomputeStandingsUseCaseImpl<P, K, S>
{
    async fn recompute_player_state(
        &self,
        player_id: PlayerId,
    ) -> Result<StandingReport, StandingsError> {
        let player = self
            .player_repository
            .get_player(player_id)
            .await
            .map_err(|e| player_error(player_id, e))?;
        let settings = self.load_settings(player.season_year).await?;
        self.recompute(player, &settings).await
    }

    async fn recompute_players(&self, player_ids: &[PlayerId]) -> SeasonStandingsSummary {
        let mut summary = SeasonStandingsSummary::default();
        for &player_id in player_ids {
            match self.recompute_player_state(player_id).await {
                Ok(report) => summary.reports.push(report),
                Err(e) => {
                    log::error!("Failed to recompute player {}: {}", player_id, e);
                    summary.failed.push((player_id, e));
                }
            }
        }
        summary
    }

    async fn recompute_season(
        &self,
        season_year: SeasonYear,
    ) -> Result<SeasonStandingsSummary, StandingsError> {
        let settings = self.load_settings(season_year).await?;
        let players = self
            .player_repository
            .list_players(season_year)
            .await
            .map_err(|e| StandingsError::Storage(e.to_string()))?;

        let mut summary = SeasonStandingsSummary::default();
        for player in players {
            let player_id = player.id;
            match self.recompute(player, &settings).await {
                Ok(report) => summary.reports.push(report),
                Err(e) => {
                    log::error!("Failed to recompute player {}: {}", player_id, e);
                    summary.failed.push((player_id, e));
                }
            }
        }

        log::info!(
            "Recomputed {} players of season {}: {} changed, {} awaiting a buyback decision, {} failed",
            summary.reports.len(),
            season_year,
            summary.changed().count(),
            summary.buyback_pending().count(),
            summary.failed.len()
        );
        Ok(summary)
    }
}
