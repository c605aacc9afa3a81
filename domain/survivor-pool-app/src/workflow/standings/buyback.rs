use std::sync::Arc;

use survivor_core::Standing;

use crate::{
    domain::{
        PlayerId,
        pick::PickRepository,
        player::{Player, PlayerRepository},
        settings::PoolSettingsRepository,
        standing::{Evaluation, evaluate},
    },
    workflow::standings::recompute::{
        RecomputeStandingsUseCase, StandingReport, StandingsError, player_error, settings_error,
    },
};

#[derive(Debug, thiserror::Error)]
pub enum BuybackError {
    #[error("player {player_id} cannot decide on a buyback while {standing}")]
    NotEligible {
        player_id: PlayerId,
        standing: Standing,
    },
    #[error("player {player_id} has {strikes} strikes; a buyback decision can only be corrected at {max_strikes}")]
    StrikesNotAtLimit {
        player_id: PlayerId,
        strikes: u32,
        max_strikes: u32,
    },
    #[error(transparent)]
    Standings(#[from] StandingsError),
}

#[async_trait::async_trait]
pub trait RecordBuybackUseCase {
    /// Stores the one-time buyback decision of a player waiting for one and
    /// recomputes the player.
    async fn record_buyback_decision(
        &self,
        player_id: PlayerId,
        accepted: bool,
        fee_paid: bool,
    ) -> Result<StandingReport, BuybackError>;
    /// Admin correction: replaces whatever decision is stored. Allowed only
    /// while the player's strikes are exactly at the limit, so a player
    /// eliminated after buying back stays eliminated.
    async fn override_buyback_decision(
        &self,
        player_id: PlayerId,
        accepted: bool,
        fee_paid: bool,
    ) -> Result<StandingReport, BuybackError>;
}

pub struct RecordBuybackUseCaseImpl<
    P: PlayerRepository,
    K: PickRepository,
    S: PoolSettingsRepository,
    R: RecomputeStandingsUseCase,
> {
    player_repository: Arc<P>,
    pick_repository: Arc<K>,
    settings_repository: Arc<S>,
    recompute_standings_use_case: Arc<R>,
}

impl<P: PlayerRepository, K: PickRepository, S: PoolSettingsRepository, R: RecomputeStandingsUseCase>
    RecordBuybackUseCaseImpl<P, K, S, R>
{
    pub fn new(
        player_repository: Arc<P>,
        pick_repository: Arc<K>,
        settings_repository: Arc<S>,
        recompute_standings_use_case: Arc<R>,
    ) -> Self {
        Self {
            player_repository,
            pick_repository,
            settings_repository,
            recompute_standings_use_case,
        }
    }
}

impl<
    P: PlayerRepository + Send + Sync + 'static,
    K: PickRepository + Send + Sync + 'static,
    S: PoolSettingsRepository + Send + Sync + 'static,
    R: RecomputeStandingsUseCase + Send + Sync + 'static,
> RecordBuybackUseCaseImpl<P, K, S, R>
{
    async fn evaluate_player(
        &self,
        player_id: PlayerId,
    ) -> Result<(Player, Evaluation, u32), StandingsError> {
        let player = self
            .player_repository
            .get_player(player_id)
            .await
            .map_err(|e| player_error(player_id, e))?;
        let settings = self
            .settings_repository
            .get_settings(player.season_year)
            .await
            .map_err(|e| settings_error(player.season_year, e))?;
        let picks = self
            .pick_repository
            .list_player_picks(player_id)
            .await
            .map_err(|e| StandingsError::Storage(e.to_string()))?;
        let evaluation = evaluate(&player, &picks, settings.max_strikes);
        Ok((player, evaluation, settings.max_strikes))
    }

    async fn store_decision(
        &self,
        player_id: PlayerId,
        accepted: bool,
        fee_paid: bool,
    ) -> Result<StandingReport, BuybackError> {
        self.player_repository
            .set_buyback(player_id, accepted, fee_paid && accepted)
            .await
            .map_err(|e| StandingsError::Storage(e.to_string()))?;
        Ok(self
            .recompute_standings_use_case
            .recompute_player_state(player_id)
            .await?)
    }
}

#[async_trait::async_trait]
impl<
    P: PlayerRepository + Send + Sync + 'static,
    K: PickRepository + Send + Sync + 'static,
    S: PoolSettingsRepository + Send + Sync + 'static,
    R: RecomputeStandingsUseCase + Send + Sync + 'static,
> RecordBuybackUseCase for RecordBuybackUseCaseImpl<P, K, S, R>
{
    async fn record_buyback_decision(
        &self,
        player_id: PlayerId,
        accepted: bool,
        fee_paid: bool,
    ) -> Result<StandingReport, BuybackError> {
        let (player, evaluation, _) = self.evaluate_player(player_id).await?;
        if evaluation.standing != Standing::BuybackPending {
            return Err(BuybackError::NotEligible {
                player_id,
                standing: evaluation.standing,
            });
        }

        let report = self.store_decision(player_id, accepted, fee_paid).await?;
        log::info!(
            "Player {} ({}) {} the buyback",
            player_id,
            player.name,
            if accepted { "accepted" } else { "declined" }
        );
        Ok(report)
    }

    async fn override_buyback_decision(
        &self,
        player_id: PlayerId,
        accepted: bool,
        fee_paid: bool,
    ) -> Result<StandingReport, BuybackError> {
        let (player, evaluation, max_strikes) = self.evaluate_player(player_id).await?;
        if evaluation.strikes != max_strikes {
            return Err(BuybackError::StrikesNotAtLimit {
                player_id,
                strikes: evaluation.strikes,
                max_strikes,
            });
        }

        let report = self.store_decision(player_id, accepted, fee_paid).await?;
        log::warn!(
            "Buyback decision of player {} ({}) overridden: {:?} -> {}",
            player_id,
            player.name,
            player.has_bought_back,
            accepted
        );
        Ok(report)
    }
}
