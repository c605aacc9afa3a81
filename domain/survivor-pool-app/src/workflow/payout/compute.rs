use std::sync::Arc;

use survivor_core::{Fees, Payout, Standing, compute_payout};

use crate::{
    domain::{
        PlayerId, SeasonYear,
        pick::PickRepository,
        player::PlayerRepository,
        settings::PoolSettingsRepository,
        standing::{entrant, evaluate},
    },
    workflow::standings::recompute::{StandingsError, settings_error},
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PayoutLine {
    pub player_id: PlayerId,
    pub name: String,
    pub strikes: u32,
    pub standing: Standing,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PayoutReport {
    pub season_year: SeasonYear,
    pub fees: Fees,
    pub payout: Payout<PlayerId>,
    pub players: Vec<PayoutLine>,
    /// Players still waiting for a buyback decision. They count as survivors
    /// until the decision is recorded.
    pub undecided_buybacks: Vec<PlayerId>,
}

impl PayoutReport {
    pub fn name_of(&self, player_id: PlayerId) -> &str {
        self.players
            .iter()
            .find(|line| line.player_id == player_id)
            .map(|line| line.name.as_str())
            .unwrap_or("?")
    }
}

pub type PayoutError = StandingsError;

#[async_trait::async_trait]
pub trait PayoutUseCase {
    async fn compute_payout(&self, season_year: SeasonYear) -> Result<PayoutReport, PayoutError>;
}

pub struct PayoutUseCaseImpl<P: PlayerRepository, K: PickRepository, S: PoolSettingsRepository> {
    player_repository: Arc<P>,
    pick_repository: Arc<K>,
    settings_repository: Arc<S>,
}

impl<P: PlayerRepository, K: PickRepository, S: PoolSettingsRepository> PayoutUseCaseImpl<P, K, S> {
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

#[async_trait::async_trait]
impl<
    P: PlayerRepository + Send + Sync + 'static,
    K: PickRepository + Send + Sync + 'static,
    S: PoolSettingsRepository + Send + Sync + 'static,
> PayoutUseCase for PayoutUseCaseImpl<P, K, S>
{
    async fn compute_payout(&self, season_year: SeasonYear) -> Result<PayoutReport, PayoutError> {
        let settings = self
            .settings_repository
            .get_settings(season_year)
            .await
            .map_err(|e| settings_error(season_year, e))?;
        let players = self
            .player_repository
            .list_players(season_year)
            .await
            .map_err(|e| StandingsError::Storage(e.to_string()))?;
        let picks = self
            .pick_repository
            .list_picks(Some(season_year))
            .await
            .map_err(|e| StandingsError::Storage(e.to_string()))?;

        let mut entrants = Vec::with_capacity(players.len());
        let mut lines = Vec::with_capacity(players.len());
        for player in &players {
            let evaluation = evaluate(player, &picks, settings.max_strikes);
            entrants.push(entrant(player, &evaluation));
            lines.push(PayoutLine {
                player_id: player.id,
                name: player.name.clone(),
                strikes: evaluation.strikes,
                standing: evaluation.standing,
            });
        }

        let undecided_buybacks: Vec<PlayerId> = lines
            .iter()
            .filter(|line| line.standing == Standing::BuybackPending)
            .map(|line| line.player_id)
            .collect();
        if !undecided_buybacks.is_empty() {
            log::warn!(
                "{} players of season {} still await a buyback decision",
                undecided_buybacks.len(),
                season_year
            );
        }

        let payout = compute_payout(&entrants, &settings.fees);
        log::info!("Payout for season {}: pot {}", season_year, payout.pot);
        Ok(PayoutReport {
            season_year,
            fees: settings.fees,
            payout,
            players: lines,
            undecided_buybacks,
        })
    }
}
