use std::sync::Arc;

use survivor_core::Standing;

use crate::domain::{
    PlayerId, RepoCreateError, RepoRetrieveError, RepoUpdateError, SeasonYear,
    pick::PickRepository,
    player::{NewPlayer, Player, PlayerRepository},
    settings::PoolSettingsRepository,
    standing::evaluate,
};

/// A leaderboard row. Strikes and standing come from the picks, not from the
/// stored columns.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlayerStanding {
    pub player: Player,
    pub strikes: u32,
    pub standing: Standing,
}

#[derive(Debug, thiserror::Error)]
pub enum RegisterPlayerError {
    #[error("player name must not be empty")]
    EmptyName,
    #[error("season {0} has no pool settings")]
    SeasonNotConfigured(SeasonYear),
    #[error("a player named {0} already exists this season")]
    NameTaken(String),
    #[error("player {0} does not exist")]
    PlayerNotFound(PlayerId),
    #[error("player {0} has not bought back")]
    NoBuyback(PlayerId),
    #[error("storage error: {0}")]
    Storage(String),
}

#[async_trait::async_trait]
pub trait PlayerAdminUseCase {
    async fn register_player(
        &self,
        season_year: SeasonYear,
        name: &str,
        entry_fee_paid: bool,
    ) -> Result<PlayerId, RegisterPlayerError>;
    async fn set_entry_fee_paid(
        &self,
        player_id: PlayerId,
        paid: bool,
    ) -> Result<(), RegisterPlayerError>;
    /// Records payment of the buyback fee after the decision was stored.
    async fn set_buyback_fee_paid(
        &self,
        player_id: PlayerId,
        paid: bool,
    ) -> Result<(), RegisterPlayerError>;
    /// The season's players ordered by strikes, then name.
    async fn list_players(
        &self,
        season_year: SeasonYear,
    ) -> Result<Vec<PlayerStanding>, RegisterPlayerError>;
}

pub struct PlayerAdminUseCaseImpl<P: PlayerRepository, K: PickRepository, S: PoolSettingsRepository> {
    player_repository: Arc<P>,
    pick_repository: Arc<K>,
    settings_repository: Arc<S>,
}

impl<P: PlayerRepository, K: PickRepository, S: PoolSettingsRepository> PlayerAdminUseCaseImpl<P, K, S> {
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

fn update_error(player_id: PlayerId, e: RepoUpdateError) -> RegisterPlayerError {
    match e {
        RepoUpdateError::NotFound => RegisterPlayerError::PlayerNotFound(player_id),
        RepoUpdateError::Conflict => RegisterPlayerError::Storage("unexpected conflict".to_string()),
        RepoUpdateError::StorageError(e) => RegisterPlayerError::Storage(e),
    }
}

#[async_trait::async_trait]
impl<
    P: PlayerRepository + Send + Sync + 'static,
    K: PickRepository + Send + Sync + 'static,
    S: PoolSettingsRepository + Send + Sync + 'static,
> PlayerAdminUseCase for PlayerAdminUseCaseImpl<P, K, S>
{
    async fn register_player(
        &self,
        season_year: SeasonYear,
        name: &str,
        entry_fee_paid: bool,
    ) -> Result<PlayerId, RegisterPlayerError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(RegisterPlayerError::EmptyName);
        }
        match self.settings_repository.get_settings(season_year).await {
            Ok(_) => {}
            Err(RepoRetrieveError::NotFound) => {
                return Err(RegisterPlayerError::SeasonNotConfigured(season_year));
            }
            Err(RepoRetrieveError::StorageError(e)) => return Err(RegisterPlayerError::Storage(e)),
        }

        let player_id = self
            .player_repository
            .create_player(NewPlayer {
                season_year,
                name: name.to_string(),
                entry_fee_paid,
            })
            .await
            .map_err(|e| match e {
                RepoCreateError::Conflict => RegisterPlayerError::NameTaken(name.to_string()),
                RepoCreateError::StorageError(e) => RegisterPlayerError::Storage(e),
            })?;
        log::info!("Registered player {} ({}) for {}", player_id, name, season_year);
        Ok(player_id)
    }

    async fn set_entry_fee_paid(
        &self,
        player_id: PlayerId,
        paid: bool,
    ) -> Result<(), RegisterPlayerError> {
        self.player_repository
            .set_entry_fee_paid(player_id, paid)
            .await
            .map_err(|e| update_error(player_id, e))
    }

    async fn set_buyback_fee_paid(
        &self,
        player_id: PlayerId,
        paid: bool,
    ) -> Result<(), RegisterPlayerError> {
        let player = self
            .player_repository
            .get_player(player_id)
            .await
            .map_err(|e| match e {
                RepoRetrieveError::NotFound => RegisterPlayerError::PlayerNotFound(player_id),
                RepoRetrieveError::StorageError(e) => RegisterPlayerError::Storage(e),
            })?;
        if paid && player.has_bought_back != Some(true) {
            return Err(RegisterPlayerError::NoBuyback(player_id));
        }
        self.player_repository
            .set_buyback_fee_paid(player_id, paid)
            .await
            .map_err(|e| update_error(player_id, e))?;
        log::info!(
            "Player {} ({}) buyback fee paid: {}",
            player_id,
            player.name,
            paid
        );
        Ok(())
    }

    async fn list_players(
        &self,
        season_year: SeasonYear,
    ) -> Result<Vec<PlayerStanding>, RegisterPlayerError> {
        let settings = match self.settings_repository.get_settings(season_year).await {
            Ok(settings) => settings,
            Err(RepoRetrieveError::NotFound) => {
                return Err(RegisterPlayerError::SeasonNotConfigured(season_year));
            }
            Err(RepoRetrieveError::StorageError(e)) => return Err(RegisterPlayerError::Storage(e)),
        };
        let players = self
            .player_repository
            .list_players(season_year)
            .await
            .map_err(|e| RegisterPlayerError::Storage(e.to_string()))?;
        let picks = self
            .pick_repository
            .list_picks(Some(season_year))
            .await
            .map_err(|e| RegisterPlayerError::Storage(e.to_string()))?;

        let mut standings: Vec<PlayerStanding> = players
            .into_iter()
            .map(|player| {
                let evaluation = evaluate(&player, &picks, settings.max_strikes);
                PlayerStanding {
                    player,
                    strikes: evaluation.strikes,
                    standing: evaluation.standing,
                }
            })
            .collect();
        standings.sort_by(|a, b| {
            a.strikes
                .cmp(&b.strikes)
                .then_with(|| a.player.name.cmp(&b.player.name))
        });
        Ok(standings)
    }
}
