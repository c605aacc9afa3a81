use survivor_core::BuybackDecision;

use crate::domain::{
    PlayerId, RepoCreateError, RepoError, RepoRetrieveError, RepoUpdateError, SeasonYear,
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Player {
    pub id: PlayerId,
    pub season_year: SeasonYear,
    pub name: String,
    pub strikes: u32,
    pub is_active: bool,
    pub is_eliminated: bool,
    pub has_bought_back: Option<bool>,
    pub entry_fee_paid: bool,
    pub buyback_fee_paid: bool,
}

impl Player {
    pub fn buyback_decision(&self) -> BuybackDecision {
        BuybackDecision::from_flag(self.has_bought_back)
    }

    pub fn state(&self) -> PlayerState {
        PlayerState {
            strikes: self.strikes,
            is_active: self.is_active,
            is_eliminated: self.is_eliminated,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewPlayer {
    pub season_year: SeasonYear,
    pub name: String,
    pub entry_fee_paid: bool,
}

/// The derived aggregate columns of a player.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlayerState {
    pub strikes: u32,
    pub is_active: bool,
    pub is_eliminated: bool,
}

#[async_trait::async_trait]
pub trait PlayerRepository {
    /// Fails with a conflict when the season already has a player with that name.
    async fn create_player(&self, player: NewPlayer) -> Result<PlayerId, RepoCreateError>;
    async fn get_player(&self, id: PlayerId) -> Result<Player, RepoRetrieveError>;
    async fn list_players(&self, season_year: SeasonYear) -> Result<Vec<Player>, RepoError>;
    async fn save_player_state(
        &self,
        id: PlayerId,
        state: PlayerState,
    ) -> Result<(), RepoUpdateError>;
    async fn set_buyback(
        &self,
        id: PlayerId,
        bought_back: bool,
        fee_paid: bool,
    ) -> Result<(), RepoUpdateError>;
    async fn set_entry_fee_paid(&self, id: PlayerId, paid: bool) -> Result<(), RepoUpdateError>;
    async fn set_buyback_fee_paid(&self, id: PlayerId, paid: bool) -> Result<(), RepoUpdateError>;
}
