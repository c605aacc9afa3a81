use rust_decimal::Decimal;
use survivor_core::{Fees, SettingsError};

use crate::domain::{RepoError, RepoRetrieveError, SeasonYear};

pub const DEFAULT_MAX_STRIKES: u32 = 2;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PoolSettings {
    pub season_year: SeasonYear,
    pub max_strikes: u32,
    pub fees: Fees,
}

impl PoolSettings {
    pub fn new(
        season_year: SeasonYear,
        max_strikes: u32,
        entry_fee: Decimal,
        buyback_fee: Decimal,
    ) -> Result<Self, SettingsError> {
        if max_strikes < 1 {
            return Err(SettingsError::MaxStrikesTooLow);
        }
        Ok(Self {
            season_year,
            max_strikes,
            fees: Fees::new(entry_fee, buyback_fee)?,
        })
    }

    /// Two strikes, a $30 entry and a $20 buyback.
    pub fn standard(season_year: SeasonYear) -> Self {
        Self {
            season_year,
            max_strikes: DEFAULT_MAX_STRIKES,
            fees: Fees {
                entry_fee: Decimal::new(30, 0),
                buyback_fee: Decimal::new(20, 0),
            },
        }
    }
}

#[async_trait::async_trait]
pub trait PoolSettingsRepository {
    async fn get_settings(&self, season_year: SeasonYear) -> Result<PoolSettings, RepoRetrieveError>;
    async fn save_settings(&self, settings: &PoolSettings) -> Result<(), RepoError>;
}
