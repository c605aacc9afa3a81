use rust_decimal::{Decimal, prelude::ToPrimitive};
use sqlx::{Pool, Row, Sqlite, sqlite::SqliteRow};
use survivor_core::Fees;
use survivor_pool_app::domain::{
    RepoError, RepoRetrieveError, SeasonYear,
    settings::{PoolSettings, PoolSettingsRepository},
};

/// Fees are stored as whole cents.
pub struct SqlitePoolSettingsRepository {
    pool: Pool<Sqlite>,
}

impl SqlitePoolSettingsRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    fn settings_from_row(row: &SqliteRow) -> sqlx::Result<PoolSettings> {
        Ok(PoolSettings {
            season_year: row.try_get("season_year")?,
            max_strikes: row.try_get("max_strikes")?,
            fees: Fees {
                entry_fee: Decimal::new(row.try_get("entry_fee_cents")?, 2),
                buyback_fee: Decimal::new(row.try_get("buyback_fee_cents")?, 2),
            },
        })
    }
}

fn to_cents(amount: Decimal) -> Result<i64, RepoError> {
    amount
        .checked_mul(Decimal::ONE_HUNDRED)
        .and_then(|cents| cents.round().to_i64())
        .ok_or_else(|| RepoError::StorageError(format!("fee {} is out of range", amount)))
}

#[async_trait::async_trait]
impl PoolSettingsRepository for SqlitePoolSettingsRepository {
    async fn get_settings(
        &self,
        season_year: SeasonYear,
    ) -> Result<PoolSettings, RepoRetrieveError> {
        let row = sqlx::query("SELECT * FROM pool_settings WHERE season_year = ?")
            .bind(season_year)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepoRetrieveError::StorageError(e.to_string()))?
            .ok_or(RepoRetrieveError::NotFound)?;
        Self::settings_from_row(&row).map_err(|e| RepoRetrieveError::StorageError(e.to_string()))
    }

    async fn save_settings(&self, settings: &PoolSettings) -> Result<(), RepoError> {
        sqlx::query(
            "INSERT INTO pool_settings (season_year, max_strikes, entry_fee_cents, buyback_fee_cents)
             VALUES (?, ?, ?, ?)
             ON CONFLICT (season_year) DO UPDATE SET
                max_strikes = excluded.max_strikes,
                entry_fee_cents = excluded.entry_fee_cents,
                buyback_fee_cents = excluded.buyback_fee_cents",
        )
        .bind(settings.season_year)
        .bind(settings.max_strikes)
        .bind(to_cents(settings.fees.entry_fee)?)
        .bind(to_cents(settings.fees.buyback_fee)?)
        .execute(&self.pool)
        .await
        .map_err(|e| RepoError::StorageError(e.to_string()))?;
        Ok(())
    }
}
