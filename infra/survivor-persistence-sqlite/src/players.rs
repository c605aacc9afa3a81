use sqlx::{Pool, Row, Sqlite, sqlite::SqliteRow};
use survivor_pool_app::domain::{
    PlayerId, RepoCreateError, RepoError, RepoRetrieveError, RepoUpdateError, SeasonYear,
    player::{NewPlayer, Player, PlayerRepository, PlayerState},
};

use crate::is_unique_violation;

pub struct SqlitePlayerRepository {
    pool: Pool<Sqlite>,
}

impl SqlitePlayerRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    fn player_from_row(row: &SqliteRow) -> sqlx::Result<Player> {
        Ok(Player {
            id: PlayerId(row.try_get("id")?),
            season_year: row.try_get("season_year")?,
            name: row.try_get("name")?,
            strikes: row.try_get("strikes")?,
            is_active: row.try_get("is_active")?,
            is_eliminated: row.try_get("is_eliminated")?,
            has_bought_back: row.try_get("has_bought_back")?,
            entry_fee_paid: row.try_get("entry_fee_paid")?,
            buyback_fee_paid: row.try_get("buyback_fee_paid")?,
        })
    }

    async fn update(&self, query: &str, id: PlayerId, binds: &[bool]) -> Result<(), RepoUpdateError> {
        let mut query = sqlx::query(query);
        for value in binds {
            query = query.bind(*value);
        }
        let result = query
            .bind(id.0)
            .execute(&self.pool)
            .await
            .map_err(|e| RepoUpdateError::StorageError(e.to_string()))?;
        if result.rows_affected() == 0 {
            return Err(RepoUpdateError::NotFound);
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl PlayerRepository for SqlitePlayerRepository {
    async fn create_player(&self, player: NewPlayer) -> Result<PlayerId, RepoCreateError> {
        let result = sqlx::query(
            "INSERT INTO players (season_year, name, entry_fee_paid) VALUES (?, ?, ?)",
        )
        .bind(player.season_year)
        .bind(&player.name)
        .bind(player.entry_fee_paid)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                RepoCreateError::Conflict
            } else {
                RepoCreateError::StorageError(e.to_string())
            }
        })?;
        Ok(PlayerId(result.last_insert_rowid()))
    }

    async fn get_player(&self, id: PlayerId) -> Result<Player, RepoRetrieveError> {
        let row = sqlx::query("SELECT * FROM players WHERE id = ?")
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepoRetrieveError::StorageError(e.to_string()))?
            .ok_or(RepoRetrieveError::NotFound)?;
        Self::player_from_row(&row).map_err(|e| RepoRetrieveError::StorageError(e.to_string()))
    }

    async fn list_players(&self, season_year: SeasonYear) -> Result<Vec<Player>, RepoError> {
        let rows = sqlx::query("SELECT * FROM players WHERE season_year = ? ORDER BY id")
            .bind(season_year)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| RepoError::StorageError(e.to_string()))?;
        rows.iter()
            .map(Self::player_from_row)
            .collect::<sqlx::Result<Vec<_>>>()
            .map_err(|e| RepoError::StorageError(e.to_string()))
    }

    async fn save_player_state(
        &self,
        id: PlayerId,
        state: PlayerState,
    ) -> Result<(), RepoUpdateError> {
        let result = sqlx::query(
            "UPDATE players SET strikes = ?, is_active = ?, is_eliminated = ? WHERE id = ?",
        )
        .bind(state.strikes)
        .bind(state.is_active)
        .bind(state.is_eliminated)
        .bind(id.0)
        .execute(&self.pool)
        .await
        .map_err(|e| RepoUpdateError::StorageError(e.to_string()))?;
        if result.rows_affected() == 0 {
            return Err(RepoUpdateError::NotFound);
        }
        Ok(())
    }

    async fn set_buyback(
        &self,
        id: PlayerId,
        bought_back: bool,
        fee_paid: bool,
    ) -> Result<(), RepoUpdateError> {
        self.update(
            "UPDATE players SET has_bought_back = ?, buyback_fee_paid = ? WHERE id = ?",
            id,
            &[bought_back, fee_paid],
        )
        .await
    }

    async fn set_entry_fee_paid(&self, id: PlayerId, paid: bool) -> Result<(), RepoUpdateError> {
        self.update("UPDATE players SET entry_fee_paid = ? WHERE id = ?", id, &[paid])
            .await
    }

    async fn set_buyback_fee_paid(&self, id: PlayerId, paid: bool) -> Result<(), RepoUpdateError> {
        self.update("UPDATE players SET buyback_fee_paid = ? WHERE id = ?", id, &[paid])
            .await
    }
}
