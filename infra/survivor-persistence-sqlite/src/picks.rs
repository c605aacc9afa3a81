use sqlx::{Pool, Row, Sqlite, sqlite::SqliteRow};
use survivor_core::is_strike;
use survivor_pool_app::domain::{
    PickId, PlayerId, RepoError, RepoRetrieveError, RepoUpdateError, SeasonYear, TeamId, WeekId,
    pick::{NewPick, Pick, PickRepository, PickWriteError},
};

pub struct SqlitePickRepository {
    pool: Pool<Sqlite>,
}

impl SqlitePickRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    fn pick_from_row(row: &SqliteRow) -> sqlx::Result<Pick> {
        Ok(Pick {
            id: PickId(row.try_get("id")?),
            player_id: PlayerId(row.try_get("player_id")?),
            week_id: WeekId(row.try_get("week_id")?),
            team_id: TeamId(row.try_get("team_id")?),
            team_won: row.try_get("team_won")?,
            is_strike: row.try_get("is_strike")?,
        })
    }

    fn picks_from_rows(rows: &[SqliteRow]) -> Result<Vec<Pick>, RepoError> {
        rows.iter()
            .map(Self::pick_from_row)
            .collect::<sqlx::Result<Vec<_>>>()
            .map_err(|e| RepoError::StorageError(e.to_string()))
    }
}

/// Maps the violated uniqueness rule of the picks table to its domain error.
fn write_error(e: sqlx::Error) -> PickWriteError {
    if let sqlx::Error::Database(db) = &e {
        if db.is_unique_violation() {
            if db.message().contains("picks.team_id") {
                return PickWriteError::TeamAlreadyUsed;
            }
            if db.message().contains("picks.week_id") {
                return PickWriteError::WeekAlreadyPicked;
            }
        }
    }
    PickWriteError::StorageError(e.to_string())
}

#[async_trait::async_trait]
impl PickRepository for SqlitePickRepository {
    async fn create_pick(&self, pick: NewPick) -> Result<PickId, PickWriteError> {
        let result = sqlx::query("INSERT INTO picks (player_id, week_id, team_id) VALUES (?, ?, ?)")
            .bind(pick.player_id.0)
            .bind(pick.week_id.0)
            .bind(pick.team_id.0)
            .execute(&self.pool)
            .await
            .map_err(write_error)?;
        Ok(PickId(result.last_insert_rowid()))
    }

    async fn get_pick(&self, id: PickId) -> Result<Pick, RepoRetrieveError> {
        let row = sqlx::query("SELECT * FROM picks WHERE id = ?")
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepoRetrieveError::StorageError(e.to_string()))?
            .ok_or(RepoRetrieveError::NotFound)?;
        Self::pick_from_row(&row).map_err(|e| RepoRetrieveError::StorageError(e.to_string()))
    }

    async fn change_pick_team(&self, id: PickId, team_id: TeamId) -> Result<(), PickWriteError> {
        let result = sqlx::query(
            "UPDATE picks SET team_id = ?, team_won = NULL, is_strike = 0 WHERE id = ?",
        )
        .bind(team_id.0)
        .bind(id.0)
        .execute(&self.pool)
        .await
        .map_err(write_error)?;
        if result.rows_affected() == 0 {
            return Err(PickWriteError::NotFound);
        }
        Ok(())
    }

    async fn list_picks(&self, season_year: Option<SeasonYear>) -> Result<Vec<Pick>, RepoError> {
        let rows = sqlx::query(
            "SELECT picks.* FROM picks JOIN weeks ON weeks.id = picks.week_id
             WHERE ? IS NULL OR weeks.season_year = ?
             ORDER BY picks.id",
        )
        .bind(season_year)
        .bind(season_year)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepoError::StorageError(e.to_string()))?;
        Self::picks_from_rows(&rows)
    }

    async fn list_player_picks(&self, player_id: PlayerId) -> Result<Vec<Pick>, RepoError> {
        let rows = sqlx::query("SELECT * FROM picks WHERE player_id = ? ORDER BY id")
            .bind(player_id.0)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| RepoError::StorageError(e.to_string()))?;
        Self::picks_from_rows(&rows)
    }

    async fn list_week_picks(&self, week_id: WeekId) -> Result<Vec<Pick>, RepoError> {
        let rows = sqlx::query("SELECT * FROM picks WHERE week_id = ? ORDER BY id")
            .bind(week_id.0)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| RepoError::StorageError(e.to_string()))?;
        Self::picks_from_rows(&rows)
    }

    async fn delete_pick(&self, id: PickId) -> Result<(), RepoUpdateError> {
        let result = sqlx::query("DELETE FROM picks WHERE id = ?")
            .bind(id.0)
            .execute(&self.pool)
            .await
            .map_err(|e| RepoUpdateError::StorageError(e.to_string()))?;
        if result.rows_affected() == 0 {
            return Err(RepoUpdateError::NotFound);
        }
        Ok(())
    }

    async fn set_pick_result(
        &self,
        id: PickId,
        team_won: Option<bool>,
    ) -> Result<(), RepoUpdateError> {
        let result = sqlx::query("UPDATE picks SET team_won = ?, is_strike = ? WHERE id = ?")
            .bind(team_won)
            .bind(is_strike(team_won))
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
