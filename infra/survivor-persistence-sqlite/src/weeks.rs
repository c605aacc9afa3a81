use sqlx::{Pool, Row, Sqlite, sqlite::SqliteRow};
use survivor_pool_app::domain::{
    RepoCreateError, RepoError, RepoRetrieveError, RepoUpdateError, SeasonYear, WeekId,
    week::{NewWeek, Week, WeekRepository},
};

use crate::is_unique_violation;

pub struct SqliteWeekRepository {
    pool: Pool<Sqlite>,
}

impl SqliteWeekRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    fn week_from_row(row: &SqliteRow) -> sqlx::Result<Week> {
        Ok(Week {
            id: WeekId(row.try_get("id")?),
            season_year: row.try_get("season_year")?,
            week_number: row.try_get("week_number")?,
            start_date: row.try_get("start_date")?,
            end_date: row.try_get("end_date")?,
            is_complete: row.try_get("is_complete")?,
        })
    }

    fn found_week(row: Option<SqliteRow>) -> Result<Week, RepoRetrieveError> {
        let row = row.ok_or(RepoRetrieveError::NotFound)?;
        Self::week_from_row(&row).map_err(|e| RepoRetrieveError::StorageError(e.to_string()))
    }
}

#[async_trait::async_trait]
impl WeekRepository for SqliteWeekRepository {
    async fn create_week(&self, week: NewWeek) -> Result<WeekId, RepoCreateError> {
        let result = sqlx::query(
            "INSERT INTO weeks (season_year, week_number, start_date, end_date) VALUES (?, ?, ?, ?)",
        )
        .bind(week.season_year)
        .bind(week.week_number)
        .bind(week.start_date)
        .bind(week.end_date)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                RepoCreateError::Conflict
            } else {
                RepoCreateError::StorageError(e.to_string())
            }
        })?;
        Ok(WeekId(result.last_insert_rowid()))
    }

    async fn get_week(&self, id: WeekId) -> Result<Week, RepoRetrieveError> {
        let row = sqlx::query("SELECT * FROM weeks WHERE id = ?")
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepoRetrieveError::StorageError(e.to_string()))?;
        Self::found_week(row)
    }

    async fn find_week(
        &self,
        season_year: SeasonYear,
        week_number: u32,
    ) -> Result<Week, RepoRetrieveError> {
        let row = sqlx::query("SELECT * FROM weeks WHERE season_year = ? AND week_number = ?")
            .bind(season_year)
            .bind(week_number)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepoRetrieveError::StorageError(e.to_string()))?;
        Self::found_week(row)
    }

    async fn list_weeks(&self, season_year: SeasonYear) -> Result<Vec<Week>, RepoError> {
        let rows = sqlx::query("SELECT * FROM weeks WHERE season_year = ? ORDER BY week_number")
            .bind(season_year)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| RepoError::StorageError(e.to_string()))?;
        rows.iter()
            .map(Self::week_from_row)
            .collect::<sqlx::Result<Vec<_>>>()
            .map_err(|e| RepoError::StorageError(e.to_string()))
    }

    async fn set_week_complete(&self, id: WeekId, complete: bool) -> Result<(), RepoUpdateError> {
        let result = sqlx::query("UPDATE weeks SET is_complete = ? WHERE id = ?")
            .bind(complete)
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
