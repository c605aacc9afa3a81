use sqlx::{Pool, Row, Sqlite, sqlite::SqliteRow};
use survivor_core::GameStatus;
use survivor_pool_app::domain::{
    GameId, RepoError, SeasonYear, TeamId, WeekId,
    game::{Game, GameRepository, GameUpsert, RepoUpsertError, UpsertOutcome},
};

use crate::is_unique_violation;

pub struct SqliteGameRepository {
    pool: Pool<Sqlite>,
}

impl SqliteGameRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    fn game_from_row(row: &SqliteRow) -> sqlx::Result<Game> {
        let status: String = row.try_get("status")?;
        let status = GameStatus::parse(&status)
            .ok_or_else(|| sqlx::Error::Decode(format!("unknown game status {}", status).into()))?;
        Ok(Game {
            id: GameId(row.try_get("id")?),
            external_id: row.try_get("external_id")?,
            week_id: WeekId(row.try_get("week_id")?),
            home_team_id: TeamId(row.try_get("home_team_id")?),
            away_team_id: TeamId(row.try_get("away_team_id")?),
            status,
            home_score: row.try_get("home_score")?,
            away_score: row.try_get("away_score")?,
            home_won: row.try_get("home_won")?,
            away_won: row.try_get("away_won")?,
            kickoff: row.try_get("kickoff")?,
        })
    }

    fn games_from_rows(rows: &[SqliteRow]) -> Result<Vec<Game>, RepoError> {
        rows.iter()
            .map(Self::game_from_row)
            .collect::<sqlx::Result<Vec<_>>>()
            .map_err(|e| RepoError::StorageError(e.to_string()))
    }
}

fn storage_error(e: sqlx::Error) -> RepoUpsertError {
    RepoUpsertError::StorageError(e.to_string())
}

#[async_trait::async_trait]
impl GameRepository for SqliteGameRepository {
    async fn upsert_game(
        &self,
        game: GameUpsert,
    ) -> Result<(GameId, UpsertOutcome), RepoUpsertError> {
        let mut tx = self.pool.begin().await.map_err(storage_error)?;

        let clashing: Option<String> = sqlx::query_scalar(
            "SELECT external_id FROM games
             WHERE week_id = ? AND external_id <> ?
               AND (home_team_id IN (?, ?) OR away_team_id IN (?, ?))
             LIMIT 1",
        )
        .bind(game.week_id.0)
        .bind(&game.external_id)
        .bind(game.home_team_id.0)
        .bind(game.away_team_id.0)
        .bind(game.home_team_id.0)
        .bind(game.away_team_id.0)
        .fetch_optional(&mut *tx)
        .await
        .map_err(storage_error)?;
        if let Some(clashing) = clashing {
            return Err(RepoUpsertError::Conflict(format!(
                "a team of game {} already plays game {} in week {}",
                game.external_id, clashing, game.week_id
            )));
        }

        let existing = sqlx::query("SELECT * FROM games WHERE external_id = ?")
            .bind(&game.external_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(storage_error)?
            .map(|row| Self::game_from_row(&row))
            .transpose()
            .map_err(storage_error)?;

        let outcome = match existing {
            Some(existing) if !game.differs_from(&existing) => {
                return Ok((existing.id, UpsertOutcome::Unchanged));
            }
            Some(existing) => {
                sqlx::query(
                    "UPDATE games SET week_id = ?, home_team_id = ?, away_team_id = ?, status = ?,
                     home_score = ?, away_score = ?, home_won = ?, away_won = ?,
                     kickoff = COALESCE(?, kickoff)
                     WHERE id = ?",
                )
                .bind(game.week_id.0)
                .bind(game.home_team_id.0)
                .bind(game.away_team_id.0)
                .bind(game.score.status.as_str())
                .bind(game.score.home_score)
                .bind(game.score.away_score)
                .bind(game.score.home_won)
                .bind(game.score.away_won)
                .bind(game.kickoff)
                .bind(existing.id.0)
                .execute(&mut *tx)
                .await
                .map_err(storage_error)?;
                (existing.id, UpsertOutcome::Updated)
            }
            None => {
                let result = sqlx::query(
                    "INSERT INTO games (external_id, week_id, home_team_id, away_team_id, status,
                     home_score, away_score, home_won, away_won, kickoff)
                     VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
                )
                .bind(&game.external_id)
                .bind(game.week_id.0)
                .bind(game.home_team_id.0)
                .bind(game.away_team_id.0)
                .bind(game.score.status.as_str())
                .bind(game.score.home_score)
                .bind(game.score.away_score)
                .bind(game.score.home_won)
                .bind(game.score.away_won)
                .bind(game.kickoff)
                .execute(&mut *tx)
                .await
                .map_err(|e| {
                    if is_unique_violation(&e) {
                        RepoUpsertError::Conflict(format!(
                            "game {} was stored concurrently",
                            game.external_id
                        ))
                    } else {
                        storage_error(e)
                    }
                })?;
                (GameId(result.last_insert_rowid()), UpsertOutcome::Created)
            }
        };

        tx.commit().await.map_err(storage_error)?;
        Ok(outcome)
    }

    async fn list_games_for_week(&self, week_id: WeekId) -> Result<Vec<Game>, RepoError> {
        let rows = sqlx::query("SELECT * FROM games WHERE week_id = ? ORDER BY id")
            .bind(week_id.0)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| RepoError::StorageError(e.to_string()))?;
        Self::games_from_rows(&rows)
    }

    async fn list_final_games(
        &self,
        season_year: Option<SeasonYear>,
    ) -> Result<Vec<Game>, RepoError> {
        let rows = sqlx::query(
            "SELECT games.* FROM games JOIN weeks ON weeks.id = games.week_id
             WHERE games.status = ? AND (? IS NULL OR weeks.season_year = ?)
             ORDER BY games.id",
        )
        .bind(GameStatus::Final.as_str())
        .bind(season_year)
        .bind(season_year)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepoError::StorageError(e.to_string()))?;
        Self::games_from_rows(&rows)
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use survivor_core::SettledScore;
    use survivor_pool_app::domain::week::{NewWeek, WeekRepository};

    use crate::{test_db, weeks::SqliteWeekRepository};

    use super::*;

    async fn week(pool: &Pool<Sqlite>, season_year: SeasonYear, week_number: u32) -> WeekId {
        let start = NaiveDate::from_ymd_opt(season_year, 9, 5).unwrap();
        SqliteWeekRepository::new(pool.clone())
            .create_week(NewWeek {
                season_year,
                week_number,
                start_date: start,
                end_date: start,
            })
            .await
            .unwrap()
    }

    fn upsert(external_id: &str, week_id: WeekId, home: i64, away: i64, score: SettledScore) -> GameUpsert {
        GameUpsert {
            external_id: external_id.to_string(),
            week_id,
            home_team_id: TeamId(home),
            away_team_id: TeamId(away),
            score,
            kickoff: None,
        }
    }

    fn scheduled() -> SettledScore {
        SettledScore {
            status: GameStatus::Scheduled,
            home_score: None,
            away_score: None,
            home_won: None,
            away_won: None,
        }
    }

    fn home_win(home_score: u32, away_score: u32) -> SettledScore {
        SettledScore {
            status: GameStatus::Final,
            home_score: Some(home_score),
            away_score: Some(away_score),
            home_won: Some(true),
            away_won: Some(false),
        }
    }

    #[tokio::test]
    async fn test_upsert_creates_updates_and_skips() {
        let pool = test_db::pool().await;
        let repo = SqliteGameRepository::new(pool.clone());
        let week_id = week(&pool, 2024, 1).await;
        let kc = test_db::team_id(&pool, "KC").await;
        let buf = test_db::team_id(&pool, "BUF").await;

        let (id, outcome) = repo.upsert_game(upsert("g1", week_id, kc, buf, scheduled())).await.unwrap();
        assert_eq!(outcome, UpsertOutcome::Created);
        assert!(repo.list_final_games(Some(2024)).await.unwrap().is_empty());

        let (same_id, outcome) = repo
            .upsert_game(upsert("g1", week_id, kc, buf, home_win(27, 20)))
            .await
            .unwrap();
        assert_eq!((same_id, outcome), (id, UpsertOutcome::Updated));

        let (_, outcome) = repo
            .upsert_game(upsert("g1", week_id, kc, buf, home_win(27, 20)))
            .await
            .unwrap();
        assert_eq!(outcome, UpsertOutcome::Unchanged);

        let finals = repo.list_final_games(Some(2024)).await.unwrap();
        assert_eq!(finals.len(), 1);
        assert_eq!(finals[0].home_score, Some(27));
        assert_eq!(finals[0].home_won, Some(true));
        assert!(repo.list_final_games(Some(2023)).await.unwrap().is_empty());
        assert_eq!(repo.list_final_games(None).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_team_cannot_play_twice_in_a_week() {
        let pool = test_db::pool().await;
        let repo = SqliteGameRepository::new(pool.clone());
        let week_id = week(&pool, 2024, 1).await;
        let kc = test_db::team_id(&pool, "KC").await;
        let buf = test_db::team_id(&pool, "BUF").await;
        let sf = test_db::team_id(&pool, "SF").await;

        repo.upsert_game(upsert("g1", week_id, kc, buf, scheduled())).await.unwrap();
        assert!(matches!(
            repo.upsert_game(upsert("g2", week_id, sf, kc, scheduled())).await,
            Err(RepoUpsertError::Conflict(_))
        ));
        assert_eq!(repo.list_games_for_week(week_id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_schema_rejects_contradictory_games() {
        let pool = test_db::pool().await;
        let repo = SqliteGameRepository::new(pool.clone());
        let week_id = week(&pool, 2024, 1).await;
        let kc = test_db::team_id(&pool, "KC").await;
        let buf = test_db::team_id(&pool, "BUF").await;

        let mut both_won = home_win(20, 20);
        both_won.away_won = Some(true);
        assert!(matches!(
            repo.upsert_game(upsert("g1", week_id, kc, buf, both_won)).await,
            Err(RepoUpsertError::StorageError(_))
        ));
        assert!(matches!(
            repo.upsert_game(upsert("g2", week_id, kc, kc, scheduled())).await,
            Err(RepoUpsertError::StorageError(_))
        ));
        assert!(repo.list_games_for_week(week_id).await.unwrap().is_empty());
    }
}
