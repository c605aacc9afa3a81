use std::time::Duration;

use sqlx::{Pool, Row, Sqlite, sqlite::SqliteRow};
use survivor_pool_app::domain::{
    RepoCreateError, RepoError, RepoUpdateError, TeamId,
    team::{Team, TeamAlias, TeamRepository, normalize_abbreviation},
};

use crate::is_unique_violation;

pub const NFL_TEAMS: [(&str, &str); 32] = [
    ("ARI", "Arizona Cardinals"),
    ("ATL", "Atlanta Falcons"),
    ("BAL", "Baltimore Ravens"),
    ("BUF", "Buffalo Bills"),
    ("CAR", "Carolina Panthers"),
    ("CHI", "Chicago Bears"),
    ("CIN", "Cincinnati Bengals"),
    ("CLE", "Cleveland Browns"),
    ("DAL", "Dallas Cowboys"),
    ("DEN", "Denver Broncos"),
    ("DET", "Detroit Lions"),
    ("GB", "Green Bay Packers"),
    ("HOU", "Houston Texans"),
    ("IND", "Indianapolis Colts"),
    ("JAX", "Jacksonville Jaguars"),
    ("KC", "Kansas City Chiefs"),
    ("LV", "Las Vegas Raiders"),
    ("LAC", "Los Angeles Chargers"),
    ("LAR", "Los Angeles Rams"),
    ("MIA", "Miami Dolphins"),
    ("MIN", "Minnesota Vikings"),
    ("NE", "New England Patriots"),
    ("NO", "New Orleans Saints"),
    ("NYG", "New York Giants"),
    ("NYJ", "New York Jets"),
    ("PHI", "Philadelphia Eagles"),
    ("PIT", "Pittsburgh Steelers"),
    ("SF", "San Francisco 49ers"),
    ("SEA", "Seattle Seahawks"),
    ("TB", "Tampa Bay Buccaneers"),
    ("TEN", "Tennessee Titans"),
    ("WAS", "Washington Commanders"),
];

/// Spellings score feeds use for teams listed under another abbreviation.
pub const FEED_ALIASES: [(&str, &str); 2] = [("WSH", "WAS"), ("LA", "LAR")];

/// Inserts the given teams, leaving already known abbreviations untouched.
/// Returns the number of teams created.
pub async fn seed_teams(pool: &Pool<Sqlite>, teams: &[(&str, &str)]) -> sqlx::Result<u64> {
    let mut created = 0;
    for (abbreviation, name) in teams {
        created += sqlx::query("INSERT OR IGNORE INTO teams (abbreviation, name) VALUES (?, ?)")
            .bind(normalize_abbreviation(abbreviation))
            .bind(name)
            .execute(pool)
            .await?
            .rows_affected();
    }
    Ok(created)
}

/// Registers aliases for teams that exist. Unknown targets are skipped.
pub async fn seed_aliases(pool: &Pool<Sqlite>, aliases: &[(&str, &str)]) -> sqlx::Result<u64> {
    let mut created = 0;
    for (alias, abbreviation) in aliases {
        created += sqlx::query(
            "INSERT OR IGNORE INTO team_aliases (alias, team_id)
             SELECT ?, id FROM teams WHERE abbreviation = ?",
        )
        .bind(normalize_abbreviation(alias))
        .bind(normalize_abbreviation(abbreviation))
        .execute(pool)
        .await?
        .rows_affected();
    }
    Ok(created)
}

pub struct SqliteTeamRepository {
    pool: Pool<Sqlite>,
    team_cache: moka::future::Cache<(), Vec<Team>>,
    alias_cache: moka::future::Cache<(), Vec<TeamAlias>>,
}

impl SqliteTeamRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self {
            pool,
            team_cache: moka::future::Cache::builder()
                .max_capacity(1)
                .time_to_live(Duration::from_secs(10 * 60))
                .build(),
            alias_cache: moka::future::Cache::builder()
                .max_capacity(1)
                .time_to_live(Duration::from_secs(10 * 60))
                .build(),
        }
    }

    fn team_from_row(row: &SqliteRow) -> sqlx::Result<Team> {
        Ok(Team {
            id: TeamId(row.try_get("id")?),
            abbreviation: row.try_get("abbreviation")?,
            name: row.try_get("name")?,
        })
    }

    fn alias_from_row(row: &SqliteRow) -> sqlx::Result<TeamAlias> {
        Ok(TeamAlias {
            alias: row.try_get("alias")?,
            team_id: TeamId(row.try_get("team_id")?),
        })
    }

    async fn invalidate(&self) {
        self.team_cache.invalidate_all();
        self.alias_cache.invalidate_all();
        self.team_cache.run_pending_tasks().await;
        self.alias_cache.run_pending_tasks().await;
    }
}

#[async_trait::async_trait]
impl TeamRepository for SqliteTeamRepository {
    async fn list_teams(&self) -> Result<Vec<Team>, RepoError> {
        if let Some(teams) = self.team_cache.get(&()).await {
            return Ok(teams);
        }
        let rows = sqlx::query("SELECT * FROM teams ORDER BY abbreviation")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| RepoError::StorageError(e.to_string()))?;
        let teams = rows
            .iter()
            .map(Self::team_from_row)
            .collect::<sqlx::Result<Vec<_>>>()
            .map_err(|e| RepoError::StorageError(e.to_string()))?;
        self.team_cache.insert((), teams.clone()).await;
        Ok(teams)
    }

    async fn list_aliases(&self) -> Result<Vec<TeamAlias>, RepoError> {
        if let Some(aliases) = self.alias_cache.get(&()).await {
            return Ok(aliases);
        }
        let rows = sqlx::query("SELECT * FROM team_aliases ORDER BY alias")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| RepoError::StorageError(e.to_string()))?;
        let aliases = rows
            .iter()
            .map(Self::alias_from_row)
            .collect::<sqlx::Result<Vec<_>>>()
            .map_err(|e| RepoError::StorageError(e.to_string()))?;
        self.alias_cache.insert((), aliases.clone()).await;
        Ok(aliases)
    }

    async fn rename_team(
        &self,
        team_id: TeamId,
        new_abbreviation: &str,
    ) -> Result<(), RepoUpdateError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| RepoUpdateError::StorageError(e.to_string()))?;

        let old: Option<String> = sqlx::query_scalar("SELECT abbreviation FROM teams WHERE id = ?")
            .bind(team_id.0)
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| RepoUpdateError::StorageError(e.to_string()))?;
        let old = old.ok_or(RepoUpdateError::NotFound)?;

        sqlx::query("UPDATE teams SET abbreviation = ? WHERE id = ?")
            .bind(new_abbreviation)
            .bind(team_id.0)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    RepoUpdateError::Conflict
                } else {
                    RepoUpdateError::StorageError(e.to_string())
                }
            })?;
        sqlx::query("INSERT OR REPLACE INTO team_aliases (alias, team_id) VALUES (?, ?)")
            .bind(&old)
            .bind(team_id.0)
            .execute(&mut *tx)
            .await
            .map_err(|e| RepoUpdateError::StorageError(e.to_string()))?;

        tx.commit()
            .await
            .map_err(|e| RepoUpdateError::StorageError(e.to_string()))?;
        self.invalidate().await;
        log::info!("Team {} renamed from {} to {}", team_id, old, new_abbreviation);
        Ok(())
    }

    async fn add_alias(&self, alias: &str, team_id: TeamId) -> Result<(), RepoCreateError> {
        sqlx::query("INSERT INTO team_aliases (alias, team_id) VALUES (?, ?)")
            .bind(normalize_abbreviation(alias))
            .bind(team_id.0)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    RepoCreateError::Conflict
                } else {
                    RepoCreateError::StorageError(e.to_string())
                }
            })?;
        self.invalidate().await;
        Ok(())
    }
}
