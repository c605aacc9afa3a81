use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Deserialize;
use survivor_pool_app::{
    domain::SeasonYear,
    ports::score_feed::{FeedError, FeedGame, ScoreFeed},
};

/// Score feed backed by JSON exports laid out as
/// `<dir>/<season>/week-<n>.json`.
pub struct JsonDirScoreFeed {
    dir: PathBuf,
}

#[derive(Debug, Deserialize)]
struct WeekFile {
    games: Vec<GameEntry>,
}

#[derive(Debug, Deserialize)]
struct GameEntry {
    id: String,
    home: String,
    away: String,
    #[serde(default)]
    home_score: Option<i64>,
    #[serde(default)]
    away_score: Option<i64>,
    #[serde(default)]
    completed: bool,
    #[serde(default)]
    home_winner: Option<bool>,
    #[serde(default)]
    away_winner: Option<bool>,
    #[serde(default)]
    kickoff: Option<DateTime<Utc>>,
}

impl From<GameEntry> for FeedGame {
    fn from(entry: GameEntry) -> Self {
        FeedGame {
            external_id: entry.id,
            home_abbreviation: entry.home,
            away_abbreviation: entry.away,
            home_score: entry.home_score,
            away_score: entry.away_score,
            completed: entry.completed,
            home_winner: entry.home_winner,
            away_winner: entry.away_winner,
            kickoff: entry.kickoff,
        }
    }
}

impl JsonDirScoreFeed {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn week_path(&self, season_year: SeasonYear, week_number: u32) -> PathBuf {
        week_path(&self.dir, season_year, week_number)
    }
}

fn week_path(dir: &Path, season_year: SeasonYear, week_number: u32) -> PathBuf {
    dir.join(season_year.to_string())
        .join(format!("week-{}.json", week_number))
}

pub fn parse_week(json: &str) -> Result<Vec<FeedGame>, FeedError> {
    let file: WeekFile =
        serde_json::from_str(json).map_err(|e| FeedError::Malformed(e.to_string()))?;
    Ok(file.games.into_iter().map(FeedGame::from).collect())
}

#[async_trait::async_trait]
impl ScoreFeed for JsonDirScoreFeed {
    async fn fetch_week(
        &self,
        season_year: SeasonYear,
        week_number: u32,
    ) -> Result<Vec<FeedGame>, FeedError> {
        let path = self.week_path(season_year, week_number);
        let json = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| FeedError::Unavailable(format!("{}: {}", path.display(), e)))?;
        let games = parse_week(&json)?;
        log::debug!("Read {} games from {}", games.len(), path.display());
        Ok(games)
    }
}
