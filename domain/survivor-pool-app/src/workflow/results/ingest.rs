use std::{sync::Arc, time::Duration};

use survivor_core::{GameStatus, settle};

use crate::{
    domain::{
        RepoRetrieveError, SeasonYear,
        game::{GameRepository, GameUpsert, RepoUpsertError, UpsertOutcome},
        team::{TeamDirectory, TeamRepository},
        week::{Week, WeekRepository},
    },
    ports::score_feed::{FeedError, FeedGame, ScoreFeed},
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SkippedGame {
    pub external_id: String,
    pub reason: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IngestSummary {
    pub season_year: SeasonYear,
    pub week_number: u32,
    pub fetched: usize,
    pub created: usize,
    pub updated: usize,
    pub unchanged: usize,
    /// Abbreviations the team directory could not resolve.
    pub unknown_teams: Vec<String>,
    pub skipped: Vec<SkippedGame>,
    pub rejected: Vec<SkippedGame>,
    pub failed: Vec<SkippedGame>,
    pub week_complete: bool,
}

impl IngestSummary {
    pub fn written(&self) -> usize {
        self.created + self.updated
    }
}

#[derive(Debug, Default)]
pub struct SeasonIngestSummary {
    pub weeks: Vec<IngestSummary>,
    pub failed_weeks: Vec<(u32, IngestError)>,
}

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("week {week_number} of season {season_year} does not exist")]
    WeekNotFound {
        season_year: SeasonYear,
        week_number: u32,
    },
    #[error(transparent)]
    Feed(#[from] FeedError),
    #[error("storage error: {0}")]
    Storage(String),
}

#[async_trait::async_trait]
pub trait IngestScoresUseCase {
    async fn ingest_week(
        &self,
        season_year: SeasonYear,
        week_number: u32,
    ) -> Result<IngestSummary, IngestError>;
    async fn apply_feed_games(
        &self,
        week: &Week,
        games: Vec<FeedGame>,
    ) -> Result<IngestSummary, IngestError>;
    async fn ingest_season(
        &self,
        season_year: SeasonYear,
        week_numbers: Vec<u32>,
        delay: Duration,
    ) -> SeasonIngestSummary;
}

pub struct IngestScoresUseCaseImpl<T: TeamRepository, W: WeekRepository, G: GameRepository, F: ScoreFeed> {
    team_repository: Arc<T>,
    week_repository: Arc<W>,
    game_repository: Arc<G>,
    score_feed: Arc<F>,
}

impl<T: TeamRepository, W: WeekRepository, G: GameRepository, F: ScoreFeed>
    IngestScoresUseCaseImpl<T, W, G, F>
{
    pub fn new(
        team_repository: Arc<T>,
        week_repository: Arc<W>,
        game_repository: Arc<G>,
        score_feed: Arc<F>,
    ) -> Self {
        Self {
            team_repository,
            week_repository,
            game_repository,
            score_feed,
        }
    }
}

#[async_trait::async_trait]
impl<
    T: TeamRepository + Send + Sync + 'static,
    W: WeekRepository + Send + Sync + 'static,
    G: GameRepository + Send + Sync + 'static,
    F: ScoreFeed + Send + Sync + 'static,
> IngestScoresUseCase for IngestScoresUseCaseImpl<T, W, G, F>
{
    async fn ingest_week(
        &self,
        season_year: SeasonYear,
        week_number: u32,
    ) -> Result<IngestSummary, IngestError> {
        let week = match self.week_repository.find_week(season_year, week_number).await {
            Ok(week) => week,
            Err(RepoRetrieveError::NotFound) => {
                return Err(IngestError::WeekNotFound {
                    season_year,
                    week_number,
                });
            }
            Err(RepoRetrieveError::StorageError(e)) => return Err(IngestError::Storage(e)),
        };
        let games = self.score_feed.fetch_week(season_year, week_number).await?;
        self.apply_feed_games(&week, games).await
    }

    async fn apply_feed_games(
        &self,
        week: &Week,
        games: Vec<FeedGame>,
    ) -> Result<IngestSummary, IngestError> {
        let directory = TeamDirectory::load(self.team_repository.as_ref())
            .await
            .map_err(|e| IngestError::Storage(e.to_string()))?;

        let mut summary = IngestSummary {
            season_year: week.season_year,
            week_number: week.week_number,
            fetched: games.len(),
            ..Default::default()
        };

        for feed_game in games {
            let home = directory.resolve(&feed_game.home_abbreviation);
            let away = directory.resolve(&feed_game.away_abbreviation);
            let (Some(home), Some(away)) = (home, away) else {
                for (abbreviation, team) in [
                    (&feed_game.home_abbreviation, home),
                    (&feed_game.away_abbreviation, away),
                ] {
                    if team.is_none() {
                        log::warn!(
                            "Unknown team abbreviation {} in game {}, leaving it pending",
                            abbreviation,
                            feed_game.external_id
                        );
                        if !summary.unknown_teams.contains(abbreviation) {
                            summary.unknown_teams.push(abbreviation.clone());
                        }
                    }
                }
                summary.skipped.push(SkippedGame {
                    external_id: feed_game.external_id,
                    reason: "unknown team".to_string(),
                });
                continue;
            };

            let upsert = match settle(&feed_game.reported_score()).and_then(|score| {
                let upsert = GameUpsert {
                    external_id: feed_game.external_id.clone(),
                    week_id: week.id,
                    home_team_id: home.id,
                    away_team_id: away.id,
                    score,
                    kickoff: feed_game.kickoff,
                };
                upsert.validate().map(|_| upsert)
            }) {
                Ok(upsert) => upsert,
                Err(violation) => {
                    log::error!(
                        "Rejecting game {} ({} vs {}): {}",
                        feed_game.external_id,
                        away.abbreviation,
                        home.abbreviation,
                        violation
                    );
                    summary.rejected.push(SkippedGame {
                        external_id: feed_game.external_id,
                        reason: violation.to_string(),
                    });
                    continue;
                }
            };

            match self.game_repository.upsert_game(upsert).await {
                Ok((_, UpsertOutcome::Created)) => summary.created += 1,
                Ok((_, UpsertOutcome::Updated)) => summary.updated += 1,
                Ok((_, UpsertOutcome::Unchanged)) => summary.unchanged += 1,
                Err(RepoUpsertError::Conflict(e)) => {
                    log::error!("Rejecting game {}: {}", feed_game.external_id, e);
                    summary.rejected.push(SkippedGame {
                        external_id: feed_game.external_id,
                        reason: e,
                    });
                }
                Err(RepoUpsertError::StorageError(e)) => {
                    log::error!("Failed to store game {}: {}", feed_game.external_id, e);
                    summary.failed.push(SkippedGame {
                        external_id: feed_game.external_id,
                        reason: e,
                    });
                }
            }
        }

        if summary.fetched > 0 {
            let stored = self
                .game_repository
                .list_games_for_week(week.id)
                .await
                .map_err(|e| IngestError::Storage(e.to_string()))?;
            let complete =
                !stored.is_empty() && stored.iter().all(|game| game.status == GameStatus::Final);
            if complete != week.is_complete {
                if let Err(e) = self.week_repository.set_week_complete(week.id, complete).await {
                    log::error!("Failed to update completion of week {}: {}", week.week_number, e);
                }
            }
            summary.week_complete = complete;
        } else {
            summary.week_complete = week.is_complete;
        }

        log::info!(
            "Ingested week {} of {}: {} fetched, {} created, {} updated, {} unchanged, {} skipped, {} rejected, {} failed",
            summary.week_number,
            summary.season_year,
            summary.fetched,
            summary.created,
            summary.updated,
            summary.unchanged,
            summary.skipped.len(),
            summary.rejected.len(),
            summary.failed.len()
        );
        Ok(summary)
    }

    async fn ingest_season(
        &self,
        season_year: SeasonYear,
        week_numbers: Vec<u32>,
        delay: Duration,
    ) -> SeasonIngestSummary {
        let mut summary = SeasonIngestSummary::default();
        for (i, week_number) in week_numbers.into_iter().enumerate() {
            if i > 0 && !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            match self.ingest_week(season_year, week_number).await {
                Ok(week_summary) => summary.weeks.push(week_summary),
                Err(e) => {
                    log::error!("Failed to ingest week {} of {}: {}", week_number, season_year, e);
                    summary.failed_weeks.push((week_number, e));
                }
            }
        }
        summary
    }
}
