use std::sync::Arc;

use chrono::NaiveDate;

use crate::{
    domain::{
        SeasonYear,
        week::{WeekRepository, current_week},
    },
    workflow::{
        results::{
            ingest::{IngestScoresUseCase, IngestSummary},
            resolve::{ResolutionSummary, ResolveError, ResolvePicksUseCase},
        },
        standings::recompute::{RecomputeStandingsUseCase, SeasonStandingsSummary, StandingsError},
    },
};

#[derive(Debug)]
pub struct SyncSummary {
    pub season_year: SeasonYear,
    pub week_number: u32,
    /// `None` when the feed could not be read; resolution still runs on the
    /// games stored so far.
    pub ingest: Option<IngestSummary>,
    pub resolution: ResolutionSummary,
    pub standings: SeasonStandingsSummary,
}

#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("season {0} has no weeks")]
    NoWeeks(SeasonYear),
    #[error(transparent)]
    Resolve(#[from] ResolveError),
    #[error(transparent)]
    Standings(#[from] StandingsError),
    #[error("storage error: {0}")]
    Storage(String),
}

#[async_trait::async_trait]
pub trait SyncResultsUseCase {
    /// Ingests the current week, resolves the season's picks and recomputes
    /// every player of the season, repairing stored state that drifted.
    async fn sync_current_week(
        &self,
        season_year: SeasonYear,
        today: NaiveDate,
    ) -> Result<SyncSummary, SyncError>;
}

pub struct SyncResultsUseCaseImpl<
    W: WeekRepository,
    I: IngestScoresUseCase,
    R: ResolvePicksUseCase,
    S: RecomputeStandingsUseCase,
> {
    week_repository: Arc<W>,
    ingest_scores_use_case: Arc<I>,
    resolve_picks_use_case: Arc<R>,
    recompute_standings_use_case: Arc<S>,
}

impl<W: WeekRepository, I: IngestScoresUseCase, R: ResolvePicksUseCase, S: RecomputeStandingsUseCase>
    SyncResultsUseCaseImpl<W, I, R, S>
{
    pub fn new(
        week_repository: Arc<W>,
        ingest_scores_use_case: Arc<I>,
        resolve_picks_use_case: Arc<R>,
        recompute_standings_use_case: Arc<S>,
    ) -> Self {
        Self {
            week_repository,
            ingest_scores_use_case,
            resolve_picks_use_case,
            recompute_standings_use_case,
        }
    }
}

#[async_trait::async_trait]
impl<
    W: WeekRepository + Send + Sync + 'static,
    I: IngestScoresUseCase + Send + Sync + 'static,
    R: ResolvePicksUseCase + Send + Sync + 'static,
    S: RecomputeStandingsUseCase + Send + Sync + 'static,
> SyncResultsUseCase for SyncResultsUseCaseImpl<W, I, R, S>
{
    async fn sync_current_week(
        &self,
        season_year: SeasonYear,
        today: NaiveDate,
    ) -> Result<SyncSummary, SyncError> {
        let weeks = self
            .week_repository
            .list_weeks(season_year)
            .await
            .map_err(|e| SyncError::Storage(e.to_string()))?;
        let week = current_week(&weeks, today).ok_or(SyncError::NoWeeks(season_year))?;

        let ingest = match self
            .ingest_scores_use_case
            .ingest_week(season_year, week.week_number)
            .await
        {
            Ok(summary) => Some(summary),
            Err(e) => {
                log::error!(
                    "Failed to ingest week {} of {}: {}",
                    week.week_number,
                    season_year,
                    e
                );
                None
            }
        };

        let resolution = self
            .resolve_picks_use_case
            .resolve_pending_picks(Some(season_year))
            .await?;
        let standings = self
            .recompute_standings_use_case
            .recompute_season(season_year)
            .await?;

        log::info!(
            "Synced week {} of {}: {} picks changed, {} players updated",
            week.week_number,
            season_year,
            resolution.resolved.len() + resolution.corrected.len(),
            standings.changed().count()
        );
        Ok(SyncSummary {
            season_year,
            week_number: week.week_number,
            ingest,
            resolution,
            standings,
        })
    }
}
