use std::sync::Arc;

use crate::domain::{
    RepoCreateError, SeasonYear,
    settings::{PoolSettings, PoolSettingsRepository},
    week::{NewWeek, WeekError, WeekRepository},
};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub created: usize,
    pub skipped_existing: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error(transparent)]
    InvalidWeek(#[from] WeekError),
    #[error("week {week_number} belongs to season {week_season}, not {season_year}")]
    SeasonMismatch {
        season_year: SeasonYear,
        week_season: SeasonYear,
        week_number: u32,
    },
    #[error("storage error: {0}")]
    Storage(String),
}

#[async_trait::async_trait]
pub trait SeedSeasonUseCase {
    /// Stores the pool settings of a season and creates its weeks. Weeks
    /// that already exist are left as they are.
    async fn seed_season(
        &self,
        settings: PoolSettings,
        weeks: Vec<NewWeek>,
    ) -> Result<SeedSummary, SeedError>;
}

pub struct SeedSeasonUseCaseImpl<W: WeekRepository, S: PoolSettingsRepository> {
    week_repository: Arc<W>,
    settings_repository: Arc<S>,
}

impl<W: WeekRepository, S: PoolSettingsRepository> SeedSeasonUseCaseImpl<W, S> {
    pub fn new(week_repository: Arc<W>, settings_repository: Arc<S>) -> Self {
        Self {
            week_repository,
            settings_repository,
        }
    }
}

#[async_trait::async_trait]
impl<W: WeekRepository + Send + Sync + 'static, S: PoolSettingsRepository + Send + Sync + 'static>
    SeedSeasonUseCase for SeedSeasonUseCaseImpl<W, S>
{
    async fn seed_season(
        &self,
        settings: PoolSettings,
        weeks: Vec<NewWeek>,
    ) -> Result<SeedSummary, SeedError> {
        for week in &weeks {
            week.validate()?;
            if week.season_year != settings.season_year {
                return Err(SeedError::SeasonMismatch {
                    season_year: settings.season_year,
                    week_season: week.season_year,
                    week_number: week.week_number,
                });
            }
        }

        self.settings_repository
            .save_settings(&settings)
            .await
            .map_err(|e| SeedError::Storage(e.to_string()))?;

        let mut summary = SeedSummary::default();
        for week in weeks {
            let week_number = week.week_number;
            match self.week_repository.create_week(week).await {
                Ok(_) => summary.created += 1,
                Err(RepoCreateError::Conflict) => {
                    log::debug!("Week {} already exists, skipping", week_number);
                    summary.skipped_existing += 1;
                }
                Err(RepoCreateError::StorageError(e)) => return Err(SeedError::Storage(e)),
            }
        }

        log::info!(
            "Seeded season {}: {} weeks created, {} already existed",
            settings.season_year,
            summary.created,
            summary.skipped_existing
        );
        Ok(summary)
    }
}
