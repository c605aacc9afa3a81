use chrono::{Days, NaiveDate};

use crate::domain::{
    RepoCreateError, RepoError, RepoRetrieveError, RepoUpdateError, SeasonYear, WeekId,
};

pub const REGULAR_SEASON_WEEKS: u32 = 18;
pub const MAX_WEEK_NUMBER: u32 = 22;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Week {
    pub id: WeekId,
    pub season_year: SeasonYear,
    pub week_number: u32,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub is_complete: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewWeek {
    pub season_year: SeasonYear,
    pub week_number: u32,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum WeekError {
    #[error("week number {0} is outside 1..={MAX_WEEK_NUMBER}")]
    InvalidNumber(u32),
    #[error("week {0} ends before it starts")]
    EndsBeforeStart(u32),
}

impl NewWeek {
    pub fn validate(&self) -> Result<(), WeekError> {
        if !(1..=MAX_WEEK_NUMBER).contains(&self.week_number) {
            return Err(WeekError::InvalidNumber(self.week_number));
        }
        if self.end_date < self.start_date {
            return Err(WeekError::EndsBeforeStart(self.week_number));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
pub trait WeekRepository {
    async fn create_week(&self, week: NewWeek) -> Result<WeekId, RepoCreateError>;
    async fn get_week(&self, id: WeekId) -> Result<Week, RepoRetrieveError>;
    async fn find_week(
        &self,
        season_year: SeasonYear,
        week_number: u32,
    ) -> Result<Week, RepoRetrieveError>;
    async fn list_weeks(&self, season_year: SeasonYear) -> Result<Vec<Week>, RepoError>;
    async fn set_week_complete(&self, id: WeekId, complete: bool) -> Result<(), RepoUpdateError>;
}

/// Regular season weeks running Thursday to Monday, starting at `kickoff_thursday`.
pub fn regular_season_schedule(season_year: SeasonYear, kickoff_thursday: NaiveDate) -> Vec<NewWeek> {
    (0..REGULAR_SEASON_WEEKS)
        .filter_map(|offset| {
            let start_date = kickoff_thursday.checked_add_days(Days::new(7 * offset as u64))?;
            let end_date = start_date.checked_add_days(Days::new(4))?;
            Some(NewWeek {
                season_year,
                week_number: offset + 1,
                start_date,
                end_date,
            })
        })
        .collect()
}

/// The latest week that has started by `today`, or the first week of the
/// season when none has.
pub fn current_week(weeks: &[Week], today: NaiveDate) -> Option<&Week> {
    weeks
        .iter()
        .filter(|week| week.start_date <= today)
        .max_by_key(|week| (week.start_date, week.week_number))
        .or_else(|| weeks.iter().min_by_key(|week| week.week_number))
}
