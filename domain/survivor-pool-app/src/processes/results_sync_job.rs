use std::{sync::Arc, time::Duration};

use chrono::Utc;

use crate::{domain::SeasonYear, workflow::results::sync::SyncResultsUseCase};

pub struct ResultsSyncJob {
    sync_results_use_case: Arc<dyn SyncResultsUseCase + Send + Sync + 'static>,
}

impl ResultsSyncJob {
    pub fn new(sync_results_use_case: Arc<dyn SyncResultsUseCase + Send + Sync + 'static>) -> Self {
        Self {
            sync_results_use_case,
        }
    }

    /// Runs one full sync of the current week.
    pub async fn run_once(&self, season_year: SeasonYear) {
        let today = Utc::now().date_naive();
        match self
            .sync_results_use_case
            .sync_current_week(season_year, today)
            .await
        {
            Ok(summary) => {
                for report in summary.standings.buyback_pending() {
                    log::warn!(
                        "Player {} ({}) awaits a buyback decision",
                        report.player_id,
                        report.name
                    );
                }
            }
            Err(e) => log::error!("Results sync for season {} failed: {}", season_year, e),
        }
    }

    pub async fn run(&self, season_year: SeasonYear, period: Duration) {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            self.run_once(season_year).await;
        }
    }
}
