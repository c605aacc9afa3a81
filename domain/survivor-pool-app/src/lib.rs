use std::sync::Arc;

use crate::{
    domain::{
        game::GameRepository, pick::PickRepository, player::PlayerRepository,
        settings::PoolSettingsRepository, team::TeamRepository, week::WeekRepository,
    },
    ports::score_feed::ScoreFeed,
    processes::results_sync_job::ResultsSyncJob,
    workflow::{
        payout::compute::{PayoutUseCase, PayoutUseCaseImpl},
        picks::submit::{PickUseCase, PickUseCaseImpl},
        players::register::{PlayerAdminUseCase, PlayerAdminUseCaseImpl},
        results::{
            ingest::{IngestScoresUseCase, IngestScoresUseCaseImpl},
            resolve::{ResolvePicksUseCase, ResolvePicksUseCaseImpl},
            sync::{SyncResultsUseCase, SyncResultsUseCaseImpl},
        },
        season::seed::{SeedSeasonUseCase, SeedSeasonUseCaseImpl},
        standings::{
            buyback::{RecordBuybackUseCase, RecordBuybackUseCaseImpl},
            recompute::{RecomputeStandingsUseCase, RecomputeStandingsUseCaseImpl},
        },
        teams::remap::{TeamAdminUseCase, TeamAdminUseCaseImpl},
    },
};

pub mod domain;
pub mod ports;
pub mod processes;
pub mod workflow;

#[cfg(test)]
pub(crate) mod testing;

pub struct Application {
    pub ingest_scores_use_case: Arc<dyn IngestScoresUseCase + Send + Sync + 'static>,
    pub resolve_picks_use_case: Arc<dyn ResolvePicksUseCase + Send + Sync + 'static>,
    pub sync_results_use_case: Arc<dyn SyncResultsUseCase + Send + Sync + 'static>,

    pub recompute_standings_use_case: Arc<dyn RecomputeStandingsUseCase + Send + Sync + 'static>,
    pub record_buyback_use_case: Box<dyn RecordBuybackUseCase + Send + Sync + 'static>,

    pub pick_use_case: Box<dyn PickUseCase + Send + Sync + 'static>,
    pub player_admin_use_case: Box<dyn PlayerAdminUseCase + Send + Sync + 'static>,
    pub team_admin_use_case: Box<dyn TeamAdminUseCase + Send + Sync + 'static>,
    pub seed_season_use_case: Box<dyn SeedSeasonUseCase + Send + Sync + 'static>,
    pub payout_use_case: Box<dyn PayoutUseCase + Send + Sync + 'static>,

    pub results_sync_job: Arc<ResultsSyncJob>,
}

pub fn build_application<
    T: TeamRepository + Send + Sync + 'static,
    W: WeekRepository + Send + Sync + 'static,
    G: GameRepository + Send + Sync + 'static,
    K: PickRepository + Send + Sync + 'static,
    P: PlayerRepository + Send + Sync + 'static,
    S: PoolSettingsRepository + Send + Sync + 'static,
    F: ScoreFeed + Send + Sync + 'static,
>(
    team_repository: Arc<T>,
    week_repository: Arc<W>,
    game_repository: Arc<G>,
    pick_repository: Arc<K>,
    player_repository: Arc<P>,
    settings_repository: Arc<S>,
    score_feed: Arc<F>,
) -> Application {
    let ingest_scores_use_case = Arc::new(IngestScoresUseCaseImpl::new(
        team_repository.clone(),
        week_repository.clone(),
        game_repository.clone(),
        score_feed,
    ));
    let resolve_picks_use_case = Arc::new(ResolvePicksUseCaseImpl::new(
        pick_repository.clone(),
        game_repository.clone(),
    ));
    let recompute_standings_use_case = Arc::new(RecomputeStandingsUseCaseImpl::new(
        player_repository.clone(),
        pick_repository.clone(),
        settings_repository.clone(),
    ));
    let sync_results_use_case = Arc::new(SyncResultsUseCaseImpl::new(
        week_repository.clone(),
        ingest_scores_use_case.clone(),
        resolve_picks_use_case.clone(),
        recompute_standings_use_case.clone(),
    ));
    let results_sync_job = Arc::new(ResultsSyncJob::new(sync_results_use_case.clone()));

    let record_buyback_use_case = Box::new(RecordBuybackUseCaseImpl::new(
        player_repository.clone(),
        pick_repository.clone(),
        settings_repository.clone(),
        recompute_standings_use_case.clone(),
    ));
    let pick_use_case = Box::new(PickUseCaseImpl::new(
        team_repository.clone(),
        week_repository.clone(),
        pick_repository.clone(),
        player_repository.clone(),
        settings_repository.clone(),
        recompute_standings_use_case.clone(),
    ));
    let player_admin_use_case = Box::new(PlayerAdminUseCaseImpl::new(
        player_repository.clone(),
        pick_repository.clone(),
        settings_repository.clone(),
    ));
    let team_admin_use_case = Box::new(TeamAdminUseCaseImpl::new(team_repository));
    let seed_season_use_case = Box::new(SeedSeasonUseCaseImpl::new(
        week_repository,
        settings_repository.clone(),
    ));
    let payout_use_case = Box::new(PayoutUseCaseImpl::new(
        player_repository,
        pick_repository,
        settings_repository,
    ));

    Application {
        ingest_scores_use_case,
        resolve_picks_use_case,
        sync_results_use_case,
        recompute_standings_use_case,
        record_buyback_use_case,
        pick_use_case,
        player_admin_use_case,
        team_admin_use_case,
        seed_season_use_case,
        payout_use_case,
        results_sync_job,
    }
}
