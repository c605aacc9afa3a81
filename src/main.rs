use std::sync::Arc;

use chrono::{Datelike, NaiveDate, Utc, Weekday};
use clap::Parser;
use survivor_core::SettingsError;
use survivor_persistence_sqlite::{
    create_db_pool, games::SqliteGameRepository, picks::SqlitePickRepository,
    players::SqlitePlayerRepository, settings::SqlitePoolSettingsRepository,
    teams::SqliteTeamRepository, weeks::SqliteWeekRepository,
};
use survivor_pool_app::{
    Application, build_application,
    domain::{
        PickId, PlayerId, RepoRetrieveError, SeasonYear,
        settings::PoolSettings,
        week::{WeekRepository, regular_season_schedule},
    },
    ports::score_feed::FeedGame,
    workflow::{
        picks::submit::SubmitPickError,
        players::register::RegisterPlayerError,
        results::{ingest::IngestError, resolve::ResolveError, sync::SyncError},
        season::seed::SeedError,
        standings::{buyback::BuybackError, recompute::StandingsError},
        teams::remap::RemapError,
    },
};

use crate::{
    cli::{BuybackArgs, Cli, Command, EnterGameArgs, SeedSeasonArgs},
    config::AppConfig,
    feed::JsonDirScoreFeed,
};

mod cli;
mod config;
mod feed;
mod logs;
mod report;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("cannot open database {path}: {message} (run create_db first)")]
    Database { path: String, message: String },
    #[error(transparent)]
    Settings(#[from] SettingsError),
    #[error(transparent)]
    Seed(#[from] SeedError),
    #[error(transparent)]
    Player(#[from] RegisterPlayerError),
    #[error(transparent)]
    Pick(#[from] SubmitPickError),
    #[error(transparent)]
    Buyback(#[from] BuybackError),
    #[error(transparent)]
    Standings(#[from] StandingsError),
    #[error(transparent)]
    Team(#[from] RemapError),
    #[error(transparent)]
    Ingest(#[from] IngestError),
    #[error(transparent)]
    Resolve(#[from] ResolveError),
    #[error(transparent)]
    Sync(#[from] SyncError),
    #[error("week {week_number} of season {season_year} does not exist")]
    UnknownWeek {
        season_year: SeasonYear,
        week_number: u32,
    },
    #[error("storage error: {0}")]
    Storage(String),
}

struct Context {
    config: AppConfig,
    app: Application,
    week_repository: Arc<SqliteWeekRepository>,
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                log::error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    log::info!("Shutdown signal received, stopping");
}

async fn connect(config: AppConfig) -> Result<Context, CliError> {
    let pool = create_db_pool(&config.db_path, false)
        .await
        .map_err(|e| CliError::Database {
            path: config.db_path.clone(),
            message: e.to_string(),
        })?;

    let team_repo = Arc::new(SqliteTeamRepository::new(pool.clone()));
    let week_repo = Arc::new(SqliteWeekRepository::new(pool.clone()));
    let game_repo = Arc::new(SqliteGameRepository::new(pool.clone()));
    let pick_repo = Arc::new(SqlitePickRepository::new(pool.clone()));
    let player_repo = Arc::new(SqlitePlayerRepository::new(pool.clone()));
    let settings_repo = Arc::new(SqlitePoolSettingsRepository::new(pool));
    let score_feed = Arc::new(JsonDirScoreFeed::new(config.feed_dir.clone()));

    let app = build_application(
        team_repo,
        week_repo.clone(),
        game_repo,
        pick_repo,
        player_repo,
        settings_repo,
        score_feed,
    );

    Ok(Context {
        config,
        app,
        week_repository: week_repo,
    })
}

async fn seed_season(ctx: &Context, season: SeasonYear, args: SeedSeasonArgs) -> Result<(), CliError> {
    if args.kickoff.weekday() != Weekday::Thu {
        log::warn!("Kickoff {} is not a Thursday", args.kickoff);
    }
    let settings = PoolSettings::new(season, args.max_strikes, args.entry_fee, args.buyback_fee)?;
    let summary = ctx
        .app
        .seed_season_use_case
        .seed_season(settings, regular_season_schedule(season, args.kickoff))
        .await?;
    report::print_seed(&summary);
    Ok(())
}

async fn record_buyback(ctx: &Context, args: BuybackArgs) -> Result<(), CliError> {
    let buyback = &ctx.app.record_buyback_use_case;
    let player_id = PlayerId(args.player_id);
    let report = if args.override_decision {
        buyback
            .override_buyback_decision(player_id, args.accept, args.fee_paid)
            .await?
    } else {
        buyback
            .record_buyback_decision(player_id, args.accept, args.fee_paid)
            .await?
    };
    report::print_standing(&report);
    Ok(())
}

async fn enter_game(ctx: &Context, season: SeasonYear, args: EnterGameArgs) -> Result<(), CliError> {
    let week = ctx
        .week_repository
        .find_week(season, args.week)
        .await
        .map_err(|e| match e {
            RepoRetrieveError::NotFound => CliError::UnknownWeek {
                season_year: season,
                week_number: args.week,
            },
            RepoRetrieveError::StorageError(e) => CliError::Storage(e),
        })?;
    let game = FeedGame {
        external_id: args.id,
        home_abbreviation: args.home,
        away_abbreviation: args.away,
        home_score: Some(args.home_score),
        away_score: Some(args.away_score),
        completed: !args.in_progress,
        home_winner: None,
        away_winner: None,
        kickoff: None,
    };
    let summary = ctx
        .app
        .ingest_scores_use_case
        .apply_feed_games(&week, vec![game])
        .await?;
    report::print_ingest(&summary);
    Ok(())
}

async fn run(cli: Cli, ctx: Context) -> Result<(), CliError> {
    let season = cli.season;
    let app = &ctx.app;
    match cli.command {
        Command::SeedSeason(args) => seed_season(&ctx, season, args).await?,
        Command::AddPlayer { name, unpaid } => {
            let id = app
                .player_admin_use_case
                .register_player(season, &name, !unpaid)
                .await?;
            println!("Registered {} as player {}", name.trim(), id);
        }
        Command::EntryFee { player_id, unpaid } => {
            app.player_admin_use_case
                .set_entry_fee_paid(PlayerId(player_id), !unpaid)
                .await?;
            println!("Player {} entry fee paid: {}", player_id, !unpaid);
        }
        Command::BuybackFee { player_id, unpaid } => {
            app.player_admin_use_case
                .set_buyback_fee_paid(PlayerId(player_id), !unpaid)
                .await?;
            println!("Player {} buyback fee paid: {}", player_id, !unpaid);
        }
        Command::Players => {
            report::print_players(&app.player_admin_use_case.list_players(season).await?)
        }
        Command::Pick {
            player_id,
            week,
            team,
        } => {
            let id = app
                .pick_use_case
                .submit_pick(PlayerId(player_id), week, &team)
                .await?;
            println!("Stored pick {}", id);
        }
        Command::ChangePick { pick_id, team } => {
            let report = app.pick_use_case.change_pick(PickId(pick_id), &team).await?;
            report::print_standing(&report);
        }
        Command::DeletePick { pick_id } => {
            let report = app.pick_use_case.delete_pick(PickId(pick_id)).await?;
            report::print_standing(&report);
        }
        Command::WeekPicks { week } => {
            report::print_week_picks(&app.pick_use_case.list_week_picks(season, week).await?)
        }
        Command::Buyback(args) => record_buyback(&ctx, args).await?,
        Command::Teams => report::print_teams(&app.team_admin_use_case.list_teams().await?),
        Command::RemapTeam { current, new } => {
            let team = app.team_admin_use_case.remap_team(&current, &new).await?;
            println!("{} is now {}", team.name, team.abbreviation);
        }
        Command::AliasTeam { alias, team } => {
            let team = app.team_admin_use_case.add_team_alias(&alias, &team).await?;
            println!("{} now also resolves to {}", alias, team.name);
        }
        Command::EnterGame(args) => enter_game(&ctx, season, args).await?,
        Command::Ingest { week } => {
            let summary = app.ingest_scores_use_case.ingest_week(season, week).await?;
            report::print_ingest(&summary);
        }
        Command::Backfill { from, to } => {
            let summary = app
                .ingest_scores_use_case
                .ingest_season(season, (from..=to).collect(), ctx.config.feed_delay)
                .await;
            report::print_backfill(&summary);
        }
        Command::Resolve { all_seasons } => {
            let scope = (!all_seasons).then_some(season);
            let resolution = app.resolve_picks_use_case.resolve_pending_picks(scope).await?;
            report::print_resolution(&resolution);
            let affected: Vec<PlayerId> = resolution.affected_players.iter().copied().collect();
            let standings = app
                .recompute_standings_use_case
                .recompute_players(&affected)
                .await;
            report::print_standings(&standings);
        }
        Command::Recompute { player: Some(id) } => {
            let report = app
                .recompute_standings_use_case
                .recompute_player_state(PlayerId(id))
                .await?;
            report::print_standing(&report);
        }
        Command::Recompute { player: None } => {
            let summary = app.recompute_standings_use_case.recompute_season(season).await?;
            report::print_standings(&summary);
        }
        Command::Sync { today } => {
            let today: NaiveDate = today.unwrap_or_else(|| Utc::now().date_naive());
            let summary = app.sync_results_use_case.sync_current_week(season, today).await?;
            report::print_sync(&summary);
        }
        Command::Watch => {
            log::info!(
                "Watching season {} every {}s",
                season,
                ctx.config.sync_interval.as_secs()
            );
            let job = app.results_sync_job.clone();
            tokio::select! {
                _ = job.run(season, ctx.config.sync_interval) => {},
                _ = shutdown_signal() => {},
            }
        }
        Command::Payout => {
            let payout = app.payout_use_case.compute_payout(season).await?;
            report::print_payout(&payout);
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(2);
        }
    };

    if let Err(e) = logs::init_logger(config.log_file.as_ref()) {
        eprintln!("Failed to initialize logger: {}", e);
        std::process::exit(2);
    }

    let result = match connect(config).await {
        Ok(ctx) => run(cli, ctx).await,
        Err(e) => Err(e),
    };
    if let Err(e) = result {
        log::error!("{}", e);
        std::process::exit(1);
    }
}
