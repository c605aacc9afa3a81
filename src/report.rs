use survivor_core::Distribution;
use survivor_pool_app::{
    domain::team::Team,
    workflow::{
        payout::compute::PayoutReport,
        picks::submit::WeekPick,
        players::register::PlayerStanding,
        results::{
            ingest::{IngestSummary, SeasonIngestSummary},
            resolve::ResolutionSummary,
            sync::SyncSummary,
        },
        season::seed::SeedSummary,
        standings::recompute::{SeasonStandingsSummary, StandingReport},
    },
};

pub fn print_teams(teams: &[Team]) {
    for team in teams {
        println!("{:>4}  {:<5} {}", team.id, team.abbreviation, team.name);
    }
}

pub fn print_players(standings: &[PlayerStanding]) {
    for row in standings {
        let player = &row.player;
        println!(
            "{:>4}  {:<20} strikes {}  {:<20} entry {}  buyback {}",
            player.id,
            player.name,
            row.strikes,
            row.standing.to_string(),
            if player.entry_fee_paid { "paid" } else { "unpaid" },
            match player.has_bought_back {
                None => "-",
                Some(false) => "declined",
                Some(true) if player.buyback_fee_paid => "paid",
                Some(true) => "unpaid",
            }
        );
    }
}

pub fn print_week_picks(picks: &[WeekPick]) {
    for row in picks {
        let result = match row.pick.team_won {
            None => "pending",
            Some(true) => "won",
            Some(false) => "strike",
        };
        println!(
            "{:>4}  {:<20} {:<5} {}",
            row.pick.id, row.player_name, row.team_abbreviation, result
        );
    }
}

pub fn print_seed(summary: &SeedSummary) {
    println!(
        "Weeks created: {}, already present: {}",
        summary.created, summary.skipped_existing
    );
}

pub fn print_ingest(summary: &IngestSummary) {
    println!(
        "Week {} of {}: {} games fetched, {} created, {} updated, {} unchanged{}",
        summary.week_number,
        summary.season_year,
        summary.fetched,
        summary.created,
        summary.updated,
        summary.unchanged,
        if summary.week_complete { ", week complete" } else { "" }
    );
    for team in &summary.unknown_teams {
        println!("  unknown team abbreviation {}", team);
    }
    for (label, games) in [
        ("skipped", &summary.skipped),
        ("rejected", &summary.rejected),
        ("failed", &summary.failed),
    ] {
        for game in games {
            println!("  {} game {}: {}", label, game.external_id, game.reason);
        }
    }
}

pub fn print_backfill(summary: &SeasonIngestSummary) {
    for week in &summary.weeks {
        print_ingest(week);
    }
    for (week_number, e) in &summary.failed_weeks {
        println!("Week {} failed: {}", week_number, e);
    }
}

pub fn print_resolution(summary: &ResolutionSummary) {
    println!(
        "Picks resolved: {}, corrected: {}, unchanged: {}, pending: {}",
        summary.resolved.len(),
        summary.corrected.len(),
        summary.unchanged,
        summary.pending.len()
    );
    for flagged in &summary.flagged {
        println!(
            "  review pick {} of player {}: {}",
            flagged.pick_id, flagged.player_id, flagged.reason
        );
    }
    for failed in &summary.failed {
        println!(
            "  failed pick {} of player {}: {}",
            failed.pick_id, failed.player_id, failed.reason
        );
    }
}

pub fn print_standing(report: &StandingReport) {
    println!(
        "{:>4}  {:<20} strikes {} -> {}  {}{}",
        report.player_id,
        report.name,
        report.before.strikes,
        report.after.strikes,
        report.standing,
        if report.repaired_strikes { " (repaired)" } else { "" }
    );
}

pub fn print_standings(summary: &SeasonStandingsSummary) {
    for report in &summary.reports {
        print_standing(report);
    }
    for (player_id, e) in &summary.failed {
        println!("{:>4}  failed: {}", player_id, e);
    }
    let pending: Vec<String> = summary
        .buyback_pending()
        .map(|report| report.name.clone())
        .collect();
    if !pending.is_empty() {
        println!("Awaiting a buyback decision: {}", pending.join(", "));
    }
}

pub fn print_sync(summary: &SyncSummary) {
    println!("Synced week {} of {}", summary.week_number, summary.season_year);
    match &summary.ingest {
        Some(ingest) => print_ingest(ingest),
        None => println!("  score feed unavailable, resolved against stored games"),
    }
    print_resolution(&summary.resolution);
    print_standings(&summary.standings);
}

pub fn print_payout(report: &PayoutReport) {
    println!(
        "Season {}: entry {}, buyback {}",
        report.season_year, report.fees.entry_fee, report.fees.buyback_fee
    );
    for line in &report.players {
        println!(
            "{:>4}  {:<20} strikes {}  {}",
            line.player_id, line.name, line.strikes, line.standing
        );
    }
    println!("Pot: {}", report.payout.pot);
    match &report.payout.distribution {
        Distribution::Split {
            tier,
            winners,
            share,
            remainder,
        } => {
            let names: Vec<&str> = winners.iter().map(|id| report.name_of(*id)).collect();
            println!(
                "Winners ({:?}): {} get {} each, {} left over",
                tier,
                names.join(", "),
                share,
                remainder
            );
        }
        Distribution::CarryOver => println!("Nobody survived, the pot carries over"),
    }
    if !report.undecided_buybacks.is_empty() {
        let names: Vec<&str> = report
            .undecided_buybacks
            .iter()
            .map(|id| report.name_of(*id))
            .collect();
        println!(
            "Warning: buyback still undecided for {}; they count as survivors",
            names.join(", ")
        );
    }
}
