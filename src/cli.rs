use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use rust_decimal::Decimal;
use survivor_pool_app::domain::{
    SeasonYear,
    settings::DEFAULT_MAX_STRIKES,
    week::REGULAR_SEASON_WEEKS,
};

#[derive(Debug, Parser)]
#[command(name = "survivor-pool", about = "NFL survivor pool administration")]
pub struct Cli {
    /// Season the command applies to.
    #[arg(long, short, env = "SURVIVOR_SEASON", global = true, default_value_t = 2025)]
    pub season: SeasonYear,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the season's pool settings and create its regular season weeks.
    SeedSeason(SeedSeasonArgs),
    /// Register a player for the season.
    AddPlayer {
        name: String,
        /// Register without a paid entry fee.
        #[arg(long)]
        unpaid: bool,
    },
    /// Mark a player's entry fee as paid (or unpaid).
    EntryFee {
        player_id: i64,
        #[arg(long)]
        unpaid: bool,
    },
    /// Mark the buyback fee of a player who bought back as paid (or unpaid).
    BuybackFee {
        player_id: i64,
        #[arg(long)]
        unpaid: bool,
    },
    /// List the season's players by strikes.
    Players,
    /// Submit a player's pick for a week.
    Pick {
        player_id: i64,
        week: u32,
        team: String,
    },
    /// Replace the team of an existing pick.
    ChangePick { pick_id: i64, team: String },
    /// Delete a pick entered by mistake.
    DeletePick { pick_id: i64 },
    /// List all picks of a week.
    WeekPicks { week: u32 },
    /// Record the buyback decision of a player.
    Buyback(BuybackArgs),
    /// List teams.
    Teams,
    /// Give a team a new abbreviation. The old one keeps working as an alias.
    RemapTeam { current: String, new: String },
    /// Make another abbreviation resolve to a team.
    AliasTeam { alias: String, team: String },
    /// Enter a game result by hand.
    EnterGame(EnterGameArgs),
    /// Pull one week from the score feed.
    Ingest { week: u32 },
    /// Pull a range of weeks from the score feed.
    Backfill {
        #[arg(long, default_value_t = 1)]
        from: u32,
        #[arg(long, default_value_t = REGULAR_SEASON_WEEKS)]
        to: u32,
    },
    /// Resolve picks against the stored final games.
    Resolve {
        /// Resolve picks of every season instead of only `--season`.
        #[arg(long)]
        all_seasons: bool,
    },
    /// Recompute strikes and standings from the picks.
    Recompute {
        /// Only recompute this player.
        #[arg(long)]
        player: Option<i64>,
    },
    /// Ingest the current week, resolve picks and recompute standings once.
    Sync {
        /// Date used to find the current week. Defaults to today.
        #[arg(long)]
        today: Option<NaiveDate>,
    },
    /// Run the sync repeatedly until interrupted.
    Watch,
    /// Compute the season's pot and how it is split.
    Payout,
}

#[derive(Debug, Args)]
pub struct SeedSeasonArgs {
    /// Thursday of the first regular season week.
    #[arg(long)]
    pub kickoff: NaiveDate,
    #[arg(long, default_value_t = DEFAULT_MAX_STRIKES)]
    pub max_strikes: u32,
    #[arg(long, default_value = "30")]
    pub entry_fee: Decimal,
    #[arg(long, default_value = "20")]
    pub buyback_fee: Decimal,
}

#[derive(Debug, Args)]
pub struct BuybackArgs {
    pub player_id: i64,
    /// The player buys back in.
    #[arg(long, conflicts_with = "decline", required_unless_present = "decline")]
    pub accept: bool,
    /// The player declines the buyback.
    #[arg(long)]
    pub decline: bool,
    /// The buyback fee has been paid.
    #[arg(long, conflicts_with = "decline")]
    pub fee_paid: bool,
    /// Replace a decision that was already recorded.
    #[arg(long = "override")]
    pub override_decision: bool,
}

#[derive(Debug, Args)]
pub struct EnterGameArgs {
    #[arg(long)]
    pub week: u32,
    /// Identifier of the game; re-entering the same id updates it.
    #[arg(long)]
    pub id: String,
    pub home: String,
    pub away: String,
    pub home_score: i64,
    pub away_score: i64,
    /// The game has not finished yet.
    #[arg(long)]
    pub in_progress: bool,
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_pick_and_buyback() {
        let cli = Cli::try_parse_from(["survivor-pool", "--season", "2024", "pick", "7", "3", "kc"])
            .unwrap();
        assert_eq!(cli.season, 2024);
        assert!(matches!(
            cli.command,
            Command::Pick { player_id: 7, week: 3, ref team } if team == "kc"
        ));

        let cli = Cli::try_parse_from(["survivor-pool", "buyback", "7", "--accept", "--fee-paid"])
            .unwrap();
        assert!(matches!(
            cli.command,
            Command::Buyback(BuybackArgs { accept: true, fee_paid: true, .. })
        ));
        assert!(Cli::try_parse_from(["survivor-pool", "buyback", "7"]).is_err());
        assert!(Cli::try_parse_from(["survivor-pool", "buyback", "7", "--decline", "--fee-paid"]).is_err());
        assert!(
            Cli::try_parse_from(["survivor-pool", "buyback", "7", "--accept", "--decline"]).is_err()
        );

        let cli = Cli::try_parse_from(["survivor-pool", "buyback", "7", "--decline", "--override"])
            .unwrap();
        assert!(matches!(
            cli.command,
            Command::Buyback(BuybackArgs {
                accept: false,
                decline: true,
                fee_paid: false,
                override_decision: true,
                ..
            })
        ));
    }

    #[test]
    fn test_parse_admin_corrections() {
        let cli = Cli::try_parse_from(["survivor-pool", "buyback-fee", "7"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::BuybackFee { player_id: 7, unpaid: false }
        ));
        let cli = Cli::try_parse_from(["survivor-pool", "delete-pick", "12"]).unwrap();
        assert!(matches!(cli.command, Command::DeletePick { pick_id: 12 }));
        let cli = Cli::try_parse_from(["survivor-pool", "week-picks", "4"]).unwrap();
        assert!(matches!(cli.command, Command::WeekPicks { week: 4 }));
        let cli = Cli::try_parse_from(["survivor-pool", "-s", "2024", "players"]).unwrap();
        assert_eq!(cli.season, 2024);
        assert!(matches!(cli.command, Command::Players));
    }

    #[test]
    fn test_seed_defaults() {
        let cli = Cli::try_parse_from(["survivor-pool", "seed-season", "--kickoff", "2025-09-04"])
            .unwrap();
        let Command::SeedSeason(args) = cli.command else {
            panic!("expected seed-season");
        };
        assert_eq!(args.max_strikes, 2);
        assert_eq!(args.entry_fee, Decimal::new(30, 0));
        assert_eq!(args.buyback_fee, Decimal::new(20, 0));
    }
}
