use std::{
    collections::{HashMap, HashSet},
    sync::{Arc, Mutex},
};

use chrono::NaiveDate;

use crate::{
    domain::{
        GameId, PickId, PlayerId, RepoCreateError, RepoError, RepoRetrieveError, RepoUpdateError,
        SeasonYear, TeamId, WeekId,
        game::{Game, GameRepository, GameUpsert, RepoUpsertError, UpsertOutcome},
        pick::{NewPick, Pick, PickRepository, PickWriteError},
        player::{NewPlayer, Player, PlayerRepository, PlayerState},
        settings::{PoolSettings, PoolSettingsRepository},
        team::{Team, TeamAlias, TeamRepository, normalize_abbreviation},
        week::{NewWeek, Week, WeekRepository, regular_season_schedule},
    },
    ports::score_feed::{FeedError, FeedGame, ScoreFeed},
};

#[derive(Default)]
pub struct MockState {
    pub teams: Vec<Team>,
    pub aliases: Vec<TeamAlias>,
    pub weeks: Vec<Week>,
    pub games: Vec<Game>,
    pub picks: Vec<Pick>,
    pub players: Vec<Player>,
    pub settings: HashMap<SeasonYear, PoolSettings>,
    pub failing_picks: HashSet<PickId>,
    pub pick_result_writes: usize,
    next_id: i64,
}

impl MockState {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn push_week(&mut self, week: NewWeek) -> WeekId {
        let id = WeekId(self.next_id());
        self.weeks.push(Week {
            id,
            season_year: week.season_year,
            week_number: week.week_number,
            start_date: week.start_date,
            end_date: week.end_date,
            is_complete: false,
        });
        id
    }

    fn push_pick(&mut self, player_id: PlayerId, week_id: WeekId, team_id: TeamId) -> PickId {
        let id = PickId(self.next_id());
        self.picks.push(Pick {
            id,
            player_id,
            week_id,
            team_id,
            team_won: None,
            is_strike: false,
        });
        id
    }

    fn push_player(&mut self, season_year: SeasonYear, name: &str) -> PlayerId {
        let id = PlayerId(self.next_id());
        self.players.push(Player {
            id,
            season_year,
            name: name.to_string(),
            strikes: 0,
            is_active: true,
            is_eliminated: false,
            has_bought_back: None,
            entry_fee_paid: true,
            buyback_fee_paid: false,
        });
        id
    }

    fn week_season(&self, week_id: WeekId) -> Option<SeasonYear> {
        self.weeks
            .iter()
            .find(|week| week.id == week_id)
            .map(|week| week.season_year)
    }
}

/// In-memory store implementing every repository trait.
#[derive(Clone, Default)]
pub struct MockPoolStore {
    pub state: Arc<Mutex<MockState>>,
}

#[allow(unused)]
impl MockPoolStore {
    pub const TEAMS: [(&'static str, &'static str); 8] = [
        ("KC", "Kansas City Chiefs"),
        ("BUF", "Buffalo Bills"),
        ("SF", "San Francisco 49ers"),
        ("DAL", "Dallas Cowboys"),
        ("PHI", "Philadelphia Eagles"),
        ("WAS", "Washington Commanders"),
        ("DET", "Detroit Lions"),
        ("GB", "Green Bay Packers"),
    ];

    /// A store with a handful of teams, the standard 2024 settings and the
    /// 2024 regular season weeks.
    pub fn seeded() -> Self {
        let store = Self::default();
        {
            let mut state = store.state.lock().unwrap();
            for (abbreviation, name) in Self::TEAMS {
                let id = TeamId(state.next_id());
                state.teams.push(Team {
                    id,
                    abbreviation: abbreviation.to_string(),
                    name: name.to_string(),
                });
            }
            state.settings.insert(2024, PoolSettings::standard(2024));
        }
        for week in regular_season_schedule(2024, date(2024, 9, 5)) {
            store.insert_week(week);
        }
        store
    }

    pub fn insert_week(&self, week: NewWeek) -> WeekId {
        self.state.lock().unwrap().push_week(week)
    }

    pub fn team(&self, abbreviation: &str) -> TeamId {
        let state = self.state.lock().unwrap();
        state
            .teams
            .iter()
            .find(|team| team.abbreviation == abbreviation)
            .map(|team| team.id)
            .unwrap()
    }

    pub fn week(&self, season_year: SeasonYear, week_number: u32) -> WeekId {
        let state = self.state.lock().unwrap();
        state
            .weeks
            .iter()
            .find(|week| week.season_year == season_year && week.week_number == week_number)
            .map(|week| week.id)
            .unwrap()
    }

    pub fn insert_player(&self, season_year: SeasonYear, name: &str) -> PlayerId {
        self.state.lock().unwrap().push_player(season_year, name)
    }

    pub fn insert_pick(&self, player_id: PlayerId, week_id: WeekId, team_id: TeamId) -> PickId {
        self.state
            .lock()
            .unwrap()
            .push_pick(player_id, week_id, team_id)
    }

    /// Stores a game without any of the upsert checks.
    pub fn insert_game_unchecked(&self, game: GameUpsert) -> GameId {
        let mut state = self.state.lock().unwrap();
        let id = GameId(state.next_id());
        state.games.push(game.into_game(id, None));
        id
    }

    pub fn pick(&self, id: PickId) -> Pick {
        let state = self.state.lock().unwrap();
        state.picks.iter().find(|pick| pick.id == id).cloned().unwrap()
    }

    pub fn player(&self, id: PlayerId) -> Player {
        let state = self.state.lock().unwrap();
        state
            .players
            .iter()
            .find(|player| player.id == id)
            .cloned()
            .unwrap()
    }

    pub fn update_player(&self, id: PlayerId, update: impl FnOnce(&mut Player)) {
        let mut state = self.state.lock().unwrap();
        if let Some(player) = state.players.iter_mut().find(|player| player.id == id) {
            update(player);
        }
    }

    pub fn fail_writes_for(&self, pick_id: PickId) {
        self.state.lock().unwrap().failing_picks.insert(pick_id);
    }

    pub fn pick_result_writes(&self) -> usize {
        self.state.lock().unwrap().pick_result_writes
    }

    pub fn games(&self) -> Vec<Game> {
        self.state.lock().unwrap().games.clone()
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn final_game(external_id: &str, home: &str, away: &str, home_score: i64, away_score: i64) -> FeedGame {
    FeedGame {
        external_id: external_id.to_string(),
        home_abbreviation: home.to_string(),
        away_abbreviation: away.to_string(),
        home_score: Some(home_score),
        away_score: Some(away_score),
        completed: true,
        home_winner: None,
        away_winner: None,
        kickoff: None,
    }
}

pub fn scheduled_game(external_id: &str, home: &str, away: &str) -> FeedGame {
    FeedGame {
        external_id: external_id.to_string(),
        home_abbreviation: home.to_string(),
        away_abbreviation: away.to_string(),
        home_score: None,
        away_score: None,
        completed: false,
        home_winner: None,
        away_winner: None,
        kickoff: None,
    }
}

#[async_trait::async_trait]
impl TeamRepository for MockPoolStore {
    async fn list_teams(&self) -> Result<Vec<Team>, RepoError> {
        Ok(self.state.lock().unwrap().teams.clone())
    }

    async fn list_aliases(&self) -> Result<Vec<TeamAlias>, RepoError> {
        Ok(self.state.lock().unwrap().aliases.clone())
    }

    async fn rename_team(
        &self,
        team_id: TeamId,
        new_abbreviation: &str,
    ) -> Result<(), RepoUpdateError> {
        let mut state = self.state.lock().unwrap();
        if state
            .teams
            .iter()
            .any(|team| team.id != team_id && team.abbreviation == new_abbreviation)
        {
            return Err(RepoUpdateError::Conflict);
        }
        let team = state
            .teams
            .iter_mut()
            .find(|team| team.id == team_id)
            .ok_or(RepoUpdateError::NotFound)?;
        let old = std::mem::replace(&mut team.abbreviation, new_abbreviation.to_string());
        state.aliases.retain(|alias| alias.alias != old);
        state.aliases.push(TeamAlias {
            alias: old,
            team_id,
        });
        Ok(())
    }

    async fn add_alias(&self, alias: &str, team_id: TeamId) -> Result<(), RepoCreateError> {
        let mut state = self.state.lock().unwrap();
        let alias = normalize_abbreviation(alias);
        if state.aliases.iter().any(|existing| existing.alias == alias) {
            return Err(RepoCreateError::Conflict);
        }
        state.aliases.push(TeamAlias { alias, team_id });
        Ok(())
    }
}

#[async_trait::async_trait]
impl WeekRepository for MockPoolStore {
    async fn create_week(&self, week: NewWeek) -> Result<WeekId, RepoCreateError> {
        let mut state = self.state.lock().unwrap();
        if state.weeks.iter().any(|existing| {
            existing.season_year == week.season_year && existing.week_number == week.week_number
        }) {
            return Err(RepoCreateError::Conflict);
        }
        Ok(state.push_week(week))
    }

    async fn get_week(&self, id: WeekId) -> Result<Week, RepoRetrieveError> {
        let state = self.state.lock().unwrap();
        state
            .weeks
            .iter()
            .find(|week| week.id == id)
            .cloned()
            .ok_or(RepoRetrieveError::NotFound)
    }

    async fn find_week(
        &self,
        season_year: SeasonYear,
        week_number: u32,
    ) -> Result<Week, RepoRetrieveError> {
        let state = self.state.lock().unwrap();
        state
            .weeks
            .iter()
            .find(|week| week.season_year == season_year && week.week_number == week_number)
            .cloned()
            .ok_or(RepoRetrieveError::NotFound)
    }

    async fn list_weeks(&self, season_year: SeasonYear) -> Result<Vec<Week>, RepoError> {
        let state = self.state.lock().unwrap();
        let mut weeks: Vec<Week> = state
            .weeks
            .iter()
            .filter(|week| week.season_year == season_year)
            .cloned()
            .collect();
        weeks.sort_by_key(|week| week.week_number);
        Ok(weeks)
    }

    async fn set_week_complete(&self, id: WeekId, complete: bool) -> Result<(), RepoUpdateError> {
        let mut state = self.state.lock().unwrap();
        let week = state
            .weeks
            .iter_mut()
            .find(|week| week.id == id)
            .ok_or(RepoUpdateError::NotFound)?;
        week.is_complete = complete;
        Ok(())
    }
}

#[async_trait::async_trait]
impl GameRepository for MockPoolStore {
    async fn upsert_game(
        &self,
        game: GameUpsert,
    ) -> Result<(GameId, UpsertOutcome), RepoUpsertError> {
        let mut state = self.state.lock().unwrap();
        if state.games.iter().any(|existing| {
            existing.external_id != game.external_id
                && existing.week_id == game.week_id
                && (existing.involves(game.home_team_id) || existing.involves(game.away_team_id))
        }) {
            return Err(RepoUpsertError::Conflict(format!(
                "a team of game {} already plays in week {}",
                game.external_id, game.week_id
            )));
        }
        match state
            .games
            .iter()
            .position(|existing| existing.external_id == game.external_id)
        {
            Some(index) => {
                let existing = &state.games[index];
                if !game.differs_from(existing) {
                    return Ok((existing.id, UpsertOutcome::Unchanged));
                }
                let id = existing.id;
                let kickoff = existing.kickoff;
                state.games[index] = game.into_game(id, kickoff);
                Ok((id, UpsertOutcome::Updated))
            }
            None => {
                let id = GameId(state.next_id());
                state.games.push(game.into_game(id, None));
                Ok((id, UpsertOutcome::Created))
            }
        }
    }

    async fn list_games_for_week(&self, week_id: WeekId) -> Result<Vec<Game>, RepoError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .games
            .iter()
            .filter(|game| game.week_id == week_id)
            .cloned()
            .collect())
    }

    async fn list_final_games(
        &self,
        season_year: Option<SeasonYear>,
    ) -> Result<Vec<Game>, RepoError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .games
            .iter()
            .filter(|game| game.as_final().is_some())
            .filter(|game| {
                season_year.is_none_or(|season| state.week_season(game.week_id) == Some(season))
            })
            .cloned()
            .collect())
    }
}

#[async_trait::async_trait]
impl PickRepository for MockPoolStore {
    async fn create_pick(&self, pick: NewPick) -> Result<PickId, PickWriteError> {
        let mut state = self.state.lock().unwrap();
        let own = state.picks.iter().filter(|p| p.player_id == pick.player_id);
        for existing in own {
            if existing.team_id == pick.team_id {
                return Err(PickWriteError::TeamAlreadyUsed);
            }
            if existing.week_id == pick.week_id {
                return Err(PickWriteError::WeekAlreadyPicked);
            }
        }
        Ok(state.push_pick(pick.player_id, pick.week_id, pick.team_id))
    }

    async fn get_pick(&self, id: PickId) -> Result<Pick, RepoRetrieveError> {
        let state = self.state.lock().unwrap();
        state
            .picks
            .iter()
            .find(|pick| pick.id == id)
            .cloned()
            .ok_or(RepoRetrieveError::NotFound)
    }

    async fn change_pick_team(&self, id: PickId, team_id: TeamId) -> Result<(), PickWriteError> {
        let mut state = self.state.lock().unwrap();
        let player_id = state
            .picks
            .iter()
            .find(|pick| pick.id == id)
            .map(|pick| pick.player_id)
            .ok_or(PickWriteError::NotFound)?;
        if state
            .picks
            .iter()
            .any(|pick| pick.id != id && pick.player_id == player_id && pick.team_id == team_id)
        {
            return Err(PickWriteError::TeamAlreadyUsed);
        }
        if let Some(pick) = state.picks.iter_mut().find(|pick| pick.id == id) {
            pick.team_id = team_id;
            pick.team_won = None;
            pick.is_strike = false;
        }
        Ok(())
    }

    async fn list_picks(&self, season_year: Option<SeasonYear>) -> Result<Vec<Pick>, RepoError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .picks
            .iter()
            .filter(|pick| {
                season_year.is_none_or(|season| state.week_season(pick.week_id) == Some(season))
            })
            .cloned()
            .collect())
    }

    async fn list_player_picks(&self, player_id: PlayerId) -> Result<Vec<Pick>, RepoError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .picks
            .iter()
            .filter(|pick| pick.player_id == player_id)
            .cloned()
            .collect())
    }

    async fn list_week_picks(&self, week_id: WeekId) -> Result<Vec<Pick>, RepoError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .picks
            .iter()
            .filter(|pick| pick.week_id == week_id)
            .cloned()
            .collect())
    }

    async fn delete_pick(&self, id: PickId) -> Result<(), RepoUpdateError> {
        let mut state = self.state.lock().unwrap();
        let index = state
            .picks
            .iter()
            .position(|pick| pick.id == id)
            .ok_or(RepoUpdateError::NotFound)?;
        state.picks.remove(index);
        Ok(())
    }

    async fn set_pick_result(
        &self,
        id: PickId,
        team_won: Option<bool>,
    ) -> Result<(), RepoUpdateError> {
        let mut state = self.state.lock().unwrap();
        if state.failing_picks.contains(&id) {
            return Err(RepoUpdateError::StorageError("disk I/O error".to_string()));
        }
        state.pick_result_writes += 1;
        let pick = state
            .picks
            .iter_mut()
            .find(|pick| pick.id == id)
            .ok_or(RepoUpdateError::NotFound)?;
        pick.team_won = team_won;
        pick.is_strike = team_won == Some(false);
        Ok(())
    }
}

#[async_trait::async_trait]
impl PlayerRepository for MockPoolStore {
    async fn create_player(&self, player: NewPlayer) -> Result<PlayerId, RepoCreateError> {
        let mut state = self.state.lock().unwrap();
        if state
            .players
            .iter()
            .any(|p| p.season_year == player.season_year && p.name == player.name)
        {
            return Err(RepoCreateError::Conflict);
        }
        let id = state.push_player(player.season_year, &player.name);
        if let Some(created) = state.players.last_mut() {
            created.entry_fee_paid = player.entry_fee_paid;
        }
        Ok(id)
    }

    async fn get_player(&self, id: PlayerId) -> Result<Player, RepoRetrieveError> {
        let state = self.state.lock().unwrap();
        state
            .players
            .iter()
            .find(|player| player.id == id)
            .cloned()
            .ok_or(RepoRetrieveError::NotFound)
    }

    async fn list_players(&self, season_year: SeasonYear) -> Result<Vec<Player>, RepoError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .players
            .iter()
            .filter(|player| player.season_year == season_year)
            .cloned()
            .collect())
    }

    async fn save_player_state(
        &self,
        id: PlayerId,
        player_state: PlayerState,
    ) -> Result<(), RepoUpdateError> {
        let mut state = self.state.lock().unwrap();
        let player = state
            .players
            .iter_mut()
            .find(|player| player.id == id)
            .ok_or(RepoUpdateError::NotFound)?;
        player.strikes = player_state.strikes;
        player.is_active = player_state.is_active;
        player.is_eliminated = player_state.is_eliminated;
        Ok(())
    }

    async fn set_buyback(
        &self,
        id: PlayerId,
        bought_back: bool,
        fee_paid: bool,
    ) -> Result<(), RepoUpdateError> {
        let mut state = self.state.lock().unwrap();
        let player = state
            .players
            .iter_mut()
            .find(|player| player.id == id)
            .ok_or(RepoUpdateError::NotFound)?;
        player.has_bought_back = Some(bought_back);
        player.buyback_fee_paid = fee_paid;
        Ok(())
    }

    async fn set_entry_fee_paid(&self, id: PlayerId, paid: bool) -> Result<(), RepoUpdateError> {
        let mut state = self.state.lock().unwrap();
        let player = state
            .players
            .iter_mut()
            .find(|player| player.id == id)
            .ok_or(RepoUpdateError::NotFound)?;
        player.entry_fee_paid = paid;
        Ok(())
    }

    async fn set_buyback_fee_paid(&self, id: PlayerId, paid: bool) -> Result<(), RepoUpdateError> {
        let mut state = self.state.lock().unwrap();
        let player = state
            .players
            .iter_mut()
            .find(|player| player.id == id)
            .ok_or(RepoUpdateError::NotFound)?;
        player.buyback_fee_paid = paid;
        Ok(())
    }
}

#[async_trait::async_trait]
impl PoolSettingsRepository for MockPoolStore {
    async fn get_settings(
        &self,
        season_year: SeasonYear,
    ) -> Result<PoolSettings, RepoRetrieveError> {
        let state = self.state.lock().unwrap();
        state
            .settings
            .get(&season_year)
            .copied()
            .ok_or(RepoRetrieveError::NotFound)
    }

    async fn save_settings(&self, settings: &PoolSettings) -> Result<(), RepoError> {
        let mut state = self.state.lock().unwrap();
        state.settings.insert(settings.season_year, *settings);
        Ok(())
    }
}

#[derive(Clone, Default)]
pub struct MockScoreFeed {
    pub weeks: Arc<Mutex<HashMap<(SeasonYear, u32), Vec<FeedGame>>>>,
    pub failing_weeks: Arc<Mutex<HashSet<u32>>>,
    pub requests: Arc<Mutex<Vec<u32>>>,
}

#[allow(unused)]
impl MockScoreFeed {
    pub fn set_week(&self, season_year: SeasonYear, week_number: u32, games: Vec<FeedGame>) {
        self.weeks
            .lock()
            .unwrap()
            .insert((season_year, week_number), games);
    }

    pub fn fail_week(&self, week_number: u32) {
        self.failing_weeks.lock().unwrap().insert(week_number);
    }

    pub fn requests(&self) -> Vec<u32> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl ScoreFeed for MockScoreFeed {
    async fn fetch_week(
        &self,
        season_year: SeasonYear,
        week_number: u32,
    ) -> Result<Vec<FeedGame>, FeedError> {
        self.requests.lock().unwrap().push(week_number);
        if self.failing_weeks.lock().unwrap().contains(&week_number) {
            return Err(FeedError::Unavailable("connection reset".to_string()));
        }
        Ok(self
            .weeks
            .lock()
            .unwrap()
            .get(&(season_year, week_number))
            .cloned()
            .unwrap_or_default())
    }
}
