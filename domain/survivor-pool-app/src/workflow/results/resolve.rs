use std::{
    collections::{BTreeSet, HashMap},
    sync::Arc,
};

use survivor_core::{FinalGame, PickResolution, resolve_pick};

use crate::domain::{
    PickId, PlayerId, SeasonYear, TeamId, WeekId,
    game::GameRepository,
    pick::{Pick, PickRepository},
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FlaggedPick {
    pub pick_id: PickId,
    pub player_id: PlayerId,
    pub reason: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResolutionSummary {
    /// Picks that received their first result.
    pub resolved: Vec<PickId>,
    /// Picks whose stored result was overwritten, including results cleared
    /// because their game is no longer final.
    pub corrected: Vec<PickId>,
    pub unchanged: usize,
    pub pending: Vec<PickId>,
    /// Picks that need manual review, e.g. a final game without a winner.
    pub flagged: Vec<FlaggedPick>,
    pub failed: Vec<FlaggedPick>,
    pub affected_players: BTreeSet<PlayerId>,
}

#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("storage error: {0}")]
    Storage(String),
}

#[async_trait::async_trait]
pub trait ResolvePicksUseCase {
    /// Recomputes the result of every pick in scope from the final games.
    async fn resolve_pending_picks(
        &self,
        season_year: Option<SeasonYear>,
    ) -> Result<ResolutionSummary, ResolveError>;
}

pub struct ResolvePicksUseCaseImpl<K: PickRepository, G: GameRepository> {
    pick_repository: Arc<K>,
    game_repository: Arc<G>,
}

impl<K: PickRepository, G: GameRepository> ResolvePicksUseCaseImpl<K, G> {
    pub fn new(pick_repository: Arc<K>, game_repository: Arc<G>) -> Self {
        Self {
            pick_repository,
            game_repository,
        }
    }
}

impl<K: PickRepository + Send + Sync + 'static, G: GameRepository + Send + Sync + 'static>
    ResolvePicksUseCaseImpl<K, G>
{
    async fn write_result(
        &self,
        pick: &Pick,
        team_won: Option<bool>,
        summary: &mut ResolutionSummary,
    ) -> bool {
        if pick.team_won == team_won {
            summary.unchanged += 1;
            return true;
        }
        match self.pick_repository.set_pick_result(pick.id, team_won).await {
            Ok(()) => {
                if pick.team_won.is_none() {
                    summary.resolved.push(pick.id);
                } else {
                    summary.corrected.push(pick.id);
                }
                summary.affected_players.insert(pick.player_id);
                true
            }
            Err(e) => {
                log::error!("Failed to store result of pick {}: {}", pick.id, e);
                summary.failed.push(FlaggedPick {
                    pick_id: pick.id,
                    player_id: pick.player_id,
                    reason: e.to_string(),
                });
                false
            }
        }
    }
}

#[async_trait::async_trait]
impl<K: PickRepository + Send + Sync + 'static, G: GameRepository + Send + Sync + 'static>
    ResolvePicksUseCase for ResolvePicksUseCaseImpl<K, G>
{
    async fn resolve_pending_picks(
        &self,
        season_year: Option<SeasonYear>,
    ) -> Result<ResolutionSummary, ResolveError> {
        let picks = self
            .pick_repository
            .list_picks(season_year)
            .await
            .map_err(|e| ResolveError::Storage(e.to_string()))?;
        let games = self
            .game_repository
            .list_final_games(season_year)
            .await
            .map_err(|e| ResolveError::Storage(e.to_string()))?;

        let mut finals: HashMap<WeekId, Vec<FinalGame<TeamId>>> = HashMap::new();
        for game in &games {
            if let Some(final_game) = game.as_final() {
                finals.entry(game.week_id).or_default().push(final_game);
            }
        }
        let no_games = Vec::new();

        let mut summary = ResolutionSummary::default();
        for pick in &picks {
            let week_finals = finals.get(&pick.week_id).unwrap_or(&no_games);
            match resolve_pick(&pick.team_id, week_finals) {
                Ok(PickResolution::Decided { team_won }) => {
                    self.write_result(pick, Some(team_won), &mut summary).await;
                }
                Ok(PickResolution::Pending) => {
                    if self.write_result(pick, None, &mut summary).await {
                        summary.pending.push(pick.id);
                    }
                }
                Ok(PickResolution::Undetermined) => {
                    log::warn!(
                        "Pick {} of player {}: final game has no winner, flagged for review",
                        pick.id,
                        pick.player_id
                    );
                    if self.write_result(pick, None, &mut summary).await {
                        summary.flagged.push(FlaggedPick {
                            pick_id: pick.id,
                            player_id: pick.player_id,
                            reason: "final game has no recorded winner".to_string(),
                        });
                    }
                }
                Err(violation) => {
                    log::error!(
                        "Data corruption: pick {} of player {} (team {}, week {}): {}",
                        pick.id,
                        pick.player_id,
                        pick.team_id,
                        pick.week_id,
                        violation
                    );
                    summary.failed.push(FlaggedPick {
                        pick_id: pick.id,
                        player_id: pick.player_id,
                        reason: violation.to_string(),
                    });
                }
            }
        }

        log::info!(
            "Resolved {} picks: {} new, {} corrected, {} unchanged, {} pending, {} flagged, {} failed",
            picks.len(),
            summary.resolved.len(),
            summary.corrected.len(),
            summary.unchanged,
            summary.pending.len(),
            summary.flagged.len(),
            summary.failed.len()
        );
        Ok(summary)
    }
}
