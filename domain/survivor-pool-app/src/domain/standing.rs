use survivor_core::{Entrant, Standing, is_strike};

use crate::domain::{
    PlayerId,
    pick::Pick,
    player::{Player, PlayerState},
};

/// A player's standing as derived from the current pick data.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Evaluation {
    pub strikes: u32,
    pub standing: Standing,
}

impl Evaluation {
    pub fn state(&self) -> PlayerState {
        PlayerState {
            strikes: self.strikes,
            is_active: self.standing.is_active(),
            is_eliminated: self.standing.is_eliminated(),
        }
    }
}

pub fn count_strikes<'a>(picks: impl IntoIterator<Item = &'a Pick>) -> u32 {
    picks
        .into_iter()
        .filter(|pick| is_strike(pick.team_won))
        .count() as u32
}

/// Derives a player's standing from `picks`, which must be all of that
/// player's picks.
pub fn evaluate(player: &Player, picks: &[Pick], max_strikes: u32) -> Evaluation {
    let strikes = count_strikes(picks.iter().filter(|pick| pick.player_id == player.id));
    Evaluation {
        strikes,
        standing: Standing::derive(strikes, player.buyback_decision(), max_strikes),
    }
}

pub fn entrant(player: &Player, evaluation: &Evaluation) -> Entrant<PlayerId> {
    Entrant {
        id: player.id,
        strikes: evaluation.strikes,
        standing: evaluation.standing,
        entry_fee_paid: player.entry_fee_paid,
        bought_back: player.has_bought_back == Some(true),
        buyback_fee_paid: player.buyback_fee_paid,
    }
}

#[cfg(test)]
mod tests {
    use crate::domain::{PickId, TeamId, WeekId};

    use super::*;

    fn player(has_bought_back: Option<bool>) -> Player {
        Player {
            id: PlayerId(1),
            season_year: 2024,
            name: "X".to_string(),
            strikes: 0,
            is_active: true,
            is_eliminated: false,
            has_bought_back,
            entry_fee_paid: true,
            buyback_fee_paid: false,
        }
    }

    fn pick(id: i64, player: i64, team_won: Option<bool>) -> Pick {
        Pick {
            id: PickId(id),
            player_id: PlayerId(player),
            week_id: WeekId(id),
            team_id: TeamId(id),
            team_won,
            is_strike: team_won == Some(false),
        }
    }

    #[test]
    fn test_evaluate_ignores_stored_strikes() {
        let mut stale = player(None);
        stale.strikes = 5;
        stale.is_eliminated = true;
        stale.is_active = false;

        let picks = vec![pick(1, 1, Some(false)), pick(2, 1, Some(true)), pick(3, 1, None)];
        let evaluation = evaluate(&stale, &picks, 2);
        assert_eq!(evaluation.strikes, 1);
        assert_eq!(evaluation.standing, Standing::Alive);
        assert_eq!(
            evaluation.state(),
            PlayerState {
                strikes: 1,
                is_active: true,
                is_eliminated: false
            }
        );
    }

    #[test]
    fn test_evaluate_only_counts_own_picks() {
        let picks = vec![pick(1, 1, Some(false)), pick(2, 2, Some(false)), pick(3, 2, Some(false))];
        assert_eq!(evaluate(&player(None), &picks, 2).strikes, 1);
    }

    #[test]
    fn test_entrant_only_counts_accepted_buyback() {
        let evaluation = Evaluation {
            strikes: 2,
            standing: Standing::Eliminated,
        };
        assert!(!entrant(&player(Some(false)), &evaluation).bought_back);
        assert!(entrant(&player(Some(true)), &evaluation).bought_back);
    }
}
