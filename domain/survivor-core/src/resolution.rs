use crate::{IntegrityViolation, is_strike};

/// A finished game, reduced to what pick resolution needs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FinalGame<T> {
    pub home: T,
    pub away: T,
    pub home_won: Option<bool>,
    pub away_won: Option<bool>,
}

impl<T: PartialEq> FinalGame<T> {
    pub fn involves(&self, team: &T) -> bool {
        self.home == *team || self.away == *team
    }

    pub fn result_for(&self, team: &T) -> Option<bool> {
        if self.home == *team {
            self.home_won
        } else if self.away == *team {
            self.away_won
        } else {
            None
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PickResolution {
    /// No final game for the team in the pick's week (yet).
    Pending,
    /// The game is final but carries no winner for the team.
    Undetermined,
    Decided { team_won: bool },
}

impl PickResolution {
    pub fn team_won(&self) -> Option<bool> {
        match self {
            PickResolution::Decided { team_won } => Some(*team_won),
            PickResolution::Pending | PickResolution::Undetermined => None,
        }
    }

    pub fn is_strike(&self) -> bool {
        is_strike(self.team_won())
    }
}

/// Resolves a pick of `team` against the final games of the pick's week.
///
/// Games that do not involve `team` are ignored, so callers may pass every
/// final game of the week. More than one match means the week holds duplicate
/// games for the team, which is never resolved by picking one of them.
pub fn resolve_pick<'a, T, I>(team: &T, week_finals: I) -> Result<PickResolution, IntegrityViolation>
where
    T: PartialEq + 'a,
    I: IntoIterator<Item = &'a FinalGame<T>>,
{
    let matches: Vec<&FinalGame<T>> = week_finals
        .into_iter()
        .filter(|game| game.involves(team))
        .collect();

    match matches.as_slice() {
        [] => Ok(PickResolution::Pending),
        [game] => Ok(match game.result_for(team) {
            Some(team_won) => PickResolution::Decided { team_won },
            None => PickResolution::Undetermined,
        }),
        many => Err(IntegrityViolation::DuplicateGame(many.len())),
    }
}
