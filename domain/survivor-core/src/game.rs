use std::cmp::Ordering;

use crate::IntegrityViolation;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GameStatus {
    Scheduled,
    InProgress,
    Final,
}

impl GameStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            GameStatus::Scheduled => "scheduled",
            GameStatus::InProgress => "in_progress",
            GameStatus::Final => "final",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "scheduled" => Some(GameStatus::Scheduled),
            "in_progress" => Some(GameStatus::InProgress),
            "final" => Some(GameStatus::Final),
            _ => None,
        }
    }
}

impl std::fmt::Display for GameStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A game result as delivered by a score feed, before any validation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReportedScore {
    pub completed: bool,
    pub home_score: Option<i64>,
    pub away_score: Option<i64>,
    pub home_winner: Option<bool>,
    pub away_winner: Option<bool>,
}

/// The normalized form of a [`ReportedScore`] that is safe to store.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SettledScore {
    pub status: GameStatus,
    pub home_score: Option<u32>,
    pub away_score: Option<u32>,
    pub home_won: Option<bool>,
    pub away_won: Option<bool>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Verdict {
    Home,
    Away,
    Tie,
}

fn checked_score(score: Option<i64>) -> Result<Option<u32>, IntegrityViolation> {
    match score {
        None => Ok(None),
        Some(value) => u32::try_from(value)
            .map(Some)
            .map_err(|_| IntegrityViolation::InvalidScore(value)),
    }
}

/// Normalizes a feed report into a storable score.
///
/// Unfinished games never carry a winner. Finished games take the declared
/// winner flags when the feed sends them and fall back to comparing scores
/// otherwise; equal scores are a tie where neither side won. A finished game
/// with neither winner flags nor scores keeps both winners unknown.
pub fn settle(report: &ReportedScore) -> Result<SettledScore, IntegrityViolation> {
    let home_score = checked_score(report.home_score)?;
    let away_score = checked_score(report.away_score)?;

    let declared = match (report.home_winner, report.away_winner) {
        (Some(true), Some(true)) => return Err(IntegrityViolation::ContradictoryWinners),
        (Some(true), _) => Some(Verdict::Home),
        (_, Some(true)) => Some(Verdict::Away),
        (Some(false), Some(false)) => Some(Verdict::Tie),
        _ => None,
    };

    if !report.completed {
        let status = if home_score.is_some() || away_score.is_some() {
            GameStatus::InProgress
        } else {
            GameStatus::Scheduled
        };
        return Ok(SettledScore {
            status,
            home_score,
            away_score,
            home_won: None,
            away_won: None,
        });
    }

    let scored = match (home_score, away_score) {
        (Some(home), Some(away)) => Some((
            match home.cmp(&away) {
                Ordering::Greater => Verdict::Home,
                Ordering::Less => Verdict::Away,
                Ordering::Equal => Verdict::Tie,
            },
            home,
            away,
        )),
        _ => None,
    };

    let verdict = match (declared, scored) {
        (Some(declared), Some((scored, home, away))) if declared != scored => {
            return Err(IntegrityViolation::WinnerDisagreesWithScore {
                home_score: home,
                away_score: away,
            });
        }
        (Some(declared), _) => Some(declared),
        (None, scored) => scored.map(|(verdict, _, _)| verdict),
    };

    let (home_won, away_won) = match verdict {
        Some(Verdict::Home) => (Some(true), Some(false)),
        Some(Verdict::Away) => (Some(false), Some(true)),
        Some(Verdict::Tie) => (Some(false), Some(false)),
        None => (None, None),
    };

    Ok(SettledScore {
        status: GameStatus::Final,
        home_score,
        away_score,
        home_won,
        away_won,
    })
}
