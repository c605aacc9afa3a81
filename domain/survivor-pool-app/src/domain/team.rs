use std::collections::HashMap;

use crate::domain::{RepoCreateError, RepoError, RepoUpdateError, TeamId};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Team {
    pub id: TeamId,
    pub abbreviation: String,
    pub name: String,
}

/// A historical or feed specific abbreviation of a team.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TeamAlias {
    pub alias: String,
    pub team_id: TeamId,
}

#[async_trait::async_trait]
pub trait TeamRepository {
    async fn list_teams(&self) -> Result<Vec<Team>, RepoError>;
    async fn list_aliases(&self) -> Result<Vec<TeamAlias>, RepoError>;
    /// Replaces the abbreviation of a team and keeps the old one as an alias,
    /// in a single transaction.
    async fn rename_team(
        &self,
        team_id: TeamId,
        new_abbreviation: &str,
    ) -> Result<(), RepoUpdateError>;
    async fn add_alias(&self, alias: &str, team_id: TeamId) -> Result<(), RepoCreateError>;
}

pub fn normalize_abbreviation(abbreviation: &str) -> String {
    abbreviation.trim().to_ascii_uppercase()
}

pub fn is_valid_abbreviation(abbreviation: &str) -> bool {
    let len = abbreviation.len();
    (2..=4).contains(&len) && abbreviation.chars().all(|c| c.is_ascii_alphabetic())
}

/// Case-insensitive lookup of teams by abbreviation or alias.
///
/// Current abbreviations always win over aliases, so an alias that was later
/// handed to another team does not shadow that team.
#[derive(Clone, Debug, Default)]
pub struct TeamDirectory {
    teams: HashMap<TeamId, Team>,
    by_abbreviation: HashMap<String, TeamId>,
}

impl TeamDirectory {
    pub fn new(teams: Vec<Team>, aliases: Vec<TeamAlias>) -> Self {
        let mut by_abbreviation = HashMap::new();
        for alias in aliases {
            by_abbreviation.insert(normalize_abbreviation(&alias.alias), alias.team_id);
        }
        for team in &teams {
            by_abbreviation.insert(normalize_abbreviation(&team.abbreviation), team.id);
        }
        Self {
            teams: teams.into_iter().map(|team| (team.id, team)).collect(),
            by_abbreviation,
        }
    }

    pub async fn load<T: TeamRepository + Send + Sync>(repo: &T) -> Result<Self, RepoError> {
        let teams = repo.list_teams().await?;
        let aliases = repo.list_aliases().await?;
        Ok(Self::new(teams, aliases))
    }

    pub fn resolve(&self, abbreviation: &str) -> Option<&Team> {
        self.by_abbreviation
            .get(&normalize_abbreviation(abbreviation))
            .and_then(|id| self.teams.get(id))
    }

    pub fn get(&self, team_id: TeamId) -> Option<&Team> {
        self.teams.get(&team_id)
    }

    /// The team currently holding `abbreviation`, ignoring aliases.
    pub fn current_holder(&self, abbreviation: &str) -> Option<&Team> {
        let abbreviation = normalize_abbreviation(abbreviation);
        self.teams
            .values()
            .find(|team| normalize_abbreviation(&team.abbreviation) == abbreviation)
    }

    pub fn abbreviation(&self, team_id: TeamId) -> &str {
        self.teams
            .get(&team_id)
            .map(|team| team.abbreviation.as_str())
            .unwrap_or("???")
    }

    pub fn len(&self) -> usize {
        self.teams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.teams.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn team(id: i64, abbreviation: &str) -> Team {
        Team {
            id: TeamId(id),
            abbreviation: abbreviation.to_string(),
            name: format!("Team {}", abbreviation),
        }
    }

    #[test]
    fn test_resolve_is_case_insensitive() {
        let directory = TeamDirectory::new(vec![team(1, "KC"), team(2, "BUF")], vec![]);
        assert_eq!(directory.resolve("kc").map(|t| t.id), Some(TeamId(1)));
        assert_eq!(directory.resolve(" Buf ").map(|t| t.id), Some(TeamId(2)));
        assert!(directory.resolve("NYJ").is_none());
    }

    #[test]
    fn test_aliases_resolve_to_canonical_team() {
        let directory = TeamDirectory::new(
            vec![team(32, "WAS")],
            vec![TeamAlias {
                alias: "WSH".to_string(),
                team_id: TeamId(32),
            }],
        );
        let resolved = directory.resolve("wsh").unwrap();
        assert_eq!(resolved.id, TeamId(32));
        assert_eq!(resolved.abbreviation, "WAS");
        assert!(directory.current_holder("WSH").is_none());
    }

    #[test]
    fn test_current_abbreviation_wins_over_alias() {
        let directory = TeamDirectory::new(
            vec![team(1, "OAK"), team(2, "LV")],
            vec![TeamAlias {
                alias: "LV".to_string(),
                team_id: TeamId(1),
            }],
        );
        assert_eq!(directory.resolve("LV").map(|t| t.id), Some(TeamId(2)));
    }

    #[test]
    fn test_abbreviation_validation() {
        assert!(is_valid_abbreviation("WAS"));
        assert!(is_valid_abbreviation("KC"));
        assert!(!is_valid_abbreviation("W"));
        assert!(!is_valid_abbreviation("WAS1"));
        assert!(!is_valid_abbreviation("TOOLONG"));
    }
}
