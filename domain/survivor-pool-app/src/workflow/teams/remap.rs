use std::sync::Arc;

use crate::domain::{
    RepoCreateError, RepoUpdateError,
    team::{Team, TeamDirectory, TeamRepository, is_valid_abbreviation, normalize_abbreviation},
};

#[derive(Debug, thiserror::Error)]
pub enum RemapError {
    #[error("unknown team {0}")]
    UnknownTeam(String),
    #[error("{0} is not a valid team abbreviation")]
    InvalidAbbreviation(String),
    #[error("{0} is already in use")]
    AbbreviationTaken(String),
    #[error("storage error: {0}")]
    Storage(String),
}

#[async_trait::async_trait]
pub trait TeamAdminUseCase {
    async fn list_teams(&self) -> Result<Vec<Team>, RemapError>;
    /// Renames a team in place. The team keeps its id, so existing picks and
    /// games are untouched, and the old abbreviation keeps resolving as an alias.
    async fn remap_team(
        &self,
        current_abbreviation: &str,
        new_abbreviation: &str,
    ) -> Result<Team, RemapError>;
    async fn add_team_alias(&self, alias: &str, abbreviation: &str) -> Result<Team, RemapError>;
}

pub struct TeamAdminUseCaseImpl<T: TeamRepository> {
    team_repository: Arc<T>,
}

impl<T: TeamRepository> TeamAdminUseCaseImpl<T> {
    pub fn new(team_repository: Arc<T>) -> Self {
        Self { team_repository }
    }
}

impl<T: TeamRepository + Send + Sync + 'static> TeamAdminUseCaseImpl<T> {
    async fn directory(&self) -> Result<TeamDirectory, RemapError> {
        TeamDirectory::load(self.team_repository.as_ref())
            .await
            .map_err(|e| RemapError::Storage(e.to_string()))
    }
}

#[async_trait::async_trait]
impl<T: TeamRepository + Send + Sync + 'static> TeamAdminUseCase for TeamAdminUseCaseImpl<T> {
    async fn list_teams(&self) -> Result<Vec<Team>, RemapError> {
        let mut teams = self
            .team_repository
            .list_teams()
            .await
            .map_err(|e| RemapError::Storage(e.to_string()))?;
        teams.sort_by(|a, b| a.abbreviation.cmp(&b.abbreviation));
        Ok(teams)
    }

    async fn remap_team(
        &self,
        current_abbreviation: &str,
        new_abbreviation: &str,
    ) -> Result<Team, RemapError> {
        let new_abbreviation = normalize_abbreviation(new_abbreviation);
        if !is_valid_abbreviation(&new_abbreviation) {
            return Err(RemapError::InvalidAbbreviation(new_abbreviation));
        }
        let directory = self.directory().await?;
        let team = directory
            .current_holder(current_abbreviation)
            .cloned()
            .ok_or_else(|| RemapError::UnknownTeam(current_abbreviation.to_string()))?;
        if team.abbreviation == new_abbreviation {
            return Ok(team);
        }
        if directory.current_holder(&new_abbreviation).is_some() {
            return Err(RemapError::AbbreviationTaken(new_abbreviation));
        }

        self.team_repository
            .rename_team(team.id, &new_abbreviation)
            .await
            .map_err(|e| match e {
                RepoUpdateError::NotFound => RemapError::UnknownTeam(team.abbreviation.clone()),
                RepoUpdateError::Conflict => RemapError::AbbreviationTaken(new_abbreviation.clone()),
                RepoUpdateError::StorageError(e) => RemapError::Storage(e),
            })?;
        log::info!(
            "Remapped team {} from {} to {}",
            team.id,
            team.abbreviation,
            new_abbreviation
        );
        Ok(Team {
            abbreviation: new_abbreviation,
            ..team
        })
    }

    async fn add_team_alias(&self, alias: &str, abbreviation: &str) -> Result<Team, RemapError> {
        let alias = normalize_abbreviation(alias);
        if !is_valid_abbreviation(&alias) {
            return Err(RemapError::InvalidAbbreviation(alias));
        }
        let directory = self.directory().await?;
        let team = directory
            .resolve(abbreviation)
            .cloned()
            .ok_or_else(|| RemapError::UnknownTeam(abbreviation.to_string()))?;
        if let Some(existing) = directory.resolve(&alias) {
            if existing.id == team.id {
                return Ok(team);
            }
            return Err(RemapError::AbbreviationTaken(alias));
        }

        self.team_repository
            .add_alias(&alias, team.id)
            .await
            .map_err(|e| match e {
                RepoCreateError::Conflict => RemapError::AbbreviationTaken(alias.clone()),
                RepoCreateError::StorageError(e) => RemapError::Storage(e),
            })?;
        log::info!("Added alias {} for {}", alias, team.abbreviation);
        Ok(team)
    }
}
