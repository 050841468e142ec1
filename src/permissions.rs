//! Permission resolution
//!
//! Turns raw collaborator and team membership data into the two lookup
//! sets consulted by the review selector.

use crate::config::GitHubConfig;
use crate::error::{Error, Result};
use crate::platform::PlatformService;
use crate::types::{Collaborator, PermissionSets, RepositoryPermission};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::debug;

/// Explicit privilege ranking of repository permissions
///
/// Levels are listed from lowest to highest privilege. A permission that does
/// not appear in the ranking (including `Unknown`) has no rank and never
/// satisfies a minimum.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionRanking(Vec<RepositoryPermission>);

impl Default for PermissionRanking {
    fn default() -> Self {
        Self(vec![
            RepositoryPermission::Read,
            RepositoryPermission::Triage,
            RepositoryPermission::Write,
            RepositoryPermission::Maintain,
            RepositoryPermission::Admin,
        ])
    }
}

impl PermissionRanking {
    /// Create a ranking from levels ordered lowest to highest
    pub fn new(levels: Vec<RepositoryPermission>) -> Result<Self> {
        let ranking = Self(levels);
        ranking.validate()?;
        Ok(ranking)
    }

    /// Check the ranking is non-empty, free of duplicates and of `Unknown`
    pub fn validate(&self) -> Result<()> {
        if self.0.is_empty() {
            return Err(Error::Config("permission ranking is empty".to_string()));
        }
        if self.0.contains(&RepositoryPermission::Unknown) {
            return Err(Error::Config(
                "permission ranking must not contain UNKNOWN".to_string(),
            ));
        }
        let mut seen = HashSet::new();
        for level in &self.0 {
            if !seen.insert(level) {
                return Err(Error::Config(format!(
                    "permission ranking lists {level} more than once"
                )));
            }
        }
        Ok(())
    }

    /// Rank of a permission (higher is more privileged), if it has one
    pub fn rank(&self, permission: RepositoryPermission) -> Option<usize> {
        if permission == RepositoryPermission::Unknown {
            return None;
        }
        self.0.iter().position(|p| *p == permission)
    }

    /// Whether `permission` meets or exceeds `minimum`
    pub fn meets_minimum(
        &self,
        permission: RepositoryPermission,
        minimum: RepositoryPermission,
    ) -> bool {
        match (self.rank(permission), self.rank(minimum)) {
            (Some(have), Some(need)) => have >= need,
            _ => false,
        }
    }

    /// Levels from lowest to highest
    pub fn levels(&self) -> &[RepositoryPermission] {
        &self.0
    }
}

/// Logins of collaborators whose permission meets `minimum`
pub fn filter_by_permission(
    collaborators: Vec<Collaborator>,
    minimum: RepositoryPermission,
    ranking: &PermissionRanking,
) -> HashSet<String> {
    collaborators
        .into_iter()
        .filter(|c| ranking.meets_minimum(c.permission, minimum))
        .map(|c| c.login)
        .collect()
}

/// Resolve the set of logins with at least `minimum` repository permission
pub async fn resolve_write_access(
    platform: &dyn PlatformService,
    owner: &str,
    repo: &str,
    minimum: RepositoryPermission,
    ranking: &PermissionRanking,
) -> Result<HashSet<String>> {
    let collaborators = platform.fetch_collaborators(owner, repo).await?;
    let total = collaborators.len();
    let logins = filter_by_permission(collaborators, minimum, ranking);
    debug!(
        owner,
        repo,
        %minimum,
        total,
        qualifying = logins.len(),
        "resolved write access"
    );
    Ok(logins)
}

/// Resolve the set of logins in the designated reviewer team
pub async fn resolve_designated_reviewers(
    platform: &dyn PlatformService,
    organization: &str,
    team_slug: &str,
) -> Result<HashSet<String>> {
    let members = platform.fetch_team_members(organization, team_slug).await?;
    debug!(organization, team_slug, count = members.len(), "resolved reviewer team");
    Ok(members.into_iter().collect())
}

/// Resolve both permission sets concurrently
pub async fn resolve_permission_sets(
    platform: &dyn PlatformService,
    config: &GitHubConfig,
) -> Result<PermissionSets> {
    let (write_access, designated_reviewers) = tokio::try_join!(
        resolve_write_access(
            platform,
            &config.organization,
            &config.repository,
            config.minimum_permission,
            &config.permission_ranking,
        ),
        resolve_designated_reviewers(platform, &config.organization, &config.reviewers_team),
    )?;

    Ok(PermissionSets {
        write_access,
        designated_reviewers,
    })
}
