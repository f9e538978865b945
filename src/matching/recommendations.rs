// src/matching/recommendations.rs
use serde::Serialize;
use std::collections::HashSet;

use crate::app_log;
use crate::error::{ServiceError, ServiceResult};
use crate::matching::engine::MatchEngine;
use crate::matching::overlap::{estimate_overlap, union_skills};
use crate::matching::prompts::{recommendation_prompt, RECOMMENDATION_SYSTEM};
use crate::matching::reasons::fallback_reason;
use crate::store::{ProfileRepository, ProjectRepository, WorkspaceRepository};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub freelancer_id: String,
    pub freelancer_name: Option<String>,
    pub freelancer_email: String,
    pub skills: Vec<String>,
    pub match_percentage: i64,
    pub reason: String,
}

impl<'a> MatchEngine<'a> {
    /// Rank non-member candidates against the union of the workspace's
    /// required skills. Nothing is persisted.
    pub async fn recommend_for_workspace(
        &self,
        workspace_id: &str,
    ) -> ServiceResult<Vec<Recommendation>> {
        let workspaces = WorkspaceRepository::new(self.pool);
        let workspace = workspaces
            .find_by_id(workspace_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Workspace not found"))?;

        let projects = ProjectRepository::new(self.pool)
            .list_for_workspace(workspace_id)
            .await?;
        let needed = union_skills(projects.iter().map(|p| p.required_skills.as_slice()));

        let members: HashSet<String> = workspaces
            .list_member_ids(workspace_id)
            .await?
            .into_iter()
            .collect();

        let candidates = ProfileRepository::new(self.pool)
            .list_candidates(&self.config.candidate_roles)
            .await?;

        app_log!(
            info,
            "Recommending for workspace {}: {} skills needed, {} candidates, {} members",
            workspace_id,
            needed.len(),
            candidates.len(),
            members.len()
        );

        let reasons = self.reasons();
        let threshold = self.config.recommendation_threshold;
        let mut recommendations = Vec::new();

        for candidate in candidates
            .iter()
            .filter(|c| !members.contains(&c.profile_id))
        {
            let overlap = estimate_overlap(&needed, &candidate.skills);
            if !overlap.meets(threshold) {
                continue;
            }

            let prompt = recommendation_prompt(&workspace.name, &needed, projects.len(), candidate);
            let (reason, _) = reasons
                .explain(
                    RECOMMENDATION_SYSTEM,
                    &prompt,
                    fallback_reason(&overlap, candidate.years_experience),
                )
                .await;

            recommendations.push(Recommendation {
                freelancer_id: candidate.profile_id.clone(),
                freelancer_name: candidate.full_name.clone(),
                freelancer_email: candidate.email.clone(),
                skills: candidate.skills.clone(),
                match_percentage: overlap.rounded(),
                reason,
            });
        }

        recommendations.sort_by(|a, b| b.match_percentage.cmp(&a.match_percentage));
        Ok(recommendations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::MatchingConfig;
    use crate::store::models::{UserRole, WorkspaceRole};
    use crate::store::MatchRepository;
    use crate::test_support::{
        seed_freelancer, seed_profile, seed_project, seed_workspace, test_db, FailingGenerator,
        FixedGenerator,
    };

    #[tokio::test]
    async fn ranks_non_members_by_overlap() {
        let db = test_db().await;
        let owner = seed_profile(&db, "owner@example.com", UserRole::ProjectOwner).await;
        let workspace = seed_workspace(&db, &owner.id, "Studio").await;
        seed_project(&db, &owner.id, Some(&workspace.id), "Web", &["React", "Node.js"]).await;
        seed_project(&db, &owner.id, Some(&workspace.id), "Data", &["react", "Python"]).await;

        let partial = seed_freelancer(&db, "partial@example.com", &["React"], Some(2)).await;
        let full = seed_freelancer(&db, "full@example.com", &["React", "Node", "Python"], None).await;
        seed_freelancer(&db, "none@example.com", &["Kubernetes"], None).await;

        let generator = FixedGenerator::new("Great addition.");
        let config = MatchingConfig::default();
        let recommendations = MatchEngine::new(db.pool(), &generator, &config)
            .recommend_for_workspace(&workspace.id)
            .await
            .unwrap();

        let ids: Vec<_> = recommendations.iter().map(|r| r.freelancer_id.as_str()).collect();
        assert_eq!(ids, vec![full.id.as_str(), partial.id.as_str()]);
        assert_eq!(recommendations[0].match_percentage, 100);
        assert_eq!(recommendations[1].match_percentage, 33);
        assert_eq!(recommendations[1].reason, "Great addition.");

        let call = &generator.calls()[0];
        assert_eq!(call.system, RECOMMENDATION_SYSTEM);
        assert!(call.user.contains("Workspace Skills Needed: React, Node.js, Python"));
        assert!(call.user.contains("Projects: 2"));
    }

    #[tokio::test]
    async fn members_are_never_recommended() {
        let db = test_db().await;
        let owner = seed_profile(&db, "owner@example.com", UserRole::ProjectOwner).await;
        let workspace = seed_workspace(&db, &owner.id, "Studio").await;
        seed_project(&db, &owner.id, Some(&workspace.id), "Engine", &["Rust"]).await;
        let member = seed_freelancer(&db, "member@example.com", &["Rust"], Some(9)).await;
        let outsider = seed_freelancer(&db, "outsider@example.com", &["Rust"], None).await;
        WorkspaceRepository::new(db.pool())
            .add_member(&workspace.id, &member.id, WorkspaceRole::Member)
            .await
            .unwrap();

        let config = MatchingConfig::default();
        let recommendations = MatchEngine::new(db.pool(), &FailingGenerator, &config)
            .recommend_for_workspace(&workspace.id)
            .await
            .unwrap();

        assert_eq!(recommendations.len(), 1);
        assert_eq!(recommendations[0].freelancer_id, outsider.id);
        assert_eq!(
            recommendations[0].reason,
            "Strong skill match with 1 of 1 required skills (100% overlap)."
        );
    }

    #[tokio::test]
    async fn workspace_without_projects_recommends_nobody() {
        let db = test_db().await;
        let owner = seed_profile(&db, "owner@example.com", UserRole::ProjectOwner).await;
        let workspace = seed_workspace(&db, &owner.id, "Empty").await;
        seed_freelancer(&db, "dev@example.com", &["Rust"], None).await;

        let config = MatchingConfig::default();
        let recommendations = MatchEngine::new(db.pool(), &FailingGenerator, &config)
            .recommend_for_workspace(&workspace.id)
            .await
            .unwrap();
        assert!(recommendations.is_empty());
    }

    #[tokio::test]
    async fn recommendations_are_not_persisted() {
        let db = test_db().await;
        let owner = seed_profile(&db, "owner@example.com", UserRole::ProjectOwner).await;
        let workspace = seed_workspace(&db, &owner.id, "Studio").await;
        let project = seed_project(&db, &owner.id, Some(&workspace.id), "Engine", &["Rust"]).await;
        seed_freelancer(&db, "dev@example.com", &["Rust"], None).await;

        let config = MatchingConfig::default();
        MatchEngine::new(db.pool(), &FailingGenerator, &config)
            .recommend_for_workspace(&workspace.id)
            .await
            .unwrap();

        assert_eq!(
            MatchRepository::new(db.pool())
                .count_for_project(&project.id)
                .await
                .unwrap(),
            0
        );
    }

    #[tokio::test]
    async fn unknown_workspace_is_not_found() {
        let db = test_db().await;
        let config = MatchingConfig::default();
        let err = MatchEngine::new(db.pool(), &FailingGenerator, &config)
            .recommend_for_workspace("missing")
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }
}
