// src/matching/user_matches.rs
//! Model-scored matching of one freelancer against the open project pool.

use serde::Serialize;
use std::time::Duration;

use crate::app_log;
use crate::error::{ServiceError, ServiceResult};
use crate::matching::engine::MatchEngine;
use crate::matching::overlap::estimate_overlap;
use crate::matching::prompts::{
    freelancer_context, model_score_prompt, project_context, MODEL_SCORE_SYSTEM,
};
use crate::store::{MatchRepository, ProfileRepository, ProjectRepository};

const NO_OPEN_PROJECTS: &str = "No open projects available";
const ALREADY_MATCHED: &str = "Matches already exist";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserMatchSummary {
    pub match_count: usize,
    pub message: String,
    /// False when an ensure call found existing matches and did nothing.
    pub generated: bool,
}

impl<'a> MatchEngine<'a> {
    /// Score the freelancer against up to `open_project_limit` open projects.
    ///
    /// A project is kept when both the local overlap and the model's score
    /// reach the user threshold; the model's score is what gets stored.
    pub async fn generate_user_matches(&self, user_id: &str) -> ServiceResult<UserMatchSummary> {
        let profiles = ProfileRepository::new(self.pool);
        let detail = profiles
            .find_freelancer_detail(user_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Freelancer profile not found"))?;
        let profile = profiles.find_by_id(user_id).await?;

        let projects = ProjectRepository::new(self.pool)
            .list_open_with_owner(self.config.open_project_limit)
            .await?;

        if projects.is_empty() {
            app_log!(info, "No open projects to match for {}", user_id);
            return Ok(UserMatchSummary {
                match_count: 0,
                message: NO_OPEN_PROJECTS.to_string(),
                generated: true,
            });
        }

        app_log!(
            info,
            "Matching freelancer {} against {} open projects",
            user_id,
            projects.len()
        );

        let freelancer = freelancer_context(&detail, profile.as_ref());
        let matches = MatchRepository::new(self.pool);
        let reasons = self.reasons();
        let threshold = self.config.user_match_threshold;
        let delay = Duration::from_millis(self.config.batch_delay_ms);
        let mut match_count = 0;

        for (index, batch) in projects.chunks(self.config.batch_size.max(1)).enumerate() {
            if index > 0 && !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }

            for entry in batch {
                let project = &entry.project;
                let overlap = estimate_overlap(&project.required_skills, &detail.skills);
                if !overlap.meets(threshold) {
                    continue;
                }

                let prompt = model_score_prompt(&freelancer, &project_context(entry));
                let Some(verdict) = reasons.score(MODEL_SCORE_SYSTEM, &prompt).await else {
                    app_log!(warn, "Skipping project {} for {}: no usable verdict", project.id, user_id);
                    continue;
                };

                if verdict.score < threshold {
                    continue;
                }

                match matches
                    .upsert(&project.id, user_id, verdict.score, &verdict.reason)
                    .await
                {
                    Ok(record) => {
                        app_log!(
                            info,
                            "Matched {} to \"{}\" with score {}",
                            user_id,
                            project.title,
                            record.match_score
                        );
                        match_count += 1;
                    }
                    Err(e) => app_log!(
                        error,
                        "Failed to save match for project {}: {:#}",
                        project.id,
                        e
                    ),
                }
            }
        }

        Ok(UserMatchSummary {
            match_count,
            message: format!(
                "Generated {} AI-powered matches using semantic analysis",
                match_count
            ),
            generated: true,
        })
    }

    /// Generate matches only when the freelancer has none yet, unless forced.
    pub async fn ensure_user_matches(
        &self,
        user_id: &str,
        force: bool,
    ) -> ServiceResult<UserMatchSummary> {
        let existing = MatchRepository::new(self.pool)
            .count_for_freelancer(user_id)
            .await?;

        if existing > 0 && !force {
            app_log!(debug, "{} already has {} matches", user_id, existing);
            return Ok(UserMatchSummary {
                match_count: existing as usize,
                message: ALREADY_MATCHED.to_string(),
                generated: false,
            });
        }

        self.generate_user_matches(user_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::MatchingConfig;
    use crate::store::models::{ProjectStatus, UserRole};
    use crate::test_support::{
        seed_freelancer, seed_profile, seed_project, test_db, FailingGenerator, FixedGenerator,
        ScriptedGenerator,
    };

    fn fast_config() -> MatchingConfig {
        MatchingConfig {
            batch_delay_ms: 0,
            ..MatchingConfig::default()
        }
    }

    #[tokio::test]
    async fn react_node_example_is_matched_with_model_score() {
        let db = test_db().await;
        let owner = seed_profile(&db, "owner@example.com", UserRole::ProjectOwner).await;
        let freelancer = seed_freelancer(&db, "dev@example.com", &["react", "express"], Some(3)).await;
        let project = seed_project(&db, &owner.id, None, "Web app", &["React", "Node.js"]).await;
        let generator = FixedGenerator::new(r#"Sure! {"score": 68.6, "reason": "Good React depth"}"#);
        let config = fast_config();

        let summary = MatchEngine::new(db.pool(), &generator, &config)
            .generate_user_matches(&freelancer.id)
            .await
            .unwrap();

        assert_eq!(summary.match_count, 1);
        assert!(summary.generated);
        assert_eq!(
            summary.message,
            "Generated 1 AI-powered matches using semantic analysis"
        );

        let record = MatchRepository::new(db.pool())
            .find(&project.id, &freelancer.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(record.match_score, 69);
        assert_eq!(record.match_reason.as_deref(), Some("Good React depth"));

        let call = &generator.calls()[0];
        assert_eq!(call.system, MODEL_SCORE_SYSTEM);
        assert!(call.user.contains("Skills: react, express"));
        assert!(call.user.contains("Title: Web app"));
    }

    #[tokio::test]
    async fn kubernetes_project_is_never_sent_to_the_model() {
        let db = test_db().await;
        let owner = seed_profile(&db, "owner@example.com", UserRole::ProjectOwner).await;
        let freelancer = seed_freelancer(&db, "dev@example.com", &["React", "Node.js"], None).await;
        seed_project(&db, &owner.id, None, "Cluster", &["Kubernetes"]).await;
        let generator = FixedGenerator::new(r#"{"score": 95, "reason": "ignored"}"#);
        let config = fast_config();

        let summary = MatchEngine::new(db.pool(), &generator, &config)
            .generate_user_matches(&freelancer.id)
            .await
            .unwrap();

        assert_eq!(summary.match_count, 0);
        assert!(generator.calls().is_empty());
    }

    #[tokio::test]
    async fn low_model_scores_and_bad_replies_are_skipped() {
        let db = test_db().await;
        let owner = seed_profile(&db, "owner@example.com", UserRole::ProjectOwner).await;
        let freelancer = seed_freelancer(&db, "dev@example.com", &["Rust"], None).await;
        let kept = seed_project(&db, &owner.id, None, "Keep", &["Rust"]).await;
        let low = seed_project(&db, &owner.id, None, "Low", &["Rust"]).await;
        let garbled = seed_project(&db, &owner.id, None, "Garbled", &["Rust"]).await;
        let failed = seed_project(&db, &owner.id, None, "Failed", &["Rust"]).await;

        let generator = ScriptedGenerator::new(|prompt: &str| {
            if prompt.contains("Title: Keep") {
                Ok(r#"{"score": 30, "reason": "Borderline"}"#.to_string())
            } else if prompt.contains("Title: Low") {
                Ok(r#"{"score": 29.4, "reason": "Weak"}"#.to_string())
            } else if prompt.contains("Title: Garbled") {
                Ok("I think it's a decent match".to_string())
            } else {
                anyhow::bail!("AI API error: 500")
            }
        });
        let config = fast_config();

        let summary = MatchEngine::new(db.pool(), &generator, &config)
            .generate_user_matches(&freelancer.id)
            .await
            .unwrap();
        assert_eq!(summary.match_count, 1);

        let repo = MatchRepository::new(db.pool());
        assert!(repo.find(&kept.id, &freelancer.id).await.unwrap().is_some());
        for project in [&low, &garbled, &failed] {
            assert!(repo.find(&project.id, &freelancer.id).await.unwrap().is_none());
        }
    }

    #[tokio::test]
    async fn closed_projects_and_cap_are_respected() {
        let db = test_db().await;
        let owner = seed_profile(&db, "owner@example.com", UserRole::ProjectOwner).await;
        let freelancer = seed_freelancer(&db, "dev@example.com", &["Rust"], None).await;
        let closed = seed_project(&db, &owner.id, None, "Closed", &["Rust"]).await;
        ProjectRepository::new(db.pool())
            .update_status(&closed.id, ProjectStatus::Cancelled)
            .await
            .unwrap();
        for n in 0..7 {
            seed_project(&db, &owner.id, None, &format!("Open {}", n), &["Rust"]).await;
        }

        let generator = FixedGenerator::new(r#"{"score": 80, "reason": "fit"}"#);
        let config = MatchingConfig {
            open_project_limit: 6,
            batch_size: 4,
            ..fast_config()
        };
        let summary = MatchEngine::new(db.pool(), &generator, &config)
            .generate_user_matches(&freelancer.id)
            .await
            .unwrap();

        assert_eq!(summary.match_count, 6);
        assert_eq!(generator.calls().len(), 6);
        assert!(MatchRepository::new(db.pool())
            .find(&closed.id, &freelancer.id)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn missing_freelancer_detail_is_not_found() {
        let db = test_db().await;
        let owner = seed_profile(&db, "owner@example.com", UserRole::ProjectOwner).await;
        let config = fast_config();

        let err = MatchEngine::new(db.pool(), &FailingGenerator, &config)
            .generate_user_matches(&owner.id)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(ref m) if m == "Freelancer profile not found"));
    }

    #[tokio::test]
    async fn no_open_projects_is_a_successful_no_op() {
        let db = test_db().await;
        let freelancer = seed_freelancer(&db, "dev@example.com", &["Rust"], None).await;
        let config = fast_config();

        let summary = MatchEngine::new(db.pool(), &FailingGenerator, &config)
            .generate_user_matches(&freelancer.id)
            .await
            .unwrap();
        assert_eq!(summary.match_count, 0);
        assert_eq!(summary.message, NO_OPEN_PROJECTS);
    }

    #[tokio::test]
    async fn ensure_only_generates_when_empty() {
        let db = test_db().await;
        let owner = seed_profile(&db, "owner@example.com", UserRole::ProjectOwner).await;
        let freelancer = seed_freelancer(&db, "dev@example.com", &["Rust"], None).await;
        seed_project(&db, &owner.id, None, "Engine", &["Rust"]).await;
        let generator = FixedGenerator::new(r#"{"score": 77, "reason": "fit"}"#);
        let config = fast_config();
        let engine = MatchEngine::new(db.pool(), &generator, &config);

        let first = engine.ensure_user_matches(&freelancer.id, false).await.unwrap();
        assert!(first.generated);
        assert_eq!(first.match_count, 1);

        let second = engine.ensure_user_matches(&freelancer.id, false).await.unwrap();
        assert!(!second.generated);
        assert_eq!(second.match_count, 1);
        assert_eq!(generator.calls().len(), 1);

        let forced = engine.ensure_user_matches(&freelancer.id, true).await.unwrap();
        assert!(forced.generated);
        assert_eq!(generator.calls().len(), 2);
    }
}
