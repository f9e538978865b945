// src/matching/workspace_chat.rs
//! Free-form questions answered over a JSON snapshot of a workspace.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::app_log;
use crate::core::GenerationOptions;
use crate::error::{ServiceError, ServiceResult};
use crate::matching::engine::MatchEngine;
use crate::matching::prompts::workspace_chat_system;
use crate::store::models::{ProjectStatus, WorkspaceRole};
use crate::store::{ProjectRepository, WorkspaceRepository};

const EMPTY_ANSWER: &str = "I couldn't generate a response.";

#[derive(Debug, Clone, Serialize)]
pub struct WorkspaceSnapshot {
    pub workspace: WorkspaceSummary,
    pub members: Vec<MemberSnapshot>,
    pub projects: Vec<ProjectSnapshot>,
    pub recent_activity: Vec<ActivitySnapshot>,
}

#[derive(Debug, Clone, Serialize)]
pub struct WorkspaceSummary {
    pub name: String,
    pub description: Option<String>,
    pub member_count: usize,
    pub project_count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct MemberSnapshot {
    pub name: Option<String>,
    pub email: String,
    pub role: WorkspaceRole,
    pub skills: Vec<String>,
    pub experience: i64,
    pub joined: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProjectSnapshot {
    pub title: String,
    pub description: String,
    pub status: ProjectStatus,
    pub skills: Vec<String>,
    pub budget: String,
    pub timeline: Option<String>,
    pub applications: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ActivitySnapshot {
    #[serde(rename = "type")]
    pub activity_type: String,
    pub description: Option<String>,
    pub date: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatAnswer {
    pub answer: String,
    pub context: WorkspaceSnapshot,
}

fn budget_range(min: Option<f64>, max: Option<f64>) -> String {
    format!("${} - ${}", min.unwrap_or(0.0), max.unwrap_or(0.0))
}

impl<'a> MatchEngine<'a> {
    pub async fn workspace_snapshot(&self, workspace_id: &str) -> ServiceResult<WorkspaceSnapshot> {
        let workspaces = WorkspaceRepository::new(self.pool);
        let workspace = workspaces
            .find_by_id(workspace_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Workspace not found"))?;

        let members = workspaces.list_members_with_profiles(workspace_id).await?;
        let projects = ProjectRepository::new(self.pool)
            .list_for_workspace_with_applications(workspace_id)
            .await?;
        let activity = workspaces
            .recent_activity(workspace_id, self.config.activity_fetch_limit)
            .await?;

        Ok(WorkspaceSnapshot {
            workspace: WorkspaceSummary {
                name: workspace.name,
                description: workspace.description,
                member_count: members.len(),
                project_count: projects.len(),
            },
            members: members
                .into_iter()
                .map(|m| MemberSnapshot {
                    name: m.full_name,
                    email: m.email,
                    role: m.role,
                    skills: m.skills,
                    experience: m.years_experience.unwrap_or(0),
                    joined: m.joined_at,
                })
                .collect(),
            projects: projects
                .into_iter()
                .map(|p| ProjectSnapshot {
                    budget: budget_range(p.project.budget_min, p.project.budget_max),
                    title: p.project.title,
                    description: p.project.description,
                    status: p.project.status,
                    skills: p.project.required_skills,
                    timeline: p.project.timeline,
                    applications: p.application_count,
                })
                .collect(),
            recent_activity: activity
                .into_iter()
                .take(self.config.activity_context_limit)
                .map(|a| ActivitySnapshot {
                    activity_type: a.activity_type,
                    description: a.description,
                    date: a.created_at,
                })
                .collect(),
        })
    }

    /// One generator call with the snapshot as context. Unlike match
    /// rationales there is no fallback: a failed call fails the request.
    pub async fn answer_workspace_question(
        &self,
        workspace_id: &str,
        question: &str,
    ) -> ServiceResult<ChatAnswer> {
        let question = question.trim();
        if question.is_empty() {
            return Err(ServiceError::bad_request("question is required"));
        }

        let context = self.workspace_snapshot(workspace_id).await?;
        let context_json = serde_json::to_string_pretty(&context)
            .map_err(|e| ServiceError::Store(anyhow::Error::new(e)))?;

        app_log!(
            info,
            "Workspace chat for {} with {} members, {} projects",
            workspace_id,
            context.workspace.member_count,
            context.workspace.project_count
        );

        let answer = self
            .generator
            .generate(
                &workspace_chat_system(&context_json),
                question,
                &GenerationOptions::default(),
            )
            .await
            .map_err(|e| {
                app_log!(error, "Workspace chat generation failed: {:#}", e);
                ServiceError::Generation(e.to_string())
            })?;

        let answer = if answer.trim().is_empty() {
            EMPTY_ANSWER.to_string()
        } else {
            answer
        };

        Ok(ChatAnswer { answer, context })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::MatchingConfig;
    use crate::store::models::{NewActivity, NewApplication, UserRole};
    use crate::test_support::{
        seed_freelancer, seed_profile, seed_project, seed_workspace, test_db, FailingGenerator,
        FixedGenerator,
    };

    #[test]
    fn budget_range_defaults_to_zero() {
        assert_eq!(budget_range(Some(500.0), Some(1200.0)), "$500 - $1200");
        assert_eq!(budget_range(None, Some(99.5)), "$0 - $99.5");
    }

    #[tokio::test]
    async fn snapshot_collects_members_projects_and_activity() {
        let db = test_db().await;
        let owner = seed_profile(&db, "owner@example.com", UserRole::ProjectOwner).await;
        let dev = seed_freelancer(&db, "dev@example.com", &["Rust"], Some(5)).await;
        let workspace = seed_workspace(&db, &owner.id, "Studio").await;
        let workspaces = WorkspaceRepository::new(db.pool());
        workspaces
            .add_member(&workspace.id, &dev.id, WorkspaceRole::Member)
            .await
            .unwrap();
        let project = seed_project(&db, &owner.id, Some(&workspace.id), "Engine", &["Rust"]).await;
        ProjectRepository::new(db.pool())
            .create_application(&NewApplication {
                project_id: project.id.clone(),
                freelancer_id: dev.id.clone(),
                ..Default::default()
            })
            .await
            .unwrap();
        for n in 0..25 {
            workspaces
                .record_activity(&NewActivity {
                    workspace_id: &workspace.id,
                    user_id: Some(owner.id.as_str()),
                    project_id: None,
                    activity_type: "note",
                    description: Some(format!("entry {}", n)),
                })
                .await
                .unwrap();
        }

        let config = MatchingConfig::default();
        let snapshot = MatchEngine::new(db.pool(), &FailingGenerator, &config)
            .workspace_snapshot(&workspace.id)
            .await
            .unwrap();

        assert_eq!(snapshot.workspace.member_count, 2);
        assert_eq!(snapshot.workspace.project_count, 1);
        let dev_entry = snapshot.members.iter().find(|m| m.email == "dev@example.com").unwrap();
        assert_eq!(dev_entry.skills, vec!["Rust"]);
        assert_eq!(dev_entry.experience, 5);
        assert_eq!(snapshot.projects[0].applications, 1);
        assert_eq!(snapshot.projects[0].budget, "$0 - $0");
        assert_eq!(snapshot.recent_activity.len(), 20);
        assert_eq!(snapshot.recent_activity[0].description.as_deref(), Some("entry 24"));

        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["recent_activity"][0]["type"], "note");
        assert_eq!(json["members"][0]["role"], "owner");
    }

    #[tokio::test]
    async fn answer_is_returned_verbatim_with_context() {
        let db = test_db().await;
        let owner = seed_profile(&db, "owner@example.com", UserRole::ProjectOwner).await;
        let workspace = seed_workspace(&db, &owner.id, "Studio").await;
        let generator = FixedGenerator::new("You have one member.");
        let config = MatchingConfig::default();

        let reply = MatchEngine::new(db.pool(), &generator, &config)
            .answer_workspace_question(&workspace.id, "How many members?")
            .await
            .unwrap();

        assert_eq!(reply.answer, "You have one member.");
        assert_eq!(reply.context.workspace.name, "Studio");

        let call = &generator.calls()[0];
        assert_eq!(call.user, "How many members?");
        assert!(call.system.contains("\"member_count\": 1"));
    }

    #[tokio::test]
    async fn empty_answer_gets_placeholder() {
        let db = test_db().await;
        let owner = seed_profile(&db, "owner@example.com", UserRole::ProjectOwner).await;
        let workspace = seed_workspace(&db, &owner.id, "Studio").await;
        let generator = FixedGenerator::new("");
        let config = MatchingConfig::default();

        let reply = MatchEngine::new(db.pool(), &generator, &config)
            .answer_workspace_question(&workspace.id, "Anything?")
            .await
            .unwrap();
        assert_eq!(reply.answer, EMPTY_ANSWER);
    }

    #[tokio::test]
    async fn generator_failure_fails_the_request() {
        let db = test_db().await;
        let owner = seed_profile(&db, "owner@example.com", UserRole::ProjectOwner).await;
        let workspace = seed_workspace(&db, &owner.id, "Studio").await;
        let config = MatchingConfig::default();
        let engine = MatchEngine::new(db.pool(), &FailingGenerator, &config);

        let err = engine
            .answer_workspace_question(&workspace.id, "Status?")
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Generation(ref m) if m == "AI API error: 503"));

        let err = engine
            .answer_workspace_question(&workspace.id, "   ")
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::BadRequest(_)));

        let err = engine
            .answer_workspace_question("missing", "Status?")
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }
}
