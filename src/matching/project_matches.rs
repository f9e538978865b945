// src/matching/project_matches.rs
//! Candidate matching for a single project, run when a project is posted.

use serde::Serialize;

use crate::app_log;
use crate::error::{ServiceError, ServiceResult};
use crate::matching::engine::MatchEngine;
use crate::matching::overlap::estimate_overlap;
use crate::matching::prompts::{project_match_prompt, PROJECT_MATCH_SYSTEM};
use crate::matching::reasons::fallback_reason;
use crate::store::models::{NewActivity, NewProject, Project};
use crate::store::{MatchRepository, ProfileRepository, ProjectRepository, WorkspaceRepository};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectMatchSummary {
    pub match_count: usize,
    pub ai_calls_made: usize,
    pub project_title: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PostedProject {
    pub project: Project,
    /// `None` when the matching run failed after the project was stored.
    pub matching: Option<ProjectMatchSummary>,
}

impl<'a> MatchEngine<'a> {
    /// Score every candidate against the project and upsert those at or
    /// above the project threshold.
    pub async fn generate_project_matches(
        &self,
        project_id: &str,
    ) -> ServiceResult<ProjectMatchSummary> {
        let project = ProjectRepository::new(self.pool)
            .find_by_id(project_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Project not found"))?;

        let candidates = ProfileRepository::new(self.pool)
            .list_candidates(&self.config.candidate_roles)
            .await?;

        app_log!(
            info,
            "Generating matches for project {} against {} candidates",
            project.id,
            candidates.len()
        );

        let matches = MatchRepository::new(self.pool);
        let reasons = self.reasons();
        let threshold = self.config.project_match_threshold;
        let mut match_count = 0;
        let mut ai_calls_made = 0;

        for candidate in &candidates {
            let overlap = estimate_overlap(&project.required_skills, &candidate.skills);
            if !overlap.meets(threshold) {
                app_log!(
                    debug,
                    "Skipping {} for project {}: {:.1}% overlap",
                    candidate.profile_id,
                    project.id,
                    overlap.percentage
                );
                continue;
            }

            let prompt = project_match_prompt(
                &project.title,
                &project.required_skills,
                project.budget_min,
                project.budget_max,
                candidate,
            );
            ai_calls_made += 1;
            let (reason, _) = reasons
                .explain(
                    PROJECT_MATCH_SYSTEM,
                    &prompt,
                    fallback_reason(&overlap, candidate.years_experience),
                )
                .await;

            match matches
                .upsert(&project.id, &candidate.profile_id, overlap.percentage, &reason)
                .await
            {
                Ok(_) => match_count += 1,
                Err(e) => app_log!(
                    error,
                    "Failed to save match for {} on project {}: {:#}",
                    candidate.profile_id,
                    project.id,
                    e
                ),
            }
        }

        app_log!(
            info,
            "Project {} matching done: {} matches, {} AI calls",
            project.id,
            match_count,
            ai_calls_made
        );

        Ok(ProjectMatchSummary {
            match_count,
            ai_calls_made,
            project_title: project.title,
        })
    }

    /// Store a new open project, log it to its workspace, then match it.
    pub async fn post_project(&self, new: &NewProject) -> ServiceResult<PostedProject> {
        if new.title.trim().is_empty() {
            return Err(ServiceError::bad_request("title is required"));
        }
        if let (Some(min), Some(max)) = (new.budget_min, new.budget_max) {
            if min > max {
                return Err(ServiceError::bad_request(
                    "budget_min must not exceed budget_max",
                ));
            }
        }

        if ProfileRepository::new(self.pool)
            .find_by_id(&new.owner_id)
            .await?
            .is_none()
        {
            return Err(ServiceError::not_found("Owner profile not found"));
        }

        let workspaces = WorkspaceRepository::new(self.pool);
        if let Some(workspace_id) = new.workspace_id.as_deref() {
            if workspaces.find_by_id(workspace_id).await?.is_none() {
                return Err(ServiceError::not_found("Workspace not found"));
            }
        }

        let project = ProjectRepository::new(self.pool).create(new).await?;

        if let Some(workspace_id) = project.workspace_id.as_deref() {
            workspaces
                .record_activity(&NewActivity {
                    workspace_id,
                    user_id: Some(project.owner_id.as_str()),
                    project_id: Some(project.id.as_str()),
                    activity_type: "project_created",
                    description: Some(format!("Posted project: {}", project.title)),
                })
                .await?;
        }

        let matching = match self.generate_project_matches(&project.id).await {
            Ok(summary) => Some(summary),
            Err(e) => {
                app_log!(error, "Matching failed for new project {}: {}", project.id, e);
                None
            }
        };

        Ok(PostedProject { project, matching })
    }
}
