// src/postings.rs
//! Project lifecycle outside matching: applications and status changes.
//! Changes to workspace projects are written to the workspace activity log.

use sqlx::SqlitePool;

use crate::app_log;
use crate::auth::Session;
use crate::error::{ServiceError, ServiceResult};
use crate::store::models::{Application, NewActivity, NewApplication, Project, ProjectStatus};
use crate::store::{ProfileRepository, ProjectRepository, WorkspaceRepository};

pub struct PostingService<'a> {
    pool: &'a SqlitePool,
}

impl<'a> PostingService<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    async fn project(&self, project_id: &str) -> ServiceResult<Project> {
        ProjectRepository::new(self.pool)
            .find_by_id(project_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Project not found"))
    }

    /// Submit an application. Users apply as themselves; service callers
    /// name the freelancer.
    pub async fn apply(
        &self,
        session: &Session,
        project_id: &str,
        freelancer_id: Option<&str>,
        cover_letter: Option<String>,
        proposed_rate: Option<f64>,
    ) -> ServiceResult<Application> {
        let freelancer_id = match (session.user_id(), freelancer_id) {
            (Some(user), Some(requested)) if user != requested => {
                return Err(ServiceError::forbidden("Applications can only be submitted as yourself"))
            }
            (Some(user), _) => user,
            (None, Some(requested)) if !requested.trim().is_empty() => requested,
            (None, _) => return Err(ServiceError::bad_request("freelancerId is required")),
        };
        if proposed_rate.is_some_and(|rate| rate < 0.0) {
            return Err(ServiceError::bad_request("proposedRate must not be negative"));
        }

        let project = self.project(project_id).await?;
        if project.status != ProjectStatus::Open {
            return Err(ServiceError::bad_request("Project is not accepting applications"));
        }
        if project.owner_id == freelancer_id {
            return Err(ServiceError::bad_request("Owners cannot apply to their own project"));
        }

        let freelancer = ProfileRepository::new(self.pool)
            .find_by_id(freelancer_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Freelancer profile not found"))?;

        let projects = ProjectRepository::new(self.pool);
        if projects
            .find_application(&project.id, freelancer_id)
            .await?
            .is_some()
        {
            return Err(ServiceError::Conflict(
                "You have already applied to this project".to_string(),
            ));
        }

        let application = projects
            .create_application(&NewApplication {
                project_id: project.id.clone(),
                freelancer_id: freelancer_id.to_string(),
                cover_letter: cover_letter.filter(|c| !c.trim().is_empty()),
                proposed_rate,
            })
            .await?;

        if let Some(workspace_id) = project.workspace_id.as_deref() {
            WorkspaceRepository::new(self.pool)
                .record_activity(&NewActivity {
                    workspace_id,
                    user_id: Some(freelancer_id),
                    project_id: Some(project.id.as_str()),
                    activity_type: "application_submitted",
                    description: Some(format!(
                        "{} applied to {}",
                        freelancer.full_name.as_deref().unwrap_or(&freelancer.email),
                        project.title
                    )),
                })
                .await?;
        }

        app_log!(info, "{} applied to project {}", freelancer_id, project.id);
        Ok(application)
    }

    /// Move a project to another status. Only its owner (or a service
    /// caller) may do so.
    pub async fn update_status(
        &self,
        session: &Session,
        project_id: &str,
        status: ProjectStatus,
    ) -> ServiceResult<Project> {
        let project = self.project(project_id).await?;
        if let Some(user_id) = session.user_id() {
            if user_id != project.owner_id {
                return Err(ServiceError::forbidden("Not the owner of this project"));
            }
        }
        if project.status == status {
            return Ok(project);
        }

        let projects = ProjectRepository::new(self.pool);
        projects.update_status(&project.id, status).await?;

        if let Some(workspace_id) = project.workspace_id.as_deref() {
            WorkspaceRepository::new(self.pool)
                .record_activity(&NewActivity {
                    workspace_id,
                    user_id: session.user_id(),
                    project_id: Some(project.id.as_str()),
                    activity_type: "project_status_changed",
                    description: Some(format!(
                        "{} is now {}",
                        project.title,
                        status.as_str()
                    )),
                })
                .await?;
        }

        app_log!(
            info,
            "Project {} moved from {} to {}",
            project.id,
            project.status.as_str(),
            status.as_str()
        );
        self.project(project_id).await
    }
}
