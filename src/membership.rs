// src/membership.rs
//! Workspace creation and role-gated membership changes. Every change is
//! written to the workspace activity log.

use sqlx::SqlitePool;

use crate::app_log;
use crate::auth::Session;
use crate::error::{ServiceError, ServiceResult};
use crate::store::models::{NewActivity, Workspace, WorkspaceMember, WorkspaceRole};
use crate::store::{ProfileRepository, WorkspaceRepository};

pub struct MembershipService<'a> {
    pool: &'a SqlitePool,
}

impl<'a> MembershipService<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a workspace owned by the caller. Service callers name the owner.
    pub async fn create_workspace(
        &self,
        session: &Session,
        owner_id: Option<&str>,
        name: &str,
        description: Option<&str>,
    ) -> ServiceResult<Workspace> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ServiceError::bad_request("name is required"));
        }

        let owner_id = match (session.user_id(), owner_id) {
            (Some(user), Some(requested)) if user != requested => {
                return Err(ServiceError::forbidden(
                    "Workspaces can only be created for yourself",
                ))
            }
            (Some(user), _) => user,
            (None, Some(requested)) if !requested.trim().is_empty() => requested,
            (None, _) => return Err(ServiceError::bad_request("ownerId is required")),
        };

        if ProfileRepository::new(self.pool)
            .find_by_id(owner_id)
            .await?
            .is_none()
        {
            return Err(ServiceError::not_found("Owner profile not found"));
        }

        let workspaces = WorkspaceRepository::new(self.pool);
        let description = description.map(str::trim).filter(|d| !d.is_empty());
        let workspace = workspaces.create(name, description, owner_id).await?;

        workspaces
            .record_activity(&NewActivity {
                workspace_id: &workspace.id,
                user_id: session.user_id(),
                project_id: None,
                activity_type: "workspace_created",
                description: Some(format!("Created workspace {}", workspace.name)),
            })
            .await?;

        Ok(workspace)
    }

    async fn workspace(&self, workspace_id: &str) -> ServiceResult<Workspace> {
        WorkspaceRepository::new(self.pool)
            .find_by_id(workspace_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Workspace not found"))
    }

    pub async fn add_by_email(
        &self,
        session: &Session,
        workspace_id: &str,
        email: &str,
    ) -> ServiceResult<WorkspaceMember> {
        let email = email.trim();
        if email.is_empty() {
            return Err(ServiceError::bad_request("email is required"));
        }

        session
            .ensure_workspace_access(self.pool, workspace_id, true)
            .await?;
        let workspaces = WorkspaceRepository::new(self.pool);

        let profile = ProfileRepository::new(self.pool)
            .find_by_email(email)
            .await?
            .ok_or_else(|| ServiceError::not_found("User not found"))?;

        if workspaces
            .find_member(workspace_id, &profile.id)
            .await?
            .is_some()
        {
            return Err(ServiceError::Conflict(
                "User is already a member of this workspace".to_string(),
            ));
        }

        let member = workspaces
            .add_member(workspace_id, &profile.id, WorkspaceRole::Member)
            .await?;

        workspaces
            .record_activity(&NewActivity {
                workspace_id,
                user_id: session.user_id(),
                project_id: None,
                activity_type: "member_added",
                description: Some(format!(
                    "Added {} to the workspace",
                    profile.full_name.as_deref().unwrap_or(&profile.email)
                )),
            })
            .await?;

        app_log!(info, "Added {} to workspace {}", profile.id, workspace_id);
        Ok(member)
    }

    pub async fn change_role(
        &self,
        session: &Session,
        workspace_id: &str,
        user_id: &str,
        role: WorkspaceRole,
    ) -> ServiceResult<WorkspaceMember> {
        session
            .ensure_workspace_access(self.pool, workspace_id, true)
            .await?;
        let workspace = self.workspace(workspace_id).await?;

        if role == WorkspaceRole::Owner {
            return Err(ServiceError::bad_request(
                "A workspace has exactly one owner",
            ));
        }
        if user_id == workspace.owner_id {
            return Err(ServiceError::Forbidden(
                "The workspace owner's role cannot be changed".to_string(),
            ));
        }

        let workspaces = WorkspaceRepository::new(self.pool);
        let member = workspaces
            .update_member_role(workspace_id, user_id, role)
            .await?
            .ok_or_else(|| ServiceError::not_found("Member not found"))?;

        workspaces
            .record_activity(&NewActivity {
                workspace_id,
                user_id: session.user_id(),
                project_id: None,
                activity_type: "member_role_changed",
                description: Some(format!(
                    "Changed role of {} to {}",
                    user_id,
                    role.as_str()
                )),
            })
            .await?;

        Ok(member)
    }

    pub async fn remove(
        &self,
        session: &Session,
        workspace_id: &str,
        user_id: &str,
    ) -> ServiceResult<()> {
        session
            .ensure_workspace_access(self.pool, workspace_id, true)
            .await?;
        let workspace = self.workspace(workspace_id).await?;

        if user_id == workspace.owner_id {
            return Err(ServiceError::Forbidden(
                "The workspace owner cannot be removed".to_string(),
            ));
        }

        let workspaces = WorkspaceRepository::new(self.pool);
        if !workspaces.remove_member(workspace_id, user_id).await? {
            return Err(ServiceError::not_found("Member not found"));
        }

        workspaces
            .record_activity(&NewActivity {
                workspace_id,
                user_id: session.user_id(),
                project_id: None,
                activity_type: "member_removed",
                description: Some(format!("Removed {} from the workspace", user_id)),
            })
            .await?;

        app_log!(info, "Removed {} from workspace {}", user_id, workspace_id);
        Ok(())
    }
}
