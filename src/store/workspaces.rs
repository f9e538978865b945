// src/store/workspaces.rs
use anyhow::{Context, Result};
use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::app_log;
use crate::store::models::{
    MemberProfile, NewActivity, Workspace, WorkspaceActivity, WorkspaceMember, WorkspaceRole,
};

pub struct WorkspaceRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> WorkspaceRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a workspace and enrol its owner with the `owner` role.
    pub async fn create(
        &self,
        name: &str,
        description: Option<&str>,
        owner_id: &str,
    ) -> Result<Workspace> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now();

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO workspaces (id, name, description, owner_id, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(name)
        .bind(description)
        .bind(owner_id)
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await
        .with_context(|| format!("Failed to create workspace '{}'", name))?;

        sqlx::query(
            r#"
            INSERT INTO workspace_members (id, workspace_id, user_id, role, joined_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(&id)
        .bind(owner_id)
        .bind(WorkspaceRole::Owner)
        .bind(now)
        .execute(&mut *tx)
        .await
        .context("Failed to enrol workspace owner")?;

        tx.commit().await?;
        app_log!(info, "Created workspace {} ({})", id, name);

        self.find_by_id(&id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Workspace {} vanished after insert", id))
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<Workspace>> {
        let workspace = sqlx::query_as::<_, Workspace>("SELECT * FROM workspaces WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool)
            .await?;
        Ok(workspace)
    }

    pub async fn list_member_ids(&self, workspace_id: &str) -> Result<Vec<String>> {
        let rows: Vec<(String,)> =
            sqlx::query_as("SELECT user_id FROM workspace_members WHERE workspace_id = ?")
                .bind(workspace_id)
                .fetch_all(self.pool)
                .await?;
        Ok(rows.into_iter().map(|(id,)| id).collect())
    }

    pub async fn list_members_with_profiles(&self, workspace_id: &str) -> Result<Vec<MemberProfile>> {
        let members = sqlx::query_as::<_, MemberProfile>(
            r#"
            SELECT m.user_id, m.role, m.joined_at,
                   p.full_name, p.email, p.bio,
                   COALESCE(f.skills, '[]') AS skills,
                   f.years_experience
            FROM workspace_members m
            JOIN profiles p ON p.id = m.user_id
            LEFT JOIN freelancer_profiles f ON f.user_id = m.user_id
            WHERE m.workspace_id = ?
            ORDER BY m.joined_at ASC, m.id ASC
            "#,
        )
        .bind(workspace_id)
        .fetch_all(self.pool)
        .await
        .context("Failed to load workspace members")?;
        Ok(members)
    }

    pub async fn find_member(
        &self,
        workspace_id: &str,
        user_id: &str,
    ) -> Result<Option<WorkspaceMember>> {
        let member = sqlx::query_as::<_, WorkspaceMember>(
            "SELECT * FROM workspace_members WHERE workspace_id = ? AND user_id = ?",
        )
        .bind(workspace_id)
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?;
        Ok(member)
    }

    pub async fn add_member(
        &self,
        workspace_id: &str,
        user_id: &str,
        role: WorkspaceRole,
    ) -> Result<WorkspaceMember> {
        sqlx::query(
            r#"
            INSERT INTO workspace_members (id, workspace_id, user_id, role, joined_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(workspace_id)
        .bind(user_id)
        .bind(role)
        .bind(Utc::now())
        .execute(self.pool)
        .await
        .with_context(|| format!("Failed to add {} to workspace {}", user_id, workspace_id))?;

        self.find_member(workspace_id, user_id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Membership for {} vanished after insert", user_id))
    }

    pub async fn update_member_role(
        &self,
        workspace_id: &str,
        user_id: &str,
        role: WorkspaceRole,
    ) -> Result<Option<WorkspaceMember>> {
        let result = sqlx::query(
            "UPDATE workspace_members SET role = ? WHERE workspace_id = ? AND user_id = ?",
        )
        .bind(role)
        .bind(workspace_id)
        .bind(user_id)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.find_member(workspace_id, user_id).await
    }

    pub async fn remove_member(&self, workspace_id: &str, user_id: &str) -> Result<bool> {
        let result =
            sqlx::query("DELETE FROM workspace_members WHERE workspace_id = ? AND user_id = ?")
                .bind(workspace_id)
                .bind(user_id)
                .execute(self.pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn record_activity(&self, activity: &NewActivity<'_>) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO workspace_activity (id, workspace_id, user_id, project_id, activity_type, description, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(activity.workspace_id)
        .bind(activity.user_id)
        .bind(activity.project_id)
        .bind(activity.activity_type)
        .bind(&activity.description)
        .bind(Utc::now())
        .execute(self.pool)
        .await
        .context("Failed to record workspace activity")?;
        Ok(())
    }

    /// Newest activity first.
    pub async fn recent_activity(
        &self,
        workspace_id: &str,
        limit: i64,
    ) -> Result<Vec<WorkspaceActivity>> {
        let activity = sqlx::query_as::<_, WorkspaceActivity>(
            r#"
            SELECT * FROM workspace_activity
            WHERE workspace_id = ?
            ORDER BY created_at DESC, rowid DESC
            LIMIT ?
            "#,
        )
        .bind(workspace_id)
        .bind(limit)
        .fetch_all(self.pool)
        .await?;
        Ok(activity)
    }
}
