// src/store/projects.rs
use anyhow::{Context, Result};
use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::app_log;
use crate::store::models::{
    Application, NewApplication, NewProject, Project, ProjectStatus, ProjectWithApplications,
    ProjectWithOwner,
};

pub struct ProjectRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> ProjectRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a new posting with status `open`.
    pub async fn create(&self, new: &NewProject) -> Result<Project> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO projects (
                id, owner_id, workspace_id, title, description, required_skills,
                budget_min, budget_max, timeline, status, project_type, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(&new.owner_id)
        .bind(&new.workspace_id)
        .bind(&new.title)
        .bind(&new.description)
        .bind(serde_json::to_string(&new.required_skills)?)
        .bind(new.budget_min)
        .bind(new.budget_max)
        .bind(&new.timeline)
        .bind(ProjectStatus::Open)
        .bind(new.project_type)
        .bind(now)
        .bind(now)
        .execute(self.pool)
        .await
        .with_context(|| format!("Failed to create project '{}'", new.title))?;

        app_log!(info, "Created project {} ({})", id, new.title);

        self.find_by_id(&id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Project {} vanished after insert", id))
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<Project>> {
        let project = sqlx::query_as::<_, Project>("SELECT * FROM projects WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool)
            .await?;
        Ok(project)
    }

    pub async fn update_status(&self, id: &str, status: ProjectStatus) -> Result<bool> {
        let result = sqlx::query("UPDATE projects SET status = ?, updated_at = ? WHERE id = ?")
            .bind(status)
            .bind(Utc::now())
            .bind(id)
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Open postings with their owner's bio, newest first, capped at `limit`.
    pub async fn list_open_with_owner(&self, limit: i64) -> Result<Vec<ProjectWithOwner>> {
        let projects = sqlx::query_as::<_, ProjectWithOwner>(
            r#"
            SELECT p.*, o.bio AS owner_bio
            FROM projects p
            LEFT JOIN profiles o ON o.id = p.owner_id
            WHERE p.status = ?
            ORDER BY p.created_at DESC, p.id ASC
            LIMIT ?
            "#,
        )
        .bind(ProjectStatus::Open)
        .bind(limit)
        .fetch_all(self.pool)
        .await
        .context("Failed to load open projects")?;
        Ok(projects)
    }

    pub async fn list_for_workspace(&self, workspace_id: &str) -> Result<Vec<Project>> {
        let projects = sqlx::query_as::<_, Project>(
            "SELECT * FROM projects WHERE workspace_id = ? ORDER BY created_at ASC, id ASC",
        )
        .bind(workspace_id)
        .fetch_all(self.pool)
        .await?;
        Ok(projects)
    }

    pub async fn list_for_workspace_with_applications(
        &self,
        workspace_id: &str,
    ) -> Result<Vec<ProjectWithApplications>> {
        let projects = sqlx::query_as::<_, ProjectWithApplications>(
            r#"
            SELECT p.*,
                   (SELECT COUNT(*) FROM applications a WHERE a.project_id = p.id) AS application_count
            FROM projects p
            WHERE p.workspace_id = ?
            ORDER BY p.created_at ASC, p.id ASC
            "#,
        )
        .bind(workspace_id)
        .fetch_all(self.pool)
        .await?;
        Ok(projects)
    }

    pub async fn create_application(&self, new: &NewApplication) -> Result<Application> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO applications (id, project_id, freelancer_id, cover_letter, proposed_rate, status, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, 'pending', ?, ?)
            "#,
        )
        .bind(&id)
        .bind(&new.project_id)
        .bind(&new.freelancer_id)
        .bind(&new.cover_letter)
        .bind(new.proposed_rate)
        .bind(now)
        .bind(now)
        .execute(self.pool)
        .await
        .with_context(|| format!("Failed to create application for project {}", new.project_id))?;

        let application =
            sqlx::query_as::<_, Application>("SELECT * FROM applications WHERE id = ?")
                .bind(&id)
                .fetch_one(self.pool)
                .await?;
        Ok(application)
    }

    pub async fn find_application(
        &self,
        project_id: &str,
        freelancer_id: &str,
    ) -> Result<Option<Application>> {
        let application = sqlx::query_as::<_, Application>(
            "SELECT * FROM applications WHERE project_id = ? AND freelancer_id = ? LIMIT 1",
        )
        .bind(project_id)
        .bind(freelancer_id)
        .fetch_optional(self.pool)
        .await?;
        Ok(application)
    }
}
