// src/core/database.rs
//! Connection management and schema setup for the SQLite store.

use anyhow::{Context, Result};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use std::path::Path;

use crate::app_log;
use crate::core::FsOps;

#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open (creating if needed) the database file and run migrations.
    pub async fn new(database_path: &Path) -> Result<Self> {
        if let Some(parent) = database_path.parent() {
            FsOps::ensure_dir_exists(parent).await?;
        }

        let database_url = format!("sqlite:{}?mode=rwc", database_path.display());
        let pool = SqlitePool::connect(&database_url).await.with_context(|| {
            format!("Failed to connect to database: {}", database_path.display())
        })?;

        app_log!(
            info,
            "Database connection established: {}",
            database_path.display()
        );

        let db = Self { pool };
        db.migrate().await?;
        Ok(db)
    }

    /// Private in-memory database on a single pinned connection.
    pub async fn in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await
            .context("Failed to open in-memory database")?;

        let db = Self { pool };
        db.migrate().await?;
        Ok(db)
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Create tables and indexes. Idempotent.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::query("PRAGMA foreign_keys = ON;")
            .execute(&self.pool)
            .await?;

        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .with_context(|| format!("Migration statement failed: {}", statement.trim()))?;
        }

        app_log!(info, "Database migrations completed");
        Ok(())
    }

    pub async fn health_check(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .context("Database health check failed")?;
        Ok(())
    }
}

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS profiles (
        id TEXT PRIMARY KEY,
        email TEXT NOT NULL UNIQUE,
        full_name TEXT,
        bio TEXT,
        location TEXT,
        user_role TEXT NOT NULL DEFAULT 'freelancer',
        looking_for TEXT NOT NULL DEFAULT '[]',
        interests TEXT NOT NULL DEFAULT '[]',
        created_at TEXT NOT NULL DEFAULT (datetime('now')),
        updated_at TEXT NOT NULL DEFAULT (datetime('now'))
    );
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS freelancer_profiles (
        id TEXT PRIMARY KEY,
        user_id TEXT NOT NULL UNIQUE REFERENCES profiles(id) ON DELETE CASCADE,
        skills TEXT NOT NULL DEFAULT '[]',
        hourly_rate REAL,
        years_experience INTEGER,
        availability TEXT,
        portfolio_url TEXT,
        github_url TEXT,
        linkedin_url TEXT,
        created_at TEXT NOT NULL DEFAULT (datetime('now')),
        updated_at TEXT NOT NULL DEFAULT (datetime('now'))
    );
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS workspaces (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        description TEXT,
        owner_id TEXT NOT NULL REFERENCES profiles(id),
        created_at TEXT NOT NULL DEFAULT (datetime('now')),
        updated_at TEXT NOT NULL DEFAULT (datetime('now'))
    );
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS workspace_members (
        id TEXT PRIMARY KEY,
        workspace_id TEXT NOT NULL REFERENCES workspaces(id) ON DELETE CASCADE,
        user_id TEXT NOT NULL REFERENCES profiles(id) ON DELETE CASCADE,
        role TEXT NOT NULL DEFAULT 'member',
        joined_at TEXT NOT NULL DEFAULT (datetime('now')),
        UNIQUE (workspace_id, user_id)
    );
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS projects (
        id TEXT PRIMARY KEY,
        owner_id TEXT NOT NULL REFERENCES profiles(id),
        workspace_id TEXT REFERENCES workspaces(id) ON DELETE SET NULL,
        title TEXT NOT NULL,
        description TEXT NOT NULL,
        required_skills TEXT NOT NULL DEFAULT '[]',
        budget_min REAL,
        budget_max REAL,
        timeline TEXT,
        status TEXT NOT NULL DEFAULT 'open',
        project_type TEXT,
        created_at TEXT NOT NULL DEFAULT (datetime('now')),
        updated_at TEXT NOT NULL DEFAULT (datetime('now'))
    );
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS applications (
        id TEXT PRIMARY KEY,
        project_id TEXT NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
        freelancer_id TEXT NOT NULL REFERENCES profiles(id) ON DELETE CASCADE,
        cover_letter TEXT,
        proposed_rate REAL,
        status TEXT NOT NULL DEFAULT 'pending',
        created_at TEXT NOT NULL DEFAULT (datetime('now')),
        updated_at TEXT NOT NULL DEFAULT (datetime('now')),
        UNIQUE (project_id, freelancer_id)
    );
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS matches (
        id TEXT PRIMARY KEY,
        project_id TEXT NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
        freelancer_id TEXT NOT NULL REFERENCES profiles(id) ON DELETE CASCADE,
        match_score INTEGER NOT NULL CHECK (match_score BETWEEN 0 AND 100),
        match_reason TEXT,
        created_at TEXT NOT NULL DEFAULT (datetime('now')),
        updated_at TEXT NOT NULL DEFAULT (datetime('now')),
        UNIQUE (project_id, freelancer_id)
    );
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS workspace_activity (
        id TEXT PRIMARY KEY,
        workspace_id TEXT NOT NULL REFERENCES workspaces(id) ON DELETE CASCADE,
        user_id TEXT,
        project_id TEXT,
        activity_type TEXT NOT NULL,
        description TEXT,
        created_at TEXT NOT NULL DEFAULT (datetime('now'))
    );
    "#,
    "CREATE INDEX IF NOT EXISTS idx_profiles_user_role ON profiles(user_role);",
    "CREATE INDEX IF NOT EXISTS idx_projects_status ON projects(status);",
    "CREATE INDEX IF NOT EXISTS idx_projects_workspace ON projects(workspace_id);",
    "CREATE INDEX IF NOT EXISTS idx_matches_freelancer ON matches(freelancer_id);",
    "CREATE INDEX IF NOT EXISTS idx_applications_project ON applications(project_id);",
    "CREATE INDEX IF NOT EXISTS idx_activity_workspace ON workspace_activity(workspace_id, created_at);",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn migrate_is_idempotent() {
        let db = Database::in_memory().await.unwrap();
        db.migrate().await.unwrap();
        db.health_check().await.unwrap();

        let tables: Vec<(String,)> = sqlx::query_as(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
        )
        .fetch_all(db.pool())
        .await
        .unwrap();
        let names: Vec<_> = tables.into_iter().map(|(name,)| name).collect();

        assert_eq!(
            names,
            vec![
                "applications",
                "freelancer_profiles",
                "matches",
                "profiles",
                "projects",
                "workspace_activity",
                "workspace_members",
                "workspaces",
            ]
        );
    }

    #[tokio::test]
    async fn creates_database_file_and_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("talentmatch.db");

        let db = Database::new(&path).await.unwrap();
        db.health_check().await.unwrap();

        assert!(path.exists());
    }
}
