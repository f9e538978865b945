// src/store/matches.rs
use anyhow::{Context, Result};
use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::app_log;
use crate::store::models::{MatchRecord, MatchWithFreelancer, MatchWithProject};

/// Round to the nearest integer and clamp into the stored 0-100 range.
pub fn clamp_score(score: f64) -> i64 {
    if !score.is_finite() {
        return 0;
    }
    (score.round() as i64).clamp(0, 100)
}

pub struct MatchRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> MatchRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert or update the single match row for (project, freelancer).
    pub async fn upsert(
        &self,
        project_id: &str,
        freelancer_id: &str,
        score: f64,
        reason: &str,
    ) -> Result<MatchRecord> {
        let now = Utc::now();
        let stored = clamp_score(score);

        sqlx::query(
            r#"
            INSERT INTO matches (id, project_id, freelancer_id, match_score, match_reason, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(project_id, freelancer_id) DO UPDATE SET
                match_score = excluded.match_score,
                match_reason = excluded.match_reason,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(project_id)
        .bind(freelancer_id)
        .bind(stored)
        .bind(reason)
        .bind(now)
        .bind(now)
        .execute(self.pool)
        .await
        .with_context(|| {
            format!(
                "Failed to save match for project {} and freelancer {}",
                project_id, freelancer_id
            )
        })?;

        app_log!(
            debug,
            "Saved match project={} freelancer={} score={}",
            project_id,
            freelancer_id,
            stored
        );

        self.find(project_id, freelancer_id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Match for project {} vanished after upsert", project_id))
    }

    pub async fn find(&self, project_id: &str, freelancer_id: &str) -> Result<Option<MatchRecord>> {
        let record = sqlx::query_as::<_, MatchRecord>(
            "SELECT * FROM matches WHERE project_id = ? AND freelancer_id = ?",
        )
        .bind(project_id)
        .bind(freelancer_id)
        .fetch_optional(self.pool)
        .await?;
        Ok(record)
    }

    /// Best matches for a freelancer, highest score first.
    pub async fn list_for_freelancer(
        &self,
        freelancer_id: &str,
        limit: i64,
    ) -> Result<Vec<MatchWithProject>> {
        let matches = sqlx::query_as::<_, MatchWithProject>(
            r#"
            SELECT m.id, m.project_id, m.freelancer_id, m.match_score, m.match_reason,
                   p.title AS project_title, p.status AS project_status, m.created_at
            FROM matches m
            JOIN projects p ON p.id = m.project_id
            WHERE m.freelancer_id = ?
            ORDER BY m.match_score DESC, m.created_at DESC
            LIMIT ?
            "#,
        )
        .bind(freelancer_id)
        .bind(limit)
        .fetch_all(self.pool)
        .await
        .context("Failed to load freelancer matches")?;
        Ok(matches)
    }

    pub async fn list_for_project(&self, project_id: &str) -> Result<Vec<MatchWithFreelancer>> {
        let matches = sqlx::query_as::<_, MatchWithFreelancer>(
            r#"
            SELECT m.id, m.project_id, m.freelancer_id, m.match_score, m.match_reason,
                   f.full_name AS freelancer_name, f.email AS freelancer_email, m.created_at
            FROM matches m
            JOIN profiles f ON f.id = m.freelancer_id
            WHERE m.project_id = ?
            ORDER BY m.match_score DESC, m.created_at DESC
            "#,
        )
        .bind(project_id)
        .fetch_all(self.pool)
        .await
        .context("Failed to load project matches")?;
        Ok(matches)
    }

    pub async fn count_for_freelancer(&self, freelancer_id: &str) -> Result<i64> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM matches WHERE freelancer_id = ?")
                .bind(freelancer_id)
                .fetch_one(self.pool)
                .await?;
        Ok(count)
    }

    pub async fn count_for_project(&self, project_id: &str) -> Result<i64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM matches WHERE project_id = ?")
            .bind(project_id)
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }
}
