// src/store/profiles.rs
use anyhow::{Context, Result};
use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use uuid::Uuid;

use crate::app_log;
use crate::store::models::{
    Candidate, FreelancerDetail, NewFreelancerDetail, NewProfile, Profile, UserRole,
};

pub struct ProfileRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> ProfileRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, new: &NewProfile) -> Result<Profile> {
        let id = new
            .id
            .clone()
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        let now = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO profiles (id, email, full_name, bio, location, user_role, looking_for, interests, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(&new.email)
        .bind(&new.full_name)
        .bind(&new.bio)
        .bind(&new.location)
        .bind(new.user_role.unwrap_or(UserRole::Freelancer))
        .bind(serde_json::to_string(&new.looking_for)?)
        .bind(serde_json::to_string(&new.interests)?)
        .bind(now)
        .bind(now)
        .execute(self.pool)
        .await
        .with_context(|| format!("Failed to create profile for {}", new.email))?;

        app_log!(info, "Created profile {} ({})", id, new.email);

        self.find_by_id(&id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Profile {} vanished after insert", id))
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<Profile>> {
        let profile = sqlx::query_as::<_, Profile>("SELECT * FROM profiles WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool)
            .await?;
        Ok(profile)
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<Profile>> {
        let profile = sqlx::query_as::<_, Profile>(
            "SELECT * FROM profiles WHERE lower(email) = lower(?)",
        )
        .bind(email.trim())
        .fetch_optional(self.pool)
        .await?;
        Ok(profile)
    }

    /// Insert or replace the freelancer detail attached to `user_id`.
    pub async fn upsert_freelancer_detail(
        &self,
        user_id: &str,
        detail: &NewFreelancerDetail,
    ) -> Result<FreelancerDetail> {
        let now = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO freelancer_profiles (
                id, user_id, skills, hourly_rate, years_experience, availability,
                portfolio_url, github_url, linkedin_url, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(user_id) DO UPDATE SET
                skills = excluded.skills,
                hourly_rate = excluded.hourly_rate,
                years_experience = excluded.years_experience,
                availability = excluded.availability,
                portfolio_url = excluded.portfolio_url,
                github_url = excluded.github_url,
                linkedin_url = excluded.linkedin_url,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(user_id)
        .bind(serde_json::to_string(&detail.skills)?)
        .bind(detail.hourly_rate)
        .bind(detail.years_experience)
        .bind(&detail.availability)
        .bind(&detail.portfolio_url)
        .bind(&detail.github_url)
        .bind(&detail.linkedin_url)
        .bind(now)
        .bind(now)
        .execute(self.pool)
        .await
        .with_context(|| format!("Failed to save freelancer detail for {}", user_id))?;

        self.find_freelancer_detail(user_id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Freelancer detail for {} vanished after upsert", user_id))
    }

    pub async fn find_freelancer_detail(&self, user_id: &str) -> Result<Option<FreelancerDetail>> {
        let detail = sqlx::query_as::<_, FreelancerDetail>(
            "SELECT * FROM freelancer_profiles WHERE user_id = ?",
        )
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?;
        Ok(detail)
    }

    /// Profiles with one of `roles` that have a freelancer detail, oldest first.
    pub async fn list_candidates(&self, roles: &[UserRole]) -> Result<Vec<Candidate>> {
        if roles.is_empty() {
            return Ok(Vec::new());
        }

        let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(
            r#"
            SELECT p.id AS profile_id, p.email, p.full_name, p.bio, p.user_role,
                   f.skills, f.hourly_rate, f.years_experience, f.availability
            FROM profiles p
            JOIN freelancer_profiles f ON f.user_id = p.id
            WHERE p.user_role IN (
            "#,
        );
        let mut separated = builder.separated(", ");
        for role in roles {
            separated.push_bind(*role);
        }
        separated.push_unseparated(") ORDER BY p.created_at ASC, p.id ASC");

        let candidates = builder
            .build_query_as::<Candidate>()
            .fetch_all(self.pool)
            .await
            .context("Failed to load candidate profiles")?;

        Ok(candidates)
    }
}
