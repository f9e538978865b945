// src/test_support.rs
//! Fixtures shared by the unit tests.

use anyhow::Result;
use std::sync::Mutex;

use crate::core::{Database, GenerationOptions, TextGenerator};
use crate::store::models::{
    NewFreelancerDetail, NewProfile, NewProject, Profile, Project, UserRole, Workspace,
};
use crate::store::{ProfileRepository, ProjectRepository, WorkspaceRepository};

pub async fn test_db() -> Database {
    Database::in_memory().await.unwrap()
}

pub async fn seed_profile(db: &Database, email: &str, role: UserRole) -> Profile {
    let local = email.split('@').next().unwrap_or(email);
    ProfileRepository::new(db.pool())
        .create(&NewProfile {
            email: email.to_string(),
            full_name: Some(local.to_string()),
            user_role: Some(role),
            ..Default::default()
        })
        .await
        .unwrap()
}

pub async fn seed_freelancer(
    db: &Database,
    email: &str,
    skills: &[&str],
    years_experience: Option<i64>,
) -> Profile {
    let profile = seed_profile(db, email, UserRole::Freelancer).await;
    ProfileRepository::new(db.pool())
        .upsert_freelancer_detail(
            &profile.id,
            &NewFreelancerDetail {
                skills: skills.iter().map(|s| s.to_string()).collect(),
                years_experience,
                ..Default::default()
            },
        )
        .await
        .unwrap();
    profile
}

pub async fn seed_project(
    db: &Database,
    owner_id: &str,
    workspace_id: Option<&str>,
    title: &str,
    skills: &[&str],
) -> Project {
    ProjectRepository::new(db.pool())
        .create(&NewProject {
            owner_id: owner_id.to_string(),
            workspace_id: workspace_id.map(str::to_string),
            title: title.to_string(),
            description: format!("{} description", title),
            required_skills: skills.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        })
        .await
        .unwrap()
}

pub async fn seed_workspace(db: &Database, owner_id: &str, name: &str) -> Workspace {
    WorkspaceRepository::new(db.pool())
        .create(name, Some("Shared workspace"), owner_id)
        .await
        .unwrap()
}

#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub system: String,
    pub user: String,
    pub options: GenerationOptions,
}

/// Answers every call with the same text and records what it was asked.
pub struct FixedGenerator {
    reply: String,
    calls: Mutex<Vec<RecordedCall>>,
}

impl FixedGenerator {
    pub fn new(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[rocket::async_trait]
impl TextGenerator for FixedGenerator {
    async fn generate(
        &self,
        system: &str,
        user: &str,
        options: &GenerationOptions,
    ) -> Result<String> {
        self.calls.lock().unwrap().push(RecordedCall {
            system: system.to_string(),
            user: user.to_string(),
            options: options.clone(),
        });
        Ok(self.reply.clone())
    }
}

pub struct FailingGenerator;

#[rocket::async_trait]
impl TextGenerator for FailingGenerator {
    async fn generate(&self, _: &str, _: &str, _: &GenerationOptions) -> Result<String> {
        anyhow::bail!("AI API error: 503")
    }
}

/// Replies computed from the user message, e.g. a score per freelancer.
pub struct ScriptedGenerator<F> {
    script: F,
}

impl<F> ScriptedGenerator<F>
where
    F: Fn(&str) -> Result<String> + Send + Sync,
{
    pub fn new(script: F) -> Self {
        Self { script }
    }
}

#[rocket::async_trait]
impl<F> TextGenerator for ScriptedGenerator<F>
where
    F: Fn(&str) -> Result<String> + Send + Sync,
{
    async fn generate(&self, _system: &str, user: &str, _: &GenerationOptions) -> Result<String> {
        (self.script)(user)
    }
}
