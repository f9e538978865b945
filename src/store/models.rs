// src/store/models.rs
//! Row types and enumerations shared by the repositories.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum UserRole {
    Freelancer,
    ProjectOwner,
    OpenSourceMaintainer,
    OpenSourceContributor,
    StartupFounder,
    JobSeeker,
    HackathonParticipant,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Freelancer => "freelancer",
            UserRole::ProjectOwner => "project_owner",
            UserRole::OpenSourceMaintainer => "open_source_maintainer",
            UserRole::OpenSourceContributor => "open_source_contributor",
            UserRole::StartupFounder => "startup_founder",
            UserRole::JobSeeker => "job_seeker",
            UserRole::HackathonParticipant => "hackathon_participant",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum ProjectStatus {
    Open,
    InProgress,
    Completed,
    Cancelled,
}

impl ProjectStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectStatus::Open => "open",
            ProjectStatus::InProgress => "in_progress",
            ProjectStatus::Completed => "completed",
            ProjectStatus::Cancelled => "cancelled",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum ProjectType {
    FreelanceGig,
    OpenSourceProject,
    StartupOpportunity,
    FullTimeJob,
    HackathonTeam,
    ContractWork,
}

impl ProjectType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectType::FreelanceGig => "freelance_gig",
            ProjectType::OpenSourceProject => "open_source_project",
            ProjectType::StartupOpportunity => "startup_opportunity",
            ProjectType::FullTimeJob => "full_time_job",
            ProjectType::HackathonTeam => "hackathon_team",
            ProjectType::ContractWork => "contract_work",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum WorkspaceRole {
    Owner,
    Admin,
    Member,
}

impl WorkspaceRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkspaceRole::Owner => "owner",
            WorkspaceRole::Admin => "admin",
            WorkspaceRole::Member => "member",
        }
    }

    /// Owners and admins manage membership.
    pub fn can_manage_members(&self) -> bool {
        matches!(self, WorkspaceRole::Owner | WorkspaceRole::Admin)
    }
}

// ===== Profiles =====

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Profile {
    pub id: String,
    pub email: String,
    pub full_name: Option<String>,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub user_role: UserRole,
    #[sqlx(json)]
    pub looking_for: Vec<String>,
    #[sqlx(json)]
    pub interests: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewProfile {
    pub id: Option<String>,
    pub email: String,
    pub full_name: Option<String>,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub user_role: Option<UserRole>,
    #[serde(default)]
    pub looking_for: Vec<String>,
    #[serde(default)]
    pub interests: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct FreelancerDetail {
    pub id: String,
    pub user_id: String,
    #[sqlx(json)]
    pub skills: Vec<String>,
    pub hourly_rate: Option<f64>,
    pub years_experience: Option<i64>,
    pub availability: Option<String>,
    pub portfolio_url: Option<String>,
    pub github_url: Option<String>,
    pub linkedin_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewFreelancerDetail {
    #[serde(default)]
    pub skills: Vec<String>,
    pub hourly_rate: Option<f64>,
    pub years_experience: Option<i64>,
    pub availability: Option<String>,
    pub portfolio_url: Option<String>,
    pub github_url: Option<String>,
    pub linkedin_url: Option<String>,
}

/// A profile joined with its freelancer detail; the unit every matcher scores.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Candidate {
    pub profile_id: String,
    pub email: String,
    pub full_name: Option<String>,
    pub bio: Option<String>,
    pub user_role: UserRole,
    #[sqlx(json)]
    pub skills: Vec<String>,
    pub hourly_rate: Option<f64>,
    pub years_experience: Option<i64>,
    pub availability: Option<String>,
}

impl Candidate {
    pub fn display_name(&self) -> &str {
        self.full_name.as_deref().unwrap_or(&self.email)
    }
}

// ===== Projects =====

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Project {
    pub id: String,
    pub owner_id: String,
    pub workspace_id: Option<String>,
    pub title: String,
    pub description: String,
    #[sqlx(json)]
    pub required_skills: Vec<String>,
    pub budget_min: Option<f64>,
    pub budget_max: Option<f64>,
    pub timeline: Option<String>,
    pub status: ProjectStatus,
    pub project_type: Option<ProjectType>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewProject {
    pub owner_id: String,
    pub workspace_id: Option<String>,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub required_skills: Vec<String>,
    pub budget_min: Option<f64>,
    pub budget_max: Option<f64>,
    pub timeline: Option<String>,
    pub project_type: Option<ProjectType>,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProjectWithOwner {
    #[sqlx(flatten)]
    pub project: Project,
    pub owner_bio: Option<String>,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProjectWithApplications {
    #[sqlx(flatten)]
    pub project: Project,
    pub application_count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Application {
    pub id: String,
    pub project_id: String,
    pub freelancer_id: String,
    pub cover_letter: Option<String>,
    pub proposed_rate: Option<f64>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub struct NewApplication {
    pub project_id: String,
    pub freelancer_id: String,
    pub cover_letter: Option<String>,
    pub proposed_rate: Option<f64>,
}

// ===== Workspaces =====

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Workspace {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub owner_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct WorkspaceMember {
    pub id: String,
    pub workspace_id: String,
    pub user_id: String,
    pub role: WorkspaceRole,
    pub joined_at: DateTime<Utc>,
}

/// Membership row joined with the member's profile and optional freelancer detail.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct MemberProfile {
    pub user_id: String,
    pub role: WorkspaceRole,
    pub joined_at: DateTime<Utc>,
    pub full_name: Option<String>,
    pub email: String,
    pub bio: Option<String>,
    #[sqlx(json)]
    pub skills: Vec<String>,
    pub years_experience: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct WorkspaceActivity {
    pub id: String,
    pub workspace_id: String,
    /// `None` for changes made by a service caller.
    pub user_id: Option<String>,
    pub project_id: Option<String>,
    pub activity_type: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewActivity<'a> {
    pub workspace_id: &'a str,
    pub user_id: Option<&'a str>,
    pub project_id: Option<&'a str>,
    pub activity_type: &'a str,
    pub description: Option<String>,
}

// ===== Matches =====

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct MatchRecord {
    pub id: String,
    pub project_id: String,
    pub freelancer_id: String,
    pub match_score: i64,
    pub match_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct MatchWithProject {
    pub id: String,
    pub project_id: String,
    pub freelancer_id: String,
    pub match_score: i64,
    pub match_reason: Option<String>,
    pub project_title: String,
    pub project_status: ProjectStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct MatchWithFreelancer {
    pub id: String,
    pub project_id: String,
    pub freelancer_id: String,
    pub match_score: i64,
    pub match_reason: Option<String>,
    pub freelancer_name: Option<String>,
    pub freelancer_email: String,
    pub created_at: DateTime<Utc>,
}
