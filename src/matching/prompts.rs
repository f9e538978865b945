// src/matching/prompts.rs
//! Instruction texts and user messages sent to the text generator.

use crate::store::models::{Candidate, FreelancerDetail, Profile, ProjectWithOwner};

pub const PROJECT_MATCH_SYSTEM: &str = "You are an AI matchmaker. Explain in 1-2 sentences why this freelancer is a good match for this project. Be specific about skills and experience.";

pub const MODEL_SCORE_SYSTEM: &str = "You are an AI matchmaking expert. Analyze the freelancer profile and project requirements to determine match quality. Return ONLY a JSON object with 'score' (0-100) and 'reason' (max 100 words explaining the match).";

pub const RECOMMENDATION_SYSTEM: &str = "You are a talent matchmaker. Explain in 1-2 sentences why this freelancer would be a great addition to the workspace based on their skills and experience.";

const WORKSPACE_CHAT_SYSTEM: &str = "You are an AI assistant for a collaborative workspace. You have access to workspace data including members, projects, and activities. Answer questions accurately based on the provided context. Be helpful, specific, and provide actionable insights when possible.";

fn money(value: Option<f64>) -> String {
    let value = value.unwrap_or(0.0);
    if value.fract() == 0.0 {
        format!("{:.0}", value)
    } else {
        format!("{:.2}", value)
    }
}

fn or_default<'a>(value: Option<&'a str>, fallback: &'a str) -> &'a str {
    value.filter(|v| !v.trim().is_empty()).unwrap_or(fallback)
}

fn list_or<'a>(items: &[String], fallback: &'a str) -> String {
    if items.is_empty() {
        fallback.to_string()
    } else {
        items.join(", ")
    }
}

pub fn project_match_prompt(
    title: &str,
    required_skills: &[String],
    budget_min: Option<f64>,
    budget_max: Option<f64>,
    candidate: &Candidate,
) -> String {
    format!(
        "Project: {}\nRequired Skills: {}\nBudget: ${}-${}\n\nFreelancer: {}\nSkills: {}\nExperience: {} years\nRate: ${}/hr\n\nWhy is this a good match?",
        title,
        required_skills.join(", "),
        money(budget_min),
        money(budget_max),
        candidate.display_name(),
        candidate.skills.join(", "),
        candidate.years_experience.unwrap_or(0),
        money(candidate.hourly_rate),
    )
}

pub fn recommendation_prompt(
    workspace_name: &str,
    workspace_skills: &[String],
    project_count: usize,
    candidate: &Candidate,
) -> String {
    format!(
        "Workspace: {}\nWorkspace Skills Needed: {}\nProjects: {}\n\nFreelancer: {}\nSkills: {}\nExperience: {} years\nRate: ${}/hr\n\nWhy recommend for this workspace?",
        workspace_name,
        workspace_skills.join(", "),
        project_count,
        candidate.display_name(),
        candidate.skills.join(", "),
        candidate.years_experience.unwrap_or(0),
        money(candidate.hourly_rate),
    )
}

/// Freelancer half of the model-scored prompt; built once per run.
pub fn freelancer_context(detail: &FreelancerDetail, profile: Option<&Profile>) -> String {
    let bio = profile.and_then(|p| p.bio.as_deref());
    let looking_for = profile
        .map(|p| list_or(&p.looking_for, "Any opportunities"))
        .unwrap_or_else(|| "Any opportunities".to_string());

    format!(
        "Skills: {}\nExperience: {} years\nHourly Rate: ${}\nAvailability: {}\nBio: {}\nLooking for: {}",
        list_or(&detail.skills, "None"),
        detail.years_experience.unwrap_or(0),
        money(detail.hourly_rate),
        or_default(detail.availability.as_deref(), "Not specified"),
        or_default(bio, "No bio"),
        looking_for,
    )
}

pub fn project_context(entry: &ProjectWithOwner) -> String {
    let project = &entry.project;
    format!(
        "Title: {}\nDescription: {}\nRequired Skills: {}\nBudget: ${} - ${}\nTimeline: {}\nProject Type: {}\nOwner Bio: {}",
        project.title,
        project.description,
        list_or(&project.required_skills, "None"),
        money(project.budget_min),
        money(project.budget_max),
        or_default(project.timeline.as_deref(), "Not specified"),
        project.project_type.map(|t| t.as_str()).unwrap_or("Not specified"),
        or_default(entry.owner_bio.as_deref(), "No bio available"),
    )
}

pub fn model_score_prompt(freelancer_context: &str, project_context: &str) -> String {
    format!(
        r#"Analyze this match:

FREELANCER PROFILE:
{freelancer_context}

PROJECT REQUIREMENTS:
{project_context}

Provide a match score (0-100) based on:
1. Skill alignment (40%)
2. Experience level match (20%)
3. Budget/rate compatibility (20%)
4. Availability and timeline fit (10%)
5. Overall profile compatibility (10%)

Return ONLY valid JSON: {{"score": number, "reason": "string"}}"#
    )
}

pub fn workspace_chat_system(context_json: &str) -> String {
    format!("{}\n\nContext Data:\n{}", WORKSPACE_CHAT_SYSTEM, context_json)
}
