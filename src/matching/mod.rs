// src/matching/mod.rs
//! Matching pipeline: overlap scoring, rationale generation and the four
//! entry points built on them.

pub mod engine;
pub mod overlap;
pub mod project_matches;
pub mod prompts;
pub mod reasons;
pub mod recommendations;
pub mod user_matches;
pub mod workspace_chat;

pub use engine::MatchEngine;
pub use overlap::{estimate_overlap, union_skills, SkillOverlap};
pub use project_matches::{PostedProject, ProjectMatchSummary};
pub use reasons::{fallback_reason, parse_verdict, ModelVerdict, ReasonGenerator};
pub use recommendations::Recommendation;
pub use user_matches::UserMatchSummary;
pub use workspace_chat::{ChatAnswer, WorkspaceSnapshot};
