// src/store/mod.rs
//! SQLite-backed repositories for profiles, projects, workspaces and matches.

pub mod matches;
pub mod models;
pub mod profiles;
pub mod projects;
pub mod workspaces;

pub use matches::{clamp_score, MatchRepository};
pub use profiles::ProfileRepository;
pub use projects::ProjectRepository;
pub use workspaces::WorkspaceRepository;
