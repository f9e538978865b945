// src/core/mod.rs
//! Infrastructure shared by every entry point: configuration, database
//! connection, file system helpers and the text-generation client.

pub mod ai_client;
pub mod config_manager;
pub mod database;
pub mod fs_ops;

pub use ai_client::{ChatCompletionClient, GenerationOptions, TextGenerator};
pub use config_manager::{ConfigManager, MatchingConfig};
pub use database::Database;
pub use fs_ops::FsOps;
