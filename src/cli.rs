// src/cli.rs
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;

use crate::app_log;
use crate::auth::AuthConfig;
use crate::core::{ChatCompletionClient, ConfigManager, Database};
use crate::matching::MatchEngine;
use crate::web::start_web_server;

#[derive(Debug, Parser)]
#[command(name = "talentmatch")]
#[command(about = "Match freelancers to projects and serve the matching API")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Overrides the configured SQLite file
    #[arg(long, global = true)]
    pub database_path: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the HTTP server (default)
    Serve {
        #[arg(long)]
        port: Option<u16>,
    },
    /// Create or update the database schema
    Migrate,
    /// Score all candidate freelancers against one project
    GenerateMatches { project_id: String },
    /// Generate matches for a freelancer unless they already have some
    EnsureUserMatches {
        user_id: String,
        #[arg(long)]
        force: bool,
    },
    /// Suggest new members for a workspace
    Recommend { workspace_id: String },
    /// Mint a bearer token for a profile id
    IssueToken {
        user_id: String,
        #[arg(long)]
        email: Option<String>,
        /// Lifetime in seconds
        #[arg(long, default_value_t = 86_400)]
        ttl: i64,
    },
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let rendered = serde_json::to_string_pretty(value).context("Failed to render result")?;
    println!("{}", rendered);
    Ok(())
}

pub async fn handle_command(cli: Cli, mut config: ConfigManager) -> Result<()> {
    if let Some(path) = cli.database_path {
        config.environment.database_path = path;
    }

    let command = cli.command.unwrap_or(Command::Serve { port: None });

    match command {
        Command::Serve { port } => {
            if let Some(port) = port {
                config.environment.port = port;
            }
            start_web_server(config).await
        }

        Command::Migrate => {
            // Database::new migrates on open.
            Database::new(config.database_path()).await?;
            app_log!(
                info,
                "Schema up to date: {}",
                config.database_path().display()
            );
            Ok(())
        }

        Command::IssueToken {
            user_id,
            email,
            ttl,
        } => {
            let auth = AuthConfig::new(&config.auth);
            let token = auth.issue_token(&user_id, email.as_deref(), ttl)?;
            println!("{}", token);
            Ok(())
        }

        Command::GenerateMatches { project_id } => {
            let (db, client) = open(&config).await?;
            let engine = MatchEngine::new(db.pool(), &client, &config.matching);
            let summary = engine.generate_project_matches(&project_id).await?;
            print_json(&summary)
        }

        Command::EnsureUserMatches { user_id, force } => {
            let (db, client) = open(&config).await?;
            let engine = MatchEngine::new(db.pool(), &client, &config.matching);
            let summary = engine.ensure_user_matches(&user_id, force).await?;
            print_json(&summary)
        }

        Command::Recommend { workspace_id } => {
            let (db, client) = open(&config).await?;
            let engine = MatchEngine::new(db.pool(), &client, &config.matching);
            let recommendations = engine.recommend_for_workspace(&workspace_id).await?;
            print_json(&recommendations)
        }
    }
}

async fn open(config: &ConfigManager) -> Result<(Database, ChatCompletionClient)> {
    let db = Database::new(config.database_path()).await?;
    let client = ChatCompletionClient::new(&config.service)?;
    Ok((db, client))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_subcommand_means_serve() {
        let cli = Cli::try_parse_from(["talentmatch"]).unwrap();
        assert!(cli.command.is_none());
        assert!(cli.database_path.is_none());
    }

    #[test]
    fn parses_ensure_with_force_and_global_path() {
        let cli = Cli::try_parse_from([
            "talentmatch",
            "ensure-user-matches",
            "user-1",
            "--force",
            "--database-path",
            "/tmp/tm.db",
        ])
        .unwrap();

        match cli.command {
            Some(Command::EnsureUserMatches { user_id, force }) => {
                assert_eq!(user_id, "user-1");
                assert!(force);
            }
            other => panic!("unexpected command: {:?}", other),
        }
        assert_eq!(cli.database_path, Some(PathBuf::from("/tmp/tm.db")));
    }

    #[test]
    fn issue_token_defaults_to_one_day() {
        let cli = Cli::try_parse_from(["talentmatch", "issue-token", "user-1"]).unwrap();
        match cli.command {
            Some(Command::IssueToken { ttl, email, .. }) => {
                assert_eq!(ttl, 86_400);
                assert!(email.is_none());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn generate_matches_requires_project_id() {
        assert!(Cli::try_parse_from(["talentmatch", "generate-matches"]).is_err());
    }

    #[tokio::test]
    async fn migrate_creates_database_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("tm.db");
        let cli = Cli::try_parse_from([
            "talentmatch",
            "migrate",
            "--database-path",
            path.to_str().unwrap(),
        ])
        .unwrap();

        handle_command(cli, ConfigManager::defaults("local"))
            .await
            .unwrap();
        assert!(path.exists());
    }
}
