// src/core/config_manager.rs
//! Unified configuration: optional `config.yaml` with per-environment
//! sections, then environment variable overrides.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::core::FsOps;
use crate::store::models::UserRole;

const DEFAULT_CONFIG_FILE: &str = "config.yaml";

#[derive(Debug, Clone)]
pub struct ConfigManager {
    pub environment_name: String,
    /// File the values were read from; `None` when built-in defaults apply.
    /// Loading happens before tracing is installed, so callers log this.
    pub source: Option<PathBuf>,
    pub environment: EnvironmentConfig,
    pub service: ServiceConfig,
    pub auth: AuthSettings,
    pub matching: MatchingConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EnvironmentConfig {
    pub database_path: PathBuf,
    pub port: u16,
    pub log_file: PathBuf,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("data/talentmatch.db"),
            port: 8000,
            log_file: PathBuf::from("/tmp/talentmatch.log"),
        }
    }
}

/// Chat-completion gateway used for match rationales and workspace chat.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub ai_gateway_url: String,
    pub api_key: String,
    pub model: String,
    pub timeout_seconds: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            ai_gateway_url: "https://ai.gateway.lovable.dev/v1".to_string(),
            api_key: String::new(),
            model: "google/gemini-2.5-flash".to_string(),
            timeout_seconds: 60,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AuthSettings {
    /// HS256 secret for bearer tokens. Unset disables per-user sessions.
    pub jwt_secret: Option<String>,
    pub audience: Option<String>,
}

/// Thresholds are overlap percentages in [0, 100]; a candidate qualifies when
/// its overlap is greater than or equal to the threshold.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MatchingConfig {
    pub project_match_threshold: f64,
    pub user_match_threshold: f64,
    pub recommendation_threshold: f64,
    pub candidate_roles: Vec<UserRole>,
    pub open_project_limit: i64,
    pub batch_size: usize,
    pub batch_delay_ms: u64,
    pub activity_fetch_limit: i64,
    pub activity_context_limit: usize,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            project_match_threshold: 40.0,
            user_match_threshold: 30.0,
            recommendation_threshold: 30.0,
            candidate_roles: vec![UserRole::Freelancer],
            open_project_limit: 50,
            batch_size: 5,
            batch_delay_ms: 100,
            activity_fetch_limit: 50,
            activity_context_limit: 20,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ConfigSection {
    environment: EnvironmentConfig,
    service: ServiceConfig,
    auth: AuthSettings,
    matching: MatchingConfig,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ConfigFile {
    local: ConfigSection,
    production: ConfigSection,
}

impl ConfigManager {
    /// Load configuration for the current environment.
    pub fn load() -> Result<Self> {
        let config_path = std::env::var("TALENTMATCH_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_FILE));

        Self::load_from(&config_path, &Self::environment_name(), |key| {
            std::env::var(key).ok()
        })
    }

    /// Read `config_path` if it exists, then apply overrides from `lookup`.
    pub fn load_from<F>(config_path: &Path, environment_name: &str, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = if config_path.exists() {
            let content = std::fs::read_to_string(config_path)
                .with_context(|| format!("Failed to read {}", config_path.display()))?;
            let mut config = Self::from_yaml(&content, environment_name)
                .with_context(|| format!("Failed to parse {}", config_path.display()))?;
            config.source = Some(config_path.to_path_buf());
            config
        } else {
            Self::defaults(environment_name)
        };

        config.apply_env_overrides(lookup)?;
        config.environment.database_path = FsOps::resolve_path(&config.environment.database_path)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a YAML document and pick the section for `environment_name`.
    pub fn from_yaml(content: &str, environment_name: &str) -> Result<Self> {
        let file: ConfigFile = serde_yaml::from_str(content).context("Invalid configuration YAML")?;
        let section = match environment_name {
            "production" => file.production,
            _ => file.local,
        };

        Ok(Self {
            environment_name: environment_name.to_string(),
            source: None,
            environment: section.environment,
            service: section.service,
            auth: section.auth,
            matching: section.matching,
        })
    }

    pub fn defaults(environment_name: &str) -> Self {
        Self {
            environment_name: environment_name.to_string(),
            source: None,
            environment: EnvironmentConfig::default(),
            service: ServiceConfig::default(),
            auth: AuthSettings::default(),
            matching: MatchingConfig::default(),
        }
    }

    fn environment_name() -> String {
        std::env::var("TALENTMATCH_ENV")
            .or_else(|_| std::env::var("ENVIRONMENT"))
            .unwrap_or_else(|_| "local".to_string())
    }

    /// Environment variables win over file values.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup("DATABASE_PATH") {
            self.environment.database_path = PathBuf::from(path);
        }
        if let Some(port) = lookup("PORT").or_else(|| lookup("ROCKET_PORT")) {
            self.environment.port = port
                .parse()
                .with_context(|| format!("PORT must be a valid port number, got {}", port))?;
        }
        if let Some(log_file) = lookup("LOG_FILE") {
            self.environment.log_file = PathBuf::from(log_file);
        }
        if let Some(url) = lookup("AI_GATEWAY_URL") {
            self.service.ai_gateway_url = url;
        }
        if let Some(key) = lookup("AI_API_KEY").or_else(|| lookup("LOVABLE_API_KEY")) {
            self.service.api_key = key;
        }
        if let Some(model) = lookup("AI_MODEL") {
            self.service.model = model;
        }
        if let Some(timeout) = lookup("AI_TIMEOUT_SECS") {
            self.service.timeout_seconds = timeout
                .parse()
                .with_context(|| format!("AI_TIMEOUT_SECS must be an integer, got {}", timeout))?;
        }
        if let Some(secret) = lookup("JWT_SECRET") {
            self.auth.jwt_secret = Some(secret).filter(|s| !s.is_empty());
        }
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        let thresholds = [
            ("project_match_threshold", self.matching.project_match_threshold),
            ("user_match_threshold", self.matching.user_match_threshold),
            ("recommendation_threshold", self.matching.recommendation_threshold),
        ];
        for (name, value) in thresholds {
            if !(0.0..=100.0).contains(&value) {
                anyhow::bail!("matching.{} must be within 0-100, got {}", name, value);
            }
        }
        if self.matching.candidate_roles.is_empty() {
            anyhow::bail!("matching.candidate_roles must list at least one role");
        }
        Ok(())
    }

    pub fn database_path(&self) -> &Path {
        &self.environment.database_path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const SAMPLE: &str = r#"
local:
  environment:
    database_path: data/local.db
    port: 8100
  matching:
    project_match_threshold: 45
    candidate_roles: [freelancer, job_seeker]
production:
  environment:
    database_path: /app/data/talentmatch.db
  service:
    model: openai/gpt-5-mini
"#;

    #[test]
    fn test_picks_section_by_environment() {
        let local = ConfigManager::from_yaml(SAMPLE, "local").unwrap();
        assert_eq!(local.environment.port, 8100);
        assert_eq!(local.matching.project_match_threshold, 45.0);
        assert_eq!(local.matching.user_match_threshold, 30.0);
        assert_eq!(
            local.matching.candidate_roles,
            vec![UserRole::Freelancer, UserRole::JobSeeker]
        );

        let production = ConfigManager::from_yaml(SAMPLE, "production").unwrap();
        assert_eq!(
            production.environment.database_path,
            PathBuf::from("/app/data/talentmatch.db")
        );
        assert_eq!(production.environment.port, 8000);
        assert_eq!(production.service.model, "openai/gpt-5-mini");
        assert_eq!(production.matching.project_match_threshold, 40.0);
    }

    #[test]
    fn test_unknown_environment_falls_back_to_local() {
        let config = ConfigManager::from_yaml(SAMPLE, "staging").unwrap();
        assert_eq!(config.environment.database_path, PathBuf::from("data/local.db"));
    }

    #[test]
    fn test_env_overrides_win() {
        let vars: HashMap<&str, &str> = [
            ("PORT", "9001"),
            ("AI_API_KEY", "secret-key"),
            ("JWT_SECRET", "jwt"),
            ("DATABASE_PATH", "/tmp/override.db"),
        ]
        .into_iter()
        .collect();

        let mut config = ConfigManager::defaults("local");
        config
            .apply_env_overrides(|key| vars.get(key).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.environment.port, 9001);
        assert_eq!(config.service.api_key, "secret-key");
        assert_eq!(config.auth.jwt_secret.as_deref(), Some("jwt"));
        assert_eq!(config.database_path(), Path::new("/tmp/override.db"));
    }

    #[test]
    fn test_invalid_port_is_rejected() {
        let mut config = ConfigManager::defaults("local");
        let result = config.apply_env_overrides(|key| (key == "PORT").then(|| "http".to_string()));
        assert!(result.is_err());
    }

    #[test]
    fn test_out_of_range_threshold_is_rejected() {
        let mut config = ConfigManager::defaults("local");
        config.matching.user_match_threshold = 120.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_from_records_source_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, SAMPLE).unwrap();

        let config = ConfigManager::load_from(&path, "local", |_| None).unwrap();
        assert_eq!(config.source.as_deref(), Some(path.as_path()));
        assert_eq!(config.environment.port, 8100);
        assert!(config.database_path().is_absolute());

        let missing = dir.path().join("absent.yaml");
        let config = ConfigManager::load_from(&missing, "local", |_| None).unwrap();
        assert_eq!(config.source, None);
        assert_eq!(config.environment.port, 8000);
    }
}
