// src/auth.rs
use anyhow::{Context, Result};
use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rocket::http::Status;
use rocket::request::{FromRequest, Outcome};
use rocket::{Request, State};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::app_log;
use crate::core::config_manager::AuthSettings;
use crate::error::{ServiceError, ServiceResult};
use crate::store::WorkspaceRepository;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // profile id
    pub exp: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aud: Option<String>,
}

/// Bearer token settings. Without a secret every request runs as the service.
#[derive(Debug, Clone, Default)]
pub struct AuthConfig {
    secret: Option<String>,
    audience: Option<String>,
}

impl AuthConfig {
    pub fn new(settings: &AuthSettings) -> Self {
        Self {
            secret: settings.jwt_secret.clone().filter(|s| !s.is_empty()),
            audience: settings.audience.clone(),
        }
    }

    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn enabled(&self) -> bool {
        self.secret.is_some()
    }

    pub fn issue_token(&self, user_id: &str, email: Option<&str>, ttl_seconds: i64) -> Result<String> {
        let secret = self
            .secret
            .as_deref()
            .context("Cannot issue tokens without a JWT secret")?;

        let claims = Claims {
            sub: user_id.to_string(),
            exp: (Utc::now().timestamp() + ttl_seconds).max(0) as usize,
            email: email.map(str::to_string),
            aud: self.audience.clone(),
        };

        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .context("Failed to sign session token")
    }

    pub fn verify(&self, token: &str) -> Result<Claims> {
        let secret = self
            .secret
            .as_deref()
            .context("Token verification is disabled")?;

        let mut validation = Validation::new(Algorithm::HS256);
        match &self.audience {
            Some(audience) => validation.set_audience(&[audience]),
            None => validation.validate_aud = false,
        }

        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &validation,
        )?;
        Ok(data.claims)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthError {
    MissingToken,
    InvalidToken,
    TokenVerificationFailed,
    ConfigMissing,
}

impl AuthError {
    pub fn message(&self) -> &'static str {
        match self {
            AuthError::MissingToken => "Authorization token required",
            AuthError::InvalidToken => "Invalid authorization token format",
            AuthError::TokenVerificationFailed => "Token verification failed",
            AuthError::ConfigMissing => "Authentication is not configured",
        }
    }
}

/// Last guard failure, read back by the 401 catcher.
#[derive(Debug, Default)]
pub struct AuthFailure(pub Option<AuthError>);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Caller {
    /// Trusted internal caller (scheduler, CLI, or auth disabled).
    Service,
    User(String),
}

/// Explicit per-request identity.
#[derive(Debug, Clone)]
pub struct Session {
    pub caller: Caller,
}

impl Session {
    pub fn service() -> Self {
        Self {
            caller: Caller::Service,
        }
    }

    pub fn user(user_id: impl Into<String>) -> Self {
        Self {
            caller: Caller::User(user_id.into()),
        }
    }

    pub fn user_id(&self) -> Option<&str> {
        match &self.caller {
            Caller::User(id) => Some(id),
            Caller::Service => None,
        }
    }

    /// Users may only act on their own behalf.
    pub fn ensure_is(&self, user_id: &str) -> ServiceResult<()> {
        match &self.caller {
            Caller::Service => Ok(()),
            Caller::User(id) if id == user_id => Ok(()),
            Caller::User(_) => Err(ServiceError::Forbidden(
                "Cannot act on behalf of another user".to_string(),
            )),
        }
    }

    /// Require workspace membership, and owner/admin when `manage` is set.
    pub async fn ensure_workspace_access(
        &self,
        pool: &SqlitePool,
        workspace_id: &str,
        manage: bool,
    ) -> ServiceResult<()> {
        let workspaces = WorkspaceRepository::new(pool);
        if workspaces.find_by_id(workspace_id).await?.is_none() {
            return Err(ServiceError::not_found("Workspace not found"));
        }

        let Caller::User(user_id) = &self.caller else {
            return Ok(());
        };

        let member = workspaces
            .find_member(workspace_id, user_id)
            .await?
            .ok_or_else(|| ServiceError::Forbidden("Not a member of this workspace".to_string()))?;

        if manage && !member.role.can_manage_members() {
            return Err(ServiceError::Forbidden(
                "Only workspace owners and admins can manage members".to_string(),
            ));
        }
        Ok(())
    }
}

fn fail(req: &Request<'_>, error: AuthError) -> Outcome<Session, AuthError> {
    req.local_cache(|| AuthFailure(Some(error)));
    Outcome::Error((Status::Unauthorized, error))
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for Session {
    type Error = AuthError;

    async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let auth_config = match req.guard::<&State<AuthConfig>>().await {
            Outcome::Success(config) => config,
            _ => {
                app_log!(error, "AuthConfig is not managed by this Rocket instance");
                return Outcome::Error((Status::InternalServerError, AuthError::ConfigMissing));
            }
        };

        if !auth_config.enabled() {
            return Outcome::Success(Session::service());
        }

        let token = match req.headers().get_one("Authorization") {
            Some(header) => match header.strip_prefix("Bearer ") {
                Some(token) if !token.trim().is_empty() => token.trim(),
                _ => {
                    app_log!(warn, "Invalid Authorization header format");
                    return fail(req, AuthError::InvalidToken);
                }
            },
            None => {
                app_log!(warn, "Missing Authorization header");
                return fail(req, AuthError::MissingToken);
            }
        };

        match auth_config.verify(token) {
            Ok(claims) => {
                app_log!(debug, "Authenticated session for {}", claims.sub);
                Outcome::Success(Session::user(claims.sub))
            }
            Err(e) => {
                app_log!(warn, "Token verification failed: {}", e);
                fail(req, AuthError::TokenVerificationFailed)
            }
        }
    }
}
