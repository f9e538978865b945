// src/web/types.rs
use rocket::http::Status;
use rocket::response::{self, status, Responder};
use rocket::serde::json::Json;
use rocket::serde::{Deserialize, Serialize};
use rocket::Request;
use std::sync::Arc;

use crate::app_log;
use crate::core::{Database, MatchingConfig, TextGenerator};
use crate::error::ServiceError;
use crate::matching::{MatchEngine, Recommendation};
use crate::store::models::{
    Application, MatchWithFreelancer, MatchWithProject, NewProject, Project, ProjectStatus,
    ProjectType, Workspace, WorkspaceMember, WorkspaceRole,
};

/// Everything the route handlers share.
pub struct AppState {
    pub db: Database,
    pub generator: Arc<dyn TextGenerator>,
    pub matching: MatchingConfig,
}

impl AppState {
    pub fn engine(&self) -> MatchEngine<'_> {
        MatchEngine::new(self.db.pool(), self.generator.as_ref(), &self.matching)
    }
}

// ===== Requests =====

#[derive(Debug, Deserialize)]
#[serde(crate = "rocket::serde", rename_all = "camelCase")]
pub struct GenerateMatchesRequest {
    #[serde(alias = "project_id")]
    pub project_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(crate = "rocket::serde", rename_all = "camelCase")]
pub struct UserMatchesRequest {
    #[serde(alias = "user_id")]
    pub user_id: String,
    #[serde(default)]
    pub force: bool,
}

#[derive(Debug, Deserialize)]
#[serde(crate = "rocket::serde", rename_all = "camelCase")]
pub struct WorkspaceRequest {
    #[serde(alias = "workspace_id")]
    pub workspace_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(crate = "rocket::serde", rename_all = "camelCase")]
pub struct WorkspaceChatRequest {
    #[serde(alias = "workspace_id")]
    pub workspace_id: String,
    pub question: String,
}

#[derive(Debug, Deserialize)]
#[serde(crate = "rocket::serde", rename_all = "camelCase")]
pub struct PostProjectRequest {
    /// Required for service callers; users post as themselves.
    pub owner_id: Option<String>,
    pub workspace_id: Option<String>,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub required_skills: Vec<String>,
    pub budget_min: Option<f64>,
    pub budget_max: Option<f64>,
    pub timeline: Option<String>,
    pub project_type: Option<ProjectType>,
}

impl PostProjectRequest {
    pub fn into_new_project(self, owner_id: String) -> NewProject {
        NewProject {
            owner_id,
            workspace_id: self.workspace_id.filter(|id| !id.trim().is_empty()),
            title: self.title.trim().to_string(),
            description: self.description,
            required_skills: self
                .required_skills
                .into_iter()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            budget_min: self.budget_min,
            budget_max: self.budget_max,
            timeline: self.timeline,
            project_type: self.project_type,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(crate = "rocket::serde", rename_all = "camelCase")]
pub struct CreateWorkspaceRequest {
    pub name: String,
    pub description: Option<String>,
    /// Required for service callers; users create workspaces for themselves.
    #[serde(alias = "owner_id")]
    pub owner_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(crate = "rocket::serde", rename_all = "camelCase")]
pub struct ApplyRequest {
    /// Required for service callers; users apply as themselves.
    #[serde(alias = "freelancer_id")]
    pub freelancer_id: Option<String>,
    #[serde(alias = "cover_letter")]
    pub cover_letter: Option<String>,
    #[serde(alias = "proposed_rate")]
    pub proposed_rate: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(crate = "rocket::serde")]
pub struct UpdateStatusRequest {
    pub status: ProjectStatus,
}

#[derive(Debug, Deserialize)]
#[serde(crate = "rocket::serde")]
pub struct AddMemberRequest {
    pub email: String,
}

#[derive(Debug, Deserialize)]
#[serde(crate = "rocket::serde")]
pub struct ChangeRoleRequest {
    pub role: WorkspaceRole,
}

// ===== Responses =====

/// `{ "success": true, ...body }`
#[derive(Debug, Serialize)]
#[serde(crate = "rocket::serde")]
pub struct Success<T: Serialize> {
    pub success: bool,
    #[serde(flatten)]
    pub body: T,
}

impl<T: Serialize> Success<T> {
    pub fn json(body: T) -> Json<Self> {
        Json(Self {
            success: true,
            body,
        })
    }
}

#[derive(Debug, Serialize)]
#[serde(crate = "rocket::serde", rename_all = "camelCase")]
pub struct UserMatchesBody {
    pub match_count: usize,
    pub message: String,
}

#[derive(Debug, Serialize)]
#[serde(crate = "rocket::serde")]
pub struct RecommendationsBody {
    pub recommendations: Vec<Recommendation>,
}

#[derive(Debug, Serialize)]
#[serde(crate = "rocket::serde")]
pub struct FreelancerMatchesBody {
    pub matches: Vec<MatchWithProject>,
}

#[derive(Debug, Serialize)]
#[serde(crate = "rocket::serde")]
pub struct ProjectMatchesBody {
    pub matches: Vec<MatchWithFreelancer>,
}

#[derive(Debug, Serialize)]
#[serde(crate = "rocket::serde")]
pub struct WorkspaceBody {
    pub workspace: Workspace,
}

#[derive(Debug, Serialize)]
#[serde(crate = "rocket::serde")]
pub struct ApplicationBody {
    pub application: Application,
}

#[derive(Debug, Serialize)]
#[serde(crate = "rocket::serde")]
pub struct ProjectBody {
    pub project: Project,
}

#[derive(Debug, Serialize)]
#[serde(crate = "rocket::serde")]
pub struct MemberBody {
    pub member: WorkspaceMember,
}

#[derive(Debug, Serialize)]
#[serde(crate = "rocket::serde")]
pub struct Empty {}

#[derive(Debug, Serialize)]
#[serde(crate = "rocket::serde")]
pub struct HealthResponse {
    pub success: bool,
    pub status: &'static str,
    pub database: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(crate = "rocket::serde")]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn json(message: impl Into<String>) -> Json<Self> {
        Json(Self {
            error: message.into(),
        })
    }
}

/// Non-200 status with an `{ "error": ... }` body.
#[derive(Debug)]
pub struct ApiError {
    pub status: Status,
    pub message: String,
}

impl ApiError {
    pub fn new(status: Status, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        let status = match &err {
            ServiceError::NotFound(_) => Status::NotFound,
            ServiceError::BadRequest(_) => Status::BadRequest,
            ServiceError::Forbidden(_) => Status::Forbidden,
            ServiceError::Conflict(_) => Status::Conflict,
            ServiceError::Generation(_) | ServiceError::Store(_) => Status::InternalServerError,
        };
        if status == Status::InternalServerError {
            app_log!(error, "Request failed: {:#}", err);
        }
        Self::new(status, err.to_string())
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ServiceError::Store(err).into()
    }
}

impl<'r> Responder<'r, 'static> for ApiError {
    fn respond_to(self, req: &'r Request<'_>) -> response::Result<'static> {
        status::Custom(self.status, ErrorBody::json(self.message)).respond_to(req)
    }
}

pub type ApiResult<T> = Result<Json<Success<T>>, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_errors_map_to_statuses() {
        let cases = [
            (ServiceError::not_found("x"), Status::NotFound),
            (ServiceError::bad_request("x"), Status::BadRequest),
            (ServiceError::Forbidden("x".into()), Status::Forbidden),
            (ServiceError::Conflict("x".into()), Status::Conflict),
            (ServiceError::Generation("AI API error: 429".into()), Status::InternalServerError),
            (anyhow::anyhow!("disk I/O error").into(), Status::InternalServerError),
        ];
        for (err, expected) in cases {
            let message = err.to_string();
            let api: ApiError = err.into();
            assert_eq!(api.status, expected);
            assert_eq!(api.message, message);
        }
    }

    #[test]
    fn success_flattens_body() {
        let value = serde_json::to_value(Success {
            success: true,
            body: UserMatchesBody {
                match_count: 2,
                message: "done".into(),
            },
        })
        .unwrap();
        assert_eq!(
            value,
            serde_json::json!({"success": true, "matchCount": 2, "message": "done"})
        );
    }

    #[test]
    fn post_project_request_cleans_input() {
        let request: PostProjectRequest = serde_json::from_str(
            r#"{"title": " API ", "workspaceId": "", "requiredSkills": ["Rust", " ", " Go "]}"#,
        )
        .unwrap();
        let project = request.into_new_project("owner-1".into());
        assert_eq!(project.title, "API");
        assert_eq!(project.workspace_id, None);
        assert_eq!(project.required_skills, vec!["Rust", "Go"]);
    }
}
