// src/web/handlers/match_handlers.rs
use rocket::serde::json::Json;
use rocket::State;
use tracing::info;

use crate::auth::Session;
use crate::error::ServiceError;
use crate::matching::{ProjectMatchSummary, UserMatchSummary};
use crate::store::{MatchRepository, ProjectRepository};
use crate::web::types::{
    ApiError, ApiResult, AppState, FreelancerMatchesBody, GenerateMatchesRequest, Success,
    UserMatchesBody, UserMatchesRequest,
};

const DEFAULT_MATCH_LIMIT: i64 = 20;
const MAX_MATCH_LIMIT: i64 = 100;

fn required(value: &str, field: &str) -> Result<(), ApiError> {
    if value.trim().is_empty() {
        return Err(ServiceError::bad_request(format!("{} is required", field)).into());
    }
    Ok(())
}

/// Users may only trigger matching for projects they own.
async fn ensure_project_owner(
    state: &AppState,
    session: &Session,
    project_id: &str,
) -> Result<(), ApiError> {
    let Some(user_id) = session.user_id() else {
        return Ok(());
    };
    let project = ProjectRepository::new(state.db.pool())
        .find_by_id(project_id)
        .await?
        .ok_or_else(|| ServiceError::not_found("Project not found"))?;
    if project.owner_id != user_id {
        return Err(ServiceError::Forbidden("Not the owner of this project".to_string()).into());
    }
    Ok(())
}

pub async fn generate_matches_handler(
    request: Json<GenerateMatchesRequest>,
    session: Session,
    state: &State<AppState>,
) -> ApiResult<ProjectMatchSummary> {
    required(&request.project_id, "projectId")?;
    info!("Generating matches for project: {}", request.project_id);

    ensure_project_owner(state, &session, &request.project_id).await?;
    let summary = state
        .engine()
        .generate_project_matches(&request.project_id)
        .await?;
    Ok(Success::json(summary))
}

pub async fn generate_user_matches_handler(
    request: Json<UserMatchesRequest>,
    session: Session,
    state: &State<AppState>,
) -> ApiResult<UserMatchesBody> {
    required(&request.user_id, "userId")?;
    session.ensure_is(&request.user_id)?;
    info!("Generating matches for user: {}", request.user_id);

    let summary = state.engine().generate_user_matches(&request.user_id).await?;
    Ok(Success::json(UserMatchesBody {
        match_count: summary.match_count,
        message: summary.message,
    }))
}

pub async fn ensure_user_matches_handler(
    request: Json<UserMatchesRequest>,
    session: Session,
    state: &State<AppState>,
) -> ApiResult<UserMatchSummary> {
    required(&request.user_id, "userId")?;
    session.ensure_is(&request.user_id)?;

    let summary = state
        .engine()
        .ensure_user_matches(&request.user_id, request.force)
        .await?;
    Ok(Success::json(summary))
}

pub async fn list_user_matches_handler(
    user_id: &str,
    limit: Option<i64>,
    session: Session,
    state: &State<AppState>,
) -> ApiResult<FreelancerMatchesBody> {
    session.ensure_is(user_id)?;
    let limit = limit.unwrap_or(DEFAULT_MATCH_LIMIT).clamp(1, MAX_MATCH_LIMIT);

    let matches = MatchRepository::new(state.db.pool())
        .list_for_freelancer(user_id, limit)
        .await?;
    Ok(Success::json(FreelancerMatchesBody { matches }))
}
