// src/web/handlers/project_handlers.rs
use rocket::serde::json::Json;
use rocket::State;
use tracing::info;

use crate::auth::Session;
use crate::error::ServiceError;
use crate::matching::PostedProject;
use crate::postings::PostingService;
use crate::store::{MatchRepository, ProjectRepository};
use crate::web::types::{
    ApiResult, AppState, ApplicationBody, ApplyRequest, PostProjectRequest, ProjectBody,
    ProjectMatchesBody, Success, UpdateStatusRequest,
};

pub async fn post_project_handler(
    request: Json<PostProjectRequest>,
    session: Session,
    state: &State<AppState>,
) -> ApiResult<PostedProject> {
    let request = request.into_inner();

    let owner_id = match (session.user_id(), request.owner_id.as_deref()) {
        (Some(user), Some(owner)) if user != owner => {
            return Err(ServiceError::Forbidden(
                "Projects can only be posted as yourself".to_string(),
            )
            .into())
        }
        (Some(user), _) => user.to_string(),
        (None, Some(owner)) if !owner.trim().is_empty() => owner.to_string(),
        (None, _) => return Err(ServiceError::bad_request("ownerId is required").into()),
    };

    if let Some(workspace_id) = request.workspace_id.as_deref().filter(|id| !id.is_empty()) {
        session
            .ensure_workspace_access(state.db.pool(), workspace_id, false)
            .await?;
    }

    info!("Posting project '{}' for {}", request.title, owner_id);
    let posted = state
        .engine()
        .post_project(&request.into_new_project(owner_id))
        .await?;
    Ok(Success::json(posted))
}

pub async fn list_project_matches_handler(
    project_id: &str,
    session: Session,
    state: &State<AppState>,
) -> ApiResult<ProjectMatchesBody> {
    let project = ProjectRepository::new(state.db.pool())
        .find_by_id(project_id)
        .await?
        .ok_or_else(|| ServiceError::not_found("Project not found"))?;

    if let Some(user_id) = session.user_id() {
        if user_id != project.owner_id {
            return Err(ServiceError::Forbidden("Not the owner of this project".to_string()).into());
        }
    }

    let matches = MatchRepository::new(state.db.pool())
        .list_for_project(project_id)
        .await?;
    Ok(Success::json(ProjectMatchesBody { matches }))
}

pub async fn apply_to_project_handler(
    project_id: &str,
    request: Json<ApplyRequest>,
    session: Session,
    state: &State<AppState>,
) -> ApiResult<ApplicationBody> {
    let request = request.into_inner();
    let application = PostingService::new(state.db.pool())
        .apply(
            &session,
            project_id,
            request.freelancer_id.as_deref(),
            request.cover_letter,
            request.proposed_rate,
        )
        .await?;
    Ok(Success::json(ApplicationBody { application }))
}

pub async fn update_project_status_handler(
    project_id: &str,
    request: Json<UpdateStatusRequest>,
    session: Session,
    state: &State<AppState>,
) -> ApiResult<ProjectBody> {
    let project = PostingService::new(state.db.pool())
        .update_status(&session, project_id, request.status)
        .await?;
    Ok(Success::json(ProjectBody { project }))
}
