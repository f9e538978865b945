// src/web/handlers/workspace_handlers.rs
use rocket::serde::json::Json;
use rocket::State;
use tracing::info;

use crate::auth::Session;
use crate::error::ServiceError;
use crate::matching::ChatAnswer;
use crate::membership::MembershipService;
use crate::web::types::{
    AddMemberRequest, ApiResult, AppState, ChangeRoleRequest, CreateWorkspaceRequest, Empty,
    MemberBody, RecommendationsBody, Success, WorkspaceBody, WorkspaceChatRequest,
    WorkspaceRequest,
};

pub async fn workspace_recommendations_handler(
    request: Json<WorkspaceRequest>,
    session: Session,
    state: &State<AppState>,
) -> ApiResult<RecommendationsBody> {
    if request.workspace_id.trim().is_empty() {
        return Err(ServiceError::bad_request("workspaceId is required").into());
    }
    info!("Generating member recommendations for workspace: {}", request.workspace_id);

    session
        .ensure_workspace_access(state.db.pool(), &request.workspace_id, true)
        .await?;
    let recommendations = state
        .engine()
        .recommend_for_workspace(&request.workspace_id)
        .await?;
    Ok(Success::json(RecommendationsBody { recommendations }))
}

pub async fn workspace_chat_handler(
    request: Json<WorkspaceChatRequest>,
    session: Session,
    state: &State<AppState>,
) -> ApiResult<ChatAnswer> {
    if request.workspace_id.trim().is_empty() {
        return Err(ServiceError::bad_request("workspaceId is required").into());
    }

    session
        .ensure_workspace_access(state.db.pool(), &request.workspace_id, false)
        .await?;
    let answer = state
        .engine()
        .answer_workspace_question(&request.workspace_id, &request.question)
        .await?;
    Ok(Success::json(answer))
}

pub async fn create_workspace_handler(
    request: Json<CreateWorkspaceRequest>,
    session: Session,
    state: &State<AppState>,
) -> ApiResult<WorkspaceBody> {
    info!("Creating workspace '{}'", request.name);
    let workspace = MembershipService::new(state.db.pool())
        .create_workspace(
            &session,
            request.owner_id.as_deref(),
            &request.name,
            request.description.as_deref(),
        )
        .await?;
    Ok(Success::json(WorkspaceBody { workspace }))
}

pub async fn add_member_handler(
    workspace_id: &str,
    request: Json<AddMemberRequest>,
    session: Session,
    state: &State<AppState>,
) -> ApiResult<MemberBody> {
    let member = MembershipService::new(state.db.pool())
        .add_by_email(&session, workspace_id, &request.email)
        .await?;
    Ok(Success::json(MemberBody { member }))
}

pub async fn change_member_role_handler(
    workspace_id: &str,
    user_id: &str,
    request: Json<ChangeRoleRequest>,
    session: Session,
    state: &State<AppState>,
) -> ApiResult<MemberBody> {
    let member = MembershipService::new(state.db.pool())
        .change_role(&session, workspace_id, user_id, request.role)
        .await?;
    Ok(Success::json(MemberBody { member }))
}

pub async fn remove_member_handler(
    workspace_id: &str,
    user_id: &str,
    session: Session,
    state: &State<AppState>,
) -> ApiResult<Empty> {
    MembershipService::new(state.db.pool())
        .remove(&session, workspace_id, user_id)
        .await?;
    Ok(Success::json(Empty {}))
}
