// src/web/mod.rs

pub mod handlers;
pub mod types;

pub use handlers::*;
pub use types::*;

use crate::auth::{AuthConfig, AuthFailure, Session};
use crate::core::{ChatCompletionClient, ConfigManager, Database};
use crate::matching::{ChatAnswer, PostedProject, ProjectMatchSummary, UserMatchSummary};
use anyhow::Result;
use rocket::fairing::{Fairing, Info, Kind};
use rocket::http::{Header, Status};
use rocket::response::status;
use rocket::serde::json::Json;
use rocket::{
    catchers, delete, get, options, patch, post, routes, Build, Request, Response, Rocket, State,
};
use std::sync::Arc;
use tracing::{info, warn};

// CORS Fairing
pub struct Cors;

#[rocket::async_trait]
impl Fairing for Cors {
    fn info(&self) -> Info {
        Info {
            name: "Add CORS headers to responses",
            kind: Kind::Response,
        }
    }

    async fn on_response<'r>(&self, _request: &'r Request<'_>, response: &mut Response<'r>) {
        response.set_header(Header::new("Access-Control-Allow-Origin", "*"));
        response.set_header(Header::new(
            "Access-Control-Allow-Methods",
            "POST, GET, PATCH, DELETE, OPTIONS",
        ));
        response.set_header(Header::new(
            "Access-Control-Allow-Headers",
            "authorization, x-client-info, apikey, content-type",
        ));
    }
}

// Matching

#[post("/generate-matches", data = "<request>")]
pub async fn generate_matches(
    request: Json<GenerateMatchesRequest>,
    session: Session,
    state: &State<AppState>,
) -> ApiResult<ProjectMatchSummary> {
    handlers::generate_matches_handler(request, session, state).await
}

#[post("/generate-user-matches", data = "<request>")]
pub async fn generate_user_matches(
    request: Json<UserMatchesRequest>,
    session: Session,
    state: &State<AppState>,
) -> ApiResult<UserMatchesBody> {
    handlers::generate_user_matches_handler(request, session, state).await
}

#[post("/ensure-user-matches", data = "<request>")]
pub async fn ensure_user_matches(
    request: Json<UserMatchesRequest>,
    session: Session,
    state: &State<AppState>,
) -> ApiResult<UserMatchSummary> {
    handlers::ensure_user_matches_handler(request, session, state).await
}

#[get("/users/<user_id>/matches?<limit>")]
pub async fn user_matches(
    user_id: &str,
    limit: Option<i64>,
    session: Session,
    state: &State<AppState>,
) -> ApiResult<FreelancerMatchesBody> {
    handlers::list_user_matches_handler(user_id, limit, session, state).await
}

// Projects

#[post("/projects", data = "<request>")]
pub async fn post_project(
    request: Json<PostProjectRequest>,
    session: Session,
    state: &State<AppState>,
) -> ApiResult<PostedProject> {
    handlers::post_project_handler(request, session, state).await
}

#[get("/projects/<project_id>/matches")]
pub async fn project_matches(
    project_id: &str,
    session: Session,
    state: &State<AppState>,
) -> ApiResult<ProjectMatchesBody> {
    handlers::list_project_matches_handler(project_id, session, state).await
}

#[post("/projects/<project_id>/applications", data = "<request>")]
pub async fn apply_to_project(
    project_id: &str,
    request: Json<ApplyRequest>,
    session: Session,
    state: &State<AppState>,
) -> ApiResult<ApplicationBody> {
    handlers::apply_to_project_handler(project_id, request, session, state).await
}

#[patch("/projects/<project_id>/status", data = "<request>")]
pub async fn update_project_status(
    project_id: &str,
    request: Json<UpdateStatusRequest>,
    session: Session,
    state: &State<AppState>,
) -> ApiResult<ProjectBody> {
    handlers::update_project_status_handler(project_id, request, session, state).await
}

// Workspaces

#[post("/workspaces", data = "<request>")]
pub async fn create_workspace(
    request: Json<CreateWorkspaceRequest>,
    session: Session,
    state: &State<AppState>,
) -> ApiResult<WorkspaceBody> {
    handlers::create_workspace_handler(request, session, state).await
}

#[post("/workspace-recommendations", data = "<request>")]
pub async fn workspace_recommendations(
    request: Json<WorkspaceRequest>,
    session: Session,
    state: &State<AppState>,
) -> ApiResult<RecommendationsBody> {
    handlers::workspace_recommendations_handler(request, session, state).await
}

#[post("/workspace-chat", data = "<request>")]
pub async fn workspace_chat(
    request: Json<WorkspaceChatRequest>,
    session: Session,
    state: &State<AppState>,
) -> ApiResult<ChatAnswer> {
    handlers::workspace_chat_handler(request, session, state).await
}

#[post("/workspaces/<workspace_id>/members", data = "<request>")]
pub async fn add_member(
    workspace_id: &str,
    request: Json<AddMemberRequest>,
    session: Session,
    state: &State<AppState>,
) -> ApiResult<MemberBody> {
    handlers::add_member_handler(workspace_id, request, session, state).await
}

#[patch("/workspaces/<workspace_id>/members/<user_id>", data = "<request>")]
pub async fn change_member_role(
    workspace_id: &str,
    user_id: &str,
    request: Json<ChangeRoleRequest>,
    session: Session,
    state: &State<AppState>,
) -> ApiResult<MemberBody> {
    handlers::change_member_role_handler(workspace_id, user_id, request, session, state).await
}

#[delete("/workspaces/<workspace_id>/members/<user_id>")]
pub async fn remove_member(
    workspace_id: &str,
    user_id: &str,
    session: Session,
    state: &State<AppState>,
) -> ApiResult<Empty> {
    handlers::remove_member_handler(workspace_id, user_id, session, state).await
}

// System

#[get("/health")]
pub async fn health(state: &State<AppState>) -> status::Custom<Json<HealthResponse>> {
    handlers::health_handler(state).await
}

#[options("/<_..>")]
pub async fn options() -> Status {
    Status::Ok
}

// Error catchers

#[rocket::catch(400)]
pub fn bad_request() -> Json<ErrorBody> {
    ErrorBody::json("Invalid request format")
}

#[rocket::catch(401)]
pub fn unauthorized(req: &Request<'_>) -> Json<ErrorBody> {
    let failure = req.local_cache(|| AuthFailure(None));
    let message = failure
        .0
        .map(|e| e.message())
        .unwrap_or("Authorization token required");
    ErrorBody::json(message)
}

#[rocket::catch(403)]
pub fn forbidden() -> Json<ErrorBody> {
    ErrorBody::json("Forbidden")
}

#[rocket::catch(404)]
pub fn not_found() -> Json<ErrorBody> {
    ErrorBody::json("Not found")
}

#[rocket::catch(422)]
pub fn unprocessable() -> Json<ErrorBody> {
    ErrorBody::json("Invalid request body")
}

#[rocket::catch(500)]
pub fn internal_error() -> Json<ErrorBody> {
    ErrorBody::json("Internal server error")
}

/// Assemble the Rocket instance without launching it.
pub fn build_rocket(state: AppState, auth: AuthConfig) -> Rocket<Build> {
    rocket::build()
        .attach(Cors)
        .manage(state)
        .manage(auth)
        .register(
            "/",
            catchers![
                bad_request,
                unauthorized,
                forbidden,
                not_found,
                unprocessable,
                internal_error
            ],
        )
        .mount("/", routes![options])
        .mount(
            "/api",
            routes![
                generate_matches,
                generate_user_matches,
                ensure_user_matches,
                user_matches,
                post_project,
                project_matches,
                apply_to_project,
                update_project_status,
                create_workspace,
                workspace_recommendations,
                workspace_chat,
                add_member,
                change_member_role,
                remove_member,
                health,
            ],
        )
}

pub async fn start_web_server(config: ConfigManager) -> Result<()> {
    info!("Starting talentmatch service ({})", config.environment_name);

    let db = Database::new(config.database_path()).await?;
    let client = ChatCompletionClient::new(&config.service)?;
    info!("Using AI model: {}", client.model());
    if config.service.api_key.is_empty() {
        warn!("AI_API_KEY is not set, model calls will fail and fall back to local reasons");
    }

    let auth = AuthConfig::new(&config.auth);
    if !auth.enabled() {
        warn!("JWT_SECRET is not set, all requests are treated as service calls");
    }

    let state = AppState {
        db,
        generator: Arc::new(client),
        matching: config.matching.clone(),
    };

    let figment = rocket::Config::figment()
        .merge(("port", config.environment.port))
        .merge(("address", "0.0.0.0"));

    info!("Listening on port {}", config.environment.port);
    let _rocket = build_rocket(state, auth).configure(figment).launch().await?;

    Ok(())
}
