// src/web/handlers/system_handlers.rs
use rocket::http::Status;
use rocket::response::status;
use rocket::serde::json::Json;
use rocket::State;
use tracing::error;

use crate::web::types::{AppState, HealthResponse};

pub async fn health_handler(state: &State<AppState>) -> status::Custom<Json<HealthResponse>> {
    match state.db.health_check().await {
        Ok(()) => status::Custom(
            Status::Ok,
            Json(HealthResponse {
                success: true,
                status: "ok",
                database: "ok",
            }),
        ),
        Err(e) => {
            error!("Health check failed: {:#}", e);
            status::Custom(
                Status::ServiceUnavailable,
                Json(HealthResponse {
                    success: false,
                    status: "degraded",
                    database: "unavailable",
                }),
            )
        }
    }
}
