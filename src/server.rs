use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::{Json, Router, routing::post};
use log::{info, warn};
use serde::Deserialize;

use crate::config::StudioConfig;
use crate::data::{Assignment, SchedulingInput, SchedulingOutput, Violation};
use crate::scheduler;
use crate::verify;

#[derive(Clone)]
struct AppState {
    config: Arc<StudioConfig>,
}

/// Body of a verify request: the scheduling input and the schedule to audit.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyRequest {
    pub input: SchedulingInput,
    pub assignments: Vec<Assignment>,
}

async fn solve_handler(
    State(state): State<AppState>,
    Json(input): Json<SchedulingInput>,
) -> Result<Json<SchedulingOutput>, (StatusCode, String)> {
    match scheduler::solve(&input, &state.config) {
        Ok(output) => Ok(Json(output)),
        Err(e) => {
            warn!("Rejected scheduling request: {}", e);
            Err((StatusCode::BAD_REQUEST, e.to_string()))
        }
    }
}

async fn verify_handler(Json(request): Json<VerifyRequest>) -> Json<Vec<Violation>> {
    let violations = verify::check(&request.input, &request.assignments);
    info!(
        "Verified {} assignments: {} violations",
        request.assignments.len(),
        violations.len()
    );
    Json(violations)
}

pub fn router(config: StudioConfig) -> Router {
    Router::new()
        .route("/v1/schedule/solve", post(solve_handler))
        .route("/v1/schedule/verify", post(verify_handler))
        .with_state(AppState {
            config: Arc::new(config),
        })
}

pub async fn run_server(config: StudioConfig) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(&config.server.bind).await?;
    info!("Server running at http://{}", listener.local_addr()?);
    axum::serve(listener, router(config)).await
}
