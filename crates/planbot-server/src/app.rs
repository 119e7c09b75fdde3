//! HTTP routes and request/response shapes for the chat API.
//!
//! One endpoint serves two paths. With `generateFloorPlan` set, the request
//! context drives the generation loop and the response carries the harvested
//! artifacts plus the attempt count, so clients can show retry cost. Without
//! it, the message (and optional inline image) goes straight to the
//! completion gateway as plain chat.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;

use planbot_core::core_types::InlineImage;
use planbot_core::executors::{CodeExecutor, ExecutionResult};
use planbot_core::generation::{FloorPlanGenerator, GeneratorConfig};
use planbot_core::llm::CompletionGateway;
use planbot_core::PlanBotError;

#[derive(Clone)]
pub struct AppState {
    gateway: Arc<dyn CompletionGateway>,
    generator: Arc<FloorPlanGenerator>,
}

impl AppState {
    pub fn new(
        gateway: Arc<dyn CompletionGateway>,
        executor: Arc<dyn CodeExecutor>,
        config: GeneratorConfig,
    ) -> Self {
        let generator = Arc::new(FloorPlanGenerator::new(gateway.clone(), executor, config));
        Self { gateway, generator }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/chat", post(chat))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    #[serde(default)]
    pub message: String,
    pub context: Option<String>,
    #[serde(default)]
    pub generate_floor_plan: bool,
    pub file: Option<UploadedFile>,
}

#[derive(Debug, Deserialize)]
pub struct UploadedFile {
    pub name: String,
    #[serde(rename = "type")]
    pub mime_type: String,
    /// Base64 payload, possibly with a browser data-URL prefix.
    pub data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FloorPlanResponse {
    execution_results: Vec<ExecutionResult>,
    attempts: usize,
}

#[derive(Debug, Serialize)]
struct ChatResponse {
    response: String,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

async fn chat(State(state): State<AppState>, Json(request): Json<ChatRequest>) -> Response {
    if request.generate_floor_plan {
        let context = request.context.as_deref().unwrap_or(&request.message);
        log::info!("floor plan generation requested");

        match state.generator.generate(context).await {
            Ok(generation) => (
                StatusCode::OK,
                Json(FloorPlanResponse {
                    execution_results: vec![generation.result],
                    attempts: generation.attempts,
                }),
            )
                .into_response(),
            Err(e) => error_response(e),
        }
    } else {
        let image = request.file.as_ref().and_then(|file| {
            file.mime_type
                .starts_with("image/")
                .then(|| InlineImage::from_data_url(&file.mime_type, &file.data))
        });

        match state.gateway.complete(&request.message, image.as_ref()).await {
            Ok(text) => (StatusCode::OK, Json(ChatResponse { response: text })).into_response(),
            Err(e) => error_response(e),
        }
    }
}

fn error_response(error: PlanBotError) -> Response {
    log::error!("chat request failed: {}", error);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: format!("Failed to process request: {}", error),
        }),
    )
        .into_response()
}
