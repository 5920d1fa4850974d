//! Task-list file and pipeline handlers.

use std::sync::Arc;

use atas_core::{BuildStatus, PipelineRun};
use axum::extract::{Path, State};
use axum::Json;
use tracing::{error, info};

use crate::dto::{FileContentResponse, SaveFileRequest, SaveFileResponse};
use crate::error::AppError;
use crate::ServerState;

/// GET /get_pipeline_file
pub async fn get_file(State(state): State<Arc<ServerState>>) -> Result<Json<FileContentResponse>, AppError> {
    let content = state.git()?.get_file().await.map_err(|e| {
        error!("Failed to read pipeline file: {}", e);
        AppError::from(e)
    })?;
    Ok(Json(FileContentResponse { content }))
}

/// POST /save_pipeline_file
pub async fn save_file(
    State(state): State<Arc<ServerState>>,
    Json(req): Json<SaveFileRequest>,
) -> Result<Json<SaveFileResponse>, AppError> {
    state.git()?.save_file(&req.content).await.map_err(|e| {
        error!("Failed to save pipeline file: {}", e);
        AppError::from(e)
    })?;

    info!("Pipeline file saved ({} bytes)", req.content.len());
    Ok(Json(SaveFileResponse {
        success: true,
        message: "Arquivo salvo com sucesso".into(),
    }))
}

/// POST /run_pipeline
pub async fn run(State(state): State<Arc<ServerState>>) -> Result<Json<PipelineRun>, AppError> {
    let run = state.pipelines()?.run().await.map_err(|e| {
        error!("Failed to run pipeline: {}", e);
        AppError::from(e)
    })?;
    Ok(Json(run))
}

/// GET /pipeline_status/{build_id}
pub async fn status(
    State(state): State<Arc<ServerState>>,
    Path(build_id): Path<u64>,
) -> Result<Json<BuildStatus>, AppError> {
    let status = state.pipelines()?.status(build_id).await.map_err(|e| {
        error!("Failed to get status of build {}: {}", build_id, e);
        AppError::from(e)
    })?;
    Ok(Json(status))
}
