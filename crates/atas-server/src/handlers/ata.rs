//! Minutes generation and minutes work-item handlers.

use std::sync::Arc;

use atas_core::{AtaDetails, AtaUpdate, GenerateAtaRequest, GeneratedAta};
use axum::extract::{Path, State};
use axum::{Form, Json};
use tracing::{error, info};

use crate::dto::{SaveAtaResponse, StatusRequest, StatusResponse};
use crate::error::AppError;
use crate::handlers::non_blank;
use crate::services;
use crate::ServerState;

/// POST /gerar_ata - Draft minutes from a form-encoded summary.
pub async fn generate(
    State(state): State<Arc<ServerState>>,
    Form(req): Form<GenerateAtaRequest>,
) -> Result<Json<GeneratedAta>, AppError> {
    info!("Generating ATA for requirement {:?}", req.requerimento);

    let ata = services::ata::generate(&state, &req).await.map_err(|e| {
        error!("Failed to generate ATA: {}", e);
        e
    })?;

    info!("Generated ATA '{}'", ata.nome_arquivo);
    Ok(Json(ata))
}

/// GET /api/ata/{id}/details
pub async fn details(
    State(state): State<Arc<ServerState>>,
    Path(id): Path<u64>,
) -> Result<Json<AtaDetails>, AppError> {
    let details = services::ata::details(&state, id).await.map_err(|e| {
        error!("Failed to load ATA {}: {}", id, e);
        e
    })?;
    Ok(Json(details))
}

/// PUT /api/ata/{id}/status
pub async fn update_status(
    State(state): State<Arc<ServerState>>,
    Path(id): Path<u64>,
    Json(req): Json<StatusRequest>,
) -> Result<Json<StatusResponse>, AppError> {
    let status = non_blank(req.status.as_deref())
        .ok_or_else(|| AppError::BadRequest("status is required".into()))?;

    info!("Moving ATA {} to '{}'", id, status);

    let response = services::ata::update_status(&state, id, status).await.map_err(|e| {
        error!("Failed to update status of ATA {}: {}", id, e);
        e
    })?;
    Ok(Json(response))
}

/// POST /api/ata/{id}/save
pub async fn save(
    State(state): State<Arc<ServerState>>,
    Path(id): Path<u64>,
    Json(update): Json<AtaUpdate>,
) -> Result<Json<SaveAtaResponse>, AppError> {
    info!("Saving ATA {} ({} next steps)", id, update.next_steps.len());

    let response = services::ata::save(&state, id, &update).await.map_err(|e| {
        error!("Failed to save ATA {}: {}", id, e);
        e
    })?;
    Ok(Json(response))
}
