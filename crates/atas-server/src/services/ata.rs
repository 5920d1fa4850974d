//! Minutes generation and the minutes fields of a work item.

use atas_config::load_template;
use atas_core::ata::status_patch;
use atas_core::{AtaDetails, AtaUpdate, GenerateAtaRequest, GeneratedAta};

use crate::dto::{SaveAtaResponse, StatusResponse};
use crate::error::AppError;
use crate::ServerState;

/// Drafts minutes with the template read fresh from disk.
pub async fn generate(state: &ServerState, request: &GenerateAtaRequest) -> Result<GeneratedAta, AppError> {
    let generator = state.generator()?;
    let template = load_template(&state.template_path)?;
    Ok(generator.generate(request, &template).await?)
}

pub async fn details(state: &ServerState, id: u64) -> Result<AtaDetails, AppError> {
    let item = state.boards()?.work_item(id).await?;
    Ok(AtaDetails::from_fields(item.id, &item.fields))
}

pub async fn update_status(state: &ServerState, id: u64, status: &str) -> Result<StatusResponse, AppError> {
    let item = state.boards()?.update_fields(id, &status_patch(status)).await?;

    let new_state = item
        .fields
        .get(atas_core::ata::FIELD_STATE)
        .and_then(|v| v.as_str())
        .unwrap_or(status)
        .to_string();

    Ok(StatusResponse { success: true, id, state: new_state })
}

pub async fn save(state: &ServerState, id: u64, update: &AtaUpdate) -> Result<SaveAtaResponse, AppError> {
    let operations = update.to_patch_operations()?;
    state.boards()?.update_fields(id, &operations).await?;

    Ok(SaveAtaResponse {
        success: true,
        id,
        updated_fields: operations.iter().map(|op| op.field().to_string()).collect(),
    })
}
