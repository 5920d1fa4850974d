//! Sprint and work-item listing handlers.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::Json;
use tracing::{error, info};

use crate::dto::{
    CompaniesResponse, SprintInfoResponse, SprintWorkItems, SprintsResponse, WorkItemsQuery, NO_ACTIVE_SPRINT,
};
use crate::error::AppError;
use crate::handlers::non_blank;
use crate::services;
use crate::ServerState;

/// GET /api/my-cards - Active sprint and the user's work items in it.
pub async fn my_cards(State(state): State<Arc<ServerState>>) -> Result<Json<SprintWorkItems>, AppError> {
    let result = services::boards::sprint_with_items(state.boards()?, None, None)
        .await
        .map_err(|e| {
            error!("Failed to list cards: {}", e);
            e
        })?;
    Ok(Json(result))
}

/// GET /api/boards/my-work-items - Optional `sprint_id` and `company` filters.
pub async fn my_work_items(
    State(state): State<Arc<ServerState>>,
    Query(query): Query<WorkItemsQuery>,
) -> Result<Json<SprintWorkItems>, AppError> {
    let sprint_id = non_blank(query.sprint_id.as_deref());
    let company = non_blank(query.company.as_deref());
    info!("Listing work items (sprint={:?}, company={:?})", sprint_id, company);

    let result = services::boards::sprint_with_items(state.boards()?, sprint_id, company)
        .await
        .map_err(|e| {
            error!("Failed to list work items: {}", e);
            e
        })?;
    Ok(Json(result))
}

/// GET /api/boards/sprints - Current sprint and up to two previous ones.
pub async fn sprints(State(state): State<Arc<ServerState>>) -> Result<Json<SprintsResponse>, AppError> {
    let sprints = state.boards()?.last_three_sprints().await.map_err(|e| {
        error!("Failed to list sprints: {}", e);
        AppError::from(e)
    })?;
    Ok(Json(SprintsResponse { sprints }))
}

/// GET /api/sprint-info
pub async fn sprint_info(State(state): State<Arc<ServerState>>) -> Result<Json<SprintInfoResponse>, AppError> {
    let current = state.boards()?.current_sprint().await.map_err(|e| {
        error!("Failed to load current sprint: {}", e);
        AppError::from(e)
    })?;

    Ok(Json(match current {
        Some(sprint) => SprintInfoResponse {
            sprint: Some(sprint.summary()),
            message: None,
        },
        None => SprintInfoResponse {
            sprint: None,
            message: Some(NO_ACTIVE_SPRINT.to_string()),
        },
    }))
}

/// GET /api/companies
pub async fn companies(State(state): State<Arc<ServerState>>) -> Result<Json<CompaniesResponse>, AppError> {
    let companies = services::boards::companies(state.boards()?).await.map_err(|e| {
        error!("Failed to list companies: {}", e);
        e
    })?;
    Ok(Json(CompaniesResponse { companies }))
}
