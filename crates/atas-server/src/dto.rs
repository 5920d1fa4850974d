use atas_core::{SprintSummary, WorkItem};
use serde::{Deserialize, Serialize};

// === Pipeline file ===

#[derive(Debug, Serialize)]
pub struct FileContentResponse {
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct SaveFileRequest {
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct SaveFileResponse {
    pub success: bool,
    pub message: String,
}

// === Boards ===

#[derive(Debug, Default, Deserialize)]
pub struct WorkItemsQuery {
    pub sprint_id: Option<String>,
    pub company: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SprintWorkItems {
    pub sprint: Option<SprintSummary>,
    pub work_items: Vec<WorkItem>,
    pub total_items: usize,
    pub message: String,
}

impl SprintWorkItems {
    pub fn new(sprint: SprintSummary, work_items: Vec<WorkItem>, message: String) -> Self {
        Self {
            sprint: Some(sprint),
            total_items: work_items.len(),
            work_items,
            message,
        }
    }

    pub fn no_active_sprint() -> Self {
        Self {
            sprint: None,
            work_items: Vec::new(),
            total_items: 0,
            message: NO_ACTIVE_SPRINT.to_string(),
        }
    }
}

pub const NO_ACTIVE_SPRINT: &str = "Nenhuma sprint ativa encontrada";

#[derive(Debug, Serialize)]
pub struct SprintsResponse {
    pub sprints: Vec<SprintSummary>,
}

#[derive(Debug, Serialize)]
pub struct SprintInfoResponse {
    pub sprint: Option<SprintSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CompaniesResponse {
    pub companies: Vec<String>,
}

// === Minutes work items ===

#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub success: bool,
    pub id: u64,
    pub state: String,
}

#[derive(Debug, Serialize)]
pub struct SaveAtaResponse {
    pub success: bool,
    pub id: u64,
    pub updated_fields: Vec<String>,
}
