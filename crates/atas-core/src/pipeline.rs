//! Pipeline run and build status values served to the UI.

use serde::{Deserialize, Serialize};

/// A queued pipeline run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineRun {
    pub success: bool,
    pub build_id: Option<u64>,
    pub build_url: Option<String>,
    pub status: String,
}

/// Polled state of a build, with status and result translated for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildStatus {
    pub success: bool,
    pub build_id: Option<u64>,
    pub status: String,
    pub result: Option<String>,
    pub build_url: String,
    pub start_time: Option<String>,
    pub finish_time: Option<String>,
    pub queue_time: Option<String>,
    pub build_number: Option<String>,
    pub is_completed: bool,
}

/// Display label for a raw build status; unknown values pass through.
pub fn status_label(status: &str) -> String {
    match status {
        "notStarted" => "na fila",
        "inProgress" => "executando",
        "completed" => "concluída",
        "cancelling" => "cancelando",
        "postponed" => "adiada",
        other => other,
    }
    .to_string()
}

/// Display label for a raw build result; unknown values pass through.
pub fn result_label(result: &str) -> String {
    match result {
        "succeeded" => "sucesso",
        "failed" => "falhou",
        "canceled" => "cancelada",
        "partiallySucceeded" => "parcialmente bem-sucedida",
        other => other,
    }
    .to_string()
}
