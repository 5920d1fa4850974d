//! Core domain types and helpers for the ATA workspace.
//!
//! This crate holds everything that does not talk to the network:
//!
//! - [`AtaError`] - Error type shared by every crate in the workspace
//! - [`extract`] - Best-effort section extraction from generated minutes
//! - [`company`] - Company naming convention in work-item titles
//! - [`datetime`] - UTC/local shifting for the fixed local offset
//! - [`ata`] - Custom work-item fields that store a meeting's minutes
//! - [`pipeline`] - Pipeline run and build status values
//!
//! # Example
//!
//! ```rust
//! use atas_core::company::extract_company_from_title;
//!
//! let company = extract_company_from_title("[ATA][TOTVS] Kickoff");
//! assert_eq!(company.as_deref(), Some("TOTVS"));
//! ```

pub mod ata;
pub mod company;
pub mod datetime;
pub mod extract;
pub mod pipeline;
pub mod text;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use ata::{AtaDetails, AtaUpdate, NextStep, PatchOperation};
pub use pipeline::{BuildStatus, PipelineRun};

/// Errors that can occur while generating minutes or calling remote services.
#[derive(Error, Debug)]
pub enum AtaError {
    /// LLM API request failed.
    #[error("LLM request failed: {0}")]
    LlmError(String),

    /// A remote API answered with a non-success status.
    #[error("External API error {status}: {body}")]
    ExternalApi { status: u16, body: String },

    /// The request never produced a response (connect, TLS, decode).
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// A required setting (usually a token) is absent.
    #[error("Missing configuration: {0}")]
    MissingConfig(String),

    /// Caller supplied something the operation cannot accept.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A remote resource the operation depends on does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// A remote payload did not have the expected shape.
    #[error("Failed to parse response: {0}")]
    Parse(String),
}

impl From<serde_json::Error> for AtaError {
    fn from(err: serde_json::Error) -> Self {
        AtaError::Parse(err.to_string())
    }
}

/// A meeting summary submitted by a user, consumed once to build a prompt.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerateAtaRequest {
    /// Free-text meeting date.
    #[serde(default)]
    pub data: Option<String>,
    /// Requirement id the minutes belong to.
    #[serde(default)]
    pub requerimento: Option<String>,
    /// Narrative summary of the meeting.
    #[serde(default)]
    pub resumo: Option<String>,
}

/// Minutes returned by the LLM plus the sections pulled out of them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GeneratedAta {
    /// Full generated text.
    pub ata: String,
    /// Extracted title, empty when none was found.
    pub titulo: String,
    /// Extracted next-steps block, empty when none was found.
    pub proximos: String,
    /// Objective section through the end of the body.
    pub corpo: String,
    /// Suggested markdown file name for the minutes.
    pub nome_arquivo: String,
}

/// A work item as listed to the UI: remote fields passed through untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkItem {
    pub id: u64,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub fields: serde_json::Map<String, serde_json::Value>,
    /// Company derived from the title naming convention.
    #[serde(default)]
    pub company: Option<String>,
}

impl WorkItem {
    /// Returns `System.Title`, or an empty string.
    pub fn title(&self) -> &str {
        self.fields
            .get("System.Title")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
    }
}

/// Sprint fields served to the UI.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SprintSummary {
    pub id: Option<String>,
    pub name: String,
    pub path: String,
    #[serde(rename = "startDate")]
    pub start_date: Option<String>,
    #[serde(rename = "endDate")]
    pub end_date: Option<String>,
}

impl SprintSummary {
    /// Placeholder for a sprint id that is not among the team's iterations.
    pub fn unknown(id: &str) -> Self {
        Self {
            id: Some(id.to_string()),
            name: format!("Sprint {id}"),
            path: String::new(),
            start_date: None,
            end_date: None,
        }
    }
}
