//! Settings for the ATA workspace, read from the process environment.
//!
//! Tokens are optional at load time: a missing token disables the client that
//! needs it and the affected routes report a configuration error instead of
//! the process refusing to start.

use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

// ─────────────────────────────────────────────────────────────────────────────
// Error
// ─────────────────────────────────────────────────────────────────────────────

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value for {name}: {value}")]
    InvalidValue { name: &'static str, value: String },

    #[error("Template not found: {0}")]
    TemplateNotFound(PathBuf),

    #[error("Failed to read template {path}: {source}")]
    TemplateIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

// ─────────────────────────────────────────────────────────────────────────────
// Defaults
// ─────────────────────────────────────────────────────────────────────────────

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 5001;
pub const DEFAULT_LLM_API_BASE: &str = "https://router.huggingface.co/v1";
pub const DEFAULT_LLM_MODEL: &str = "moonshotai/Kimi-K2-Instruct";
pub const DEFAULT_TEMPLATE_PATH: &str = "template.md";
pub const DEFAULT_DEVOPS_BASE_URL: &str = "https://dev.azure.com";

// ─────────────────────────────────────────────────────────────────────────────
// Settings
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl ServerSettings {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LlmSettings {
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    pub api_base: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub template_path: PathBuf,
}

/// Repository and pipeline that hold the task-list file.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineSettings {
    pub base_url: String,
    #[serde(skip_serializing)]
    pub token: Option<String>,
    pub organization: String,
    pub project: String,
    pub repository: String,
    pub pipeline_id: u64,
    pub branch: String,
    pub file_path: String,
}

/// Project whose work items carry the minutes fields.
#[derive(Debug, Clone, Serialize)]
pub struct BoardsSettings {
    pub base_url: String,
    #[serde(skip_serializing)]
    pub token: Option<String>,
    pub organization: String,
    pub project: String,
    pub team: String,
    /// Display name used in the WIQL assignee clause; `None` means `@Me`.
    pub user_name: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub llm: LlmSettings,
    pub pipeline: PipelineSettings,
    pub boards: BoardsSettings,
}

impl Settings {
    /// Reads settings from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads settings through `lookup`, treating blank values as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let or = |name: &str, default: &str| get(name).unwrap_or_else(|| default.to_string());

        let port = match get("PORT") {
            Some(v) => v
                .parse()
                .map_err(|_| ConfigError::InvalidValue { name: "PORT", value: v })?,
            None => DEFAULT_PORT,
        };

        let pipeline_id = match get("PIPELINE_ID") {
            Some(v) => v
                .parse()
                .map_err(|_| ConfigError::InvalidValue { name: "PIPELINE_ID", value: v })?,
            None => 556,
        };

        let devops_base = or("AZURE_DEVOPS_BASE_URL", DEFAULT_DEVOPS_BASE_URL)
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            server: ServerSettings {
                host: or("HOST", DEFAULT_HOST),
                port,
            },
            llm: LlmSettings {
                api_key: get("HF_TOKEN"),
                api_base: or("LLM_API_BASE", DEFAULT_LLM_API_BASE),
                model: or("LLM_MODEL", DEFAULT_LLM_MODEL),
                max_tokens: 512,
                temperature: 0.7,
                template_path: PathBuf::from(or("TEMPLATE_PATH", DEFAULT_TEMPLATE_PATH)),
            },
            pipeline: PipelineSettings {
                base_url: devops_base.clone(),
                token: get("AZURE_DEVOPS_TOKEN"),
                organization: or("AZURE_DEVOPS_ORG", "koniasamples"),
                project: or("AZURE_DEVOPS_PROJECT", "POCS"),
                repository: or("AZURE_DEVOPS_REPO", "AutomacaoCards"),
                pipeline_id,
                branch: or("PIPELINE_BRANCH", "main"),
                file_path: or("PIPELINE_FILE", "/cards.txt"),
            },
            boards: BoardsSettings {
                base_url: devops_base,
                token: get("AZURE_BOARDS_TOKEN"),
                organization: or("AZURE_BOARDS_ORG", "konia"),
                project: or("AZURE_BOARDS_PROJECT", "Consultoria"),
                team: or("AZURE_BOARDS_TEAM", "Consultoria Team"),
                user_name: get("AZURE_BOARDS_USER"),
            },
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Template
// ─────────────────────────────────────────────────────────────────────────────

/// Reads the minutes markdown template.
pub fn load_template(path: &Path) -> Result<String, ConfigError> {
    match fs::read_to_string(path) {
        Ok(content) => {
            tracing::debug!("Loaded template {} ({} bytes)", path.display(), content.len());
            Ok(content)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(ConfigError::TemplateNotFound(path.to_path_buf()))
        }
        Err(e) => Err(ConfigError::TemplateIo {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}
