use std::path::PathBuf;
use std::sync::Arc;

use atas_config::Settings;
use atas_core::AtaError;
use atas_devops::{Boards, DevOpsClient, GitRepo, Pipelines};
use atas_llm::{AtaGenerator, ChatModel};
use tracing::{info, warn};

use crate::error::AppError;

/// Clients shared by every request. A client whose token is missing stays
/// absent and its routes answer with a configuration error.
pub struct ServerState {
    pub template_path: PathBuf,
    generator: Option<AtaGenerator>,
    git: Option<GitRepo>,
    pipelines: Option<Pipelines>,
    boards: Option<Boards>,
}

impl ServerState {
    pub fn new(settings: &Settings, model: Option<Arc<dyn ChatModel>>) -> Self {
        let generator = model.map(AtaGenerator::new);
        if generator.is_none() {
            warn!("ATA generation disabled: HF_TOKEN not configured");
        }

        let (git, pipelines) = match DevOpsClient::for_pipeline(&settings.pipeline) {
            Ok(client) => {
                info!(
                    "Pipeline routes enabled: {}/{} pipeline {}",
                    settings.pipeline.organization, settings.pipeline.repository, settings.pipeline.pipeline_id
                );
                (
                    Some(GitRepo::new(client.clone(), &settings.pipeline)),
                    Some(Pipelines::new(client, &settings.pipeline)),
                )
            }
            Err(_) => {
                warn!("Pipeline routes disabled: AZURE_DEVOPS_TOKEN not configured");
                (None, None)
            }
        };

        let boards = match Boards::from_settings(&settings.boards) {
            Ok(boards) => {
                info!(
                    "Boards routes enabled: {}/{} ({})",
                    settings.boards.organization, settings.boards.project, settings.boards.team
                );
                Some(boards)
            }
            Err(_) => {
                warn!("Boards routes disabled: AZURE_BOARDS_TOKEN not configured");
                None
            }
        };

        Self {
            template_path: settings.llm.template_path.clone(),
            generator,
            git,
            pipelines,
            boards,
        }
    }

    pub fn generator(&self) -> Result<&AtaGenerator, AppError> {
        self.generator.as_ref().ok_or_else(|| missing("HF_TOKEN"))
    }

    pub fn git(&self) -> Result<&GitRepo, AppError> {
        self.git.as_ref().ok_or_else(|| missing("AZURE_DEVOPS_TOKEN"))
    }

    pub fn pipelines(&self) -> Result<&Pipelines, AppError> {
        self.pipelines.as_ref().ok_or_else(|| missing("AZURE_DEVOPS_TOKEN"))
    }

    pub fn boards(&self) -> Result<&Boards, AppError> {
        self.boards.as_ref().ok_or_else(|| missing("AZURE_BOARDS_TOKEN"))
    }
}

fn missing(var: &str) -> AppError {
    AtaError::MissingConfig(format!("{var} is not set")).into()
}
