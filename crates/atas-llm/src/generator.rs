//! Minutes generation: prompt, model call, section extraction.

use std::sync::Arc;

use atas_core::datetime::today_local;
use atas_core::extract::{extract_next_steps, extract_objective, extract_title};
use atas_core::{AtaError, GenerateAtaRequest, GeneratedAta};
use tracing::info;

use crate::{build_prompt, ChatModel};

/// Title handed to the model when the user gives none.
pub const DEFAULT_TITLE: &str = "Atividades do dia";

/// Drafts minutes with a [`ChatModel`].
#[derive(Clone)]
pub struct AtaGenerator {
    model: Arc<dyn ChatModel>,
}

impl AtaGenerator {
    pub fn new(model: Arc<dyn ChatModel>) -> Self {
        Self { model }
    }

    /// Generates minutes for `request` following `template`.
    pub async fn generate(&self, request: &GenerateAtaRequest, template: &str) -> Result<GeneratedAta, AtaError> {
        let resumo = request
            .resumo
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .ok_or_else(|| AtaError::InvalidInput("resumo is required".into()))?;

        let data = request
            .data
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(str::to_string)
            .unwrap_or_else(today_local);

        let requerimento = request.requerimento.as_deref().map(str::trim).unwrap_or_default();

        info!("Generating ATA for requirement '{}' dated {}", requerimento, data);

        let prompt = build_prompt(resumo, &data, requerimento, DEFAULT_TITLE, template);
        let ata = self.model.complete(&prompt).await?;

        let titulo = extract_title(&ata);
        let nome_arquivo = file_name(requerimento, if titulo.is_empty() { DEFAULT_TITLE } else { &titulo }, &data);

        Ok(GeneratedAta {
            proximos: extract_next_steps(&ata),
            corpo: extract_objective(&ata),
            titulo,
            nome_arquivo,
            ata,
        })
    }
}

/// Suggested file name for saved minutes. Path separators in the parts are
/// replaced so the name stays a single path component.
pub fn file_name(requerimento: &str, titulo: &str, data: &str) -> String {
    let clean = |s: &str| s.trim().replace(['/', '\\'], "-");
    format!(
        "{} - [ATA] {} - Atividade do dia {}.md",
        clean(requerimento),
        clean(titulo),
        clean(data)
    )
}
