//! OpenAI-compatible chat completions client (Hugging Face router by default).

use async_openai::config::OpenAIConfig;
use async_openai::types::{ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs};
use async_openai::Client;
use async_trait::async_trait;
use atas_config::LlmSettings;
use atas_core::AtaError;
use tracing::{error, info};

use crate::ChatModel;

/// Client for any endpoint speaking the OpenAI chat completions API.
pub struct LlmClient {
    client: Client<OpenAIConfig>,
    model: String,
    max_tokens: u32,
    temperature: f32,
}

impl LlmClient {
    /// Creates a client from settings. Fails when no API key is configured.
    pub fn new(settings: &LlmSettings) -> Result<Self, AtaError> {
        let api_key = settings
            .api_key
            .clone()
            .ok_or_else(|| AtaError::MissingConfig("HF_TOKEN is not set".into()))?;

        let config = OpenAIConfig::new()
            .with_api_base(settings.api_base.clone())
            .with_api_key(api_key);

        info!("LlmClient: model={}, api_base={}", settings.model, settings.api_base);

        Ok(Self {
            client: Client::with_config(config),
            model: settings.model.clone(),
            max_tokens: settings.max_tokens,
            temperature: settings.temperature,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl ChatModel for LlmClient {
    #[allow(deprecated)]
    async fn complete(&self, prompt: &str) -> Result<String, AtaError> {
        let start = std::time::Instant::now();

        let message = ChatCompletionRequestUserMessageArgs::default()
            .content(prompt)
            .build()
            .map_err(|e| AtaError::LlmError(e.to_string()))?;

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(vec![message.into()])
            .max_tokens(self.max_tokens)
            .temperature(self.temperature)
            .build()
            .map_err(|e| AtaError::LlmError(e.to_string()))?;

        let response = self.client.chat().create(request).await.map_err(|e| {
            error!("Chat completion failed: {}", e);
            AtaError::LlmError(e.to_string())
        })?;

        if let Some(usage) = &response.usage {
            info!(
                model = %self.model,
                input_tokens = usage.prompt_tokens,
                output_tokens = usage.completion_tokens,
                elapsed_ms = start.elapsed().as_millis() as u64,
                "chat completion finished"
            );
        }

        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| AtaError::LlmError("response contained no message content".into()))
    }
}
