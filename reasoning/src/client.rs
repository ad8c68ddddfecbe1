//! Chat-completion client (spec.md §6): the core depends only on sending a
//! system preamble and a user prompt, a bounded output token budget, and a
//! usage report. Grounded on the teacher's `embedding::services::llm::openai`
//! client wrapper, generalized from embeddings to chat completions.

use async_openai::config::OpenAIConfig;
use async_openai::types::{
    ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
    CreateChatCompletionRequestArgs, ResponseFormat,
};
use async_openai::Client as OpenAIClient;

use archivist_config::ReasoningConfig;
use archivist_observability::log_external_call;

use crate::error::ReasoningError;

/// A completed chat-completion call: the raw reply text plus usage.
#[derive(Debug, Clone)]
pub struct ReasoningResponse {
    pub content: String,
    pub model: String,
    pub input_tokens: u32,
    pub output_tokens: u32,
}

impl ReasoningResponse {
    pub fn total_tokens(&self) -> u32 {
        self.input_tokens + self.output_tokens
    }
}

pub struct ReasoningClient {
    client: OpenAIClient<OpenAIConfig>,
    default_model: String,
}

impl ReasoningClient {
    pub fn new(config: &ReasoningConfig) -> Self {
        let mut openai_config = OpenAIConfig::new().with_api_key(&config.api_key);
        if let Some(base) = &config.api_base {
            openai_config = openai_config.with_api_base(base.clone());
        }

        Self {
            client: OpenAIClient::with_config(openai_config),
            default_model: config.model.clone(),
        }
    }

    /// Send one system preamble + user prompt, requesting a JSON-object
    /// reply, bounded to `max_tokens` output tokens.
    pub async fn complete_json(
        &self,
        model: Option<&str>,
        system: &str,
        user: &str,
        max_tokens: u16,
    ) -> Result<ReasoningResponse, ReasoningError> {
        let model = model.unwrap_or(&self.default_model);

        log_external_call!("reasoning", model);

        let request = CreateChatCompletionRequestArgs::default()
            .model(model)
            .messages(vec![
                ChatCompletionRequestSystemMessageArgs::default()
                    .content(system)
                    .build()?
                    .into(),
                ChatCompletionRequestUserMessageArgs::default()
                    .content(user)
                    .build()?
                    .into(),
            ])
            .response_format(ResponseFormat::JsonObject)
            .temperature(0.3)
            .max_tokens(max_tokens)
            .build()?;

        let response = self.client.chat().create(request).await?;

        let choice = response.choices.into_iter().next().ok_or(ReasoningError::EmptyResponse)?;
        let content = choice.message.content.unwrap_or_default();
        let usage = response.usage;

        Ok(ReasoningResponse {
            content,
            model: response.model,
            input_tokens: usage.as_ref().map(|u| u.prompt_tokens).unwrap_or(0),
            output_tokens: usage.as_ref().map(|u| u.completion_tokens).unwrap_or(0),
        })
    }
}
