use async_trait::async_trait;
use reqwest::Client;
use thiserror::Error;

use super::endpoints::{ChatCompletionRequest, ChatCompletionResponse, ChatMessage, ResponseFormat};
use crate::config::{ConfigError, GeneratorConfig, API_KEY_ENV_VAR};
use crate::recipe_parser::strip_code_fence;
use crate::recipe_schema::{SchemaField, SchemaNode, RECIPE_LIST_SCHEMA_NAME};
use serde_json::Value;

const APP_TITLE: &str = "RecipeIdeas";
const SYSTEM_PROMPT: &str = "You are a recipe assistant. Respond only with JSON matching the provided schema.";

/// Strict structured outputs require an object root, so array schemas travel
/// inside an object under this key.
pub const ENVELOPE_FIELD: &str = "recipes";

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("API key not found: {0}")]
    MissingApiKey(String),

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("API error {status}: {error_body}")]
    Api {
        status: reqwest::StatusCode,
        error_body: String,
    },

    #[error("API response contained no completion text")]
    EmptyCompletion,

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Turns a prompt plus an output schema into the model's raw text answer.
#[async_trait]
pub trait RecipeTransport: Send + Sync {
    async fn complete(&self, prompt: &str, schema: &SchemaNode) -> Result<String, TransportError>;
}

/// Chat-completion client for OpenRouter or any OpenAI-compatible endpoint.
#[derive(Debug, Clone)]
pub struct Provider {
    client: Client,
    config: GeneratorConfig,
}

impl Provider {
    pub fn new(config: GeneratorConfig) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self { client, config })
    }

    pub fn from_env() -> Result<Self, TransportError> {
        Self::new(GeneratorConfig::from_env()?)
    }

    pub async fn call_chat_completion(
        &self,
        request: ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse, TransportError> {
        if self.config.api_key.trim().is_empty() {
            return Err(TransportError::MissingApiKey(API_KEY_ENV_VAR.to_string()));
        }

        let url = self.config.chat_completions_url();
        tracing::debug!(model = %request.model, url = %url, "calling chat completion API");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .header("X-Title", APP_TITLE)
            .json(&request)
            .send()
            .await?;

        if response.status().is_success() {
            let chat_response = response.json::<ChatCompletionResponse>().await?;
            if let Some(usage) = &chat_response.usage {
                tracing::debug!(
                    prompt_tokens = usage.prompt_tokens,
                    total_tokens = usage.total_tokens,
                    "chat completion finished"
                );
            }
            Ok(chat_response)
        } else {
            let status = response.status();
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error body".to_string());
            Err(TransportError::Api { status, error_body })
        }
    }
}

#[async_trait]
impl RecipeTransport for Provider {
    async fn complete(&self, prompt: &str, schema: &SchemaNode) -> Result<String, TransportError> {
        let request = ChatCompletionRequest {
            model: self.config.model.clone(),
            messages: vec![ChatMessage::system(SYSTEM_PROMPT), ChatMessage::user(prompt)],
            response_format: Some(ResponseFormat::json_schema(
                RECIPE_LIST_SCHEMA_NAME,
                request_schema(schema),
            )),
            temperature: Some(self.config.temperature),
            max_tokens: None,
        };

        let response = self.call_chat_completion(request).await?;
        let content = response
            .first_content()
            .ok_or(TransportError::EmptyCompletion)?;

        if is_enveloped(schema) {
            Ok(unwrap_envelope(content))
        } else {
            Ok(content.to_string())
        }
    }
}

fn is_enveloped(schema: &SchemaNode) -> bool {
    matches!(schema, SchemaNode::Array(_) | SchemaNode::StringArray)
}

/// JSON Schema sent in `response_format`; array roots are wrapped in an object.
pub fn request_schema(schema: &SchemaNode) -> Value {
    if is_enveloped(schema) {
        SchemaNode::Object(vec![SchemaField::new(
            ENVELOPE_FIELD,
            "The generated recipes.",
            schema.clone(),
        )])
        .to_json_schema()
    } else {
        schema.to_json_schema()
    }
}

/// Extracts the enveloped array as JSON text. Anything else is passed through
/// unchanged for the parser to judge.
pub fn unwrap_envelope(content: &str) -> String {
    match serde_json::from_str::<Value>(strip_code_fence(content)) {
        Ok(Value::Object(mut obj)) => match obj.remove(ENVELOPE_FIELD) {
            Some(inner) => inner.to_string(),
            None => content.to_string(),
        },
        _ => content.to_string(),
    }
}
