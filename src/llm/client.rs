use crate::exceptions::ParleyError;
use crate::llm::api_models::{AnthropicRequest, ChatCompletionRequest};
use crate::models::ChatMessage;
use crate::providers::Provider;
use reqwest::Client as HttpClient;
use std::env;

pub const ANTHROPIC_VERSION: &str = "2023-06-01";

// The messages API requires an explicit completion budget
const ANTHROPIC_MAX_TOKENS: u32 = 8192;

/// Wire protocol spoken by a provider endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    ChatCompletions,
    AnthropicMessages,
}

/// A callable model: resolved provider endpoint, credential, and model id.
#[derive(Debug)]
pub struct ModelHandle {
    http: HttpClient,
    api_key: String,
    base_url: String,
    pub model_id: String,
    dialect: Dialect,
}

impl ModelHandle {
    pub fn new(provider: Provider, model_id: &str, api_key: &str) -> Self {
        let base_url = env::var(provider.base_url_env())
            .unwrap_or_else(|_| provider.default_base_url().to_string());

        Self {
            http: crate::utils::setup_http_client(),
            api_key: api_key.to_string(),
            base_url,
            model_id: model_id.to_string(),
            dialect: provider.dialect(),
        }
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Posts the full message history; the caller consumes the body either
    /// as an SSE stream or as a single JSON document.
    pub async fn send_chat(
        &self,
        messages: &[ChatMessage],
        stream: bool,
    ) -> Result<reqwest::Response, ParleyError> {
        let request_builder = match self.dialect {
            Dialect::ChatCompletions => self
                .http
                .post(format!("{}/chat/completions", self.base_url))
                .header("Authorization", format!("Bearer {}", self.api_key))
                .json(&ChatCompletionRequest {
                    model: self.model_id.clone(),
                    messages: messages.to_vec(),
                    stream,
                }),
            Dialect::AnthropicMessages => self
                .http
                .post(format!("{}/v1/messages", self.base_url))
                .header("x-api-key", &self.api_key)
                .header("anthropic-version", ANTHROPIC_VERSION)
                .json(&AnthropicRequest {
                    model: self.model_id.clone(),
                    max_tokens: ANTHROPIC_MAX_TOKENS,
                    messages: messages.to_vec(),
                    stream,
                }),
        };

        let response = request_builder
            .send()
            .await
            .map_err(|e| ParleyError::Provider(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();

            let error_msg = if text.trim().is_empty() {
                format!("API Error (Status: {}): [Empty Body]", status)
            } else {
                format!("API Error (Status: {}): {}", status, text)
            };
            return Err(ParleyError::Provider(error_msg));
        }

        Ok(response)
    }
}

/// Payload of an SSE line: strips the `data: ` prefix, drops the `[DONE]`
/// sentinel and anything that is not a data line.
pub fn parse_sse_data(line: &str) -> Option<&str> {
    let data = line.trim().strip_prefix("data: ")?;
    if data == "[DONE]" { None } else { Some(data) }
}
