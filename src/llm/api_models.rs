use crate::models::ChatMessage;
use serde::{Deserialize, Serialize};

// --- Chat-completions dialect (perplexity, openai, xai) ---

#[derive(Serialize, Debug)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub stream: bool,
}

#[derive(Deserialize, Debug)]
pub struct ChatCompletionChunk {
    #[serde(default)]
    pub choices: Vec<ChunkChoice>,
    // Perplexity citation metadata, usually carried on the final chunks
    #[serde(default)]
    pub citations: Option<Vec<String>>,
    #[serde(default)]
    pub search_results: Option<Vec<SearchResult>>,
}

#[derive(Deserialize, Debug)]
pub struct ChunkChoice {
    pub delta: ChunkDelta,
}

#[derive(Deserialize, Debug)]
pub struct ChunkDelta {
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub choices: Vec<CompletionChoice>,
    #[serde(default)]
    pub citations: Option<Vec<String>>,
    #[serde(default)]
    pub search_results: Option<Vec<SearchResult>>,
}

#[derive(Deserialize, Debug)]
pub struct CompletionChoice {
    pub message: CompletionMessage,
}

#[derive(Deserialize, Debug)]
pub struct CompletionMessage {
    #[serde(default)]
    pub content: String,
}

#[derive(Deserialize, Debug, Clone)]
pub struct SearchResult {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

// --- Anthropic messages dialect ---

#[derive(Serialize, Debug)]
pub struct AnthropicRequest {
    pub model: String,
    pub max_tokens: u32,
    pub messages: Vec<ChatMessage>,
    pub stream: bool,
}

#[derive(Deserialize, Debug)]
#[serde(tag = "type")]
pub enum AnthropicEvent {
    #[serde(rename = "content_block_delta")]
    ContentBlockDelta { delta: AnthropicDelta },
    #[serde(rename = "message_stop")]
    MessageStop,
    #[serde(other)]
    Other,
}

#[derive(Deserialize, Debug)]
#[serde(tag = "type")]
pub enum AnthropicDelta {
    #[serde(rename = "text_delta")]
    TextDelta { text: String },
    #[serde(other)]
    Other,
}

#[derive(Deserialize, Debug)]
pub struct AnthropicResponse {
    #[serde(default)]
    pub content: Vec<AnthropicContent>,
}

#[derive(Deserialize, Debug)]
pub struct AnthropicContent {
    #[serde(rename = "type")]
    pub content_type: String,
    #[serde(default)]
    pub text: String,
}

// --- Model listing ---

#[derive(Deserialize, Debug)]
pub struct OpenAiModelsResponse {
    pub data: Vec<OpenAiModelItem>,
}

#[derive(Deserialize, Debug)]
pub struct OpenAiModelItem {
    pub id: String,
    #[serde(default)]
    pub created: i64,
}

#[derive(Deserialize, Debug)]
pub struct AnthropicModelsResponse {
    pub data: Vec<AnthropicModelItem>,
}

#[derive(Deserialize, Debug)]
pub struct AnthropicModelItem {
    pub id: String,
    #[serde(default)]
    pub display_name: Option<String>,
}
