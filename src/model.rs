//! Request and response payloads for every supported endpoint.
//!
//! Optional request parameters are skipped when unset so the server applies
//! its own defaults. The `stream` flag on completion requests is always
//! serialized; the client overwrites it before sending.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// --- Engines and models ---

pub const TEXT_ADA_001_ENGINE: &str = "text-ada-001";
pub const TEXT_BABBAGE_001_ENGINE: &str = "text-babbage-001";
pub const TEXT_CURIE_001_ENGINE: &str = "text-curie-001";
pub const TEXT_DAVINCI_001_ENGINE: &str = "text-davinci-001";
pub const TEXT_DAVINCI_002_ENGINE: &str = "text-davinci-002";
pub const TEXT_DAVINCI_003_ENGINE: &str = "text-davinci-003";
pub const ADA_ENGINE: &str = "ada";
pub const BABBAGE_ENGINE: &str = "babbage";
pub const CURIE_ENGINE: &str = "curie";
pub const DAVINCI_ENGINE: &str = "davinci";

/// Engine used when the configuration does not name one.
pub const DEFAULT_ENGINE: &str = DAVINCI_ENGINE;

pub const GPT4: &str = "gpt4";
pub const GPT3_5_TURBO: &str = "gpt-3.5-turbo";
pub const GPT3_5_TURBO_0301: &str = "gpt-3.5-turbo-0301";
pub const TEXT_SIMILARITY_ADA_001: &str = "text-similarity-ada-001";
pub const TEXT_SIMILARITY_BABBAGE_001: &str = "text-similarity-babbage-001";
pub const TEXT_SIMILARITY_CURIE_001: &str = "text-similarity-curie-001";
pub const TEXT_SIMILARITY_DAVINCI_001: &str = "text-similarity-davinci-001";
pub const TEXT_SEARCH_ADA_DOC_001: &str = "text-search-ada-doc-001";
pub const TEXT_SEARCH_ADA_QUERY_001: &str = "text-search-ada-query-001";
pub const TEXT_SEARCH_BABBAGE_DOC_001: &str = "text-search-babbage-doc-001";
pub const TEXT_SEARCH_BABBAGE_QUERY_001: &str = "text-search-babbage-query-001";
pub const TEXT_SEARCH_CURIE_DOC_001: &str = "text-search-curie-doc-001";
pub const TEXT_SEARCH_CURIE_QUERY_001: &str = "text-search-curie-query-001";
pub const TEXT_SEARCH_DAVINCI_DOC_001: &str = "text-search-davinci-doc-001";
pub const TEXT_SEARCH_DAVINCI_QUERY_001: &str = "text-search-davinci-query-001";
pub const CODE_SEARCH_ADA_CODE_001: &str = "code-search-ada-code-001";
pub const CODE_SEARCH_ADA_TEXT_001: &str = "code-search-ada-text-001";
pub const CODE_SEARCH_BABBAGE_CODE_001: &str = "code-search-babbage-code-001";
pub const CODE_SEARCH_BABBAGE_TEXT_001: &str = "code-search-babbage-text-001";
pub const TEXT_EMBEDDING_ADA_002: &str = "text-embedding-ada-002";

/// Model used by chat completions when the request leaves it empty.
pub const DEFAULT_CHAT_MODEL: &str = GPT3_5_TURBO;

// --- Errors ---

/// Error returned by the API for any non-2xx status.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("[{status_code}:{error_type}] {message}")]
pub struct ApiError {
    /// HTTP status of the failed response
    pub status_code: u16,
    /// Error category reported by the server, or `Unexpected`
    pub error_type: String,
    /// Human-readable description, or the raw body for unexpected errors
    pub message: String,
}

impl ApiError {
    /// Error type used when the body is not a structured error.
    pub const UNEXPECTED: &'static str = "Unexpected";

    /// Build an error from a failed response body.
    ///
    /// The status always comes from the HTTP response, never from the body.
    pub fn from_body(status_code: u16, body: &[u8]) -> Self {
        match serde_json::from_slice::<ApiErrorResponse>(body) {
            Ok(response) => Self {
                status_code,
                error_type: response.error.error_type.unwrap_or_default(),
                message: response.error.message.unwrap_or_default(),
            },
            Err(_) => Self {
                status_code,
                error_type: Self::UNEXPECTED.to_string(),
                message: String::from_utf8_lossy(body).into_owned(),
            },
        }
    }
}

#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(rename = "type", default)]
    error_type: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

// --- Engines ---

/// Basic information about one engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineObject {
    pub id: String,
    pub object: String,
    #[serde(default)]
    pub owner: String,
    #[serde(default)]
    pub ready: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnginesResponse {
    pub data: Vec<EngineObject>,
    pub object: String,
}

// --- Shared pieces ---

/// Author of a chat message.
#[derive(Debug, Copy, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// Why the model stopped producing tokens for a choice.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    Stop,
    Length,
    ContentFilter,
    #[serde(other)]
    Other,
}

/// Token accounting for one call.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    #[serde(default)]
    pub prompt_tokens: u32,
    #[serde(default)]
    pub completion_tokens: u32,
    #[serde(default)]
    pub total_tokens: u32,
}

// --- Chat completions ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: Role::System, content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: content.into() }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: Role::Assistant, content: content.into() }
    }
}

/// Request body for `POST /chat/completions`.
///
/// An empty `model` is replaced with [`DEFAULT_CHAT_MODEL`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    /// Sampling temperature between 0 and 2
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    /// Nucleus sampling probability mass
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
    /// Number of choices to generate
    #[serde(skip_serializing_if = "Option::is_none")]
    pub n: Option<u32>,
    /// Overwritten by the client to match the method being called.
    #[serde(default)]
    pub stream: bool,
    /// Up to 4 sequences where generation stops
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    /// Between -2 and 2; positive values favour new topics
    #[serde(skip_serializing_if = "Option::is_none")]
    pub presence_penalty: Option<f32>,
    /// Between -2 and 2; positive values discourage repetition
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frequency_penalty: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logit_bias: Option<HashMap<String, f32>>,
    /// End-user identifier
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
}

impl ChatCompletionRequest {
    pub fn new(messages: Vec<ChatMessage>) -> Self {
        Self {
            messages,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatCompletionChoice {
    pub index: u32,
    #[serde(default)]
    pub finish_reason: Option<FinishReason>,
    pub message: ChatMessage,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatCompletionResponse {
    pub id: String,
    pub object: String,
    pub created: u64,
    pub model: String,
    pub choices: Vec<ChatCompletionChoice>,
    #[serde(default)]
    pub usage: Usage,
}

/// Partial message carried by a streamed chat frame.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatDelta {
    #[serde(default)]
    pub role: Option<Role>,
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatCompletionStreamChoice {
    pub index: u32,
    #[serde(default)]
    pub finish_reason: Option<FinishReason>,
    #[serde(default)]
    pub delta: ChatDelta,
}

/// One frame of a streamed chat completion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatCompletionStreamResponse {
    pub id: String,
    pub object: String,
    pub created: u64,
    pub model: String,
    pub choices: Vec<ChatCompletionStreamChoice>,
    #[serde(default)]
    pub usage: Option<Usage>,
}

// --- Completions ---

/// Request body for `POST /completions`.
///
/// An empty `model` is replaced with the client's default engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompletionRequest {
    pub model: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub prompt: Vec<String>,
    /// Text that comes after the inserted completion
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suffix: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
    /// Choices to create for each prompt
    #[serde(skip_serializing_if = "Option::is_none")]
    pub n: Option<u32>,
    /// Overwritten by the client to match the method being called.
    #[serde(default)]
    pub stream: bool,
    /// Include the log probabilities of the most likely tokens
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logprobs: Option<u32>,
    /// Echo back the prompt in addition to the completion
    #[serde(skip_serializing_if = "Option::is_none")]
    pub echo: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub presence_penalty: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frequency_penalty: Option<f32>,
    /// Generate this many completions server-side and return the best
    #[serde(skip_serializing_if = "Option::is_none")]
    pub best_of: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logit_bias: Option<HashMap<String, f32>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
}

impl CompletionRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: vec![prompt.into()],
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LogProbResult {
    #[serde(default)]
    pub tokens: Vec<String>,
    #[serde(default)]
    pub token_logprobs: Vec<Option<f32>>,
    #[serde(default)]
    pub top_logprobs: Vec<Option<HashMap<String, f32>>>,
    #[serde(default)]
    pub text_offset: Vec<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionChoice {
    pub text: String,
    pub index: u32,
    #[serde(default)]
    pub logprobs: Option<LogProbResult>,
    #[serde(default)]
    pub finish_reason: Option<FinishReason>,
}

/// Result of a completion, and also the shape of each streamed frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionResponse {
    pub id: String,
    pub object: String,
    pub created: u64,
    pub model: String,
    pub choices: Vec<CompletionChoice>,
    #[serde(default)]
    pub usage: Option<Usage>,
}

impl CompletionResponse {
    /// Text of the first choice, or an empty string.
    pub fn text(&self) -> &str {
        self.choices.first().map_or("", |choice| choice.text.as_str())
    }
}

// --- Edits ---

/// Request body for `POST /edits`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EditsRequest {
    pub model: String,
    /// Starting text for the edit
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input: Option<String>,
    /// How the model should edit the input
    pub instruction: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub n: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditsChoice {
    pub text: String,
    pub index: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditsResponse {
    pub object: String,
    pub created: u64,
    pub choices: Vec<EditsChoice>,
    #[serde(default)]
    pub usage: Usage,
}

// --- Search ---

/// Request body for `POST /engines/{engine}/search`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchRequest {
    pub documents: Vec<String>,
    pub query: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchData {
    /// Index of the document in the request
    pub document: u32,
    pub object: String,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    pub data: Vec<SearchData>,
    pub object: String,
}

// --- Embeddings ---

/// Request body for `POST /embeddings`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingsRequest {
    /// One embedding is returned per input
    pub input: Vec<String>,
    pub model: String,
    /// Stable identifier of the end user, used for abuse tracing
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingsResult {
    pub object: String,
    pub embedding: Vec<f64>,
    pub index: u32,
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbeddingsUsage {
    #[serde(default)]
    pub prompt_tokens: u32,
    #[serde(default)]
    pub total_tokens: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingsResponse {
    pub object: String,
    pub data: Vec<EmbeddingsResult>,
    #[serde(default)]
    pub usage: EmbeddingsUsage,
}

// --- Images ---

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImageSize {
    #[serde(rename = "256x256")]
    Size256x256,
    #[serde(rename = "512x512")]
    Size512x512,
    #[serde(rename = "1024x1024")]
    Size1024x1024,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageResponseFormat {
    Url,
    B64Json,
}

/// Request body for `POST /images/generations`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImageRequest {
    pub prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub n: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<ImageSize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_format: Option<ImageResponseFormat>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
}

/// One generated image; exactly one field is set, depending on the format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub b64_json: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageResponse {
    pub created: u64,
    pub data: Vec<ImageData>,
}
