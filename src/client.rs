//! Core client traits and error types.

use async_trait::async_trait;
use thiserror::Error;

use crate::model::{
    ApiError, ChatCompletionRequest, ChatCompletionResponse, ChatCompletionStreamResponse,
    CompletionRequest, CompletionResponse, EditsRequest, EditsResponse, EmbeddingsRequest,
    EmbeddingsResponse, EngineObject, EnginesResponse, ImageRequest, ImageResponse, SearchRequest,
    SearchResponse,
};

/// Errors that can occur during client operations.
#[derive(Error, Debug)]
pub enum ClientError {
    /// Connection failure, timeout, or failure reading a full body.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-2xx status.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// A body or a stream frame was not the expected JSON shape.
    #[error("{context}: {source}")]
    Decode {
        context: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed encoding json: {0}")]
    Encode(#[source] serde_json::Error),

    /// Reading the event stream failed part way through.
    #[error("stream read error: {0}")]
    Stream(#[source] reqwest::Error),

    /// The event stream closed before the `[DONE]` marker.
    #[error("unexpected end of stream before [DONE]")]
    UnexpectedEof,

    #[error("invalid utf-8 in stream data: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl ClientError {
    pub(crate) fn decode(context: &'static str, source: serde_json::Error) -> Self {
        Self::Decode { context, source }
    }

    /// HTTP status of an API error.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            ClientError::Api(err) => Some(err.status_code),
            _ => None,
        }
    }

    /// Whether the request ran out of its time budget.
    pub fn is_timeout(&self) -> bool {
        match self {
            ClientError::Http(err) | ClientError::Stream(err) => err.is_timeout(),
            _ => false,
        }
    }
}

/// Non-streaming endpoints of the API.
///
/// Each call issues exactly one HTTP request and returns the decoded body,
/// or the first error met on the way. Nothing is retried.
///
/// # Example
/// ```no_run
/// use gpt_client::client::Client;
/// use gpt_client::model::{ChatCompletionRequest, ChatMessage};
/// use gpt_client::options::ClientConfig;
/// use gpt_client::providers::OpenAiClient;
///
/// # async fn run() -> Result<(), gpt_client::ClientError> {
/// let client = OpenAiClient::new(ClientConfig::new("sk-..."))?;
/// let request = ChatCompletionRequest::new(vec![ChatMessage::user("Hello!")]);
/// let response = client.chat_completion(request).await?;
/// println!("{}", response.choices[0].message.content);
/// # Ok(())
/// # }
/// ```
#[async_trait]
pub trait Client: Send + Sync {
    /// List the available engines.
    async fn engines(&self) -> Result<EnginesResponse, ClientError>;

    /// Retrieve one engine by id.
    async fn engine(&self, engine: &str) -> Result<EngineObject, ClientError>;

    /// Create a chat completion.
    async fn chat_completion(
        &self,
        request: ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse, ClientError>;

    /// Create a completion, using the default engine when the request names none.
    async fn completion(&self, request: CompletionRequest) -> Result<CompletionResponse, ClientError>;

    /// Create a completion with the given engine, overriding the request's model.
    async fn completion_with_engine(
        &self,
        engine: &str,
        request: CompletionRequest,
    ) -> Result<CompletionResponse, ClientError>;

    /// Edit the input according to an instruction.
    async fn edits(&self, request: EditsRequest) -> Result<EditsResponse, ClientError>;

    /// Semantic search over documents with the default engine.
    async fn search(&self, request: SearchRequest) -> Result<SearchResponse, ClientError>;

    /// Semantic search over documents with the given engine.
    async fn search_with_engine(
        &self,
        engine: &str,
        request: SearchRequest,
    ) -> Result<SearchResponse, ClientError>;

    /// Create embeddings for each input.
    async fn embeddings(&self, request: EmbeddingsRequest) -> Result<EmbeddingsResponse, ClientError>;

    /// Generate images from a prompt.
    async fn image(&self, request: ImageRequest) -> Result<ImageResponse, ClientError>;
}

/// Streaming endpoints.
///
/// `on_data` runs on the awaiting task before the next line is read, so
/// invocations never overlap. The call succeeds only when the server sends
/// `data: [DONE]`; frames already delivered stay delivered when it fails.
#[async_trait]
pub trait StreamingClient: Client {
    /// Stream a chat completion.
    async fn chat_completion_stream(
        &self,
        request: ChatCompletionRequest,
        on_data: &mut (dyn FnMut(ChatCompletionStreamResponse) + Send),
    ) -> Result<(), ClientError>;

    /// Stream a completion, using the default engine when the request names none.
    async fn completion_stream(
        &self,
        request: CompletionRequest,
        on_data: &mut (dyn FnMut(CompletionResponse) + Send),
    ) -> Result<(), ClientError>;

    /// Stream a completion with the given engine, overriding the request's model.
    async fn completion_stream_with_engine(
        &self,
        engine: &str,
        request: CompletionRequest,
        on_data: &mut (dyn FnMut(CompletionResponse) + Send),
    ) -> Result<(), ClientError>;
}
