//! OpenAI API client implementation.
//!
//! `OpenAiClient` fills in per-call defaults, forces the `stream` flag to
//! match the method being called, and delegates to the [`Transport`].
//! See: <https://platform.openai.com/docs/api-reference>

use async_trait::async_trait;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::client::{Client, ClientError, StreamingClient};
use crate::http::Transport;
use crate::model::{
    ChatCompletionRequest, ChatCompletionResponse, ChatCompletionStreamResponse, CompletionRequest,
    CompletionResponse, EditsRequest, EditsResponse, EmbeddingsRequest, EmbeddingsResponse,
    EngineObject, EnginesResponse, ImageRequest, ImageResponse, SearchRequest, SearchResponse,
    DEFAULT_CHAT_MODEL,
};
use crate::options::ClientConfig;
use crate::sse::SSEResponseExt;
use crate::stream::{for_each_frame, FrameStream};

/// OpenAI client using HTTP transport.
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    transport: Transport,
    default_engine: String,
}

impl OpenAiClient {
    /// Create a new client from a finished configuration.
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        Ok(Self {
            transport: Transport::new(&config)?,
            default_engine: config.default_engine,
        })
    }

    /// Engine used when a request does not name one.
    pub fn default_engine(&self) -> &str {
        &self.default_engine
    }

    /// Stream a chat completion as a pull-based sequence of frames.
    pub async fn chat_completion_events(
        &self,
        request: ChatCompletionRequest,
    ) -> Result<FrameStream<ChatCompletionStreamResponse>, ClientError> {
        let request = prepare_chat(request, true);
        self.open_stream("/chat/completions", &request).await
    }

    /// Stream a completion as a pull-based sequence of frames.
    ///
    /// Uses the default engine when the request names none.
    pub async fn completion_events(
        &self,
        request: CompletionRequest,
    ) -> Result<FrameStream<CompletionResponse>, ClientError> {
        let request = prepare_completion(request, &self.default_engine, true);
        self.open_stream("/completions", &request).await
    }

    async fn open_stream<B, T>(&self, path: &str, body: &B) -> Result<FrameStream<T>, ClientError>
    where
        B: Serialize + Sync,
        T: DeserializeOwned + Send + 'static,
    {
        let response = self.transport.send(Method::POST, path, Some(body)).await?;
        debug!(path, "streaming response");
        Ok(Box::pin(response.sse_events::<T>()))
    }

    async fn post<B, R>(&self, path: &str, body: &B) -> Result<R, ClientError>
    where
        B: Serialize + Sync,
        R: DeserializeOwned,
    {
        self.transport.request(Method::POST, path, Some(body)).await
    }

    async fn get<R: DeserializeOwned>(&self, path: &str) -> Result<R, ClientError> {
        self.transport.request::<(), R>(Method::GET, path, None).await
    }
}

/// Apply the chat defaults and force the stream flag.
fn prepare_chat(mut request: ChatCompletionRequest, stream: bool) -> ChatCompletionRequest {
    if request.model.is_empty() {
        request.model = DEFAULT_CHAT_MODEL.to_string();
    }
    request.stream = stream;
    request
}

/// Apply the completion defaults and force the stream flag.
fn prepare_completion(mut request: CompletionRequest, default_engine: &str, stream: bool) -> CompletionRequest {
    if request.model.is_empty() {
        request.model = default_engine.to_string();
    }
    request.stream = stream;
    request
}

fn with_engine(mut request: CompletionRequest, engine: &str) -> CompletionRequest {
    request.model = engine.to_string();
    request
}

fn search_path(engine: &str) -> String {
    format!("/engines/{}/search", engine)
}

#[async_trait]
impl Client for OpenAiClient {
    async fn engines(&self) -> Result<EnginesResponse, ClientError> {
        self.get("/engines").await
    }

    async fn engine(&self, engine: &str) -> Result<EngineObject, ClientError> {
        self.get(&format!("/engines/{}", engine)).await
    }

    async fn chat_completion(
        &self,
        request: ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse, ClientError> {
        let request = prepare_chat(request, false);
        self.post("/chat/completions", &request).await
    }

    async fn completion(&self, request: CompletionRequest) -> Result<CompletionResponse, ClientError> {
        let request = prepare_completion(request, &self.default_engine, false);
        self.post("/completions", &request).await
    }

    async fn completion_with_engine(
        &self,
        engine: &str,
        request: CompletionRequest,
    ) -> Result<CompletionResponse, ClientError> {
        self.completion(with_engine(request, engine)).await
    }

    async fn edits(&self, request: EditsRequest) -> Result<EditsResponse, ClientError> {
        self.post("/edits", &request).await
    }

    async fn search(&self, request: SearchRequest) -> Result<SearchResponse, ClientError> {
        self.post(&search_path(&self.default_engine), &request).await
    }

    async fn search_with_engine(
        &self,
        engine: &str,
        request: SearchRequest,
    ) -> Result<SearchResponse, ClientError> {
        self.post(&search_path(engine), &request).await
    }

    async fn embeddings(&self, request: EmbeddingsRequest) -> Result<EmbeddingsResponse, ClientError> {
        self.post("/embeddings", &request).await
    }

    async fn image(&self, request: ImageRequest) -> Result<ImageResponse, ClientError> {
        self.post("/images/generations", &request).await
    }
}

#[async_trait]
impl StreamingClient for OpenAiClient {
    async fn chat_completion_stream(
        &self,
        request: ChatCompletionRequest,
        on_data: &mut (dyn FnMut(ChatCompletionStreamResponse) + Send),
    ) -> Result<(), ClientError> {
        let frames = self.chat_completion_events(request).await?;
        for_each_frame(frames, on_data).await
    }

    async fn completion_stream(
        &self,
        request: CompletionRequest,
        on_data: &mut (dyn FnMut(CompletionResponse) + Send),
    ) -> Result<(), ClientError> {
        let frames = self.completion_events(request).await?;
        for_each_frame(frames, on_data).await
    }

    async fn completion_stream_with_engine(
        &self,
        engine: &str,
        request: CompletionRequest,
        on_data: &mut (dyn FnMut(CompletionResponse) + Send),
    ) -> Result<(), ClientError> {
        self.completion_stream(with_engine(request, engine), on_data).await
    }
}
