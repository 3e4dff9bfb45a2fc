//! # gpt-client - OpenAI GPT API Client Library
//!
//! A small, pragmatic Rust client for the OpenAI text generation API.
//!
//! ## Features
//! - Async-first, tokio compatible
//! - Typed request/response models for every endpoint: engines, chat
//!   completions, completions, edits, search, embeddings and images
//! - Streaming via Server-Sent Events, either with a per-frame callback or
//!   as a `Stream` of frames
//! - Typed errors that separate transport failures, API errors and
//!   malformed responses
//!
//! ## Architecture
//!
//! - **`options`**: `ClientConfig`, built once and immutable afterwards
//! - **`http`**: the transport: headers, timeout, status checks
//! - **`sse`** / **`stream`**: the line-oriented event decoder
//! - **`model`**: wire payloads
//! - **`client`**: `Client` / `StreamingClient` traits and `ClientError`
//! - **`providers`**: `OpenAiClient`, which implements both traits
//!
//! ## Example
//! ```no_run
//! use gpt_client::client::StreamingClient;
//! use gpt_client::model::{CompletionRequest, CompletionResponse, TEXT_DAVINCI_003_ENGINE};
//! use gpt_client::options::ClientConfig;
//! use gpt_client::providers::OpenAiClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ClientConfig::new("your-api-key").with_org("org-123");
//!     let client = OpenAiClient::new(config)?;
//!
//!     let request = CompletionRequest {
//!         max_tokens: Some(100),
//!         ..CompletionRequest::new("Write a haiku about Rust.")
//!     };
//!
//!     client
//!         .completion_stream_with_engine(TEXT_DAVINCI_003_ENGINE, request, &mut |frame: CompletionResponse| {
//!             print!("{}", frame.text());
//!         })
//!         .await?;
//!     println!();
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod http;
pub mod model;
pub mod options;
pub mod providers;
pub mod sse;
pub mod stream;

// Re-exports for convenience
pub use client::{Client, ClientError, StreamingClient};
pub use model::ApiError;
pub use options::ClientConfig;
pub use providers::OpenAiClient;
pub use stream::FrameStream;
