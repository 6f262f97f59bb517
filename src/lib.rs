//! Client SDK for the OpenCode Zen gateway.
//!
//! The gateway multiplexes four AI-provider request/response dialects behind
//! a single base URL: OpenAI Responses, OpenAI-compatible Chat Completions,
//! Anthropic Messages, and Google Gemini Models. This crate exposes one
//! normalized request model and internally routes it to the right dialect,
//! translates the body, selects the matching auth header, and parses the
//! four Server-Sent-Events wire formats into a single normalized delta
//! stream.
//!
//! ```no_run
//! use zen_sdk::{Client, Config, NormalizedMessage, NormalizedRequest, Role};
//!
//! # async fn run() -> zen_sdk::Result<()> {
//! let client = Client::new(Config::new("sk-zen-example"))?;
//! let req = NormalizedRequest {
//!     model: "claude-sonnet-4-6".into(),
//!     messages: vec![NormalizedMessage::text(Role::User, "Hello!")],
//!     ..Default::default()
//! };
//! let mut stream = client.stream(&req).await?;
//! while let Some(delta) = stream.recv().await {
//!     println!("{delta:?}");
//! }
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod protocol;
pub mod routing;
pub mod stream;
pub mod transport;

pub use client::{Client, Model, ModelsResponse};
pub use config::{AuthHeader, Config, RetryConfig};
pub use error::{ApiError, ZenError};
pub use protocol::normalized::{
    NormalizedMessage, NormalizedReasoning, NormalizedRequest, NormalizedTool, NormalizedToolCall,
    NormalizedToolChoice, Role, ToolChoiceType,
};
pub use routing::Endpoint;
pub use stream::parse::NormalizedDelta;
pub use stream::tool_calls::{StreamToolCall, ToolCallAccumulator};
pub use stream::{DeltaStream, RawEventStream, StreamEvent, UnifiedEvent, UnifiedEventStream};

/// Result type alias used across the crate.
pub type Result<T> = std::result::Result<T, ZenError>;
