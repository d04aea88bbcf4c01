//! HTTP client for the hosted generative-AI API.
//!
//! Three capabilities are used by the platform:
//!
//! - streamed chat replies ([`GenAiClient::stream_chat`]), delivered as
//!   server-sent events and decoded chunk by chunk;
//! - speech synthesis of a reply ([`GenAiClient::synthesize_speech`]);
//! - structured JSON profile drafts for admins ([`GenAiClient::generate_profile`]).
//!
//! No retries: a failed request surfaces as [`GenAiError`].

pub mod client;
pub mod config;
pub mod error;
pub mod stream;
pub mod wire;

pub use client::{GenAiClient, SpeechAudio, TextStream};
pub use config::GenAiConfig;
pub use error::GenAiError;
