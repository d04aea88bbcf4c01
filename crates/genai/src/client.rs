//! The generative-AI HTTP client.

use std::pin::Pin;

use companion_core::chat::ChatMessage;
use companion_core::profile::ProfileDraft;
use futures::Stream;
use serde::Serialize;

use crate::config::GenAiConfig;
use crate::error::GenAiError;
use crate::stream::text_chunks;
use crate::wire::{decode_response, Content, GenerateRequest, GenerationConfig};

/// Streamed reply text, in arrival order.
pub type TextStream = Pin<Box<dyn Stream<Item = Result<String, GenAiError>> + Send>>;

const API_KEY_HEADER: &str = "x-goog-api-key";

/// Synthesized speech, base64-encoded as returned by the API.
#[derive(Debug, Clone, Serialize)]
pub struct SpeechAudio {
    pub mime_type: String,
    pub data: String,
}

/// Client for one generative-AI API account. Cheap to clone.
#[derive(Clone)]
pub struct GenAiClient {
    client: reqwest::Client,
    config: GenAiConfig,
}

impl GenAiClient {
    pub fn new(config: GenAiConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    pub fn config(&self) -> &GenAiConfig {
        &self.config
    }

    /// Stream a companion reply.
    ///
    /// `context` is the recent history ending with the user's new turn.
    pub async fn stream_chat(
        &self,
        system_prompt: &str,
        context: &[ChatMessage],
    ) -> Result<TextStream, GenAiError> {
        self.ensure_configured()?;
        let request = GenerateRequest {
            system_instruction: Some(Content::text(None, system_prompt)),
            contents: context.iter().map(Content::from_message).collect(),
            generation_config: None,
        };

        let url = format!(
            "{}/models/{}:streamGenerateContent?alt=sse",
            self.config.base_url, self.config.chat_model
        );
        tracing::debug!(model = %self.config.chat_model, turns = context.len(), "Starting chat stream");

        let response = self
            .client
            .post(url)
            .header(API_KEY_HEADER, &self.config.api_key)
            .json(&request)
            .send()
            .await?;
        let response = Self::ensure_success(response).await?;

        Ok(Box::pin(text_chunks(response.bytes_stream())))
    }

    /// Read `text` aloud in the given prebuilt voice.
    pub async fn synthesize_speech(&self, text: &str, voice: &str) -> Result<SpeechAudio, GenAiError> {
        self.ensure_configured()?;
        let request = GenerateRequest {
            system_instruction: None,
            contents: vec![Content::text(Some("user"), text)],
            generation_config: Some(GenerationConfig {
                response_modalities: Some(vec!["AUDIO".into()]),
                speech_config: Some(serde_json::json!({
                    "voiceConfig": { "prebuiltVoiceConfig": { "voiceName": voice } }
                })),
                ..Default::default()
            }),
        };

        let raw = self.generate(&self.config.speech_model, &request).await?;
        let inline = decode_response(&raw)?
            .inline_data()
            .cloned()
            .ok_or(GenAiError::Empty)?;
        Ok(SpeechAudio {
            mime_type: inline.mime_type,
            data: inline.data,
        })
    }

    /// Draft a companion profile from a short admin brief.
    pub async fn generate_profile(&self, brief: &str) -> Result<ProfileDraft, GenAiError> {
        self.ensure_configured()?;
        let request = GenerateRequest {
            system_instruction: Some(Content::text(None, PROFILE_INSTRUCTION)),
            contents: vec![Content::text(Some("user"), brief)],
            generation_config: Some(GenerationConfig {
                response_mime_type: Some("application/json".into()),
                ..Default::default()
            }),
        };

        let raw = self.generate(&self.config.profile_model, &request).await?;
        let text = decode_response(&raw)?.text();
        if text.trim().is_empty() {
            return Err(GenAiError::Empty);
        }
        serde_json::from_str(&text).map_err(|e| GenAiError::Decode(format!("profile draft: {e}")))
    }

    async fn generate(&self, model: &str, request: &GenerateRequest) -> Result<String, GenAiError> {
        let url = format!("{}/models/{model}:generateContent", self.config.base_url);
        let response = self
            .client
            .post(url)
            .header(API_KEY_HEADER, &self.config.api_key)
            .timeout(self.config.request_timeout)
            .json(request)
            .send()
            .await?;
        Ok(Self::ensure_success(response).await?.text().await?)
    }

    fn ensure_configured(&self) -> Result<(), GenAiError> {
        if self.config.is_configured() {
            Ok(())
        } else {
            Err(GenAiError::NotConfigured)
        }
    }

    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, GenAiError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            tracing::warn!(status = status.as_u16(), "Generative AI request failed");
            return Err(GenAiError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }
}

const PROFILE_INSTRUCTION: &str = "You write profiles for adult virtual companions. \
Reply with a single JSON object with the fields: name (string), age (integer, 18 or older), \
tagline (string), bio (string, two or three sentences), persona_prompt (string, second person, \
describing personality, speaking style and boundaries) and interests (array of strings).";

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn unconfigured() -> GenAiClient {
        GenAiClient::new(GenAiConfig {
            api_key: String::new(),
            base_url: "http://127.0.0.1:9".into(),
            chat_model: "chat".into(),
            speech_model: "speech".into(),
            profile_model: "profile".into(),
            request_timeout: std::time::Duration::from_secs(1),
        })
    }

    #[tokio::test]
    async fn missing_key_fails_without_network() {
        let client = unconfigured();
        // The stream type has no Debug impl.
        assert_matches!(
            client.stream_chat("p", &[]).await.err(),
            Some(GenAiError::NotConfigured)
        );
        assert_matches!(
            client.synthesize_speech("hi", "Kore").await,
            Err(GenAiError::NotConfigured)
        );
        assert_matches!(client.generate_profile("x").await, Err(GenAiError::NotConfigured));
    }
}
