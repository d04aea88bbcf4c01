use std::time::Duration;

/// Connection settings for the generative-AI API.
#[derive(Debug, Clone)]
pub struct GenAiConfig {
    /// Empty means the capability is disabled.
    pub api_key: String,
    pub base_url: String,
    pub chat_model: String,
    pub speech_model: String,
    pub profile_model: String,
    /// Applies to non-streaming calls only.
    pub request_timeout: Duration,
}

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

impl GenAiConfig {
    /// Load from environment variables.
    ///
    /// | Env var               | Default                                      |
    /// |-----------------------|----------------------------------------------|
    /// | `GENAI_API_KEY`       | empty (disabled)                             |
    /// | `GENAI_BASE_URL`      | `https://generativelanguage.googleapis.com/v1beta` |
    /// | `GENAI_CHAT_MODEL`    | `gemini-2.5-flash`                           |
    /// | `GENAI_SPEECH_MODEL`  | `gemini-2.5-flash-preview-tts`               |
    /// | `GENAI_PROFILE_MODEL` | `gemini-2.5-flash`                           |
    /// | `GENAI_TIMEOUT_SECS`  | `60`                                         |
    pub fn from_env() -> Self {
        let var = |name: &str, default: &str| std::env::var(name).unwrap_or_else(|_| default.into());

        let request_timeout_secs: u64 = std::env::var("GENAI_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(60);

        Self {
            api_key: var("GENAI_API_KEY", ""),
            base_url: var("GENAI_BASE_URL", DEFAULT_BASE_URL)
                .trim_end_matches('/')
                .to_string(),
            chat_model: var("GENAI_CHAT_MODEL", "gemini-2.5-flash"),
            speech_model: var("GENAI_SPEECH_MODEL", "gemini-2.5-flash-preview-tts"),
            profile_model: var("GENAI_PROFILE_MODEL", "gemini-2.5-flash"),
            request_timeout: Duration::from_secs(request_timeout_secs),
        }
    }

    pub fn is_configured(&self) -> bool {
        !self.api_key.is_empty()
    }
}
