/// Errors from the generative-AI layer.
#[derive(Debug, thiserror::Error)]
pub enum GenAiError {
    /// No API key configured.
    #[error("Generative AI is not configured")]
    NotConfigured,

    /// Network, DNS or TLS failure.
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Non-2xx response.
    #[error("Generative AI API error ({status}): {body}")]
    Api { status: u16, body: String },

    /// The response did not have the expected shape.
    #[error("Failed to decode response: {0}")]
    Decode(String),

    /// The model returned no usable content.
    #[error("Model returned an empty response")]
    Empty,
}
