//! HTTP client construction and error decoration.

use crate::error::ModelError;
use std::time::Duration;

/// Build an HTTP client with the request timeout applied.
pub(super) fn build_http_client(timeout: Duration) -> reqwest::Client {
    // Fall back to reqwest defaults if builder creation fails for any reason.
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}

/// Add a hint to 404 responses, which local servers return for unknown models.
pub(super) fn with_diagnostic_hints(model: &str, err: ModelError) -> ModelError {
    match err {
        ModelError::Status {
            code: 404,
            mut body,
            retry_after_secs,
        } => {
            body.push_str(&format!(
                "\nHint: check that model `{model}` is installed and that AIC_BASE_URL points at an OpenAI-compatible `/v1` endpoint."
            ));
            ModelError::status(404, body, retry_after_secs)
        }
        other => other,
    }
}
