//! API client for the local model server.
//!
//! - dispatch helpers live in `transport`.
//! - retry policy logic lives in `retry`.

mod retry;
mod transport;

use super::{completions, models, ModelClient};
use crate::config::ModelSettings;
use crate::error::ModelError;
use crate::types::{ChatRequest, ModelList};
use async_trait::async_trait;
use retry::RetryPolicy;
use std::time::Duration;
use tokio::time::sleep;

/// Client for OpenAI-compatible local model servers.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    retry_policy: RetryPolicy,
}

impl ApiClient {
    /// Build a client from resolved model settings.
    pub fn new(settings: &ModelSettings) -> Self {
        Self::new_with_retry_policy(settings, RetryPolicy::default())
    }

    fn new_with_retry_policy(settings: &ModelSettings, retry_policy: RetryPolicy) -> Self {
        let http = transport::build_http_client(Duration::from_secs(settings.timeout_secs));
        Self {
            http,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            api_key: settings.api_key.trim().to_string(),
            model: settings.model.clone(),
            retry_policy,
        }
    }

    /// Model id sent with every request.
    pub fn model(&self) -> &str {
        &self.model
    }

    fn bearer(&self) -> Option<&str> {
        (!self.api_key.is_empty()).then_some(self.api_key.as_str())
    }

    /// List models advertised by the server.
    pub async fn list_models(&self) -> Result<ModelList, ModelError> {
        models::request(&self.http, &self.base_url, self.bearer()).await
    }

    /// Stream one chat completion, forwarding fragments to `on_text`.
    ///
    /// Failures before the first byte of the body are retried; once text has
    /// been delivered the request is never replayed.
    pub async fn stream_chat(
        &self,
        request: &ChatRequest,
        on_text: &mut (dyn for<'t> FnMut(&'t str) + Send),
    ) -> Result<String, ModelError> {
        let response = self.open_stream_with_retries(request).await?;
        completions::read_stream(response, on_text).await
    }

    async fn open_stream_with_retries(
        &self,
        request: &ChatRequest,
    ) -> Result<reqwest::Response, ModelError> {
        let mut attempt: u32 = 0;
        loop {
            match completions::open_stream(&self.http, &self.base_url, request, self.bearer()).await
            {
                Ok(response) => return Ok(response),
                Err(err) => {
                    if !self.retry_policy.should_retry(&err, attempt) {
                        return Err(transport::with_diagnostic_hints(&self.model, err));
                    }
                    let delay = self.retry_policy.retry_delay_for(attempt, &err);
                    tracing::debug!(attempt, ?delay, error = %err, "retrying chat request");
                    attempt = attempt.saturating_add(1);
                    sleep(delay).await;
                }
            }
        }
    }
}

#[async_trait]
impl ModelClient for ApiClient {
    fn model(&self) -> &str {
        ApiClient::model(self)
    }

    async fn list_models(&self) -> Result<ModelList, ModelError> {
        ApiClient::list_models(self).await
    }

    async fn stream_chat(
        &self,
        request: &ChatRequest,
        on_text: &mut (dyn for<'t> FnMut(&'t str) + Send),
    ) -> Result<String, ModelError> {
        ApiClient::stream_chat(self, request, on_text).await
    }
}
