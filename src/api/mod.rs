//! HTTP access to the local model server.
//!
//! - `models`: `GET /models`, used for availability checks
//! - `completions`: streaming `POST /chat/completions`
//! - `sse`: incremental event-stream decoding
//! - `client`: retry and dispatch orchestration

use crate::error::ModelError;
use crate::types::{ChatRequest, ModelList};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, RETRY_AFTER};
use std::time::SystemTime;

mod client;
mod completions;
pub(crate) mod models;
mod sse;

pub use client::ApiClient;

/// Minimal model-server interface used by sessions and availability checks.
///
/// Tests provide scripted implementations; production uses [`ApiClient`].
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Model id requested by this client.
    fn model(&self) -> &str;

    async fn list_models(&self) -> Result<ModelList, ModelError>;

    /// Stream one chat completion; returns the full text.
    async fn stream_chat(
        &self,
        request: &ChatRequest,
        on_text: &mut (dyn for<'t> FnMut(&'t str) + Send),
    ) -> Result<String, ModelError>;
}

/// Parse `Retry-After` as delta-seconds or an HTTP-date.
pub(crate) fn parse_retry_after_secs(headers: &HeaderMap) -> Option<u64> {
    let value = headers.get(RETRY_AFTER)?.to_str().ok()?.trim();
    if let Ok(seconds) = value.parse::<u64>() {
        return Some(seconds);
    }
    let when = httpdate::parse_http_date(value).ok()?;
    Some(
        when.duration_since(SystemTime::now())
            .map(|delta| delta.as_secs())
            .unwrap_or(0),
    )
}
