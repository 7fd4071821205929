//! Streaming `/chat/completions` protocol helpers.
//!
//! The request is split in two: [`open_stream`] sends the request and checks
//! the status (safe to retry), [`read_stream`] consumes the body and forwards
//! text fragments as they arrive (never retried).

use reqwest::header::CONTENT_TYPE;

use crate::api::parse_retry_after_secs;
use crate::api::sse::{SseDecoder, SseEvent};
use crate::error::ModelError;
use crate::types::{ChatChunk, ChatRequest, ChatResponse, ErrorBody};

/// Send one chat request and return the response once headers say success.
pub(crate) async fn open_stream(
    http: &reqwest::Client,
    base_url: &str,
    request: &ChatRequest,
    bearer: Option<&str>,
) -> Result<reqwest::Response, ModelError> {
    let url = format!("{base_url}/chat/completions");
    let mut req = http.post(&url).json(request);
    if let Some(token) = bearer.filter(|value| !value.trim().is_empty()) {
        req = req.header("Authorization", format!("Bearer {token}"));
    }

    let response = req.send().await?;
    if !response.status().is_success() {
        let status = response.status().as_u16();
        let retry_after_secs = parse_retry_after_secs(response.headers());
        let body = response.text().await.unwrap_or_default();
        return Err(ModelError::status(status, body, retry_after_secs));
    }
    Ok(response)
}

/// Consume a chat response body, forwarding each text fragment to `on_text`.
///
/// Returns the concatenated assistant text.
pub(crate) async fn read_stream(
    mut response: reqwest::Response,
    on_text: &mut (dyn for<'t> FnMut(&'t str) + Send),
) -> Result<String, ModelError> {
    let is_event_stream = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.contains("text/event-stream"));

    // Some servers answer with a single JSON body even when stream=true.
    if !is_event_stream {
        let body = response.text().await?;
        if !body.trim_start().starts_with('{') {
            return read_buffered_events(&body, on_text);
        }
        let text = parse_complete_body(&body)?;
        if !text.is_empty() {
            on_text(&text);
        }
        return Ok(text);
    }

    let mut decoder = SseDecoder::default();
    let mut collected = String::new();
    while let Some(chunk) = response.chunk().await? {
        for event in decoder.push(&chunk) {
            if apply_event(event, &mut collected, on_text)? {
                return Ok(collected);
            }
        }
    }
    for event in decoder.finish() {
        if apply_event(event, &mut collected, on_text)? {
            break;
        }
    }
    Ok(collected)
}

fn read_buffered_events(
    body: &str,
    on_text: &mut (dyn for<'t> FnMut(&'t str) + Send),
) -> Result<String, ModelError> {
    let mut decoder = SseDecoder::default();
    let mut collected = String::new();
    let events = decoder
        .push(body.as_bytes())
        .into_iter()
        .chain(decoder.finish());
    for event in events {
        if apply_event(event, &mut collected, on_text)? {
            break;
        }
    }
    Ok(collected)
}

/// Apply one SSE event. Returns `true` once the stream is complete.
fn apply_event(
    event: SseEvent,
    collected: &mut String,
    on_text: &mut (dyn for<'t> FnMut(&'t str) + Send),
) -> Result<bool, ModelError> {
    let data = match event {
        SseEvent::Done => return Ok(true),
        SseEvent::Data(data) => data,
    };
    let chunk: ChatChunk = serde_json::from_str(&data)
        .map_err(|err| ModelError::InvalidResponse(format!("invalid stream event: {err}")))?;
    if let Some(error) = chunk.error {
        return Err(ModelError::Stream(error.message().to_string()));
    }
    let Some(choice) = chunk.choices.into_iter().next() else {
        return Ok(false);
    };
    if let Some(text) = choice.delta.content.filter(|text| !text.is_empty()) {
        on_text(&text);
        collected.push_str(&text);
    }
    Ok(false)
}

fn parse_complete_body(body: &str) -> Result<String, ModelError> {
    #[derive(serde::Deserialize)]
    struct ErrorEnvelope {
        error: ErrorBody,
    }

    if let Ok(envelope) = serde_json::from_str::<ErrorEnvelope>(body) {
        return Err(ModelError::Stream(envelope.error.message().to_string()));
    }
    let response: ChatResponse = serde_json::from_str(body)
        .map_err(|err| ModelError::InvalidResponse(format!("invalid JSON response: {err}")))?;
    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| ModelError::InvalidResponse("response has no choices".to_string()))?;
    Ok(choice.message.content.unwrap_or_default())
}
