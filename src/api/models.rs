//! `GET /models` request helper used for availability checks.

use crate::api::parse_retry_after_secs;
use crate::error::ModelError;
use crate::types::ModelList;

/// Fetch the model catalog advertised by the server.
pub(crate) async fn request(
    http: &reqwest::Client,
    base_url: &str,
    bearer: Option<&str>,
) -> Result<ModelList, ModelError> {
    let url = format!("{base_url}/models");
    let mut req = http.get(&url);
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

    let body = response.text().await?;
    serde_json::from_str::<ModelList>(&body)
        .map_err(|err| ModelError::InvalidResponse(format!("invalid model list: {err}")))
}

/// True when `wanted` names one of `available`, ignoring a `:latest` tag.
pub(crate) fn contains_model(available: &ModelList, wanted: &str) -> bool {
    let wanted = strip_latest_tag(wanted.trim());
    available
        .data
        .iter()
        .any(|entry| strip_latest_tag(entry.id.trim()) == wanted)
}

fn strip_latest_tag(id: &str) -> &str {
    id.strip_suffix(":latest").unwrap_or(id)
}
