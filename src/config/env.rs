//! Environment variable overrides.
//!
//! `AIC_*` variables take precedence over `settings.toml` values.

use crate::error::ConfigError;

use super::Settings;

pub const BASE_URL_ENV: &str = "AIC_BASE_URL";
pub const MODEL_ENV: &str = "AIC_MODEL";
pub const API_KEY_ENV: &str = "AIC_API_KEY";
pub const TIMEOUT_ENV: &str = "AIC_API_TIMEOUT_SECS";
pub const CONFIG_DIR_ENV: &str = "AIC_CONFIG_DIR";
/// Log filter directive consumed by the tracing subscriber in `main`.
pub const LOG_ENV: &str = "AIC_LOG";

pub(super) fn apply_env_overrides<FEnv>(
    settings: &mut Settings,
    env_lookup: &FEnv,
) -> Result<(), ConfigError>
where
    FEnv: Fn(&str) -> Option<String>,
{
    if let Some(url) = non_empty(env_lookup, BASE_URL_ENV) {
        settings.model.base_url = normalize_base_url(BASE_URL_ENV, &url)?;
    }
    if let Some(model) = non_empty(env_lookup, MODEL_ENV) {
        settings.model.model = model;
    }
    if let Some(key) = non_empty(env_lookup, API_KEY_ENV) {
        settings.model.api_key = key;
    }
    if let Some(timeout) = non_empty(env_lookup, TIMEOUT_ENV) {
        // Clamp to at least 1 second so a zero never disables the timeout.
        let parsed = timeout.parse::<u64>().map_err(|_| {
            ConfigError::Invalid(format!(
                "invalid {TIMEOUT_ENV} value `{timeout}`: expected positive integer seconds"
            ))
        })?;
        settings.model.timeout_secs = parsed.max(1);
    }
    Ok(())
}

/// Check that `url` is an absolute http(s) URL and drop any trailing `/`.
///
/// `source` names the setting in the error message.
pub(super) fn normalize_base_url(source: &str, url: &str) -> Result<String, ConfigError> {
    let trimmed = url.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(ConfigError::Invalid(format!("{source} cannot be empty")));
    }
    let parsed = reqwest::Url::parse(trimmed).map_err(|err| {
        ConfigError::Invalid(format!("invalid {source} `{trimmed}`: {err}"))
    })?;
    if !matches!(parsed.scheme(), "http" | "https") || !parsed.has_host() {
        return Err(ConfigError::Invalid(format!(
            "invalid {source} `{trimmed}`: expected an http:// or https:// URL"
        )));
    }
    Ok(trimmed.to_string())
}

/// Look up `name`, treating blank values as unset.
pub(super) fn non_empty<FEnv>(env_lookup: &FEnv, name: &str) -> Option<String>
where
    FEnv: Fn(&str) -> Option<String>,
{
    env_lookup(name)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
