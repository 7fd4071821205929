//! Settings loading pipeline: defaults < `settings.toml` < env overrides.

use std::io::ErrorKind;
use std::path::Path;

use crate::error::ConfigError;

use super::env::{apply_env_overrides, non_empty, normalize_base_url};
use super::{ConfigLocation, FileSettings, Settings};

/// Load settings for `location` from disk and the process environment.
///
/// A missing location or settings file simply means built-in defaults.
pub fn load_settings(location: Option<&ConfigLocation>) -> Result<Settings, ConfigError> {
    let path = location.map(ConfigLocation::settings_path);
    load_settings_from_sources(
        path.as_deref(),
        |path| std::fs::read_to_string(path),
        |name| std::env::var(name).ok(),
    )
}

pub(super) fn load_settings_from_sources<FRead, FEnv>(
    settings_path: Option<&Path>,
    read_file: FRead,
    env_lookup: FEnv,
) -> Result<Settings, ConfigError>
where
    FRead: Fn(&Path) -> Result<String, std::io::Error>,
    FEnv: Fn(&str) -> Option<String>,
{
    let text = match settings_path.map(&read_file) {
        Some(Ok(text)) => text,
        Some(Err(e)) if e.kind() == ErrorKind::NotFound => String::new(),
        Some(Err(e)) => return Err(ConfigError::Io(e)),
        None => String::new(),
    };
    let parsed: FileSettings = toml::from_str(&text)?;
    let mut settings = resolve_file_settings(parsed, &env_lookup)?;
    apply_env_overrides(&mut settings, &env_lookup)?;
    Ok(settings)
}

fn resolve_file_settings<FEnv>(
    file: FileSettings,
    env_lookup: &FEnv,
) -> Result<Settings, ConfigError>
where
    FEnv: Fn(&str) -> Option<String>,
{
    let mut settings = Settings::default();
    let model = file.model;
    if let Some(url) = model.base_url {
        settings.model.base_url = normalize_base_url("model.base_url", &url)?;
    }
    if let Some(id) = model.model {
        let trimmed = id.trim();
        if trimmed.is_empty() {
            return Err(ConfigError::Invalid("model.model cannot be empty".into()));
        }
        settings.model.model = trimmed.to_string();
    }
    if model.api_key.is_some() && model.api_key_env.is_some() {
        return Err(ConfigError::Invalid(
            "set only one of model.api_key and model.api_key_env".into(),
        ));
    }
    if let Some(key) = model.api_key {
        settings.model.api_key = key.trim().to_string();
    }
    if let Some(var) = model.api_key_env {
        settings.model.api_key = non_empty(env_lookup, var.trim()).unwrap_or_default();
    }
    if let Some(timeout) = model.timeout_secs {
        settings.model.timeout_secs = timeout.max(1);
    }
    Ok(settings)
}
