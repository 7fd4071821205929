//! Configuration data model.
//!
//! `FileSettings` mirrors the optional `settings.toml`; `Settings` is the
//! resolved shape handed to the model backend.

use serde::Deserialize;

use super::defaults::{DEFAULT_BASE_URL, DEFAULT_MODEL_ID, DEFAULT_TIMEOUT_SECS};

/// Top-level runtime configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings {
    pub model: ModelSettings,
}

/// Resolved connection settings for the local model server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSettings {
    /// OpenAI-compatible base URL, without a trailing slash.
    pub base_url: String,
    /// Model id passed in every request.
    pub model: String,
    /// Bearer token; empty for servers without auth.
    pub api_key: String,
    pub timeout_secs: u64,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL_ID.to_string(),
            api_key: String::new(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// On-disk `settings.toml` shape. Every field is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileSettings {
    pub model: FileModelSettings,
}

/// `[model]` table of `settings.toml`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileModelSettings {
    pub base_url: Option<String>,
    pub model: Option<String>,
    pub api_key: Option<String>,
    /// Name of an env var holding the API key.
    pub api_key_env: Option<String>,
    pub timeout_secs: Option<u64>,
}
