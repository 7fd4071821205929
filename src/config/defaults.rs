//! Default configuration constants.
//!
//! Keeping defaults in one module lets the loader, the instructions bootstrap,
//! and tests share the same literals.

/// Name of the per-user configuration directory under `$HOME`.
pub const CONFIG_DIR_NAME: &str = ".aiCodeAssistant";
/// File holding the persisted system instructions.
pub const INSTRUCTIONS_FILE_NAME: &str = "workingInstructions.md";
/// Optional, never-written backend settings file.
pub const SETTINGS_FILE_NAME: &str = "settings.toml";

/// Embedded instructions template written on first run.
pub const DEFAULT_INSTRUCTIONS_TEMPLATE: &str =
    include_str!("../templates/workingInstructions.md");
/// Minimal instructions used when the file can be neither read nor created.
pub const FALLBACK_INSTRUCTIONS: &str = "You are a helpful AI assistant.";

/// Default OpenAI-compatible base URL of the local model server (Ollama).
pub(super) const DEFAULT_BASE_URL: &str = "http://localhost:11434/v1";
/// Default model id requested from the local server.
pub(super) const DEFAULT_MODEL_ID: &str = "llama3.2";
/// Default timeout for one model request, streaming included.
pub(super) const DEFAULT_TIMEOUT_SECS: u64 = 300;
