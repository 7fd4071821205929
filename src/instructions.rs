//! Instructions bootstrap: read `workingInstructions.md`, or create it from
//! the built-in template on first run.
//!
//! [`load_instructions`] is total. Every failure branch resolves to usable
//! instruction text, and the [`InstructionsOutcome`] records which branch was
//! taken so the caller can tell the user.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::config::{ConfigLocation, DEFAULT_INSTRUCTIONS_TEMPLATE, FALLBACK_INSTRUCTIONS};

/// Immutable system prompt used to configure a model session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstructionSet(String);

impl InstructionSet {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    /// Generic prompt used when the instructions file is unusable.
    pub fn fallback() -> Self {
        Self::new(FALLBACK_INSTRUCTIONS)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Which bootstrap branch produced the instructions.
#[derive(Debug)]
pub enum InstructionsOutcome {
    /// Existing file read verbatim.
    Loaded { path: PathBuf },
    /// File was absent; the default template was written and used.
    CreatedDefault { path: PathBuf },
    /// File was absent and the template could not be written.
    CreateFailed { path: PathBuf, error: std::io::Error },
    /// File exists but could not be read as UTF-8 text.
    ReadFailed { path: PathBuf, error: std::io::Error },
    /// No home directory to resolve a config location from.
    NoConfigLocation,
}

impl InstructionsOutcome {
    /// True when the generic fallback prompt is in use.
    pub fn is_fallback(&self) -> bool {
        matches!(
            self,
            Self::CreateFailed { .. } | Self::ReadFailed { .. } | Self::NoConfigLocation
        )
    }
}

/// Instructions plus the outcome that produced them.
#[derive(Debug)]
pub struct LoadedInstructions {
    pub instructions: InstructionSet,
    pub outcome: InstructionsOutcome,
}

impl LoadedInstructions {
    /// User-facing status lines describing how the instructions were obtained.
    pub fn notices(&self, location: Option<&ConfigLocation>) -> Vec<String> {
        let shown = |path: &Path| match location {
            Some(location) => location.display_path(path),
            None => path.display().to_string(),
        };
        match &self.outcome {
            InstructionsOutcome::Loaded { path } => {
                vec![format!("Successfully loaded instructions from {}", shown(path))]
            }
            InstructionsOutcome::CreatedDefault { path } => vec![
                "Instructions file not found. Creating a default one...".to_string(),
                format!(
                    "Successfully created and loaded default instructions at {}",
                    shown(path)
                ),
            ],
            InstructionsOutcome::CreateFailed { error, .. } => vec![
                "Instructions file not found. Creating a default one...".to_string(),
                format!("Error: Could not create '{}'.", file_name()),
                format!("Details: {error}"),
                "Using a default, generic prompt for now.".to_string(),
            ],
            InstructionsOutcome::ReadFailed { error, .. } => vec![
                format!("Warning: Could not load '{}'.", file_name()),
                format!("Details: {error}"),
                "Using a default, generic prompt for now.".to_string(),
            ],
            InstructionsOutcome::NoConfigLocation => vec![
                format!("Warning: Could not load '{}'.", file_name()),
                "Details: unable to resolve the home directory".to_string(),
                "Using a default, generic prompt for now.".to_string(),
            ],
        }
    }
}

fn file_name() -> &'static str {
    crate::config::INSTRUCTIONS_FILE_NAME
}

/// Load instructions from `location`, creating the file on first run.
///
/// Never fails: unreadable or unwritable files fall back to a generic prompt.
pub fn load_instructions(location: Option<&ConfigLocation>) -> LoadedInstructions {
    let Some(location) = location else {
        tracing::warn!("no config location; using fallback instructions");
        return fallback(InstructionsOutcome::NoConfigLocation);
    };

    // Directory creation failure is not fatal; the read below reports the
    // real problem if there is one.
    if let Err(error) = fs::create_dir_all(location.dir()) {
        tracing::warn!(
            dir = %location.dir().display(),
            %error,
            "failed to create config directory"
        );
    }

    let path = location.instructions_path();
    match fs::read_to_string(&path) {
        Ok(text) => {
            tracing::debug!(path = %path.display(), bytes = text.len(), "loaded instructions");
            LoadedInstructions {
                instructions: InstructionSet::new(text),
                outcome: InstructionsOutcome::Loaded { path },
            }
        }
        Err(error) if error.kind() == ErrorKind::NotFound => create_default(path),
        Err(error) => {
            tracing::warn!(path = %path.display(), %error, "failed to read instructions");
            fallback(InstructionsOutcome::ReadFailed { path, error })
        }
    }
}

fn create_default(path: PathBuf) -> LoadedInstructions {
    match write_atomically(&path, DEFAULT_INSTRUCTIONS_TEMPLATE) {
        Ok(()) => {
            tracing::debug!(path = %path.display(), "wrote default instructions");
            LoadedInstructions {
                instructions: InstructionSet::new(DEFAULT_INSTRUCTIONS_TEMPLATE),
                outcome: InstructionsOutcome::CreatedDefault { path },
            }
        }
        Err(error) => {
            tracing::warn!(path = %path.display(), %error, "failed to write default instructions");
            fallback(InstructionsOutcome::CreateFailed { path, error })
        }
    }
}

fn fallback(outcome: InstructionsOutcome) -> LoadedInstructions {
    LoadedInstructions {
        instructions: InstructionSet::fallback(),
        outcome,
    }
}

/// Write `contents` to a sibling temp file, then rename it over `path`.
///
/// On failure the temp file is removed so no partial file is left behind.
fn write_atomically(path: &Path, contents: &str) -> std::io::Result<()> {
    let tmp_path = staging_path(path);
    let result = fs::write(&tmp_path, contents).and_then(|()| fs::rename(&tmp_path, path));
    if result.is_err() {
        let _ = fs::remove_file(&tmp_path);
    }
    result
}

fn staging_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|value| value.to_os_string())
        .unwrap_or_default();
    name.push(format!(".{}.tmp", std::process::id()));
    path.with_file_name(name)
}
