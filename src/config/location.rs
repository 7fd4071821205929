//! Resolution of the per-user configuration directory.

use std::path::{Path, PathBuf};

use super::defaults::{CONFIG_DIR_NAME, INSTRUCTIONS_FILE_NAME, SETTINGS_FILE_NAME};
use super::env::CONFIG_DIR_ENV;

/// Directory and file paths used to persist instructions and read settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigLocation {
    dir: PathBuf,
    /// Home directory used to abbreviate displayed paths with `~`.
    home: Option<PathBuf>,
}

impl ConfigLocation {
    /// Location rooted at an explicit directory.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            home: None,
        }
    }

    /// Resolve `~/.aiCodeAssistant`, honoring `AIC_CONFIG_DIR`.
    pub fn resolve() -> Option<Self> {
        Self::resolve_with(|name| std::env::var(name).ok(), dirs::home_dir)
    }

    /// Resolve with injected env and home-directory lookups.
    ///
    /// Returns `None` only when neither an override nor a home dir exists.
    pub fn resolve_with<FEnv, FHome>(env_lookup: FEnv, home_dir: FHome) -> Option<Self>
    where
        FEnv: Fn(&str) -> Option<String>,
        FHome: Fn() -> Option<PathBuf>,
    {
        let home = home_dir();
        if let Some(dir) = env_lookup(CONFIG_DIR_ENV) {
            let trimmed = dir.trim();
            if !trimmed.is_empty() {
                return Some(Self {
                    dir: PathBuf::from(trimmed),
                    home,
                });
            }
        }
        let home = home?;
        Some(Self {
            dir: home.join(CONFIG_DIR_NAME),
            home: Some(home),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn instructions_path(&self) -> PathBuf {
        self.dir.join(INSTRUCTIONS_FILE_NAME)
    }

    pub fn settings_path(&self) -> PathBuf {
        self.dir.join(SETTINGS_FILE_NAME)
    }

    /// Render `path` for user-facing messages, replacing the home prefix with `~`.
    pub fn display_path(&self, path: &Path) -> String {
        if let Some(home) = self.home.as_deref() {
            if let Ok(relative) = path.strip_prefix(home) {
                return format!("~/{}", relative.display());
            }
        }
        path.display().to_string()
    }
}
