//! Configuration: the per-user directory, optional backend settings, and
//! the defaults both fall back to.
//!
//! The instructions file itself is handled by [`crate::instructions`]; this
//! module only says where it lives.

mod defaults;
pub mod env;
mod loader;
mod location;
mod types;

pub use defaults::{
    CONFIG_DIR_NAME, DEFAULT_INSTRUCTIONS_TEMPLATE, FALLBACK_INSTRUCTIONS, INSTRUCTIONS_FILE_NAME,
    SETTINGS_FILE_NAME,
};
pub use loader::load_settings;
pub use location::ConfigLocation;
pub use types::{FileModelSettings, FileSettings, ModelSettings, Settings};
