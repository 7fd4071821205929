//! aic: a minimal terminal chat assistant for a local language model.
//!
//! On start the assistant loads (or creates) its working instructions from
//! `~/.aiCodeAssistant/workingInstructions.md`, checks that the configured
//! model is served, and then answers one prompt per input line until `exit`.
//!
//! # Quick start
//!
//! ```no_run
//! use aic::api::ApiClient;
//! use aic::config::{load_settings, ConfigLocation};
//! use aic::model::LocalModel;
//! use tokio::io::BufReader;
//!
//! # async fn example() -> std::io::Result<()> {
//! let location = ConfigLocation::resolve();
//! let settings = load_settings(location.as_ref()).unwrap_or_default();
//! let model = LocalModel::new(ApiClient::new(&settings.model), &settings.model.base_url);
//! let stdin = BufReader::new(tokio::io::stdin());
//! aic::repl::run(&model, location.as_ref(), stdin, std::io::stdout()).await?;
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod build_info;
pub mod config;
pub mod error;
pub mod instructions;
pub mod model;
pub mod repl;
pub mod session;
#[cfg(test)]
pub mod testsupport;
pub mod types;
