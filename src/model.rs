//! The language-model collaborator consumed by the REPL.
//!
//! [`LanguageModel`] answers "can I run?" and hands out sessions;
//! [`ModelSession`] answers one turn at a time. [`LocalModel`] implements both
//! on top of any [`ModelClient`], and tests substitute scripted doubles.

use std::fmt;

use async_trait::async_trait;

use crate::api::{models::contains_model, ModelClient};
use crate::error::ModelError;
use crate::instructions::InstructionSet;
use crate::session::ChatSession;

/// Result of probing the model runtime before the REPL starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Availability {
    Available,
    Unavailable(UnavailableReason),
    /// The runtime answered in a way we do not recognize.
    Unknown,
}

/// Why the model cannot be used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnavailableReason {
    /// Nothing is listening at the configured base URL.
    ServerUnreachable { base_url: String, detail: String },
    /// The server rejected our credentials.
    NotAuthorized { status: u16 },
    /// The server is up but does not serve the configured model.
    ModelNotFound { model: String },
}

impl fmt::Display for UnavailableReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ServerUnreachable { base_url, detail } => {
                write!(f, "No model server is reachable at {base_url} ({detail}).")
            }
            Self::NotAuthorized { status } => write!(
                f,
                "The model server rejected the request (status {status}); check AIC_API_KEY."
            ),
            Self::ModelNotFound { model } => {
                write!(f, "Model `{model}` is not installed on the model server.")
            }
        }
    }
}

/// A model runtime that can be probed and can open sessions.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    async fn availability(&self) -> Availability;

    /// Open a session configured with `instructions`. Never fails.
    fn create_session(&self, instructions: &InstructionSet) -> Box<dyn ModelSession + '_>;
}

/// One logical conversation with the model.
#[async_trait]
pub trait ModelSession: Send {
    /// Answer `prompt`, streaming fragments to `on_text`; returns the full text.
    async fn respond(
        &mut self,
        prompt: &str,
        on_text: &mut (dyn for<'t> FnMut(&'t str) + Send),
    ) -> Result<String, ModelError>;
}

/// [`LanguageModel`] backed by a local OpenAI-compatible server.
pub struct LocalModel<C> {
    client: C,
    base_url: String,
}

impl<C: ModelClient> LocalModel<C> {
    pub fn new(client: C, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl<C: ModelClient> LanguageModel for LocalModel<C> {
    async fn availability(&self) -> Availability {
        let model = self.client.model();
        match self.client.list_models().await {
            Ok(list) if contains_model(&list, model) => Availability::Available,
            Ok(list) => {
                let installed: Vec<&str> =
                    list.data.iter().map(|entry| entry.id.as_str()).collect();
                tracing::debug!(model, ?installed, "configured model not installed");
                Availability::Unavailable(UnavailableReason::ModelNotFound {
                    model: model.to_string(),
                })
            }
            Err(err) => classify_probe_error(&self.base_url, err),
        }
    }

    fn create_session(&self, instructions: &InstructionSet) -> Box<dyn ModelSession + '_> {
        Box::new(ChatSession::new(&self.client, instructions))
    }
}

fn classify_probe_error(base_url: &str, err: ModelError) -> Availability {
    tracing::debug!(error = %err, "availability probe failed");
    match err {
        ModelError::Http(inner) if inner.is_connect() || inner.is_timeout() => {
            Availability::Unavailable(UnavailableReason::ServerUnreachable {
                base_url: base_url.to_string(),
                detail: if inner.is_timeout() {
                    "timed out".to_string()
                } else {
                    "connection refused".to_string()
                },
            })
        }
        ModelError::Status { code, .. } if code == 401 || code == 403 => {
            Availability::Unavailable(UnavailableReason::NotAuthorized { status: code })
        }
        _ => Availability::Unknown,
    }
}
