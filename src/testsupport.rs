//! Shared test fixtures: temp directories and scripted model doubles.
//!
//! The doubles replay canned results in order and record what they were
//! asked, so REPL and session tests run without a model server.

use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;

use crate::api::ModelClient;
use crate::error::ModelError;
use crate::instructions::InstructionSet;
use crate::model::{Availability, LanguageModel, ModelSession};
use crate::types::{ChatRequest, ModelList};

static TEST_DIR_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Temporary directory fixture with best-effort cleanup.
#[derive(Debug)]
pub struct TestTempDir {
    path: PathBuf,
}

impl TestTempDir {
    /// Create a unique temporary directory with a readable prefix.
    pub fn new(prefix: &str) -> Self {
        let suffix = TEST_DIR_COUNTER.fetch_add(1, Ordering::Relaxed);
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis();
        let dir = std::env::temp_dir().join(format!(
            "aic-{prefix}-{}-{millis}-{suffix}",
            std::process::id()
        ));
        fs::create_dir_all(&dir).expect("failed to create temporary fixture directory");
        Self { path: dir }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Build a child path under the fixture root.
    pub fn child(&self, relative: &str) -> PathBuf {
        self.path.join(relative)
    }

    /// Write UTF-8 text to a child path, creating parent directories as needed.
    pub fn write_text(&self, relative: &str, content: &str) -> PathBuf {
        let path = self.child(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("failed to create parent directories for fixture");
        }
        fs::write(&path, content).expect("failed to write fixture file");
        path
    }
}

impl Drop for TestTempDir {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.path);
    }
}

type Reply = Result<Vec<&'static str>, ModelError>;

/// Stream fragments to `on_text` and return their concatenation.
fn replay(
    reply: Option<Reply>,
    on_text: &mut (dyn for<'t> FnMut(&'t str) + Send),
) -> Result<String, ModelError> {
    let fragments = reply.unwrap_or_else(|| Err(ModelError::Stream("no scripted reply".into())))?;
    let mut text = String::new();
    for fragment in fragments {
        on_text(fragment);
        text.push_str(fragment);
    }
    Ok(text)
}

/// [`ModelClient`] double with a scripted catalog and reply queue.
pub struct ScriptedClient {
    model: String,
    models: Mutex<Option<Result<ModelList, ModelError>>>,
    replies: Mutex<VecDeque<Reply>>,
    requests: Mutex<Vec<ChatRequest>>,
}

impl ScriptedClient {
    pub fn new(model: &str) -> Self {
        Self {
            model: model.to_string(),
            models: Mutex::new(None),
            replies: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn with_models(self, models: Result<ModelList, ModelError>) -> Self {
        *self.models.lock().unwrap() = Some(models);
        self
    }

    pub fn with_reply(self, reply: Reply) -> Self {
        self.replies.lock().unwrap().push_back(reply);
        self
    }

    /// Every chat request received so far.
    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ModelClient for ScriptedClient {
    fn model(&self) -> &str {
        &self.model
    }

    async fn list_models(&self) -> Result<ModelList, ModelError> {
        self.models
            .lock()
            .unwrap()
            .take()
            .unwrap_or_else(|| Err(ModelError::InvalidResponse("no scripted catalog".into())))
    }

    async fn stream_chat(
        &self,
        request: &ChatRequest,
        on_text: &mut (dyn for<'t> FnMut(&'t str) + Send),
    ) -> Result<String, ModelError> {
        self.requests.lock().unwrap().push(request.clone());
        let reply = self.replies.lock().unwrap().pop_front();
        replay(reply, on_text)
    }
}

#[derive(Default)]
struct ScriptState {
    replies: VecDeque<Reply>,
    prompts: Vec<String>,
    sessions: Vec<InstructionSet>,
}

/// [`LanguageModel`] double with fixed availability and a reply queue.
#[derive(Clone)]
pub struct ScriptedModel {
    availability: Availability,
    state: Arc<Mutex<ScriptState>>,
}

impl ScriptedModel {
    pub fn new(availability: Availability) -> Self {
        Self {
            availability,
            state: Arc::default(),
        }
    }

    pub fn with_reply(self, reply: Reply) -> Self {
        self.state.lock().unwrap().replies.push_back(reply);
        self
    }

    /// Prompts dispatched to any session, in order.
    pub fn prompts(&self) -> Vec<String> {
        self.state.lock().unwrap().prompts.clone()
    }

    /// Instructions of every session created so far.
    pub fn sessions(&self) -> Vec<InstructionSet> {
        self.state.lock().unwrap().sessions.clone()
    }
}

#[async_trait]
impl LanguageModel for ScriptedModel {
    async fn availability(&self) -> Availability {
        self.availability.clone()
    }

    fn create_session(&self, instructions: &InstructionSet) -> Box<dyn ModelSession + '_> {
        self.state.lock().unwrap().sessions.push(instructions.clone());
        Box::new(ScriptedSession {
            state: Arc::clone(&self.state),
        })
    }
}

struct ScriptedSession {
    state: Arc<Mutex<ScriptState>>,
}

#[async_trait]
impl ModelSession for ScriptedSession {
    async fn respond(
        &mut self,
        prompt: &str,
        on_text: &mut (dyn for<'t> FnMut(&'t str) + Send),
    ) -> Result<String, ModelError> {
        let reply = {
            let mut state = self.state.lock().unwrap();
            state.prompts.push(prompt.to_string());
            state.replies.pop_front()
        };
        replay(reply, on_text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn temp_dir_fixture_writes_and_resolves_paths() {
        let fixture = TestTempDir::new("fixture");
        let file = fixture.write_text("nested/file.txt", "hello");
        assert_eq!(fs::read_to_string(file).unwrap(), "hello");
        assert!(fixture.path().is_dir());
    }

    #[tokio::test]
    async fn scripted_model_replays_in_order() {
        let model = ScriptedModel::new(Availability::Available)
            .with_reply(Ok(vec!["a", "b"]))
            .with_reply(Err(ModelError::Stream("x".into())));
        let mut session = model.create_session(&InstructionSet::new("sys"));

        let mut seen = Vec::new();
        let text = session
            .respond("p1", &mut |fragment: &str| seen.push(fragment.to_string()))
            .await
            .unwrap();
        assert_eq!(text, "ab");
        assert_eq!(seen, vec!["a", "b"]);
        assert!(session.respond("p2", &mut |_: &str| {}).await.is_err());
        assert_eq!(model.prompts(), vec!["p1", "p2"]);
    }
}
