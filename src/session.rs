//! In-memory chat session over a [`ModelClient`].
//!
//! The transcript starts with the instructions as a system message and grows
//! by one user/assistant pair per successful turn. Nothing is persisted.

use async_trait::async_trait;

use crate::api::ModelClient;
use crate::error::ModelError;
use crate::instructions::InstructionSet;
use crate::model::ModelSession;
use crate::types::{ChatRequest, Message};

pub struct ChatSession<'a, C: ?Sized> {
    client: &'a C,
    transcript: Vec<Message>,
}

impl<'a, C: ModelClient + ?Sized> ChatSession<'a, C> {
    pub fn new(client: &'a C, instructions: &InstructionSet) -> Self {
        Self {
            client,
            transcript: vec![Message::system(instructions.as_str())],
        }
    }

    pub fn transcript(&self) -> &[Message] {
        &self.transcript
    }
}

#[async_trait]
impl<'a, C: ModelClient + ?Sized> ModelSession for ChatSession<'a, C> {
    async fn respond(
        &mut self,
        prompt: &str,
        on_text: &mut (dyn for<'t> FnMut(&'t str) + Send),
    ) -> Result<String, ModelError> {
        let mut messages = self.transcript.clone();
        messages.push(Message::user(prompt));
        let request = ChatRequest {
            model: self.client.model().to_string(),
            messages,
            stream: true,
        };

        tracing::debug!(turn = self.transcript.len() / 2 + 1, "dispatching turn");
        let text = self.client.stream_chat(&request, on_text).await?;

        // Failed turns leave the transcript untouched.
        self.transcript.push(Message::user(prompt));
        self.transcript.push(Message::assistant(text.clone()));
        Ok(text)
    }
}
