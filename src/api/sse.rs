//! Incremental decoder for `text/event-stream` bodies.
//!
//! Bytes arrive in arbitrary chunks; only complete lines are decoded, so a
//! multi-byte character split across chunks is reassembled before use.

/// One dispatched server-sent event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum SseEvent {
    /// Joined `data:` lines of one event.
    Data(String),
    /// OpenAI-style `data: [DONE]` terminator.
    Done,
}

#[derive(Debug, Default)]
pub(crate) struct SseDecoder {
    pending: Vec<u8>,
    data: Option<String>,
}

impl SseDecoder {
    /// Feed raw bytes and return every event completed by them.
    pub(crate) fn push(&mut self, bytes: &[u8]) -> Vec<SseEvent> {
        self.pending.extend_from_slice(bytes);
        let mut events = Vec::new();
        while let Some(newline) = self.pending.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.pending.drain(..=newline).collect();
            let line = String::from_utf8_lossy(&line[..line.len() - 1]);
            self.handle_line(line.trim_end_matches('\r'), &mut events);
        }
        events
    }

    /// Flush a trailing event from a stream that ended without a blank line.
    pub(crate) fn finish(&mut self) -> Vec<SseEvent> {
        let mut events = Vec::new();
        if !self.pending.is_empty() {
            let rest = std::mem::take(&mut self.pending);
            let line = String::from_utf8_lossy(&rest).into_owned();
            self.handle_line(line.trim_end_matches('\r'), &mut events);
        }
        self.dispatch(&mut events);
        events
    }

    fn handle_line(&mut self, line: &str, events: &mut Vec<SseEvent>) {
        if line.is_empty() {
            self.dispatch(events);
            return;
        }
        // Comments, `event:`, `id:` and `retry:` fields carry nothing we use.
        let Some(value) = line.strip_prefix("data:") else {
            return;
        };
        let value = value.strip_prefix(' ').unwrap_or(value);
        match self.data.as_mut() {
            Some(data) => {
                data.push('\n');
                data.push_str(value);
            }
            None => self.data = Some(value.to_string()),
        }
    }

    fn dispatch(&mut self, events: &mut Vec<SseEvent>) {
        let Some(data) = self.data.take() else {
            return;
        };
        if data.trim() == "[DONE]" {
            events.push(SseEvent::Done);
        } else if !data.trim().is_empty() {
            events.push(SseEvent::Data(data));
        }
    }
}
