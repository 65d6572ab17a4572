//! Chat session state
//!
//! The transcript is append-only. Every append bumps a `watch` channel
//! carrying the transcript length, so the UI can react (scroll to bottom)
//! without the session knowing anything about rendering.

use serde::Serialize;
use tokio::sync::watch;

/// Who authored a transcript entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Bot,
}

/// A single transcript entry. Never mutated after it is appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    pub text: String,
    pub sender: Sender,
}

impl ChatMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            sender: Sender::User,
        }
    }

    pub fn bot(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            sender: Sender::Bot,
        }
    }
}

pub struct SessionState {
    transcript: Vec<ChatMessage>,
    pub pending_input: String,
    pub input_cursor: usize, // cursor position (in chars) inside pending_input
    is_waiting: bool,
    appended: watch::Sender<usize>,
}

impl SessionState {
    pub fn new() -> Self {
        let (appended, _) = watch::channel(0);
        Self {
            transcript: Vec::new(),
            pending_input: String::new(),
            input_cursor: 0,
            is_waiting: false,
            appended,
        }
    }

    pub fn transcript(&self) -> &[ChatMessage] {
        &self.transcript
    }

    pub fn is_waiting(&self) -> bool {
        self.is_waiting
    }

    pub(crate) fn set_waiting(&mut self, waiting: bool) {
        self.is_waiting = waiting;
    }

    /// Append to the transcript and notify subscribers of the new length
    pub fn push(&mut self, message: ChatMessage) {
        self.transcript.push(message);
        self.appended.send_replace(self.transcript.len());
    }

    /// Subscribe to transcript appends. The receiver yields the new length.
    pub fn subscribe(&self) -> watch::Receiver<usize> {
        self.appended.subscribe()
    }

    pub fn clear_input(&mut self) {
        self.pending_input.clear();
        self.input_cursor = 0;
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}
