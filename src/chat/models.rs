//! The core models for a stateful conversation: the transcript and the
//! per-conversation session record.
use serde::{Deserialize, Serialize};

use crate::openai::{Message, Role};
use crate::persona::{self, Persona};

/// Ordered conversational memory sent to the completion service on every
/// turn. Entries are append-only: the first entry (when present) is the
/// single system prompt, seeded once at initialization, and individual
/// entries are never reordered or deleted. The whole transcript can only
/// be cleared via `reset`.
///
/// There is no length cap. An overlong transcript is rejected by the
/// completion service and surfaces as an ordinary upstream failure.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Transcript(Vec<Message>);

impl Transcript {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn messages(&self) -> &[Message] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Seeds the system prompt if the transcript is empty. Idempotent, so
    /// it is safe to call on every turn. An already-initialized transcript
    /// keeps its original system prompt even if the active persona has
    /// changed since.
    pub fn ensure_initialized(&mut self, persona: &Persona) {
        if self.0.is_empty() {
            self.0.push(Message::new(Role::System, persona.system_prompt));
        }
    }

    pub fn append_user(&mut self, text: &str) {
        self.0.push(Message::new(Role::User, text));
    }

    /// Appends the assistant's reply. Called only after a successful
    /// completion.
    pub fn append_assistant(&mut self, text: &str) {
        self.0.push(Message::new(Role::Assistant, text));
    }

    /// Clears the transcript. The next turn re-seeds the system prompt
    /// via `ensure_initialized`.
    pub fn reset(&mut self) {
        self.0.clear();
    }
}

/// Per-conversation session record. Created lazily on first contact via
/// `ConversationState::new`, owned exclusively by one conversation key
/// for the duration of an exchange, and persisted between exchanges by a
/// `SessionStore`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConversationState {
    /// Selected persona code; the default persona applies when absent.
    #[serde(default)]
    pub persona_code: Option<String>,
    /// Personal API key overriding the platform-wide default credential.
    #[serde(default)]
    pub api_key: Option<String>,
    /// Completed exchanges, incremented once per successful turn.
    #[serde(default)]
    pub usage_count: u32,
    #[serde(default)]
    pub transcript: Transcript,
    #[serde(default)]
    pub terse_replies: bool,
}

impl ConversationState {
    pub fn new() -> Self {
        Self {
            persona_code: None,
            api_key: None,
            usage_count: 0,
            transcript: Transcript::new(),
            terse_replies: false,
        }
    }

    pub fn persona(&self) -> &'static Persona {
        persona::resolve(self.persona_code.as_deref())
    }
}

impl Default for ConversationState {
    fn default() -> Self {
        Self::new()
    }
}
