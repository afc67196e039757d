//! Widget state value.

use std::collections::BTreeSet;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::compose::{Draft, InputMetrics};

/// Bot text appended when the backend cannot answer.
pub const DEFAULT_FALLBACK_MESSAGE: &str = "Sorry, I am unable to process your request right now.";

/// Who produced a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    User,
    Bot,
}

/// A rendered transcript entry. Never mutated once appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,
    pub origin: Origin,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

impl Message {
    #[must_use]
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Origin::User, text.into())
    }

    #[must_use]
    pub fn bot(text: impl Into<String>) -> Self {
        Self::new(Origin::Bot, text.into())
    }

    fn new(origin: Origin, text: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            origin,
            text,
            created_at: Utc::now(),
        }
    }
}

/// Tunables the transitions depend on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidgetSettings {
    /// Delay between load and the welcome popup.
    pub popup_delay: Duration,
    /// Minimum time since load before hover-exit may hide the popup.
    pub hover_gate: Duration,
    pub input: InputMetrics,
    /// Ignore submits while a request is in flight.
    pub single_flight: bool,
    pub fallback_message: String,
}

impl Default for WidgetSettings {
    fn default() -> Self {
        Self {
            popup_delay: Duration::from_millis(3000),
            hover_gate: Duration::from_millis(3000),
            input: InputMetrics::default(),
            single_flight: false,
            fallback_message: DEFAULT_FALLBACK_MESSAGE.to_string(),
        }
    }
}

/// Full state of one widget.
///
/// `panel_open`, `popup_shown` and `typing_active` are independent flags; no
/// invariant ties them together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidgetState {
    pub panel_open: bool,
    pub popup_shown: bool,
    pub typing_active: bool,
    pub input_focused: bool,
    pub draft: Draft,
    transcript: Vec<Message>,
    in_flight: BTreeSet<Uuid>,
}

impl WidgetState {
    #[must_use]
    pub fn new(settings: &WidgetSettings) -> Self {
        Self {
            panel_open: false,
            popup_shown: false,
            typing_active: false,
            input_focused: false,
            draft: Draft::new(&settings.input),
            transcript: Vec::new(),
            in_flight: BTreeSet::new(),
        }
    }

    /// Messages in render order.
    #[must_use]
    pub fn transcript(&self) -> &[Message] {
        &self.transcript
    }

    pub(crate) fn append(&mut self, message: Message) {
        self.transcript.push(message);
    }

    /// Number of backend requests still awaiting an answer.
    #[must_use]
    pub fn pending_requests(&self) -> usize {
        self.in_flight.len()
    }

    /// Whether any backend request is still awaiting an answer.
    #[must_use]
    pub fn is_sending(&self) -> bool {
        !self.in_flight.is_empty()
    }

    pub(crate) fn begin_request(&mut self, request_id: Uuid) {
        self.in_flight.insert(request_id);
    }

    pub(crate) fn finish_request(&mut self, request_id: Uuid) -> bool {
        self.in_flight.remove(&request_id)
    }
}
