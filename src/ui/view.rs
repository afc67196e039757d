//! Presentation derived from widget state.
//!
//! The browser never decides a class flag on its own: it applies whatever
//! [`WidgetView`] says and appends whatever [`RenderedMessage`] it receives.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::widget::format::{bot_markup, user_markup};
use crate::widget::state::{Message, Origin, WidgetState};

/// DOM-facing projection of a [`WidgetState`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WidgetView {
    /// Class attribute of the panel container.
    pub widget_class: String,
    /// Class attribute of the welcome popup.
    pub popup_class: String,
    /// Class attribute of the typing indicator.
    pub typing_class: String,
    pub panel_open: bool,
    pub popup_shown: bool,
    pub typing_active: bool,
    pub input_focused: bool,
    /// Textarea height in CSS pixels.
    pub input_height: u32,
    /// Content exceeds the cap; textarea scrolls internally.
    pub input_overflowing: bool,
    /// Changes whenever the textarea must be emptied.
    pub draft_generation: u64,
    pub message_count: usize,
}

impl WidgetView {
    #[must_use]
    pub fn from_state(state: &WidgetState) -> Self {
        Self {
            widget_class: class_list("chat-widget", "open", state.panel_open),
            popup_class: class_list("welcome-popup", "show", state.popup_shown),
            typing_class: class_list("typing-indicator", "active", state.typing_active),
            panel_open: state.panel_open,
            popup_shown: state.popup_shown,
            typing_active: state.typing_active,
            input_focused: state.input_focused,
            input_height: state.draft.height(),
            input_overflowing: state.draft.overflowing(),
            draft_generation: state.draft.generation(),
            message_count: state.transcript().len(),
        }
    }

    /// Inline style for the textarea.
    #[must_use]
    pub fn input_style(&self) -> String {
        let overflow = if self.input_overflowing { "auto" } else { "hidden" };
        format!("height: {}px; overflow-y: {overflow};", self.input_height)
    }
}

fn class_list(base: &str, flag: &str, on: bool) -> String {
    if on {
        format!("{base} {flag}")
    } else {
        base.to_string()
    }
}

/// One transcript entry ready for insertion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedMessage {
    pub id: Uuid,
    pub origin: Origin,
    /// Full `<div>` element for the message list.
    pub html: String,
}

impl RenderedMessage {
    #[must_use]
    pub fn from_message(message: &Message) -> Self {
        let (kind, body) = match message.origin {
            Origin::User => ("user", user_markup(&message.text)),
            Origin::Bot => ("bot", bot_markup(&message.text)),
        };
        Self {
            id: message.id,
            origin: message.origin,
            html: format!(
                r#"<div class="message {kind}-message" data-message-id="{}">{body}</div>"#,
                message.id
            ),
        }
    }
}

/// Update pushed to the browser after each applied event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum WidgetUpdate {
    /// New class flags and textarea geometry.
    #[serde(rename = "widget.state")]
    State(WidgetView),
    /// A message was appended to the transcript.
    #[serde(rename = "message.appended")]
    MessageAppended(RenderedMessage),
}

/// SSE event name for a [`WidgetUpdate`].
pub fn event_name(update: &WidgetUpdate) -> &'static str {
    match update {
        WidgetUpdate::State(_) => "widget.state",
        WidgetUpdate::MessageAppended(_) => "message.appended",
    }
}

/// Format a [`WidgetUpdate`] as one SSE frame.
pub fn sse_event(update: &WidgetUpdate) -> String {
    let json = serde_json::to_string(update).unwrap_or_else(|e| {
        serde_json::json!({ "type": "error", "data": { "message": e.to_string() } }).to_string()
    });

    format!("event: {}\ndata: {json}\n\n", event_name(update))
}
