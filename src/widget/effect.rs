//! Side effects requested by a transition.

use std::time::Duration;

use uuid::Uuid;

use super::error::WidgetError;

/// Work the controller performs after a transition has been applied.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Raise [`super::WidgetEvent::PopupTimerElapsed`] after `after`.
    SchedulePopup { after: Duration },
    /// Move keyboard focus into the compose box.
    FocusInput,
    /// POST `text` to the chat backend.
    PostMessage { request_id: Uuid, text: String },
    /// Record a failed exchange for diagnostics.
    ReportFailure { request_id: Uuid, error: WidgetError },
}
