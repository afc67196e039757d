//! Events fed into the widget transition function.

use serde::Deserialize;
use uuid::Uuid;

use crate::backend::BackendError;

/// Everything that can happen to a widget.
#[derive(Debug, Clone, PartialEq)]
pub enum WidgetEvent {
    /// The page finished loading.
    Loaded,
    LogoClicked,
    /// Close control inside the welcome popup.
    PopupCloseClicked,
    /// Close control inside the chat panel.
    PanelCloseClicked,
    LogoHoverEntered,
    LogoHoverExited,
    InputChanged {
        value: String,
        /// Browser-measured content height, if available.
        scroll_height: Option<u32>,
    },
    EnterPressed {
        shift: bool,
        /// Textarea value at the time of the key press.
        value: Option<String>,
    },
    SendClicked {
        value: Option<String>,
    },
    PopupTimerElapsed,
    ResponseReceived {
        request_id: Uuid,
        text: String,
    },
    ResponseFailed {
        request_id: Uuid,
        error: BackendError,
    },
}

/// Subset of [`WidgetEvent`] the browser is allowed to send.
///
/// Timer and backend events are produced server-side only.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum UiEvent {
    LogoClicked,
    PopupCloseClicked,
    PanelCloseClicked,
    LogoHoverEntered,
    LogoHoverExited,
    InputChanged {
        value: String,
        #[serde(default)]
        scroll_height: Option<u32>,
    },
    EnterPressed {
        #[serde(default)]
        shift: bool,
        #[serde(default)]
        value: Option<String>,
    },
    SendClicked {
        #[serde(default)]
        value: Option<String>,
    },
}

impl From<UiEvent> for WidgetEvent {
    fn from(event: UiEvent) -> Self {
        match event {
            UiEvent::LogoClicked => Self::LogoClicked,
            UiEvent::PopupCloseClicked => Self::PopupCloseClicked,
            UiEvent::PanelCloseClicked => Self::PanelCloseClicked,
            UiEvent::LogoHoverEntered => Self::LogoHoverEntered,
            UiEvent::LogoHoverExited => Self::LogoHoverExited,
            UiEvent::InputChanged {
                value,
                scroll_height,
            } => Self::InputChanged {
                value,
                scroll_height,
            },
            UiEvent::EnterPressed { shift, value } => Self::EnterPressed { shift, value },
            UiEvent::SendClicked { value } => Self::SendClicked { value },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ui_event_deserialization() {
        let event: UiEvent = serde_json::from_str(r#"{"type":"logo_clicked"}"#).unwrap();
        assert_eq!(event, UiEvent::LogoClicked);

        let event: UiEvent = serde_json::from_str(r#"{"type":"send_clicked"}"#).unwrap();
        assert_eq!(event, UiEvent::SendClicked { value: None });

        let event: UiEvent =
            serde_json::from_str(r#"{"type":"enter_pressed","shift":true}"#).unwrap();
        assert_eq!(
            event,
            UiEvent::EnterPressed {
                shift: true,
                value: None
            }
        );

        let event: UiEvent = serde_json::from_str(
            r#"{"type":"input_changed","value":"hi\n","scroll_height":64}"#,
        )
        .unwrap();
        assert_eq!(
            WidgetEvent::from(event),
            WidgetEvent::InputChanged {
                value: "hi\n".to_string(),
                scroll_height: Some(64),
            }
        );
    }

    #[test]
    fn test_server_side_events_are_rejected() {
        let result: Result<UiEvent, _> =
            serde_json::from_str(r#"{"type":"response_received","text":"spoof"}"#);
        assert!(result.is_err());
    }
}
