//! Pure state transitions.
//!
//! `transition` never touches the clock, the network or the DOM. Elapsed time
//! comes in through [`TransitionContext`]; everything with an outside effect
//! goes out as an [`Effect`].

use std::time::Duration;

use uuid::Uuid;

use super::compose::submission;
use super::effect::Effect;
use super::error::{IgnoreReason, WidgetError};
use super::event::WidgetEvent;
use super::format::format_bot_reply;
use super::state::{Message, WidgetSettings, WidgetState};

/// Inputs a transition may read besides the state and the event.
#[derive(Debug, Clone, Copy)]
pub struct TransitionContext<'a> {
    /// Time elapsed since the widget was loaded.
    pub since_load: Duration,
    pub settings: &'a WidgetSettings,
}

/// Apply `event` to `state`.
///
/// On `Err` the state is left untouched.
pub fn transition(
    state: &mut WidgetState,
    event: WidgetEvent,
    ctx: &TransitionContext<'_>,
) -> Result<Vec<Effect>, WidgetError> {
    let settings = ctx.settings;

    let effects = match event {
        WidgetEvent::Loaded => vec![Effect::SchedulePopup {
            after: settings.popup_delay,
        }],

        // Fires unconditionally, even after a dismissal.
        WidgetEvent::PopupTimerElapsed => {
            state.popup_shown = true;
            Vec::new()
        }

        WidgetEvent::LogoClicked => {
            state.panel_open = !state.panel_open;
            state.popup_shown = false;
            state.input_focused = state.panel_open;
            if state.panel_open {
                vec![Effect::FocusInput]
            } else {
                Vec::new()
            }
        }

        WidgetEvent::PopupCloseClicked => {
            state.popup_shown = false;
            Vec::new()
        }

        WidgetEvent::PanelCloseClicked => {
            state.panel_open = false;
            state.input_focused = false;
            Vec::new()
        }

        WidgetEvent::LogoHoverEntered => {
            state.popup_shown = true;
            Vec::new()
        }

        WidgetEvent::LogoHoverExited => {
            if ctx.since_load >= settings.hover_gate {
                state.popup_shown = false;
            }
            Vec::new()
        }

        WidgetEvent::InputChanged {
            value,
            scroll_height,
        } => {
            state.draft.set_text(value);
            state.draft.auto_resize(&settings.input, scroll_height);
            Vec::new()
        }

        WidgetEvent::EnterPressed { shift: true, value } => {
            if let Some(value) = value {
                state.draft.set_text(value);
            }
            state.draft.insert_newline();
            state.draft.auto_resize(&settings.input, None);
            Vec::new()
        }

        WidgetEvent::EnterPressed { shift: false, value } | WidgetEvent::SendClicked { value } => {
            submit(state, value, settings)?
        }

        WidgetEvent::ResponseReceived { request_id, text } => {
            state.finish_request(request_id);
            state.typing_active = false;
            state.append(Message::bot(format_bot_reply(&text)));
            Vec::new()
        }

        WidgetEvent::ResponseFailed { request_id, error } => {
            state.finish_request(request_id);
            state.typing_active = false;
            state.append(Message::bot(settings.fallback_message.clone()));
            vec![Effect::ReportFailure {
                request_id,
                error: WidgetError::BackendUnavailable(error),
            }]
        }
    };

    Ok(effects)
}

/// Start a send cycle from the draft, or from `value` when the browser sent one.
fn submit(
    state: &mut WidgetState,
    value: Option<String>,
    settings: &WidgetSettings,
) -> Result<Vec<Effect>, WidgetError> {
    let candidate = value.as_deref().unwrap_or_else(|| state.draft.text());
    let text = submission(candidate)
        .ok_or(WidgetError::SubmissionIgnored(IgnoreReason::Empty))?
        .to_string();

    if settings.single_flight && state.is_sending() {
        return Err(WidgetError::SubmissionIgnored(IgnoreReason::Busy));
    }

    state.append(Message::user(text.clone()));
    state.draft.clear();
    state.draft.auto_resize(&settings.input, None);
    state.typing_active = true;

    let request_id = Uuid::new_v4();
    state.begin_request(request_id);

    Ok(vec![Effect::PostMessage { request_id, text }])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::BackendError;
    use crate::widget::state::{DEFAULT_FALLBACK_MESSAGE, Origin};

    fn ctx_at(settings: &WidgetSettings, ms: u64) -> TransitionContext<'_> {
        TransitionContext {
            since_load: Duration::from_millis(ms),
            settings,
        }
    }

    fn apply(
        state: &mut WidgetState,
        event: WidgetEvent,
        settings: &WidgetSettings,
    ) -> Result<Vec<Effect>, WidgetError> {
        transition(state, event, &ctx_at(settings, 0))
    }

    fn typed(state: &mut WidgetState, settings: &WidgetSettings, text: &str) {
        apply(
            state,
            WidgetEvent::InputChanged {
                value: text.to_string(),
                scroll_height: None,
            },
            settings,
        )
        .unwrap();
    }

    fn send(state: &mut WidgetState, settings: &WidgetSettings) -> (Uuid, String) {
        let effects = apply(state, WidgetEvent::SendClicked { value: None }, settings).unwrap();
        match effects.as_slice() {
            [Effect::PostMessage { request_id, text }] => (*request_id, text.clone()),
            other => panic!("expected a single PostMessage, got {other:?}"),
        }
    }

    #[test]
    fn test_loaded_schedules_popup() {
        let settings = WidgetSettings::default();
        let mut state = WidgetState::new(&settings);

        let effects = apply(&mut state, WidgetEvent::Loaded, &settings).unwrap();
        assert_eq!(
            effects,
            vec![Effect::SchedulePopup {
                after: Duration::from_millis(3000)
            }]
        );
        assert!(!state.popup_shown);
    }

    #[test]
    fn test_popup_timer_fires_even_after_dismissal() {
        let settings = WidgetSettings::default();
        let mut state = WidgetState::new(&settings);

        apply(&mut state, WidgetEvent::LogoClicked, &settings).unwrap();
        apply(&mut state, WidgetEvent::PopupTimerElapsed, &settings).unwrap();

        assert!(state.panel_open);
        assert!(state.popup_shown);
    }

    #[test]
    fn test_logo_click_opens_panel_and_hides_popup() {
        let settings = WidgetSettings::default();

        for (panel_open, popup_shown) in [(false, false), (false, true), (true, true)] {
            let mut state = WidgetState::new(&settings);
            state.panel_open = panel_open;
            state.popup_shown = popup_shown;

            let effects = apply(&mut state, WidgetEvent::LogoClicked, &settings).unwrap();
            assert!(!state.popup_shown);
            if state.panel_open {
                assert!(state.input_focused);
                assert_eq!(effects, vec![Effect::FocusInput]);
            } else {
                assert!(!state.input_focused);
                assert!(effects.is_empty());
            }
        }
    }

    #[test]
    fn test_close_controls_close_only_their_container() {
        let settings = WidgetSettings::default();
        let mut state = WidgetState::new(&settings);
        state.panel_open = true;
        state.popup_shown = true;

        apply(&mut state, WidgetEvent::PopupCloseClicked, &settings).unwrap();
        assert!(!state.popup_shown);
        assert!(state.panel_open);

        state.popup_shown = true;
        apply(&mut state, WidgetEvent::PanelCloseClicked, &settings).unwrap();
        assert!(!state.panel_open);
        assert!(state.popup_shown);
    }

    #[test]
    fn test_hover_exit_is_gated_on_time_since_load() {
        let settings = WidgetSettings::default();
        let mut state = WidgetState::new(&settings);

        transition(&mut state, WidgetEvent::LogoHoverEntered, &ctx_at(&settings, 500)).unwrap();
        assert!(state.popup_shown);

        transition(&mut state, WidgetEvent::LogoHoverExited, &ctx_at(&settings, 2999)).unwrap();
        assert!(state.popup_shown);

        transition(&mut state, WidgetEvent::LogoHoverExited, &ctx_at(&settings, 3000)).unwrap();
        assert!(!state.popup_shown);
    }

    #[test]
    fn test_whitespace_submission_is_ignored() {
        let settings = WidgetSettings::default();

        for blank in ["", "   ", "\n\t "] {
            let mut state = WidgetState::new(&settings);
            typed(&mut state, &settings, blank);
            let before = state.clone();

            let result = apply(&mut state, WidgetEvent::SendClicked { value: None }, &settings);
            assert_eq!(
                result,
                Err(WidgetError::SubmissionIgnored(IgnoreReason::Empty))
            );
            assert_eq!(state, before);
            assert!(state.transcript().is_empty());
        }
    }

    #[test]
    fn test_send_appends_trimmed_user_message() {
        let settings = WidgetSettings::default();
        let mut state = WidgetState::new(&settings);
        typed(&mut state, &settings, "  where is my order?\n\n\n");

        let (_, text) = send(&mut state, &settings);

        assert_eq!(text, "where is my order?");
        assert_eq!(state.transcript().len(), 1);
        assert_eq!(state.transcript()[0].origin, Origin::User);
        assert_eq!(state.transcript()[0].text, "where is my order?");
        assert_eq!(state.draft.text(), "");
        assert_eq!(state.draft.height(), settings.input.min_height);
        assert!(state.typing_active);
        assert_eq!(state.pending_requests(), 1);
    }

    #[test]
    fn test_submit_value_overrides_stale_draft() {
        let settings = WidgetSettings::default();
        let mut state = WidgetState::new(&settings);
        typed(&mut state, &settings, "hel");

        let effects = apply(
            &mut state,
            WidgetEvent::EnterPressed {
                shift: false,
                value: Some("hello".to_string()),
            },
            &settings,
        )
        .unwrap();

        assert!(matches!(
            effects.as_slice(),
            [Effect::PostMessage { text, .. }] if text == "hello"
        ));
    }

    #[test]
    fn test_shift_enter_inserts_newline_without_sending() {
        let settings = WidgetSettings::default();
        let mut state = WidgetState::new(&settings);
        typed(&mut state, &settings, "line one");

        let effects = apply(
            &mut state,
            WidgetEvent::EnterPressed {
                shift: true,
                value: None,
            },
            &settings,
        )
        .unwrap();

        assert!(effects.is_empty());
        assert_eq!(state.draft.text(), "line one\n");
        assert!(state.transcript().is_empty());
        assert!(!state.typing_active);
    }

    #[test]
    fn test_response_renders_formatted_bot_message() {
        let settings = WidgetSettings::default();
        let mut state = WidgetState::new(&settings);
        typed(&mut state, &settings, "invoice please");
        let (request_id, _) = send(&mut state, &settings);

        apply(
            &mut state,
            WidgetEvent::ResponseReceived {
                request_id,
                text: "Order Invoice\n-----------------------------\nTotal:   $10".to_string(),
            },
            &settings,
        )
        .unwrap();

        let reply = &state.transcript()[1];
        assert_eq!(reply.origin, Origin::Bot);
        assert_eq!(
            reply.text,
            format!("Order Invoice\n{}\nTotal: $10", "\u{2500}".repeat(35))
        );
        assert!(!state.typing_active);
        assert!(!state.is_sending());
    }

    #[test]
    fn test_failure_appends_fallback_and_reports() {
        let settings = WidgetSettings::default();
        let mut state = WidgetState::new(&settings);
        typed(&mut state, &settings, "hi");
        let (request_id, _) = send(&mut state, &settings);

        let effects = apply(
            &mut state,
            WidgetEvent::ResponseFailed {
                request_id,
                error: BackendError::Status(500),
            },
            &settings,
        )
        .unwrap();

        assert_eq!(state.transcript()[1].text, DEFAULT_FALLBACK_MESSAGE);
        assert!(!state.typing_active);
        assert_eq!(
            effects,
            vec![Effect::ReportFailure {
                request_id,
                error: WidgetError::BackendUnavailable(BackendError::Status(500)),
            }]
        );
    }

    #[test]
    fn test_overlapping_sends_allowed_by_default() {
        let settings = WidgetSettings::default();
        let mut state = WidgetState::new(&settings);

        typed(&mut state, &settings, "first");
        let (first, _) = send(&mut state, &settings);
        typed(&mut state, &settings, "second");
        let (second, _) = send(&mut state, &settings);

        assert_ne!(first, second);
        assert_eq!(state.pending_requests(), 2);

        // Any answer hides the indicator, even with another request pending.
        apply(
            &mut state,
            WidgetEvent::ResponseReceived {
                request_id: second,
                text: "two".to_string(),
            },
            &settings,
        )
        .unwrap();
        assert!(!state.typing_active);
        assert_eq!(state.pending_requests(), 1);
    }

    #[test]
    fn test_single_flight_ignores_busy_submit() {
        let settings = WidgetSettings {
            single_flight: true,
            ..WidgetSettings::default()
        };
        let mut state = WidgetState::new(&settings);

        typed(&mut state, &settings, "first");
        send(&mut state, &settings);
        typed(&mut state, &settings, "second");

        let result = apply(&mut state, WidgetEvent::SendClicked { value: None }, &settings);
        assert_eq!(
            result,
            Err(WidgetError::SubmissionIgnored(IgnoreReason::Busy))
        );
        assert_eq!(state.draft.text(), "second");
        assert_eq!(state.transcript().len(), 1);
    }
}
