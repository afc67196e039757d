//! Widget controller: applies events and runs their effects.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::broadcast;
use tokio::time::{Duration, Instant};
use uuid::Uuid;

use super::clock::Clock;
use super::effect::Effect;
use super::error::WidgetError;
use super::event::WidgetEvent;
use super::state::{Message, WidgetSettings, WidgetState};
use super::transition::{TransitionContext, transition};
use crate::backend::ChatBackend;
use crate::ui::{RenderedMessage, WidgetUpdate, WidgetView};

/// Capacity of the per-widget update channel.
const UPDATE_CHANNEL_CAPACITY: usize = 64;

/// Owns one widget's state and its side effects.
///
/// Transitions are applied one at a time under a lock. Timers and backend
/// calls run on their own tasks and report back through [`Self::dispatch`].
#[derive(Debug)]
pub struct ChatWidgetController {
    id: String,
    settings: WidgetSettings,
    state: Mutex<WidgetState>,
    backend: Arc<dyn ChatBackend>,
    clock: Arc<dyn Clock>,
    updates: broadcast::Sender<WidgetUpdate>,
    last_activity: Mutex<Instant>,
}

impl ChatWidgetController {
    pub fn new(
        id: impl Into<String>,
        settings: WidgetSettings,
        backend: Arc<dyn ChatBackend>,
        clock: Arc<dyn Clock>,
    ) -> Arc<Self> {
        let (updates, _) = broadcast::channel(UPDATE_CHANNEL_CAPACITY);
        Arc::new(Self {
            id: id.into(),
            state: Mutex::new(WidgetState::new(&settings)),
            settings,
            backend,
            clock,
            updates,
            last_activity: Mutex::new(Instant::now()),
        })
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Subscribe to state and transcript updates.
    pub fn subscribe(&self) -> broadcast::Receiver<WidgetUpdate> {
        self.updates.subscribe()
    }

    /// Current presentation.
    pub fn view(&self) -> WidgetView {
        WidgetView::from_state(&self.lock_state())
    }

    /// True when nothing was dispatched for `idle_after` and no stream is open.
    pub fn is_idle(&self, idle_after: Duration) -> bool {
        let last = *self
            .last_activity
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        self.updates.receiver_count() == 0 && last.elapsed() >= idle_after
    }

    /// Transcript in render order.
    pub fn transcript(&self) -> Vec<Message> {
        self.lock_state().transcript().to_vec()
    }

    /// Arm the welcome popup timer.
    pub fn initialize(self: &Arc<Self>) {
        self.dispatch_infallible(WidgetEvent::Loaded);
    }

    /// Logo click.
    pub fn toggle_panel(self: &Arc<Self>) -> WidgetView {
        self.dispatch_infallible(WidgetEvent::LogoClicked)
    }

    /// Close control inside the popup.
    pub fn dismiss_popup(self: &Arc<Self>) -> WidgetView {
        self.dispatch_infallible(WidgetEvent::PopupCloseClicked)
    }

    /// Close control inside the panel.
    pub fn close_panel(self: &Arc<Self>) -> WidgetView {
        self.dispatch_infallible(WidgetEvent::PanelCloseClicked)
    }

    pub fn show_popup_on_hover(self: &Arc<Self>) -> WidgetView {
        self.dispatch_infallible(WidgetEvent::LogoHoverEntered)
    }

    pub fn hide_popup_on_hover_exit(self: &Arc<Self>) -> WidgetView {
        self.dispatch_infallible(WidgetEvent::LogoHoverExited)
    }

    /// Replace the draft and resize the compose box.
    pub fn auto_resize(
        self: &Arc<Self>,
        value: impl Into<String>,
        scroll_height: Option<u32>,
    ) -> WidgetView {
        self.dispatch_infallible(WidgetEvent::InputChanged {
            value: value.into(),
            scroll_height,
        })
    }

    /// Send the current draft.
    pub fn send_message(self: &Arc<Self>) -> Result<WidgetView, WidgetError> {
        self.dispatch(WidgetEvent::SendClicked { value: None })
    }

    /// Apply `event`, publish the resulting updates and run its effects.
    pub fn dispatch(self: &Arc<Self>, event: WidgetEvent) -> Result<WidgetView, WidgetError> {
        *self
            .last_activity
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Instant::now();

        let ctx = TransitionContext {
            since_load: self.clock.since_load(),
            settings: &self.settings,
        };

        let (view, effects) = {
            let mut state = self.lock_state();
            let before = state.transcript().len();
            let effects = transition(&mut state, event, &ctx)?;
            let view = WidgetView::from_state(&state);

            // Published under the lock so subscribers see updates in state order.
            for message in &state.transcript()[before..] {
                self.publish(WidgetUpdate::MessageAppended(RenderedMessage::from_message(
                    message,
                )));
            }
            self.publish(WidgetUpdate::State(view.clone()));
            (view, effects)
        };

        for effect in effects {
            self.run(effect);
        }

        Ok(view)
    }

    /// Dispatch an event whose transition cannot fail.
    fn dispatch_infallible(self: &Arc<Self>, event: WidgetEvent) -> WidgetView {
        match self.dispatch(event) {
            Ok(view) => view,
            Err(e) => {
                tracing::warn!(widget_id = %self.id, error = %e, "Unexpected transition error");
                self.view()
            }
        }
    }

    fn run(self: &Arc<Self>, effect: Effect) {
        match effect {
            Effect::SchedulePopup { after } => {
                let this = Arc::clone(self);
                tokio::spawn(async move {
                    tokio::time::sleep(after).await;
                    tracing::debug!(widget_id = %this.id, "Welcome popup timer elapsed");
                    this.dispatch_infallible(WidgetEvent::PopupTimerElapsed);
                });
            }
            Effect::FocusInput => {
                tracing::trace!(widget_id = %self.id, "Focusing compose box");
            }
            Effect::PostMessage { request_id, text } => {
                tracing::info!(
                    name: "widget.message.sent",
                    widget_id = %self.id,
                    request_id = %request_id,
                    length = text.len(),
                    "Message sent to chat backend"
                );
                let this = Arc::clone(self);
                tokio::spawn(async move {
                    this.exchange(request_id, &text).await;
                });
            }
            Effect::ReportFailure { request_id, error } => {
                tracing::error!(
                    name: "widget.backend.failed",
                    widget_id = %self.id,
                    request_id = %request_id,
                    error = %error,
                    "Chat backend request failed"
                );
            }
        }
    }

    /// One backend round trip; the outcome is fed back as an event.
    async fn exchange(self: &Arc<Self>, request_id: Uuid, text: &str) {
        let event = match self.backend.send(text).await {
            Ok(text) => {
                tracing::debug!(
                    widget_id = %self.id,
                    request_id = %request_id,
                    reply_length = text.len(),
                    "Chat backend replied"
                );
                WidgetEvent::ResponseReceived { request_id, text }
            }
            Err(error) => WidgetEvent::ResponseFailed { request_id, error },
        };
        self.dispatch_infallible(event);
    }

    fn publish(&self, update: WidgetUpdate) {
        // Fails only when nobody is subscribed.
        let _ = self.updates.send(update);
    }

    fn lock_state(&self) -> MutexGuard<'_, WidgetState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
