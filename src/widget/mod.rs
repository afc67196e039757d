//! Chat widget core.
//!
//! State lives in an explicit [`WidgetState`] value. Every DOM event, timer
//! and backend outcome is a [`WidgetEvent`] applied by the pure
//! [`transition`] function, which returns [`Effect`]s for the
//! [`ChatWidgetController`] to execute.
//!
//! # Example
//!
//! ```rust
//! use chat_widget::widget::{
//!     TransitionContext, WidgetEvent, WidgetSettings, WidgetState, transition,
//! };
//! use std::time::Duration;
//!
//! let settings = WidgetSettings::default();
//! let mut state = WidgetState::new(&settings);
//! let ctx = TransitionContext { since_load: Duration::ZERO, settings: &settings };
//!
//! transition(&mut state, WidgetEvent::LogoClicked, &ctx).unwrap();
//! assert!(state.panel_open);
//! assert!(state.input_focused);
//! ```

pub mod clock;
pub mod compose;
pub mod controller;
pub mod effect;
pub mod error;
pub mod event;
pub mod format;
pub mod state;
pub mod store;
pub mod transition;

pub use clock::{Clock, ManualClock, MonotonicClock};
pub use compose::{Draft, InputMetrics};
pub use controller::ChatWidgetController;
pub use effect::Effect;
pub use error::{IgnoreReason, WidgetError};
pub use event::{UiEvent, WidgetEvent};
pub use state::{DEFAULT_FALLBACK_MESSAGE, Message, Origin, WidgetSettings, WidgetState};
pub use store::WidgetStore;
pub use transition::{TransitionContext, transition};
