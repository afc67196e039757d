//! Chat Widget
//!
//! A floating chat widget: a logo that toggles a chat panel, a welcome popup
//! shown on a timer and on hover, and a message loop that posts user text to
//! a chat backend and renders the reply.
//!
//! # Architecture
//!
//! - **Widget core**: explicit state, events and a pure transition function
//! - **Controller**: runs timers and backend calls, publishes updates
//! - **Server**: Axum host serving the widget page, event intake and SSE
//! - **UI**: HTML and class flags derived from state
//!
//! # Modules
//!
//! - [`widget`]: state, transitions, formatting and the controller
//! - [`backend`]: chat backend client
//! - [`ui`]: rendering of state into markup and updates
//! - [`server`]: HTTP routes
//! - [`config`]: layered configuration

// Allow pedantic clippy warnings that don't add value for this codebase
#![allow(clippy::missing_fields_in_debug)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::unused_async)]

pub mod backend;
pub mod config;
pub mod server;
pub mod telemetry;
pub mod ui;
pub mod widget;

use crate::config::AppConfig;
use std::sync::Arc;
use widget::WidgetStore;

/// Application state shared across all handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Live widgets, one per page load.
    pub widgets: WidgetStore,
    /// Global Configuration
    pub config: Arc<AppConfig>,
}
