//! Rendering of widget state into HTML and browser updates.
//!
//! # Structure
//!
//! - [`view`]: class flags, message markup and SSE updates derived from state
//! - [`page`]: page shell and widget DOM contract

pub mod page;
pub mod view;

pub use page::{html_shell, render_widget};
pub use view::{RenderedMessage, WidgetUpdate, WidgetView, sse_event};
