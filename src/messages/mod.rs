//! Message types between the operator loop and the session.
//!
//! Input lines become `UiEvent`s; the session answers with `Feedback` and
//! exposes the menu as `MenuEntry` rows for the view to draw.

pub mod ui_events;
pub mod render;

pub use ui_events::{parse_input, UiEvent};
pub use render::{Feedback, MenuEntry};
