//! Render data - plain structures the view layer draws

use crate::error::RequesterError;
use crate::models::CallOutcome;

/// One selectable row of the request menu
#[derive(Debug, Clone, PartialEq)]
pub struct MenuEntry {
    /// 1-based selection number
    pub index: usize,
    pub name: String,
    /// Method label as configured (may be unsupported; resolution reports that)
    pub method: String,
    /// Path after the base URL, e.g. `users/activate/42`
    pub path: String,
}

/// Session answer to one `UiEvent`
#[derive(Debug)]
pub enum Feedback {
    Completed(CallOutcome),
    Failed {
        request: Option<String>,
        error: RequesterError,
    },
    Reloaded { requests: usize },
    Cleared { removed: usize },
    Menu,
    Help,
    Invalid(String),
    Quit,
}
