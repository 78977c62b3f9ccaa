//! App layer - session state and command processing
//!
//! `Session` owns the loaded namespace and the collaborators that resolve,
//! dispatch and archive a request. It is driven one event at a time.

pub mod state;
pub mod commands;

pub use state::Session;
