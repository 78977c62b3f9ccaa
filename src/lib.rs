//! # Requester
//!
//! An interactive terminal tool for firing named HTTP requests against a
//! chosen environment and archiving every response to disk.
//!
//! ## Features
//! - Namespaces of request templates in YAML or JSON files
//! - Per-mode base URLs (PROD / DEV / LOCAL or any custom key)
//! - `common` defaults merged into every request
//! - Basic auth, query parameters, JSON bodies
//! - Responses archived per namespace, PDF kept byte for byte
//! - Live reload of the namespace file while the tool runs
//!
//! ## Architecture
//! Leaf-first:
//! - Config Store (`storage`) - namespace discovery and loading
//! - Resolver (`resolver`) - template + common + mode → concrete call
//! - Dispatcher (`network`) - one HTTP round trip, timed
//! - Archiver (`archive`) - response → file, shaped by content type
//! - Session (`app`) - owns the loaded namespace, reload, event handling

pub mod constants;
pub mod error;
pub mod models;
pub mod settings;
pub mod storage;
pub mod resolver;
pub mod network;
pub mod archive;
pub mod messages;
pub mod app;
pub mod ui;

// Re-export commonly used types
pub use error::{RequesterError, Result};
pub use models::{CallOutcome, ContentKind, HttpMethod, Namespace, RequestTemplate, ResolvedCall};
pub use storage::ConfigStore;
pub use resolver::resolve;
pub use network::Dispatcher;
pub use archive::ResponseArchiver;
pub use messages::{Feedback, MenuEntry, UiEvent};
pub use app::Session;
pub use settings::{Cli, Settings};
