//! Application constants
//!
//! Centralized location for file names and configuration defaults.

/// Directory under the user's home holding all requester files
pub const HOME_DIR_NAME: &str = ".requester";

/// Environment variable overriding the configuration home
pub const HOME_ENV: &str = "REQUESTER_HOME";

pub const SETTINGS_FILE: &str = "settings.yaml";
pub const NAMESPACES_DIR: &str = "namespaces";
pub const RESPONSES_DIR: &str = "responses";
pub const LOG_FILE: &str = "requester.log";

/// Extensions recognised as namespace documents
pub const NAMESPACE_EXTENSIONS: [&str; 3] = ["yaml", "yml", "json"];

/// Archive file timestamp, second resolution and lexically sortable
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

/// Elapsed-time thresholds for the outcome line (milliseconds)
pub const SLOW_MS: u64 = 2000;
pub const VERY_SLOW_MS: u64 = 5000;

/// Application name
pub const APP_NAME: &str = "Requester";

/// Application version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");
