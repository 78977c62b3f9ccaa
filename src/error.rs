//! Error taxonomy shared by the config store, resolver, dispatcher and archiver

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, RequesterError>;

#[derive(Debug, Error)]
pub enum RequesterError {
    #[error("Malformed configuration in {path}: {message}")]
    ConfigMalformed { path: PathBuf, message: String },

    #[error("Namespace '{0}' not found")]
    NamespaceNotFound(String),

    #[error("Mode '{mode}' is not defined in namespace '{namespace}' (available: {available})")]
    ModeUnsupported {
        mode: String,
        namespace: String,
        available: String,
    },

    #[error("Invalid request type '{0}'")]
    RequestNotFound(String),

    #[error("Unsupported HTTP method '{0}'")]
    UnsupportedMethod(String),

    /// Resolved call that cannot go on the wire (bad base URL, header name or value)
    #[error("Request '{request}' cannot be sent: {message}")]
    InvalidRequest { request: String, message: String },

    #[error("Connection failed: {0}")]
    ConnectionFailure(String),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl RequesterError {
    /// Startup errors end the process; everything else is reported and the loop goes on.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            RequesterError::ConfigMalformed { .. }
                | RequesterError::NamespaceNotFound(_)
                | RequesterError::ModeUnsupported { .. }
        )
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        RequesterError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn malformed(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        RequesterError::ConfigMalformed {
            path: path.into(),
            message: message.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatality_split() {
        assert!(RequesterError::NamespaceNotFound("x".into()).is_fatal());
        assert!(RequesterError::malformed("a.yaml", "bad").is_fatal());
        assert!(!RequesterError::RequestNotFound("x".into()).is_fatal());
        assert!(!RequesterError::UnsupportedMethod("TRACE".into()).is_fatal());
        assert!(!RequesterError::ConnectionFailure("refused".into()).is_fatal());
        assert!(!RequesterError::InvalidRequest {
            request: "list".into(),
            message: "bad url".into()
        }
        .is_fatal());
    }
}
