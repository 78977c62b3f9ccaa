//! Response archiver - writes each response to `<root>/<namespace>/<request>_<timestamp>.<ext>`

use chrono::{DateTime, Local};
use serde_json::{json, Map, Value};
use std::fs;
use std::path::{Path, PathBuf};

use crate::constants::TIMESTAMP_FORMAT;
use crate::error::{RequesterError, Result};
use crate::models::{ContentKind, RawResponse};

/// Where and how a response ended up on disk
#[derive(Clone, Debug)]
pub struct Archived {
    pub path: PathBuf,
    pub kind: ContentKind,
    pub decode_warning: Option<String>,
}

pub struct ResponseArchiver {
    root: PathBuf,
    content_only: bool,
}

impl ResponseArchiver {
    pub fn new(root: impl Into<PathBuf>, content_only: bool) -> Self {
        ResponseArchiver {
            root: root.into(),
            content_only,
        }
    }

    pub fn namespace_dir(&self, namespace: &str) -> PathBuf {
        self.root.join(namespace)
    }

    pub fn persist(&self, namespace: &str, request: &str, response: &RawResponse) -> Result<Archived> {
        self.persist_at(namespace, request, response, Local::now())
    }

    /// Same-second writes for one request share a name; the later one replaces the earlier.
    pub fn persist_at(
        &self,
        namespace: &str,
        request: &str,
        response: &RawResponse,
        now: DateTime<Local>,
    ) -> Result<Archived> {
        let (kind, bytes, decode_warning) = if response.content_type().as_deref() == Some("application/pdf") {
            (ContentKind::Pdf, response.body.clone(), None)
        } else {
            let (kind, content, warning) = decode_body(&response.body);
            let document = if self.content_only {
                content
            } else {
                envelope(response, content)
            };
            let text = serde_json::to_string_pretty(&document)
                .map_err(|e| RequesterError::io(&self.root, std::io::Error::new(std::io::ErrorKind::InvalidData, e)))?;
            (kind, text.into_bytes(), warning)
        };

        if let Some(warning) = &decode_warning {
            tracing::warn!(namespace, request, "{}", warning);
        }

        let dir = self.namespace_dir(namespace);
        ensure_dir(&dir)?;
        let path = dir.join(format!(
            "{}_{}.{}",
            file_stem(request),
            now.format(TIMESTAMP_FORMAT),
            kind.extension()
        ));
        fs::write(&path, bytes).map_err(|e| RequesterError::io(&path, e))?;

        tracing::info!(namespace, request, path = %path.display(), "Archived response");
        Ok(Archived {
            path,
            kind,
            decode_warning,
        })
    }

    /// Delete every archived file for the namespace; returns how many went
    pub fn clear(&self, namespace: &str) -> Result<usize> {
        let dir = self.namespace_dir(namespace);
        if !dir.exists() {
            return Ok(0);
        }

        let mut removed = 0;
        for entry in fs::read_dir(&dir).map_err(|e| RequesterError::io(&dir, e))? {
            let path = entry.map_err(|e| RequesterError::io(&dir, e))?.path();
            if path.is_file() {
                fs::remove_file(&path).map_err(|e| RequesterError::io(&path, e))?;
                removed += 1;
            }
        }
        tracing::info!(namespace, removed, "Cleared archived responses");
        Ok(removed)
    }
}

/// Request name as a single file-name component: separators and `..` become `_`
fn file_stem(request: &str) -> String {
    let flat: String = request
        .chars()
        .map(|c| if matches!(c, '/' | '\\' | ':') || c.is_control() { '_' } else { c })
        .collect();
    flat.replace("..", "_")
}

fn ensure_dir(dir: &Path) -> Result<()> {
    if !dir.exists() {
        fs::create_dir_all(dir).map_err(|e| RequesterError::io(dir, e))?;
    }
    Ok(())
}

/// Parse the body as JSON, falling back to the raw text as a JSON string.
/// An empty body is stored as `null`.
fn decode_body(body: &[u8]) -> (ContentKind, Value, Option<String>) {
    if body.iter().all(u8::is_ascii_whitespace) {
        return (ContentKind::Json, Value::Null, None);
    }
    match serde_json::from_slice::<Value>(body) {
        Ok(value) => (ContentKind::Json, value, None),
        Err(e) => (
            ContentKind::Other,
            Value::String(String::from_utf8_lossy(body).into_owned()),
            Some(format!("Response is not valid JSON ({}), saved as text", e)),
        ),
    }
}

fn envelope(response: &RawResponse, content: Value) -> Value {
    let mut headers = Map::new();
    for (key, value) in &response.headers {
        let merged = match headers.remove(key) {
            Some(Value::String(prev)) => format!("{}, {}", prev, value),
            _ => value.clone(),
        };
        headers.insert(key.clone(), Value::String(merged));
    }
    json!({
        "status": response.status,
        "reason": response.reason,
        "headers": headers,
        "content": content,
    })
}
