use std::fs;
use std::path::{Path, PathBuf};

use crate::constants::NAMESPACE_EXTENSIONS;
use crate::error::{RequesterError, Result};
use crate::models::Namespace;

/// Reads namespace documents from a directory of YAML/JSON files
#[derive(Clone, Debug)]
pub struct ConfigStore {
    namespaces_dir: PathBuf,
}

impl ConfigStore {
    pub fn new(namespaces_dir: impl Into<PathBuf>) -> Self {
        ConfigStore {
            namespaces_dir: namespaces_dir.into(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.namespaces_dir
    }

    /// Sorted namespace identifiers, without example/template documents
    pub fn list_namespaces(&self) -> Result<Vec<String>> {
        let mut names: Vec<String> = self.documents()?.into_iter().map(|(name, _)| name).collect();
        names.sort();
        names.dedup();
        Ok(names)
    }

    /// Load and validate one namespace document
    pub fn load_namespace(&self, name: &str) -> Result<Namespace> {
        let path = self
            .documents()?
            .into_iter()
            .find(|(n, _)| n == name)
            .map(|(_, p)| p)
            .ok_or_else(|| RequesterError::NamespaceNotFound(name.to_string()))?;

        let content = fs::read_to_string(&path).map_err(|e| RequesterError::io(&path, e))?;
        // JSON is valid YAML, so one parser covers every extension
        let mut namespace: Namespace =
            serde_yaml::from_str(&content).map_err(|e| RequesterError::malformed(&path, e))?;
        namespace.name = name.to_string();

        if namespace.url_by_mode.is_empty() {
            return Err(RequesterError::malformed(&path, "urlByMode is empty"));
        }

        tracing::debug!(
            namespace = name,
            path = %path.display(),
            requests = namespace.requests.len(),
            "Loaded namespace"
        );
        Ok(namespace)
    }

    /// (identifier, path) for every candidate document. When the same stem exists with
    /// several extensions the first in `NAMESPACE_EXTENSIONS` order is used.
    fn documents(&self) -> Result<Vec<(String, PathBuf)>> {
        if !self.namespaces_dir.exists() {
            return Ok(Vec::new());
        }

        let entries = fs::read_dir(&self.namespaces_dir)
            .map_err(|e| RequesterError::io(&self.namespaces_dir, e))?;

        let mut docs: Vec<(String, PathBuf, usize)> = Vec::new();
        for entry in entries {
            let path = entry.map_err(|e| RequesterError::io(&self.namespaces_dir, e))?.path();
            if !path.is_file() {
                continue;
            }
            let (Some(stem), Some(ext)) = (
                path.file_stem().and_then(|s| s.to_str()),
                path.extension().and_then(|e| e.to_str()),
            ) else {
                continue;
            };
            let Some(rank) = NAMESPACE_EXTENSIONS
                .iter()
                .position(|e| e.eq_ignore_ascii_case(ext))
            else {
                continue;
            };
            if is_example(stem) {
                continue;
            }
            docs.push((stem.to_string(), path, rank));
        }

        docs.sort_by(|a, b| a.0.cmp(&b.0).then(a.2.cmp(&b.2)));
        docs.dedup_by(|later, earlier| later.0 == earlier.0);
        Ok(docs.into_iter().map(|(name, path, _)| (name, path)).collect())
    }
}

/// Example and template documents ship alongside real ones but are never loaded
fn is_example(stem: &str) -> bool {
    let lower = stem.to_ascii_lowercase();
    ["example", "template"].iter().any(|marker| {
        lower == *marker
            || lower.ends_with(&format!(".{}", marker))
            || lower.ends_with(&format!("_{}", marker))
    })
}
