//! Session state - the loaded namespace plus everything needed to run a request

use std::time::Duration;

use crate::archive::ResponseArchiver;
use crate::error::{RequesterError, Result};
use crate::messages::MenuEntry;
use crate::models::{CallOutcome, Namespace, ResolvedCall};
use crate::network::Dispatcher;
use crate::resolver::{self, DEFAULT_METHOD};
use crate::settings::Settings;
use crate::storage::ConfigStore;

/// Exactly one per process. Reload swaps `namespace` as a whole.
pub struct Session {
    store: ConfigStore,
    namespace: Namespace,
    mode: String,
    live_reload: bool,
    dispatcher: Dispatcher,
    archiver: ResponseArchiver,
}

impl Session {
    pub fn new(
        store: ConfigStore,
        namespace: &str,
        mode: impl Into<String>,
        live_reload: bool,
        dispatcher: Dispatcher,
        archiver: ResponseArchiver,
    ) -> Result<Self> {
        let mode = mode.into();
        let namespace = store.load_namespace(namespace)?;
        resolver::check_mode(&namespace, &mode)?;

        tracing::info!(namespace = %namespace.name, %mode, live_reload, "Session started");
        Ok(Session {
            store,
            namespace,
            mode,
            live_reload,
            dispatcher,
            archiver,
        })
    }

    /// Build a session from effective settings for the chosen namespace
    pub fn from_settings(settings: &Settings, namespace: &str) -> Result<Self> {
        Self::new(
            ConfigStore::new(settings.namespaces_dir()),
            namespace,
            settings.mode.clone(),
            settings.live_reload,
            Dispatcher::new(settings.timeout_secs.map(Duration::from_secs)),
            ResponseArchiver::new(&settings.responses_dir, settings.content_only),
        )
    }

    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    pub fn mode(&self) -> &str {
        &self.mode
    }

    pub fn live_reload(&self) -> bool {
        self.live_reload
    }

    /// Re-read the namespace document. On any failure the current namespace stays active.
    pub fn reload(&mut self) -> Result<()> {
        let fresh = self.store.load_namespace(&self.namespace.name)?;
        resolver::check_mode(&fresh, &self.mode)?;
        tracing::info!(
            namespace = %fresh.name,
            requests = fresh.requests.len(),
            "Namespace reloaded"
        );
        self.namespace = fresh;
        Ok(())
    }

    /// Rows of the mode-filtered menu, numbered from 1
    pub fn menu(&self) -> Vec<MenuEntry> {
        resolver::menu(&self.namespace, &self.mode)
            .into_iter()
            .enumerate()
            .map(|(i, (name, template))| {
                let merged = match &self.namespace.common {
                    Some(common) => resolver::overlay(template, common),
                    None => template.clone(),
                };
                let method = merged
                    .method
                    .map(|m| m.to_uppercase())
                    .unwrap_or_else(|| DEFAULT_METHOD.to_string());
                let path = resolver::compose_url("", &merged.endpoint, merged.action.as_deref(), merged.id.as_deref());
                MenuEntry {
                    index: i + 1,
                    name: name.to_string(),
                    method,
                    path: path.trim_start_matches('/').to_string(),
                }
            })
            .collect()
    }

    /// Request name behind a 1-based menu number
    pub fn request_at(&self, index: usize) -> Option<String> {
        let menu = resolver::menu(&self.namespace, &self.mode);
        index
            .checked_sub(1)
            .and_then(|i| menu.get(i))
            .map(|(name, _)| name.to_string())
    }

    /// Resolve, dispatch and archive one request.
    /// Nothing is written when the call fails before a response arrives.
    pub async fn execute(&mut self, name: &str) -> Result<CallOutcome> {
        let call = self.prepare(name)?;
        self.send(&call).await
    }

    /// Reload when live reload is on, then resolve `name` against the active namespace
    pub fn prepare(&mut self, name: &str) -> Result<ResolvedCall> {
        if self.live_reload {
            self.reload()?;
        }
        resolver::resolve(&self.namespace, &self.mode, name)
    }

    /// Dispatch a prepared call and archive its response
    pub async fn send(&self, call: &ResolvedCall) -> Result<CallOutcome> {
        let (response, elapsed_ms) = self.dispatcher.dispatch(call).await?;
        let archived = self.archiver.persist(&self.namespace.name, &call.name, &response)?;

        Ok(CallOutcome {
            request: call.name.clone(),
            status: response.status,
            reason: response.reason,
            elapsed_ms,
            kind: archived.kind,
            path: archived.path,
            decode_warning: archived.decode_warning,
        })
    }

    /// Remove archived responses of the active namespace
    pub fn clear_responses(&self) -> Result<usize> {
        self.archiver.clear(&self.namespace.name)
    }

    pub(crate) fn unknown_selection(&self, index: usize) -> RequesterError {
        RequesterError::RequestNotFound(format!("#{}", index))
    }
}
