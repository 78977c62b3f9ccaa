//! Command handlers - map operator events onto session operations

use crate::app::Session;
use crate::error::Result;
use crate::messages::{Feedback, UiEvent};
use crate::models::{CallOutcome, ResolvedCall};

impl Session {
    /// Process one event. Every failure comes back as `Feedback::Failed`;
    /// nothing here ends the loop except `Quit`.
    /// `on_send` sees each resolved call right before it goes out.
    pub async fn handle_event(&mut self, event: UiEvent, on_send: impl FnMut(&ResolvedCall)) -> Feedback {
        match event {
            UiEvent::Select(index) => {
                let Some(name) = self.request_at(index) else {
                    return Feedback::Failed {
                        request: None,
                        error: self.unknown_selection(index),
                    };
                };
                match self.run_selected(&name, on_send).await {
                    Ok(outcome) => Feedback::Completed(outcome),
                    Err(error) => {
                        tracing::warn!(request = %name, %error, "Request not completed");
                        Feedback::Failed {
                            request: Some(name),
                            error,
                        }
                    }
                }
            }
            UiEvent::Reload => match self.reload() {
                Ok(()) => Feedback::Reloaded {
                    requests: self.menu().len(),
                },
                Err(error) => Feedback::Failed { request: None, error },
            },
            UiEvent::ClearResponses => match self.clear_responses() {
                Ok(removed) => Feedback::Cleared { removed },
                Err(error) => Feedback::Failed { request: None, error },
            },
            UiEvent::ShowHelp => Feedback::Help,
            UiEvent::Redraw => Feedback::Menu,
            UiEvent::Invalid(input) => Feedback::Invalid(input),
            UiEvent::Quit => Feedback::Quit,
        }
    }

    async fn run_selected(&mut self, name: &str, mut on_send: impl FnMut(&ResolvedCall)) -> Result<CallOutcome> {
        let call = self.prepare(name)?;
        on_send(&call);
        self.send(&call).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::ResponseArchiver;
    use crate::error::RequesterError;
    use crate::network::test_server::{local_dispatcher, serve_once};
    use crate::storage::ConfigStore;
    use std::fs;

    fn ignore(_: &ResolvedCall) {}
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_select_clear_and_bad_index() {
        let dir = tempdir().unwrap();
        let server = serve_once(404, "text/plain", b"missing".to_vec()).await;
        fs::write(
            dir.path().join("api.yaml"),
            format!(
                "urlByMode:\n  LOCAL: {}\nrequests:\n  fetch:\n    method: GET\n    endpoint: things\n    id: 9\n",
                server.base_url
            ),
        )
        .unwrap();
        let mut session = Session::new(
            ConfigStore::new(dir.path()),
            "api",
            "LOCAL",
            false,
            local_dispatcher(),
            ResponseArchiver::new(dir.path().join("out"), true),
        )
        .unwrap();

        let mut announced = Vec::new();
        match session
            .handle_event(UiEvent::Select(1), |call| announced.push(call.url.clone()))
            .await
        {
            Feedback::Completed(outcome) => {
                assert_eq!(outcome.status, 404);
                assert!(!outcome.is_success());
                assert!(outcome.decode_warning.is_some());
            }
            other => panic!("unexpected feedback: {:?}", other),
        }
        assert_eq!(announced, vec![format!("{}/things/9", server.base_url)]);

        match session.handle_event(UiEvent::Select(5), ignore).await {
            Feedback::Failed { request: None, error } => {
                assert!(matches!(error, RequesterError::RequestNotFound(_)))
            }
            other => panic!("unexpected feedback: {:?}", other),
        }

        assert!(matches!(
            session.handle_event(UiEvent::ClearResponses, ignore).await,
            Feedback::Cleared { removed: 1 }
        ));
        assert!(matches!(
            session.handle_event(UiEvent::Reload, ignore).await,
            Feedback::Reloaded { requests: 1 }
        ));
        assert!(matches!(session.handle_event(UiEvent::Quit, ignore).await, Feedback::Quit));
    }
}
