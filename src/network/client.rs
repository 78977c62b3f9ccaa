//! HTTP client wrapper - executes resolved calls and captures raw responses

use std::error::Error as _;
use std::time::{Duration, Instant};
use base64::Engine;

use crate::error::{RequesterError, Result};
use crate::models::{AuthType, RawResponse, ResolvedCall};

/// Build a request from a resolved call
fn build_request(client: &reqwest::Client, call: &ResolvedCall) -> reqwest::RequestBuilder {
    let mut req_builder = client.request(call.method.into(), &call.url);

    // Add headers
    for (key, value) in &call.headers {
        req_builder = req_builder.header(key, value);
    }

    if !call.query.is_empty() {
        req_builder = req_builder.query(&call.query);
    }

    // Add auth
    match &call.auth {
        AuthType::Basic { username, password } => {
            let credentials = format!("{}:{}", username, password.as_deref().unwrap_or_default());
            let encoded = base64::engine::general_purpose::STANDARD.encode(credentials);
            req_builder = req_builder.header("Authorization", format!("Basic {}", encoded));
        }
        AuthType::None => {}
    }

    // Resolver already dropped bodies for GET/DELETE/HEAD/OPTIONS
    if let Some(body) = &call.body {
        req_builder = req_builder.json(body);
    }

    req_builder
}

/// Transport error text including its cause chain
fn describe(e: &reqwest::Error) -> String {
    let mut msg = if e.is_timeout() {
        format!("request timed out: {}", e)
    } else {
        e.to_string()
    };
    let mut source = e.source();
    while let Some(cause) = source {
        msg.push_str(": ");
        msg.push_str(&cause.to_string());
        source = cause.source();
    }
    msg
}

/// Executes resolved calls one at a time
#[derive(Clone, Debug)]
pub struct Dispatcher {
    client: reqwest::Client,
}

impl Dispatcher {
    pub fn new(timeout: Option<Duration>) -> Self {
        Dispatcher {
            client: create_client(timeout),
        }
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Dispatcher { client }
    }

    /// Send the call and read the whole response. Returns the response and the
    /// wall-clock milliseconds from send to last body byte.
    pub async fn dispatch(&self, call: &ResolvedCall) -> Result<(RawResponse, u64)> {
        tracing::info!(request = %call.name, method = %call.method, url = %call.url, "Executing request");

        let start = Instant::now();
        let resp = build_request(&self.client, call).send().await.map_err(|e| {
            tracing::warn!(request = %call.name, error = %e, "Request failed");
            if e.is_builder() {
                RequesterError::InvalidRequest {
                    request: call.name.clone(),
                    message: describe(&e),
                }
            } else {
                RequesterError::ConnectionFailure(describe(&e))
            }
        })?;

        let status = resp.status();
        let headers = resp
            .headers()
            .iter()
            .map(|(k, v)| (k.as_str().to_string(), String::from_utf8_lossy(v.as_bytes()).into_owned()))
            .collect();
        let body = resp
            .bytes()
            .await
            .map_err(|e| RequesterError::ConnectionFailure(format!("Error reading body: {}", describe(&e))))?;
        let elapsed = start.elapsed().as_millis() as u64;

        tracing::info!(request = %call.name, status = status.as_u16(), elapsed_ms = elapsed, "Request completed");

        Ok((
            RawResponse {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or_default().to_string(),
                headers,
                body: body.to_vec(),
            },
            elapsed,
        ))
    }
}

/// Create an HTTP client. No timeout unless one is configured.
pub fn create_client(timeout: Option<Duration>) -> reqwest::Client {
    let mut builder = reqwest::Client::builder();
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }
    builder.build().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Falling back to default HTTP client");
        reqwest::Client::new()
    })
}
