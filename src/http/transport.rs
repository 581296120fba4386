use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use url::Url;

use crate::error::RelayError;
use crate::form::serialize::FormPayload;
use crate::http::outcome::RequestOutcome;

pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded; charset=UTF-8";

// ============================================================================
// Transport trait: the seam between the interceptor and the network
// ============================================================================

/// Sends a serialized form to its action URL. Called from worker threads,
/// one call per click; implementations never retry.
pub trait Transport: Send + Sync {
    fn post_form(&self, url: &Url, payload: &FormPayload) -> RequestOutcome;
}

// ============================================================================
// HTTP backend (reqwest blocking)
// ============================================================================

pub struct HttpTransport {
    client: reqwest::blocking::Client,
}

impl HttpTransport {
    /// `timeout == None` leaves requests unbounded.
    pub fn new(timeout: Option<Duration>) -> Result<Self, RelayError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(RelayError::HttpClient)?;
        Ok(HttpTransport { client })
    }
}

impl Transport for HttpTransport {
    fn post_form(&self, url: &Url, payload: &FormPayload) -> RequestOutcome {
        let response = match self
            .client
            .post(url.as_str())
            .header(CONTENT_TYPE, FORM_CONTENT_TYPE)
            .body(payload.encode())
            .send()
        {
            Ok(r) => r,
            Err(e) => {
                log::warn!("POST {} failed: {}", url, e);
                return RequestOutcome::transport_failure(e);
            }
        };

        let status = response.status().as_u16();
        match response.text() {
            Ok(body) => RequestOutcome::from_status(status, body),
            Err(e) => {
                log::warn!("POST {} returned {} but the body could not be read: {}", url, status, e);
                RequestOutcome::Failure {
                    status: Some(status),
                    body: String::new(),
                    reason: Some(e.to_string()),
                }
            }
        }
    }
}

// ============================================================================
// Scripted backend (for testing without a server)
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub url: String,
    pub body: String,
}

/// Replays queued outcomes in order and records every request it receives.
/// Once the queue is empty every request fails as if the server were down.
#[derive(Default)]
pub struct ScriptedTransport {
    responses: Mutex<VecDeque<RequestOutcome>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(self, outcome: RequestOutcome) -> Self {
        if let Ok(mut queue) = self.responses.lock() {
            queue.push_back(outcome);
        }
        self
    }

    pub fn respond_ok(self, body: &str) -> Self {
        self.respond(RequestOutcome::from_status(200, body.to_string()))
    }

    pub fn respond_status(self, status: u16, body: &str) -> Self {
        self.respond(RequestOutcome::from_status(status, body.to_string()))
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }
}

impl Transport for ScriptedTransport {
    fn post_form(&self, url: &Url, payload: &FormPayload) -> RequestOutcome {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(RecordedRequest {
                url: url.to_string(),
                body: payload.encode(),
            });
        }

        self.responses
            .lock()
            .ok()
            .and_then(|mut queue| queue.pop_front())
            .unwrap_or_else(|| RequestOutcome::transport_failure("no scripted response"))
    }
}
