use serde::{Deserialize, Serialize};
use sha1::{Digest, Sha1};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::http::outcome::RequestOutcome;

/// One line of the relay trace: a completed click cycle.
///
/// Field values never appear here; the request body is recorded only as a
/// SHA-1 digest so repeated submissions can still be correlated.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TraceEvent {
    pub timestamp_ms: u128,
    pub form: String,
    pub action: String,

    /// `success`, `failure` or `malformed`
    pub outcome: String,
    pub status: Option<u16>,
    pub body_len: usize,
    pub payload_sha1: String,

    pub rendered: bool,
    pub detail: Option<String>,
}

impl TraceEvent {
    pub fn now(form: &str, action: &str, encoded_payload: &str) -> Self {
        Self {
            timestamp_ms: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_millis())
                .unwrap_or(0),
            form: form.to_string(),
            action: action.to_string(),
            outcome: String::new(),
            status: None,
            body_len: 0,
            payload_sha1: payload_digest(encoded_payload),
            rendered: false,
            detail: None,
        }
    }

    pub fn with_outcome(mut self, outcome: &RequestOutcome) -> Self {
        self.outcome = outcome.kind().to_string();
        self.status = outcome.status();
        self.body_len = outcome.body().len();
        if let RequestOutcome::Failure { reason: Some(reason), .. } = outcome {
            self.detail = Some(reason.clone());
        }
        self
    }

    pub fn malformed(mut self, detail: impl ToString) -> Self {
        self.outcome = "malformed".to_string();
        self.detail = Some(detail.to_string());
        self
    }

    pub fn rendered(mut self, rendered: bool) -> Self {
        self.rendered = rendered;
        self
    }
}

pub fn payload_digest(encoded_payload: &str) -> String {
    format!("{:x}", Sha1::digest(encoded_payload.as_bytes()))
}
