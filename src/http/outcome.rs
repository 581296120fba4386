/// Result of one form POST. Exactly one variant is produced per click.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestOutcome {
    /// The server answered with a 2xx status
    Success { status: u16, body: String },

    /// Non-2xx status, or no response at all (`status == None`)
    Failure {
        status: Option<u16>,
        body: String,
        reason: Option<String>,
    },
}

impl RequestOutcome {
    pub fn from_status(status: u16, body: String) -> Self {
        if (200..300).contains(&status) {
            RequestOutcome::Success { status, body }
        } else {
            RequestOutcome::Failure {
                status: Some(status),
                body,
                reason: None,
            }
        }
    }

    /// A request that never produced a response. There is no response text,
    /// so the body is empty.
    pub fn transport_failure(reason: impl ToString) -> Self {
        RequestOutcome::Failure {
            status: None,
            body: String::new(),
            reason: Some(reason.to_string()),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, RequestOutcome::Success { .. })
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            RequestOutcome::Success { status, .. } => Some(*status),
            RequestOutcome::Failure { status, .. } => *status,
        }
    }

    pub fn body(&self) -> &str {
        match self {
            RequestOutcome::Success { body, .. } | RequestOutcome::Failure { body, .. } => body,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            RequestOutcome::Success { .. } => "success",
            RequestOutcome::Failure { .. } => "failure",
        }
    }
}
