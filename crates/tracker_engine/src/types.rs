use std::fmt;

use tracker_core::JobKind;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct BackendError {
    pub kind: FailureKind,
    pub message: String,
}

impl BackendError {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Job id carried by a timed-out start call, when the backend reported one.
    pub fn timeout_job_id(&self) -> Option<&str> {
        match &self.kind {
            FailureKind::Timeout { job_id } => job_id.as_deref(),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    /// The call gave up without a definitive answer. The server may still
    /// have accepted the job, in which case `job_id` is set.
    Timeout { job_id: Option<String> },
    HttpStatus(u16),
    Network,
    Decode,
    InvalidRequest,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::Timeout { job_id: Some(job_id) } => write!(f, "timeout (job id {job_id})"),
            FailureKind::Timeout { job_id: None } => write!(f, "timeout"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Network => write!(f, "network error"),
            FailureKind::Decode => write!(f, "malformed response"),
            FailureKind::InvalidRequest => write!(f, "invalid request"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LaunchError {
    #[error("a job is already launching or running")]
    AlreadyActive,
    #[error("{kind} jobs require a start/end range")]
    MissingRange { kind: JobKind },
    #[error("invalid range {start}..={end}")]
    InvalidRange { start: i64, end: i64 },
    #[error("start request failed: {0}")]
    Backend(#[from] BackendError),
}
