use crate::CheckpointId;

/// Terminal failure surfaced once through the error callback.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum JobFailure {
    /// The backend has no record of the job: expired past its retention
    /// window, or the id was never valid.
    #[error("job not found")]
    NotFound,
    #[error("{}", describe_job_failure(.message, .checkpoint.as_ref()))]
    JobFailed {
        message: String,
        checkpoint: Option<CheckpointId>,
    },
    #[error("status polling failed {attempts} times in a row, last error: {last_error}")]
    PollingExhausted { attempts: u32, last_error: String },
    #[error("job launch failed: {message}")]
    LaunchFailed { message: String },
}

impl JobFailure {
    /// Checkpoint a restart can resume from, if the backend reported one.
    pub fn checkpoint(&self) -> Option<&CheckpointId> {
        match self {
            JobFailure::JobFailed { checkpoint, .. } => checkpoint.as_ref(),
            _ => None,
        }
    }
}

pub(crate) fn describe_job_failure(message: &str, checkpoint: Option<&CheckpointId>) -> String {
    match checkpoint {
        Some(checkpoint) => format!("{message} (last processed position: {checkpoint})"),
        None => message.to_string(),
    }
}
