use crate::failure::describe_job_failure;
use crate::{ClientJobState, JobFailure, JobStatus, JobStatusSnapshot, Lifecycle};

/// What a status report did to the lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// Still running; keep polling.
    Continue,
    Completed(JobStatusSnapshot),
    Failed(JobFailure),
}

/// Applies one status report to `state`.
///
/// `None` is the backend's "not found" answer and is terminal: the record
/// expired or never existed. It is not treated as a transient failure.
pub fn apply_status(state: &mut ClientJobState, snapshot: Option<JobStatusSnapshot>) -> Transition {
    let Some(snapshot) = snapshot else {
        let failure = JobFailure::NotFound;
        state.lifecycle = Lifecycle::Failed;
        state.error_message = Some(failure.to_string());
        return Transition::Failed(failure);
    };

    let transition = match snapshot.status {
        JobStatus::Completed => {
            state.lifecycle = Lifecycle::Completed;
            state.error_message = None;
            Transition::Completed(snapshot.clone())
        }
        JobStatus::Failed => {
            let message = snapshot
                .error_message
                .clone()
                .unwrap_or_else(|| "job failed".to_string());
            let checkpoint = snapshot.last_checkpoint_id.clone();
            state.lifecycle = Lifecycle::Failed;
            state.error_message = Some(describe_job_failure(&message, checkpoint.as_ref()));
            Transition::Failed(JobFailure::JobFailed {
                message,
                checkpoint,
            })
        }
        JobStatus::Running => {
            state.lifecycle = Lifecycle::Running;
            Transition::Continue
        }
    };
    state.latest_snapshot = Some(snapshot);
    transition
}
