//! One `run` invocation: start a job, follow it to a terminal state, and
//! restart it from its checkpoint while resume attempts remain.

use std::fmt::Write as _;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use tokio::sync::mpsc;
use tracker_core::{
    ClientJobState, JobFailure, JobHandle, JobKind, JobStatusSnapshot, RangeParams,
};
use tracker_engine::{JobTracker, LaunchError};
use tracker_logging::{tracker_info, tracker_warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunRequest {
    pub kind: JobKind,
    pub params: Option<RangeParams>,
    pub resume_attempts: u32,
}

enum Outcome {
    Completed(JobStatusSnapshot),
    Failed(JobFailure),
}

/// Runs the job to a final outcome and returns the final tracker state.
///
/// Progress is sampled every `progress_every` and logged when it changes.
pub async fn run(
    tracker: &JobTracker,
    request: RunRequest,
    progress_every: Duration,
) -> Result<ClientJobState> {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let completed = tx.clone();
    tracker.on_complete(move |snapshot| {
        let _ = completed.send(Outcome::Completed(snapshot.clone()));
    });
    tracker.on_error(move |failure| {
        let _ = tx.send(Outcome::Failed(failure.clone()));
    });

    let mut attempts_left = request.resume_attempts;
    launched(tracker.start(request.kind, request.params).await)?;

    loop {
        match next_outcome(tracker, &mut rx, progress_every).await? {
            Outcome::Completed(snapshot) => {
                tracker_info!(
                    "Job finished: {} of {} processed",
                    snapshot.processed_count,
                    snapshot.total_count
                );
                break;
            }
            Outcome::Failed(failure @ JobFailure::JobFailed { .. }) if attempts_left > 0 => {
                attempts_left -= 1;
                tracker_warn!(
                    "Job failed ({}); restarting, {} attempt(s) left after this one",
                    failure,
                    attempts_left
                );
                launched(tracker.restart(request.kind, None).await)?;
            }
            Outcome::Failed(failure) => {
                tracker_warn!("Giving up: {}", failure);
                break;
            }
        }
    }

    Ok(tracker.state())
}

/// Launch errors other than a busy slot also arrive through the error
/// callback, so they are only logged here.
fn launched(result: Result<JobHandle, LaunchError>) -> Result<()> {
    match result {
        Ok(handle) => {
            tracker_info!("Tracking job {}", handle);
            Ok(())
        }
        Err(LaunchError::AlreadyActive) => bail!("another job is already running"),
        Err(err) => {
            tracker_warn!("Launch failed: {}", err);
            Ok(())
        }
    }
}

async fn next_outcome(
    tracker: &JobTracker,
    rx: &mut mpsc::UnboundedReceiver<Outcome>,
    progress_every: Duration,
) -> Result<Outcome> {
    let mut ticker = tokio::time::interval(progress_every.max(Duration::from_millis(1)));
    let mut last_logged = None;
    loop {
        tokio::select! {
            outcome = rx.recv() => {
                return outcome.context("tracker dropped its callbacks");
            }
            _ = ticker.tick() => {
                let state = tracker.state();
                let Some(point) = state.history.last() else {
                    continue;
                };
                if last_logged != Some(point.progress) {
                    last_logged = Some(point.progress);
                    tracker_info!(
                        "Progress {}% ({} processed)",
                        point.progress,
                        point.processed_count
                    );
                }
            }
        }
    }
}

/// Human-readable summary of a finished run.
pub fn summary(state: &ClientJobState) -> String {
    let mut out = String::new();
    let job = state
        .handle
        .as_ref()
        .map_or_else(|| "-".to_string(), JobHandle::to_string);
    let _ = writeln!(out, "job:        {job}");
    let _ = writeln!(out, "lifecycle:  {:?}", state.lifecycle);
    if let Some(progress) = state.progress() {
        let _ = writeln!(out, "progress:   {progress}%");
    }
    if let Some(snapshot) = &state.latest_snapshot {
        let _ = writeln!(
            out,
            "processed:  {}/{} (success {}, failed {})",
            snapshot.processed_count,
            snapshot.total_count,
            snapshot.success_count,
            snapshot.fail_count
        );
    }
    let _ = writeln!(out, "samples:    {}", state.history.len());
    if let Some(rate) = state.history.throughput_per_second() {
        let _ = writeln!(out, "throughput: {rate:.1} items/s");
    }
    if let Some(message) = &state.error_message {
        let _ = writeln!(out, "error:      {message}");
    }
    out
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use tracker_core::{CheckpointId, JobStatus, Lifecycle};
    use tracker_engine::{BackendError, JobBackend, TrackerSettings};

    use super::*;

    /// Each started job reports the scripted status for its start order.
    #[derive(Default)]
    struct FakeBackend {
        outcomes: Vec<JobStatusSnapshot>,
        starts: Mutex<Vec<Option<RangeParams>>>,
        ids: Mutex<HashMap<String, usize>>,
    }

    #[async_trait::async_trait]
    impl JobBackend for FakeBackend {
        async fn start_job(
            &self,
            _kind: JobKind,
            params: Option<RangeParams>,
        ) -> Result<String, BackendError> {
            let mut starts = self.starts.lock().unwrap();
            starts.push(params);
            let index = starts.len() - 1;
            let id = format!("job-{index}");
            self.ids.lock().unwrap().insert(id.clone(), index);
            Ok(id)
        }

        async fn get_job_status(
            &self,
            _kind: JobKind,
            job_id: &str,
        ) -> Result<Option<JobStatusSnapshot>, BackendError> {
            let index = self.ids.lock().unwrap().get(job_id).copied();
            Ok(index.and_then(|index| self.outcomes.get(index).cloned()))
        }
    }

    fn crashed_at(checkpoint: i64) -> JobStatusSnapshot {
        JobStatusSnapshot::new(JobStatus::Failed)
            .with_error("worker crashed")
            .with_checkpoint(CheckpointId::Numeric(checkpoint))
            .with_range(1, 1000)
    }

    fn details_request(resume_attempts: u32) -> RunRequest {
        RunRequest {
            kind: JobKind::Details,
            params: Some(RangeParams::new(1, 1000)),
            resume_attempts,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn failed_job_resumes_from_checkpoint() {
        let backend = Arc::new(FakeBackend {
            outcomes: vec![
                crashed_at(500),
                JobStatusSnapshot::new(JobStatus::Completed).with_progress(100, 1000),
            ],
            ..FakeBackend::default()
        });
        let tracker = JobTracker::new(backend.clone(), TrackerSettings::default());

        let state = run(&tracker, details_request(1), Duration::from_secs(1))
            .await
            .unwrap();

        assert_eq!(state.lifecycle, Lifecycle::Completed);
        assert_eq!(
            *backend.starts.lock().unwrap(),
            vec![
                Some(RangeParams::new(1, 1000)),
                Some(RangeParams::new(501, 1000))
            ]
        );
        let report = summary(&state);
        assert!(report.contains("lifecycle:  Completed"));
        assert!(report.contains("progress:   100%"));
    }

    #[tokio::test(start_paused = true)]
    async fn gives_up_when_attempts_run_out() {
        let backend = Arc::new(FakeBackend {
            outcomes: vec![crashed_at(500), crashed_at(800)],
            ..FakeBackend::default()
        });
        let tracker = JobTracker::new(backend.clone(), TrackerSettings::default());

        let state = run(&tracker, details_request(1), Duration::from_secs(1))
            .await
            .unwrap();

        assert_eq!(state.lifecycle, Lifecycle::Failed);
        assert_eq!(backend.starts.lock().unwrap().len(), 2);
        assert!(summary(&state)
            .contains("error:      worker crashed (last processed position: 800)"));
    }

    #[tokio::test(start_paused = true)]
    async fn not_found_is_not_retried() {
        let backend = Arc::new(FakeBackend::default());
        let tracker = JobTracker::new(backend.clone(), TrackerSettings::default());

        let state = run(&tracker, details_request(3), Duration::from_secs(1))
            .await
            .unwrap();

        assert_eq!(state.lifecycle, Lifecycle::Failed);
        assert_eq!(state.error_message.as_deref(), Some("job not found"));
        assert_eq!(backend.starts.lock().unwrap().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn launch_failure_ends_the_run() {
        let backend = Arc::new(FakeBackend::default());
        let tracker = JobTracker::new(backend.clone(), TrackerSettings::default());
        let request = RunRequest {
            params: None,
            ..details_request(2)
        };

        let state = run(&tracker, request, Duration::from_secs(1)).await.unwrap();

        assert_eq!(state.lifecycle, Lifecycle::Failed);
        assert!(backend.starts.lock().unwrap().is_empty());
    }
}
