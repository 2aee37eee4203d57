#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tracker_core::{JobFailure, JobKind, JobStatus, JobStatusSnapshot, RangeParams};
use tracker_engine::{BackendError, FailureKind, JobBackend, JobTracker};

pub fn init_logging() {
    tracker_logging::initialize_for_tests();
}

pub type StatusResult = Result<Option<JobStatusSnapshot>, BackendError>;

/// Backend fake that replays scripted answers. Once the status script runs
/// out it keeps answering `RUNNING`.
#[derive(Default)]
pub struct ScriptedBackend {
    starts: Mutex<VecDeque<Result<String, BackendError>>>,
    statuses: Mutex<VecDeque<StatusResult>>,
    status_delay: Option<Duration>,
    start_delays: HashMap<JobKind, Duration>,
    pub start_calls: Mutex<Vec<(JobKind, Option<RangeParams>)>>,
    pub status_calls: Mutex<Vec<String>>,
    in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_status_delay(mut self, delay: Duration) -> Self {
        self.status_delay = Some(delay);
        self
    }

    pub fn with_start_delay(mut self, kind: JobKind, delay: Duration) -> Self {
        self.start_delays.insert(kind, delay);
        self
    }

    pub fn push_start(&self, result: Result<&str, BackendError>) -> &Self {
        self.starts
            .lock()
            .unwrap()
            .push_back(result.map(str::to_string));
        self
    }

    pub fn push_status(&self, result: StatusResult) -> &Self {
        self.statuses.lock().unwrap().push_back(result);
        self
    }

    pub fn push_running(&self, progress: u32) -> &Self {
        self.push_status(Ok(Some(
            JobStatusSnapshot::new(JobStatus::Running).with_progress(progress, u64::from(progress)),
        )))
    }

    pub fn push_transport_errors(&self, count: usize) -> &Self {
        for _ in 0..count {
            self.push_status(Err(network_error()));
        }
        self
    }

    pub fn status_call_count(&self) -> usize {
        self.status_calls.lock().unwrap().len()
    }

    pub fn last_start(&self) -> Option<(JobKind, Option<RangeParams>)> {
        self.start_calls.lock().unwrap().last().copied()
    }
}

#[async_trait::async_trait]
impl JobBackend for ScriptedBackend {
    async fn start_job(
        &self,
        kind: JobKind,
        params: Option<RangeParams>,
    ) -> Result<String, BackendError> {
        self.start_calls.lock().unwrap().push((kind, params));
        let next = self.starts.lock().unwrap().pop_front();
        let result =
            next.unwrap_or_else(|| Ok(format!("job-{}", self.start_calls.lock().unwrap().len())));

        if let Some(delay) = self.start_delays.get(&kind) {
            tokio::time::sleep(*delay).await;
        }
        result
    }

    async fn get_job_status(
        &self,
        _kind: JobKind,
        job_id: &str,
    ) -> Result<Option<JobStatusSnapshot>, BackendError> {
        self.status_calls.lock().unwrap().push(job_id.to_string());
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        if let Some(delay) = self.status_delay {
            tokio::time::sleep(delay).await;
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        let next = self.statuses.lock().unwrap().pop_front();
        next.unwrap_or_else(|| Ok(Some(JobStatusSnapshot::new(JobStatus::Running))))
    }
}

pub fn network_error() -> BackendError {
    BackendError::new(FailureKind::Network, "connection refused")
}

/// Collects everything the tracker reports through its callbacks.
#[derive(Clone, Default)]
pub struct Outcomes {
    pub completed: Arc<Mutex<Vec<JobStatusSnapshot>>>,
    pub failed: Arc<Mutex<Vec<JobFailure>>>,
}

impl Outcomes {
    pub fn attach(tracker: &JobTracker) -> Self {
        let outcomes = Self::default();
        let completed = outcomes.completed.clone();
        tracker.on_complete(move |snapshot| completed.lock().unwrap().push(snapshot.clone()));
        let failed = outcomes.failed.clone();
        tracker.on_error(move |failure| failed.lock().unwrap().push(failure.clone()));
        outcomes
    }

    pub fn completed(&self) -> Vec<JobStatusSnapshot> {
        self.completed.lock().unwrap().clone()
    }

    pub fn failed(&self) -> Vec<JobFailure> {
        self.failed.lock().unwrap().clone()
    }
}
