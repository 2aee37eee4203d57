use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use futures_util::future::BoxFuture;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracker_core::{JobHandle, JobStatusSnapshot, Msg};
use tracker_logging::{tracker_debug, tracker_trace, tracker_warn};

use crate::{BackendError, JobBackend};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(2000);

/// Receives the outcome of each status query.
pub trait StatusSink: Send + Sync {
    /// Whether `handle` is still launching or running. Checked on every tick.
    fn is_tracking(&self, handle: &JobHandle) -> bool;

    /// Applies a poll result. Returns false when polling must stop.
    fn deliver(&self, handle: &JobHandle, msg: Msg) -> bool;
}

type StatusQuery = BoxFuture<'static, Result<Option<JobStatusSnapshot>, BackendError>>;

/// Recurring status poller for one job handle.
///
/// At most one status query is in flight at a time: a tick that fires while
/// the previous query is outstanding is skipped, never queued.
pub struct StatusPoller {
    handle: JobHandle,
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl StatusPoller {
    /// Starts polling on the current tokio runtime. The first query fires
    /// one `period` after spawning.
    pub fn spawn(
        handle: JobHandle,
        backend: Arc<dyn JobBackend>,
        sink: Arc<dyn StatusSink>,
        period: Duration,
    ) -> Self {
        let cancel = CancellationToken::new();
        let task = tokio::spawn(poll_loop(
            handle.clone(),
            backend,
            sink,
            period,
            cancel.clone(),
        ));
        Self {
            handle,
            cancel,
            task: Some(task),
        }
    }

    pub fn handle(&self) -> &JobHandle {
        &self.handle
    }

    pub fn is_active(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Stops the timer and drops any in-flight query. Safe to call repeatedly.
    pub fn stop(&mut self) {
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            task.abort();
            tracker_debug!("Stopped status poller for {}", self.handle);
        }
    }
}

impl Drop for StatusPoller {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn poll_loop(
    handle: JobHandle,
    backend: Arc<dyn JobBackend>,
    sink: Arc<dyn StatusSink>,
    period: Duration,
    cancel: CancellationToken,
) {
    let period = period.max(Duration::from_millis(1));
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut in_flight: Option<StatusQuery> = None;

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {
                if !sink.is_tracking(&handle) {
                    tracker_debug!("Job {} no longer active, poller exiting", handle);
                    break;
                }
                if in_flight.is_some() {
                    tracker_trace!("Status query for {} still in flight, skipping tick", handle);
                    continue;
                }
                in_flight = Some(query_status(backend.clone(), handle.clone()));
            }
            result = wait_for(&mut in_flight) => {
                in_flight = None;
                let msg = match result {
                    Ok(snapshot) => Msg::StatusReceived {
                        snapshot,
                        observed_at: Utc::now(),
                    },
                    Err(err) => {
                        tracker_warn!("Status query for {} failed: {}", handle, err);
                        Msg::StatusQueryFailed {
                            message: err.to_string(),
                        }
                    }
                };
                if !sink.deliver(&handle, msg) {
                    break;
                }
            }
        }
    }
}

fn query_status(backend: Arc<dyn JobBackend>, handle: JobHandle) -> StatusQuery {
    Box::pin(async move { backend.get_job_status(handle.kind, &handle.job_id).await })
}

async fn wait_for(
    in_flight: &mut Option<StatusQuery>,
) -> Result<Option<JobStatusSnapshot>, BackendError> {
    match in_flight.as_mut() {
        Some(query) => query.await,
        None => std::future::pending().await,
    }
}
