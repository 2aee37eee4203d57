use std::sync::{Arc, Mutex};
use std::time::Duration;

use tracker_core::{
    ClientJobState, Effect, JobFailure, JobHandle, JobKind, JobStatusSnapshot, Msg, RangeParams,
    TrackerPolicy,
};
use tracker_logging::{tracker_debug, tracker_info, tracker_warn};

use crate::effects::{lock, EffectRunner};
use crate::poller::DEFAULT_POLL_INTERVAL;
use crate::{JobBackend, JobLauncher, LaunchError, StatusPoller};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackerSettings {
    pub poll_interval: Duration,
    pub policy: TrackerPolicy,
}

impl Default for TrackerSettings {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            policy: TrackerPolicy::default(),
        }
    }
}

/// Parameters of the most recent start, kept so a restart can reuse them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct LaunchRecord {
    pub(crate) kind: JobKind,
    pub(crate) params: Option<RangeParams>,
}

/// Tracks one logical job slot: start, poll to completion, restart, stop.
///
/// Must be used from within a tokio runtime. Dropping the tracker stops its
/// poller.
pub struct JobTracker {
    backend: Arc<dyn JobBackend>,
    launcher: JobLauncher,
    settings: TrackerSettings,
    runner: Arc<EffectRunner>,
    poller: Mutex<Option<StatusPoller>>,
    pub(crate) last_launch: Mutex<Option<LaunchRecord>>,
}

impl JobTracker {
    pub fn new(backend: Arc<dyn JobBackend>, settings: TrackerSettings) -> Self {
        Self {
            launcher: JobLauncher::new(backend.clone()),
            backend,
            settings,
            runner: Arc::new(EffectRunner::new(settings.policy)),
            poller: Mutex::new(None),
            last_launch: Mutex::new(None),
        }
    }

    pub fn settings(&self) -> &TrackerSettings {
        &self.settings
    }

    /// Called once with the final snapshot when a job completes.
    pub fn on_complete<F>(&self, callback: F)
    where
        F: Fn(&JobStatusSnapshot) + Send + Sync + 'static,
    {
        self.runner.set_on_complete(Arc::new(callback));
    }

    /// Called once when a job reaches a terminal failure.
    pub fn on_error<F>(&self, callback: F)
    where
        F: Fn(&JobFailure) + Send + Sync + 'static,
    {
        self.runner.set_on_error(Arc::new(callback));
    }

    /// Current state of the slot.
    pub fn state(&self) -> ClientJobState {
        self.runner.snapshot()
    }

    pub fn is_polling(&self) -> bool {
        lock(&self.poller)
            .as_ref()
            .is_some_and(StatusPoller::is_active)
    }

    /// Starts a job and begins polling it.
    ///
    /// Returns `LaunchError::AlreadyActive` without touching the state while
    /// a job is launching or running. Every other launch error leaves the
    /// slot `Failed` and is also reported through the error callback.
    pub async fn start(
        &self,
        kind: JobKind,
        params: Option<RangeParams>,
    ) -> Result<JobHandle, LaunchError> {
        let Some(launch_seq) = self.runner.begin_launch(kind) else {
            tracker_warn!("Ignoring start of {} job: slot is busy", kind);
            return Err(LaunchError::AlreadyActive);
        };
        self.detach_poller();
        *lock(&self.last_launch) = Some(LaunchRecord { kind, params });

        match self.launcher.launch(kind, params).await {
            Ok(launch) => {
                if launch.recovered {
                    tracker_info!("Adopting {} after an ambiguous start timeout", launch.handle);
                }
                let effects = self.runner.dispatch(Msg::Launched {
                    handle: launch.handle.clone(),
                    launch_seq,
                });
                if effects.is_empty() {
                    tracker_debug!("Launch of {} was abandoned before it resolved", launch.handle);
                }
                for effect in effects {
                    if let Effect::StartPolling { handle } = effect {
                        self.attach_poller(handle);
                    }
                }
                Ok(launch.handle)
            }
            Err(err) => {
                self.runner.dispatch(Msg::LaunchFailed {
                    message: err.to_string(),
                    launch_seq,
                });
                Err(err)
            }
        }
    }

    /// Stops polling and discards a non-terminal job state. Terminal state
    /// stays readable. Safe to call at any time, any number of times.
    pub fn stop(&self) {
        self.detach_poller();
        self.runner.dispatch(Msg::Stopped);
    }

    fn attach_poller(&self, handle: JobHandle) {
        let poller = StatusPoller::spawn(
            handle,
            self.backend.clone(),
            self.runner.clone(),
            self.settings.poll_interval,
        );
        if let Some(mut previous) = lock(&self.poller).replace(poller) {
            previous.stop();
        }
    }

    fn detach_poller(&self) {
        let previous = lock(&self.poller).take();
        if let Some(mut poller) = previous {
            tracker_debug!("Detaching poller for {}", poller.handle());
            poller.stop();
        }
    }
}

impl Drop for JobTracker {
    fn drop(&mut self) {
        self.detach_poller();
    }
}
