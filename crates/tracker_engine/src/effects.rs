use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracker_core::{
    update, ClientJobState, Effect, JobFailure, JobHandle, JobKind, JobStatusSnapshot, Msg,
    TrackerPolicy,
};
use tracker_logging::{tracker_info, tracker_warn};

use crate::poller::StatusSink;

pub type CompleteCallback = Arc<dyn Fn(&JobStatusSnapshot) + Send + Sync>;
pub type ErrorCallback = Arc<dyn Fn(&JobFailure) + Send + Sync>;

pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Owns the job state, feeds messages through `update`, and runs the
/// notification effects against the registered callbacks.
///
/// The state lock is never held while a callback runs, so callbacks may read
/// the tracker state.
pub(crate) struct EffectRunner {
    state: Mutex<ClientJobState>,
    on_complete: Mutex<Option<CompleteCallback>>,
    on_error: Mutex<Option<ErrorCallback>>,
}

impl EffectRunner {
    pub(crate) fn new(policy: TrackerPolicy) -> Self {
        Self {
            state: Mutex::new(ClientJobState::new(policy)),
            on_complete: Mutex::new(None),
            on_error: Mutex::new(None),
        }
    }

    pub(crate) fn snapshot(&self) -> ClientJobState {
        lock(&self.state).clone()
    }

    pub(crate) fn set_on_complete(&self, callback: CompleteCallback) {
        *lock(&self.on_complete) = Some(callback);
    }

    pub(crate) fn set_on_error(&self, callback: ErrorCallback) {
        *lock(&self.on_error) = Some(callback);
    }

    /// Moves the slot into `Launching` and returns the launch sequence the
    /// result must carry. Returns `None`, leaving the state untouched, while
    /// a job is already launching or running.
    pub(crate) fn begin_launch(&self, kind: JobKind) -> Option<u64> {
        let mut guard = lock(&self.state);
        if guard.lifecycle.is_active() {
            return None;
        }
        let state = std::mem::take(&mut *guard);
        let (state, _effects) = update(state, Msg::StartRequested { kind });
        let launch_seq = state.launch_seq();
        *guard = state;
        Some(launch_seq)
    }

    pub(crate) fn dispatch(&self, msg: Msg) -> Vec<Effect> {
        let effects = {
            let mut guard = lock(&self.state);
            Self::apply(&mut guard, msg)
        };
        self.notify(&effects);
        effects
    }

    fn apply(state: &mut ClientJobState, msg: Msg) -> Vec<Effect> {
        let current = std::mem::take(state);
        let (next, effects) = update(current, msg);
        *state = next;
        effects
    }

    fn notify(&self, effects: &[Effect]) {
        for effect in effects {
            match effect {
                Effect::NotifyComplete(snapshot) => {
                    tracker_info!(
                        "Job completed: processed={} success={} fail={}",
                        snapshot.processed_count,
                        snapshot.success_count,
                        snapshot.fail_count
                    );
                    let callback = lock(&self.on_complete).clone();
                    if let Some(callback) = callback {
                        callback(snapshot);
                    }
                }
                Effect::NotifyError(failure) => {
                    tracker_warn!("Job failed: {}", failure);
                    let callback = lock(&self.on_error).clone();
                    if let Some(callback) = callback {
                        callback(failure);
                    }
                }
                Effect::StartPolling { .. } | Effect::StopPolling => {}
            }
        }
    }
}

impl StatusSink for EffectRunner {
    fn is_tracking(&self, handle: &JobHandle) -> bool {
        let state = lock(&self.state);
        state.lifecycle.is_active() && state.handle.as_ref() == Some(handle)
    }

    fn deliver(&self, handle: &JobHandle, msg: Msg) -> bool {
        let effects = {
            let mut guard = lock(&self.state);
            if guard.handle.as_ref() != Some(handle) {
                return false;
            }
            Self::apply(&mut guard, msg)
        };
        self.notify(&effects);
        !effects.contains(&Effect::StopPolling)
    }
}
