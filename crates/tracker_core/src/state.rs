use crate::history::DEFAULT_HISTORY_CAPACITY;
use crate::{
    FailureGovernor, JobHandle, JobStatusSnapshot, ProgressHistory,
    DEFAULT_MAX_CONSECUTIVE_ERRORS,
};

/// Client-side lifecycle of one job slot.
///
/// Transitions only along `Idle -> Launching -> Running -> {Completed | Failed}`
/// (a launch may also fail straight from `Launching`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Lifecycle {
    #[default]
    Idle,
    Launching,
    Running,
    Completed,
    Failed,
}

impl Lifecycle {
    pub fn is_active(self) -> bool {
        matches!(self, Lifecycle::Launching | Lifecycle::Running)
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Lifecycle::Completed | Lifecycle::Failed)
    }
}

/// Bounds applied to one tracked job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackerPolicy {
    pub max_consecutive_errors: u32,
    pub history_capacity: usize,
}

impl Default for TrackerPolicy {
    fn default() -> Self {
        Self {
            max_consecutive_errors: DEFAULT_MAX_CONSECUTIVE_ERRORS,
            history_capacity: DEFAULT_HISTORY_CAPACITY,
        }
    }
}

impl TrackerPolicy {
    pub fn governor(&self) -> FailureGovernor {
        FailureGovernor::new(self.max_consecutive_errors)
    }
}

/// Everything the client knows about the job it is tracking.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientJobState {
    pub handle: Option<JobHandle>,
    pub lifecycle: Lifecycle,
    pub latest_snapshot: Option<JobStatusSnapshot>,
    pub history: ProgressHistory,
    pub consecutive_error_count: u32,
    pub error_message: Option<String>,
    policy: TrackerPolicy,
    pub(crate) launch_seq: u64,
}

impl Default for ClientJobState {
    fn default() -> Self {
        Self::new(TrackerPolicy::default())
    }
}

impl ClientJobState {
    pub fn new(policy: TrackerPolicy) -> Self {
        Self {
            handle: None,
            lifecycle: Lifecycle::Idle,
            latest_snapshot: None,
            history: ProgressHistory::with_capacity(policy.history_capacity),
            consecutive_error_count: 0,
            error_message: None,
            policy,
            launch_seq: 0,
        }
    }

    pub fn policy(&self) -> TrackerPolicy {
        self.policy
    }

    /// Sequence number of the most recent start request. Launch results
    /// carrying any other number belong to an abandoned launch.
    pub fn launch_seq(&self) -> u64 {
        self.launch_seq
    }

    /// A fresh idle state that keeps this state's policy and launch sequence.
    pub fn reset(&self) -> Self {
        Self {
            launch_seq: self.launch_seq,
            ..Self::new(self.policy)
        }
    }

    pub fn progress(&self) -> Option<u8> {
        self.latest_snapshot.as_ref().map(JobStatusSnapshot::progress)
    }
}
