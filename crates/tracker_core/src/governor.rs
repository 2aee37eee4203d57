use crate::{ClientJobState, JobFailure, Lifecycle};

pub const DEFAULT_MAX_CONSECUTIVE_ERRORS: u32 = 5;

/// Counts consecutive transient status-query failures and forces the job
/// into `Failed` once the threshold is reached.
///
/// Only transport failures count here. A "not found" response is terminal
/// on its own and never reaches the governor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FailureGovernor {
    threshold: u32,
}

impl Default for FailureGovernor {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_CONSECUTIVE_ERRORS)
    }
}

impl FailureGovernor {
    pub fn new(threshold: u32) -> Self {
        Self {
            threshold: threshold.max(1),
        }
    }

    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    /// Returns the failure to surface when this failure exhausted the budget.
    pub fn on_failure(&self, state: &mut ClientJobState, error: &str) -> Option<JobFailure> {
        state.consecutive_error_count = state.consecutive_error_count.saturating_add(1);
        if state.consecutive_error_count < self.threshold {
            return None;
        }

        let failure = JobFailure::PollingExhausted {
            attempts: state.consecutive_error_count,
            last_error: error.to_string(),
        };
        state.lifecycle = Lifecycle::Failed;
        state.error_message = Some(failure.to_string());
        Some(failure)
    }

    pub fn on_success(&self, state: &mut ClientJobState) {
        state.consecutive_error_count = 0;
    }
}
