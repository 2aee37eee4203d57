//! Restart coordination: relaunch a finished job, resuming from its
//! checkpoint when the job kind allows it.

use tracker_core::{plan_restart, JobHandle, JobKind, RangeParams};
use tracker_logging::tracker_info;

use crate::effects::lock;
use crate::{JobTracker, LaunchError};

impl JobTracker {
    /// Launches a replacement for the current job.
    ///
    /// A failed range-bounded job with a numeric checkpoint resumes at
    /// `checkpoint + 1`, keeping the range end from `override_params`, the
    /// last snapshot, or the original start, in that order. Otherwise the
    /// override (or the original parameters) is used unchanged. The prior
    /// state is replaced, never modified.
    pub async fn restart(
        &self,
        kind: JobKind,
        override_params: Option<RangeParams>,
    ) -> Result<JobHandle, LaunchError> {
        let prior = self.state();
        let last_launch = *lock(&self.last_launch);
        let original = last_launch
            .filter(|record| record.kind == kind)
            .and_then(|record| record.params);

        let plan = plan_restart(kind, &prior, original, override_params);
        match (plan.resumes_from_checkpoint, plan.params) {
            (true, Some(params)) => tracker_info!(
                "Restarting {} job from checkpoint: {}..={}",
                kind,
                params.start,
                params.end
            ),
            _ => tracker_info!("Restarting {} job with original parameters", kind),
        }

        self.start(kind, plan.params).await
    }
}
