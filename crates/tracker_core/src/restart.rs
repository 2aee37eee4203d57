use crate::{ClientJobState, JobKind, Lifecycle, RangeParams};

/// Parameters for the launch that replaces a previous job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RestartPlan {
    pub params: Option<RangeParams>,
    /// Whether `params` were derived from a numeric checkpoint.
    pub resumes_from_checkpoint: bool,
}

/// Computes launch parameters for restarting `prior`.
///
/// A failed range-bounded job with a numeric checkpoint resumes right after
/// the checkpoint, keeping the end of its range. A checkpoint at or past the
/// end still yields a one-id range rather than an inverted one. Every other case relaunches
/// with the override, or the original parameters, unchanged and leaves
/// resumption to the backend's own persisted checkpoint.
pub fn plan_restart(
    kind: JobKind,
    prior: &ClientJobState,
    original: Option<RangeParams>,
    override_params: Option<RangeParams>,
) -> RestartPlan {
    let checkpoint = prior
        .latest_snapshot
        .as_ref()
        .and_then(|snapshot| snapshot.last_checkpoint_id.as_ref())
        .and_then(|checkpoint| checkpoint.as_numeric());

    match checkpoint {
        Some(checkpoint) if kind.is_range_bounded() && prior.lifecycle == Lifecycle::Failed => {
            let start = checkpoint.saturating_add(1);
            let end = override_params
                .map(|params| params.end)
                .or_else(|| prior.latest_snapshot.as_ref().and_then(|s| s.range_end))
                .or_else(|| original.map(|params| params.end))
                .map_or(start, |end| end.max(start));
            RestartPlan {
                params: Some(RangeParams::new(start, end)),
                resumes_from_checkpoint: true,
            }
        }
        _ => RestartPlan {
            params: override_params.or(original),
            resumes_from_checkpoint: false,
        },
    }
}
