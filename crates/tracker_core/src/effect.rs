#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    StartPolling { handle: crate::JobHandle },
    StopPolling,
    NotifyComplete(crate::JobStatusSnapshot),
    NotifyError(crate::JobFailure),
}
