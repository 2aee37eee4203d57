use chrono::{DateTime, Utc};

#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// Caller asked to start a job of `kind`.
    StartRequested { kind: crate::JobKind },
    /// The backend accepted the job (directly or via a recovery probe).
    /// `launch_seq` is the state's sequence number when the launch began.
    Launched {
        handle: crate::JobHandle,
        launch_seq: u64,
    },
    /// The start call failed for good.
    LaunchFailed { message: String, launch_seq: u64 },
    /// A status query resolved; `None` means the backend has no such job.
    StatusReceived {
        snapshot: Option<crate::JobStatusSnapshot>,
        observed_at: DateTime<Utc>,
    },
    /// A status query failed in transport.
    StatusQueryFailed { message: String },
    /// Caller tore the tracker down.
    Stopped,
}
