//! Job tracker core: pure state machine for tracking server-executed batch
//! jobs, with progress history, failure bounding and restart planning.
mod effect;
mod failure;
mod governor;
mod history;
mod job;
mod msg;
mod restart;
mod snapshot;
mod state;
mod transition;
mod update;

pub use effect::Effect;
pub use failure::JobFailure;
pub use governor::{FailureGovernor, DEFAULT_MAX_CONSECUTIVE_ERRORS};
pub use history::{ProgressHistory, ProgressHistoryPoint, DEFAULT_HISTORY_CAPACITY};
pub use job::{CheckpointId, JobHandle, JobKind, RangeParams};
pub use msg::Msg;
pub use restart::{plan_restart, RestartPlan};
pub use snapshot::{JobStatus, JobStatusSnapshot};
pub use state::{ClientJobState, Lifecycle, TrackerPolicy};
pub use transition::{apply_status, Transition};
pub use update::update;
