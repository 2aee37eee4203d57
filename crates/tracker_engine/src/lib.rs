//! Job tracker engine: backend IO, status polling, launch and restart.
mod backend;
mod effects;
mod launcher;
mod poller;
mod restart;
mod tracker;
mod types;

pub use backend::{BackendSettings, JobBackend, RestBackend};
pub use effects::{CompleteCallback, ErrorCallback};
pub use launcher::{JobLauncher, Launch};
pub use poller::{StatusPoller, StatusSink, DEFAULT_POLL_INTERVAL};
pub use tracker::{JobTracker, TrackerSettings};
pub use types::{BackendError, FailureKind, LaunchError};
