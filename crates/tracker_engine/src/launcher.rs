use std::sync::Arc;

use tracker_core::{JobHandle, JobKind, JobStatus, RangeParams};
use tracker_logging::{tracker_info, tracker_warn};

use crate::{JobBackend, LaunchError};

/// A started job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Launch {
    pub handle: JobHandle,
    /// True when the start call timed out but a status probe showed the
    /// backend had accepted the job anyway.
    pub recovered: bool,
}

/// Starts backend jobs and resolves ambiguous start timeouts.
#[derive(Clone)]
pub struct JobLauncher {
    backend: Arc<dyn JobBackend>,
}

impl JobLauncher {
    pub fn new(backend: Arc<dyn JobBackend>) -> Self {
        Self { backend }
    }

    pub async fn launch(
        &self,
        kind: JobKind,
        params: Option<RangeParams>,
    ) -> Result<Launch, LaunchError> {
        let params = validate_params(kind, params)?;

        let err = match self.backend.start_job(kind, params).await {
            Ok(job_id) => {
                tracker_info!("Started {} job {}", kind, job_id);
                return Ok(Launch {
                    handle: JobHandle::new(job_id, kind),
                    recovered: false,
                });
            }
            Err(err) => err,
        };

        let Some(job_id) = err.timeout_job_id().map(str::to_owned) else {
            return Err(err.into());
        };

        // The backend may have accepted the job before we gave up waiting.
        tracker_warn!(
            "Start of {} job timed out after the backend assigned {}; probing its status",
            kind,
            job_id
        );
        match self.backend.get_job_status(kind, &job_id).await {
            Ok(Some(snapshot))
                if snapshot.status == JobStatus::Running
                    || snapshot.last_checkpoint_id.is_some() =>
            {
                tracker_info!("Recovered {} job {} after start timeout", kind, job_id);
                Ok(Launch {
                    handle: JobHandle::new(job_id, kind),
                    recovered: true,
                })
            }
            Ok(snapshot) => {
                tracker_warn!(
                    "Probe for {} job {} shows no progress ({:?}); treating start as failed",
                    kind,
                    job_id,
                    snapshot.map(|s| s.status)
                );
                Err(err.into())
            }
            Err(probe_err) => {
                tracker_warn!("Probe for {} job {} failed: {}", kind, job_id, probe_err);
                Err(err.into())
            }
        }
    }
}

fn validate_params(
    kind: JobKind,
    params: Option<RangeParams>,
) -> Result<Option<RangeParams>, LaunchError> {
    if !kind.is_range_bounded() {
        if params.is_some() {
            tracker_warn!("Ignoring range parameters for {} job", kind);
        }
        return Ok(None);
    }

    let params = params.ok_or(LaunchError::MissingRange { kind })?;
    if !params.is_valid() {
        return Err(LaunchError::InvalidRange {
            start: params.start,
            end: params.end,
        });
    }
    Ok(Some(params))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn details_require_a_valid_range() {
        assert_eq!(
            validate_params(JobKind::Details, None),
            Err(LaunchError::MissingRange {
                kind: JobKind::Details
            })
        );
        assert_eq!(
            validate_params(JobKind::Details, Some(RangeParams::new(10, 5))),
            Err(LaunchError::InvalidRange { start: 10, end: 5 })
        );
        assert_eq!(
            validate_params(JobKind::Details, Some(RangeParams::new(5, 5))),
            Ok(Some(RangeParams::new(5, 5)))
        );
    }

    #[test]
    fn other_kinds_drop_range() {
        assert_eq!(
            validate_params(JobKind::Language, Some(RangeParams::new(1, 2))),
            Ok(None)
        );
        assert_eq!(validate_params(JobKind::Metadata, None), Ok(None));
    }
}
