use serde::{Deserialize, Deserializer, Serialize};

use crate::CheckpointId;

/// Status as reported on the wire.
///
/// Unknown status strings deserialize to `Running` so newer backends with
/// extra intermediate states keep being polled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE", from = "String")]
pub enum JobStatus {
    Running,
    Completed,
    Failed,
}

impl From<String> for JobStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "COMPLETED" => JobStatus::Completed,
            "FAILED" => JobStatus::Failed,
            _ => JobStatus::Running,
        }
    }
}

/// Counts may arrive as explicit `null`; those read as zero.
fn null_as_zero<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// One polled status report for a job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobStatusSnapshot {
    pub status: JobStatus,
    #[serde(default, deserialize_with = "null_as_zero")]
    pub processed_count: u64,
    #[serde(default, deserialize_with = "null_as_zero")]
    pub total_count: u64,
    #[serde(default, deserialize_with = "null_as_zero")]
    pub success_count: u64,
    #[serde(default, deserialize_with = "null_as_zero")]
    pub fail_count: u64,
    #[serde(default, deserialize_with = "null_as_zero")]
    pub progress_percentage: u32,
    #[serde(default)]
    pub estimated_remaining_seconds: Option<u64>,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub range_start: Option<i64>,
    #[serde(default)]
    pub range_end: Option<i64>,
    #[serde(default)]
    pub last_checkpoint_id: Option<CheckpointId>,
}

impl JobStatusSnapshot {
    /// A bare snapshot with the given status and everything else zeroed.
    pub fn new(status: JobStatus) -> Self {
        Self {
            status,
            processed_count: 0,
            total_count: 0,
            success_count: 0,
            fail_count: 0,
            progress_percentage: 0,
            estimated_remaining_seconds: None,
            error_message: None,
            range_start: None,
            range_end: None,
            last_checkpoint_id: None,
        }
    }

    /// Reported progress, clamped to 0..=100.
    pub fn progress(&self) -> u8 {
        self.progress_percentage.min(100) as u8
    }

    pub fn with_progress(mut self, progress_percentage: u32, processed_count: u64) -> Self {
        self.progress_percentage = progress_percentage;
        self.processed_count = processed_count;
        self
    }

    pub fn with_checkpoint(mut self, checkpoint: CheckpointId) -> Self {
        self.last_checkpoint_id = Some(checkpoint);
        self
    }

    pub fn with_error(mut self, message: impl Into<String>) -> Self {
        self.error_message = Some(message.into());
        self
    }

    pub fn with_range(mut self, start: i64, end: i64) -> Self {
        self.range_start = Some(start);
        self.range_end = Some(end);
        self
    }
}
