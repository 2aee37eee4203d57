use std::fmt;

use serde::{Deserialize, Serialize};

/// The kinds of bulk collection job the backend runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobKind {
    Metadata,
    /// Range-bounded: collects details for an inclusive id range.
    Details,
    Language,
}

impl JobKind {
    pub const ALL: [JobKind; 3] = [JobKind::Metadata, JobKind::Details, JobKind::Language];

    pub fn as_str(self) -> &'static str {
        match self {
            JobKind::Metadata => "metadata",
            JobKind::Details => "details",
            JobKind::Language => "language",
        }
    }

    /// Whether start requests carry an explicit id range, and restarts can
    /// resume from a numeric checkpoint.
    pub fn is_range_bounded(self) -> bool {
        matches!(self, JobKind::Details)
    }
}

impl fmt::Display for JobKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifies one backend task instance.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JobHandle {
    pub job_id: String,
    pub kind: JobKind,
}

impl JobHandle {
    pub fn new(job_id: impl Into<String>, kind: JobKind) -> Self {
        Self {
            job_id: job_id.into(),
            kind,
        }
    }
}

impl fmt::Display for JobHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.job_id)
    }
}

/// Inclusive id range for range-bounded jobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeParams {
    pub start: i64,
    pub end: i64,
}

impl RangeParams {
    pub fn new(start: i64, end: i64) -> Self {
        Self { start, end }
    }

    pub fn is_valid(&self) -> bool {
        self.start <= self.end
    }
}

/// Server-reported checkpoint. Range-bounded jobs report the last processed
/// id; other kinds may report an opaque marker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CheckpointId {
    Numeric(i64),
    Opaque(String),
}

impl CheckpointId {
    pub fn as_numeric(&self) -> Option<i64> {
        match self {
            CheckpointId::Numeric(value) => Some(*value),
            CheckpointId::Opaque(_) => None,
        }
    }
}

impl fmt::Display for CheckpointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckpointId::Numeric(value) => write!(f, "{value}"),
            CheckpointId::Opaque(marker) => f.write_str(marker),
        }
    }
}
