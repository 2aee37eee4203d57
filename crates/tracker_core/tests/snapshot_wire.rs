use pretty_assertions::assert_eq;
use tracker_core::{CheckpointId, JobKind, JobStatus, JobStatusSnapshot};

#[test]
fn decodes_full_camel_case_snapshot() {
    let json = r#"{
        "status": "RUNNING",
        "processedCount": 120,
        "totalCount": 1000,
        "successCount": 118,
        "failCount": 2,
        "progressPercentage": 12,
        "estimatedRemainingSeconds": 300,
        "errorMessage": null,
        "rangeStart": 1,
        "rangeEnd": 1000,
        "lastCheckpointId": 120
    }"#;
    let snapshot: JobStatusSnapshot = serde_json::from_str(json).unwrap();
    let expected = JobStatusSnapshot {
        status: JobStatus::Running,
        processed_count: 120,
        total_count: 1000,
        success_count: 118,
        fail_count: 2,
        progress_percentage: 12,
        estimated_remaining_seconds: Some(300),
        error_message: None,
        range_start: Some(1),
        range_end: Some(1000),
        last_checkpoint_id: Some(CheckpointId::Numeric(120)),
    };
    assert_eq!(snapshot, expected);
}

#[test]
fn unknown_status_decodes_as_running() {
    let snapshot: JobStatusSnapshot =
        serde_json::from_str(r#"{"status":"QUEUED"}"#).unwrap();
    assert_eq!(snapshot.status, JobStatus::Running);
    assert_eq!(snapshot.processed_count, 0);
    assert_eq!(snapshot.last_checkpoint_id, None);
}

#[test]
fn string_checkpoint_is_opaque() {
    let snapshot: JobStatusSnapshot =
        serde_json::from_str(r#"{"status":"FAILED","lastCheckpointId":"cursor-abc"}"#).unwrap();
    assert_eq!(snapshot.status, JobStatus::Failed);
    let checkpoint = snapshot.last_checkpoint_id.unwrap();
    assert_eq!(checkpoint, CheckpointId::Opaque("cursor-abc".to_string()));
    assert_eq!(checkpoint.as_numeric(), None);
    assert_eq!(checkpoint.to_string(), "cursor-abc");
}

#[test]
fn status_serializes_uppercase() {
    let json = serde_json::to_value(JobStatusSnapshot::new(JobStatus::Completed)).unwrap();
    assert_eq!(json["status"], "COMPLETED");
}

#[test]
fn only_details_is_range_bounded() {
    let bounded: Vec<JobKind> = JobKind::ALL
        .into_iter()
        .filter(|kind| kind.is_range_bounded())
        .collect();
    assert_eq!(bounded, vec![JobKind::Details]);
    assert_eq!(JobKind::Details.to_string(), "details");
}

#[test]
fn null_counts_read_as_zero() {
    let json = r#"{
        "status": "RUNNING",
        "processedCount": null,
        "totalCount": null,
        "successCount": 4,
        "failCount": null,
        "progressPercentage": null
    }"#;
    let snapshot: JobStatusSnapshot = serde_json::from_str(json).unwrap();
    assert_eq!(
        snapshot,
        JobStatusSnapshot {
            success_count: 4,
            ..JobStatusSnapshot::new(JobStatus::Running)
        }
    );
    assert_eq!(snapshot.progress(), 0);
}
