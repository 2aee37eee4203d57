use chrono::{DateTime, Duration, TimeZone, Utc};
use tracker_core::{
    update, ClientJobState, JobHandle, JobKind, JobStatus, JobStatusSnapshot, Msg,
    ProgressHistory,
};

fn at(secs: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::seconds(secs)
}

fn running(progress: u32, processed: u64) -> JobStatusSnapshot {
    JobStatusSnapshot::new(JobStatus::Running).with_progress(progress, processed)
}

#[test]
fn history_keeps_last_hundred_points_in_order() {
    let mut history = ProgressHistory::default();
    // Percentages cap at 100, so wrap them; consecutive polls still differ.
    for i in 0..150u32 {
        history.record(at(i64::from(i)), &running(i % 100, u64::from(i)));
    }
    assert_eq!(history.len(), 100);

    let processed: Vec<u64> = history.iter().map(|p| p.processed_count).collect();
    let expected: Vec<u64> = (50..150).collect();
    assert_eq!(processed, expected);
    assert!(history
        .iter()
        .zip(history.iter().skip(1))
        .all(|(a, b)| a.timestamp < b.timestamp));
}

#[test]
fn unchanged_progress_appends_once() {
    let mut history = ProgressHistory::default();
    assert!(history.record(at(0), &running(10, 100)));
    assert!(!history.record(at(2), &running(10, 120)));
    assert_eq!(history.len(), 1);
    assert_eq!(history.last().unwrap().processed_count, 100);

    assert!(history.record(at(4), &running(11, 130)));
    assert_eq!(history.len(), 2);
}

#[test]
fn non_monotonic_progress_is_recorded() {
    let mut history = ProgressHistory::default();
    history.record(at(0), &running(40, 40));
    history.record(at(1), &running(35, 35));
    let progress: Vec<u8> = history.iter().map(|p| p.progress).collect();
    assert_eq!(progress, vec![40, 35]);
}

#[test]
fn progress_is_clamped_to_one_hundred() {
    let mut history = ProgressHistory::default();
    history.record(at(0), &running(250, 1));
    assert_eq!(history.last().unwrap().progress, 100);
}

#[test]
fn polls_feed_history_and_failed_polls_do_not() {
    let (state, _) = update(
        ClientJobState::default(),
        Msg::StartRequested {
            kind: JobKind::Metadata,
        },
    );
    let (state, _) = update(
        state.clone(),
        Msg::Launched {
            handle: JobHandle::new("h", JobKind::Metadata),
            launch_seq: state.launch_seq(),
        },
    );

    let (state, _) = update(
        state,
        Msg::StatusReceived {
            snapshot: Some(running(5, 50)),
            observed_at: at(0),
        },
    );
    let (state, _) = update(
        state,
        Msg::StatusReceived {
            snapshot: Some(running(5, 55)),
            observed_at: at(2),
        },
    );
    let (state, _) = update(
        state,
        Msg::StatusQueryFailed {
            message: "timeout".to_string(),
        },
    );
    let (state, _) = update(
        state,
        Msg::StatusReceived {
            snapshot: None,
            observed_at: at(4),
        },
    );

    assert_eq!(state.history.len(), 1);
    assert_eq!(state.history.to_vec()[0].progress, 5);
}
