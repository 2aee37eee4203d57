use crate::{apply_status, ClientJobState, Effect, JobFailure, Lifecycle, Msg, Transition};

/// Pure update function: applies a message to state and returns any effects.
///
/// Poll results for a job that is no longer launching or running are
/// dropped, so each terminal outcome produces exactly one notification.
pub fn update(mut state: ClientJobState, msg: Msg) -> (ClientJobState, Vec<Effect>) {
    let effects = match msg {
        Msg::StartRequested { .. } => {
            if state.lifecycle.is_active() {
                return (state, Vec::new());
            }
            state = state.reset();
            state.launch_seq = state.launch_seq.wrapping_add(1);
            state.lifecycle = Lifecycle::Launching;
            Vec::new()
        }
        Msg::Launched { handle, launch_seq } => {
            if !awaits_launch(&state, launch_seq) {
                return (state, Vec::new());
            }
            state.lifecycle = Lifecycle::Running;
            state.consecutive_error_count = 0;
            state.error_message = None;
            state.handle = Some(handle.clone());
            vec![Effect::StartPolling { handle }]
        }
        Msg::LaunchFailed {
            message,
            launch_seq,
        } => {
            if !awaits_launch(&state, launch_seq) {
                return (state, Vec::new());
            }
            let failure = JobFailure::LaunchFailed { message };
            state.lifecycle = Lifecycle::Failed;
            state.error_message = Some(failure.to_string());
            vec![Effect::NotifyError(failure)]
        }
        Msg::StatusReceived {
            snapshot,
            observed_at,
        } => {
            if !state.lifecycle.is_active() {
                return (state, vec![Effect::StopPolling]);
            }
            if let Some(snapshot) = snapshot.as_ref() {
                state.history.record(observed_at, snapshot);
                state.policy().governor().on_success(&mut state);
            }
            match apply_status(&mut state, snapshot) {
                Transition::Continue => Vec::new(),
                Transition::Completed(snapshot) => {
                    vec![Effect::StopPolling, Effect::NotifyComplete(snapshot)]
                }
                Transition::Failed(failure) => {
                    vec![Effect::StopPolling, Effect::NotifyError(failure)]
                }
            }
        }
        Msg::StatusQueryFailed { message } => {
            if !state.lifecycle.is_active() {
                return (state, vec![Effect::StopPolling]);
            }
            let governor = state.policy().governor();
            match governor.on_failure(&mut state, &message) {
                Some(failure) => vec![Effect::StopPolling, Effect::NotifyError(failure)],
                None => Vec::new(),
            }
        }
        Msg::Stopped => {
            if !state.lifecycle.is_terminal() {
                state = state.reset();
            }
            Vec::new()
        }
    };

    (state, effects)
}

/// Only the launch that started the current `Launching` phase may settle it.
fn awaits_launch(state: &ClientJobState, launch_seq: u64) -> bool {
    state.lifecycle == Lifecycle::Launching && state.launch_seq == launch_seq
}
