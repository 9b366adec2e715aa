use crate::vendor::validate_submission;
use crate::{
    AppState, BundleFailure, DetailOutcome, DetailPurpose, Effect, Msg, Phase, PresetKind,
    ResultsResponse, RunDoneUpdate, RunOutcome, StartFailure, StartRequest, VendorForm,
    VendorStage, BUNDLE_DOWNLOADING, BUNDLE_FAILED, BUNDLE_UNAVAILABLE, NOTE_LOAD_FAILED,
    NOTE_NOT_READY, NOTE_RUN_FAILED, NOTE_RUN_NOT_FOUND, NOTE_WORKING, PRESET_BUSY,
    START_CONFLICT, START_REJECTED, START_TRANSPORT, STARTING_MESSAGE,
};

/// Initial state and boot effects for a new session: open the push stream,
/// take one status snapshot and load the run history.
pub fn session_start() -> (AppState, Vec<Effect>) {
    (
        AppState::new(),
        vec![
            Effect::ConnectStream,
            Effect::FetchStatus,
            Effect::FetchHistory,
        ],
    )
}

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::StartClicked { target, scan } => start_run(&mut state, target, scan, None),
        Msg::PresetClicked(kind) => {
            if state.troubleshooter.pending {
                state.launcher.start_error = PRESET_BUSY.to_string();
                state.mark_dirty();
                Vec::new()
            } else {
                start_run(&mut state, String::new(), kind.scan(), Some(kind))
            }
        }
        Msg::StartFinished(result) => finish_start(&mut state, result),
        Msg::StreamConnected { reconnect } => {
            state.stream_connected = true;
            // The agent replays its retained event log to every new
            // subscriber; the console is rebuilt from that replay.
            state.clear_console();
            if reconnect {
                vec![Effect::FetchStatus]
            } else {
                Vec::new()
            }
        }
        Msg::StreamDropped => {
            state.stream_connected = false;
            state.mark_dirty();
            Vec::new()
        }
        Msg::StreamPhase(update) => {
            state.apply_phase(&update);
            Vec::new()
        }
        Msg::StreamStep(step) => {
            state.push_console_line(step.text);
            Vec::new()
        }
        Msg::StreamDone(done) => finish_run(&mut state, done),
        Msg::PollTick => {
            if state.progress.phase.in_progress() {
                vec![Effect::FetchStatus]
            } else {
                Vec::new()
            }
        }
        Msg::StatusFetched(status) => {
            state.apply_status(status);
            Vec::new()
        }
        Msg::ResultsFetched(response) => match response {
            ResultsResponse::Ready(result) => {
                let run_id = state.record_latest(&result);
                state.inspect_result_for_vendor(&result);
                state.apply_run_data(result, run_id, true);
                vec![Effect::FetchHistory]
            }
            ResultsResponse::NotReady => {
                state.clear_results_panel(NOTE_NOT_READY);
                Vec::new()
            }
            ResultsResponse::Failed => {
                state.clear_results_panel(NOTE_LOAD_FAILED);
                Vec::new()
            }
        },
        Msg::HistoryFetched(entries) => {
            state.history = entries;
            state.mark_dirty();
            Vec::new()
        }
        Msg::HistorySelected(run_id) => match state.cache.get(&run_id).cloned() {
            Some(result) => {
                state.apply_run_data(result, Some(run_id), true);
                vec![Effect::FetchHistory]
            }
            None => vec![
                Effect::FetchRunDetail {
                    run_id,
                    purpose: DetailPurpose::Display,
                },
                Effect::FetchHistory,
            ],
        },
        Msg::RunDetailFetched {
            run_id,
            purpose,
            outcome,
        } => match outcome {
            DetailOutcome::Ready(result) => {
                state.cache.insert(run_id.clone(), result.clone());
                match purpose {
                    DetailPurpose::Display => state.apply_run_data(result, Some(run_id), true),
                    DetailPurpose::ComparePin => state.set_compare(run_id, result),
                }
                Vec::new()
            }
            DetailOutcome::NotFound => {
                // The entry was pruned server-side; refresh the list.
                if purpose == DetailPurpose::Display {
                    state.clear_results_panel(NOTE_RUN_NOT_FOUND);
                }
                vec![Effect::FetchHistory]
            }
            DetailOutcome::Failed => {
                if purpose == DetailPurpose::Display {
                    state.clear_results_panel(NOTE_LOAD_FAILED);
                }
                Vec::new()
            }
        },
        Msg::ComparePinned(run_id) => {
            if state
                .compare
                .as_ref()
                .is_some_and(|sel| sel.run_id == run_id)
            {
                state.compare = None;
                state.mark_dirty();
                Vec::new()
            } else if let Some(result) = state.cache.get(&run_id).cloned() {
                state.set_compare(run_id, result);
                Vec::new()
            } else {
                vec![Effect::FetchRunDetail {
                    run_id,
                    purpose: DetailPurpose::ComparePin,
                }]
            }
        }
        Msg::CompareCleared => {
            if state.compare.take().is_some() {
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::VendorPromptOpened => {
            if !state.vendor.suggestions.is_empty() && state.vendor.stage != VendorStage::Prompting
            {
                state.vendor.stage = VendorStage::Prompting;
                state.vendor.error.clear();
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::VendorPromptDismissed => {
            if state.vendor.stage == VendorStage::Prompting {
                state.vendor.stage = VendorStage::Suggested;
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::VendorFieldEdited { field, value } => {
            if state.vendor.stage == VendorStage::Prompting {
                state.vendor.form.set(field, value);
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::VendorSubmitClicked => submit_vendor(&mut state),
        Msg::VendorSubmitFinished(result) => {
            state.vendor.submitting = false;
            match result {
                Ok(()) => {
                    state.vendor.stage = VendorStage::Submitted;
                    state.vendor.error.clear();
                    state.vendor.form = VendorForm::default();
                }
                Err(reason) => {
                    if state.vendor.stage == VendorStage::Prompting {
                        state.vendor.error = reason;
                    }
                }
            }
            state.mark_dirty();
            Vec::new()
        }
        Msg::BundleRequested => {
            if state.display.bundle_enabled {
                state.display.bundle_note = BUNDLE_DOWNLOADING.to_string();
                state.mark_dirty();
                vec![Effect::FetchBundle]
            } else {
                Vec::new()
            }
        }
        Msg::BundleFetched(result) => {
            state.display.bundle_note = match result {
                Ok(path) => format!("Evidence bundle saved to {}", path.display()),
                Err(BundleFailure::Unavailable) => BUNDLE_UNAVAILABLE.to_string(),
                Err(BundleFailure::Failed) => BUNDLE_FAILED.to_string(),
            };
            state.mark_dirty();
            Vec::new()
        }
        Msg::NoOp => Vec::new(),
    };

    (state, effects)
}

fn start_run(
    state: &mut AppState,
    target: String,
    scan: bool,
    preset: Option<PresetKind>,
) -> Vec<Effect> {
    if state.launcher.start_pending {
        return Vec::new();
    }
    state.launcher.start_pending = true;
    state.launcher.start_error.clear();
    if let Some(kind) = preset {
        state.troubleshooter.active = Some(kind);
        state.troubleshooter.pending = true;
        state.troubleshooter.status_message = kind.running_message().to_string();
    }
    state.mark_dirty();
    vec![Effect::StartRun(StartRequest {
        target: target.trim().to_string(),
        scan,
    })]
}

fn finish_start(state: &mut AppState, result: Result<(), StartFailure>) -> Vec<Effect> {
    state.launcher.start_pending = false;
    match result {
        Ok(()) => {
            // Optimistic projection so the interface never looks idle right
            // after an accepted start.
            state.progress.phase = Phase::Starting;
            state.progress.percent = Phase::Starting.default_percent();
            state.progress.message = STARTING_MESSAGE.to_string();
            state.clear_results_panel(NOTE_WORKING);
            state.terminal_seen = false;
            if !state.troubleshooter.pending {
                // A plain accepted start drops any lingering preset focus.
                state.troubleshooter.active = None;
                state.troubleshooter.status_message.clear();
            }
        }
        Err(failure) => {
            state.launcher.start_error = match failure {
                StartFailure::Conflict(reason) if !reason.is_empty() => reason,
                StartFailure::Conflict(_) => START_CONFLICT.to_string(),
                StartFailure::Rejected => START_REJECTED.to_string(),
                StartFailure::Transport => START_TRANSPORT.to_string(),
            };
            if state.troubleshooter.pending {
                state.troubleshooter.pending = false;
                state.troubleshooter.active = None;
                state.troubleshooter.status_message.clear();
            }
        }
    }
    state.mark_dirty();
    Vec::new()
}

fn finish_run(state: &mut AppState, done: RunDoneUpdate) -> Vec<Effect> {
    // Replayed terminal events (stream replay after reconnect) must not
    // re-run the terminal action.
    if state.terminal_seen {
        return Vec::new();
    }
    state.terminal_seen = true;

    let phase = match done.outcome {
        RunOutcome::Finished => Phase::Finished,
        RunOutcome::Error => Phase::Error,
    };
    state.progress.phase = phase;
    state.progress.percent = phase.default_percent();
    let detail = done.message.unwrap_or_default();
    if !detail.is_empty() {
        state.progress.message = detail.clone();
    }

    if state.troubleshooter.pending {
        state.troubleshooter.pending = false;
        if let Some(kind) = state.troubleshooter.active {
            state.troubleshooter.status_message = match done.outcome {
                RunOutcome::Finished => kind.success_message().to_string(),
                RunOutcome::Error => kind.failure_message(&detail),
            };
        }
    }
    state.mark_dirty();

    match done.outcome {
        RunOutcome::Finished => vec![Effect::FetchResults],
        RunOutcome::Error => {
            state.clear_results_panel(NOTE_RUN_FAILED);
            Vec::new()
        }
    }
}

fn submit_vendor(state: &mut AppState) -> Vec<Effect> {
    if state.vendor.stage != VendorStage::Prompting || state.vendor.submitting {
        return Vec::new();
    }
    match validate_submission(&state.vendor.form, &state.vendor.suggestions) {
        Ok(creds) => {
            state.vendor.submitting = true;
            state.vendor.error.clear();
            state.mark_dirty();
            vec![Effect::SubmitVendor(creds)]
        }
        Err(message) => {
            // Local pre-validation failure: no network call is made.
            state.vendor.error = message;
            state.mark_dirty();
            Vec::new()
        }
    }
}
