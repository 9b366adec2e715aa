use std::sync::Once;

use linkscope_core::{
    session_start, update, AppState, Effect, Msg, Panel, PresetKind, RunDoneUpdate, RunOutcome,
    StartFailure, StartRequest, PRESET_BUSY, START_CONFLICT,
};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(console_logging::initialize_for_tests);
}

fn booted() -> AppState {
    let (state, _) = session_start();
    state
}

fn preset_started(kind: PresetKind) -> AppState {
    let (state, _) = update(booted(), Msg::PresetClicked(kind));
    let (state, _) = update(state, Msg::StartFinished(Ok(())));
    state
}

#[test]
fn lan_preset_starts_a_scan_run_and_focuses_local_panels() {
    init_logging();
    let state = booted();

    let (state, effects) = update(state, Msg::PresetClicked(PresetKind::Lan));

    assert_eq!(
        effects,
        vec![Effect::StartRun(StartRequest {
            target: String::new(),
            scan: true,
        })]
    );
    let view = state.view();
    assert_eq!(view.troubleshooter.active, Some(PresetKind::Lan));
    assert_eq!(
        view.troubleshooter.status_message,
        "Local network check running…"
    );
    assert_eq!(
        view.highlighted,
        vec![Panel::LocalPerformance, Panel::Devices, Panel::Console]
    );
}

#[test]
fn wan_preset_skips_the_device_scan() {
    init_logging();
    let state = booted();

    let (state, effects) = update(state, Msg::PresetClicked(PresetKind::Wan));

    assert_eq!(
        effects,
        vec![Effect::StartRun(StartRequest {
            target: String::new(),
            scan: false,
        })]
    );
    assert_eq!(
        state.view().highlighted,
        vec![Panel::WanPerformance, Panel::Compare, Panel::Console]
    );
}

#[test]
fn preset_clicked_while_one_is_running_is_refused() {
    init_logging();
    let state = preset_started(PresetKind::Lan);

    let (state, effects) = update(state, Msg::PresetClicked(PresetKind::Wan));

    assert!(effects.is_empty());
    let view = state.view();
    assert_eq!(view.start_error, PRESET_BUSY);
    assert_eq!(view.troubleshooter.active, Some(PresetKind::Lan));
}

#[test]
fn finished_preset_reports_completion_and_keeps_the_focus() {
    init_logging();
    let state = preset_started(PresetKind::Lan);

    let (state, _) = update(
        state,
        Msg::StreamDone(RunDoneUpdate {
            outcome: RunOutcome::Finished,
            message: None,
        }),
    );

    let view = state.view();
    assert_eq!(
        view.troubleshooter.status_message,
        "Local network check complete."
    );
    // The focus stays until another start replaces it.
    assert_eq!(view.troubleshooter.active, Some(PresetKind::Lan));
    assert!(!view.highlighted.is_empty());
}

#[test]
fn failed_preset_carries_the_terminal_detail() {
    init_logging();
    let state = preset_started(PresetKind::Wan);

    let (state, _) = update(
        state,
        Msg::StreamDone(RunDoneUpdate {
            outcome: RunOutcome::Error,
            message: Some("no default route".to_string()),
        }),
    );

    assert_eq!(
        state.view().troubleshooter.status_message,
        "Internet path check failed: no default route"
    );
}

#[test]
fn failed_preset_without_detail_still_reads_as_a_sentence() {
    init_logging();
    let state = preset_started(PresetKind::Wan);

    let (state, _) = update(
        state,
        Msg::StreamDone(RunDoneUpdate {
            outcome: RunOutcome::Error,
            message: None,
        }),
    );

    assert_eq!(
        state.view().troubleshooter.status_message,
        "Internet path check failed."
    );
}

#[test]
fn refused_preset_start_drops_the_focus() {
    init_logging();
    let state = booted();
    let (state, _) = update(state, Msg::PresetClicked(PresetKind::Lan));

    let (state, _) = update(
        state,
        Msg::StartFinished(Err(StartFailure::Conflict(String::new()))),
    );

    let view = state.view();
    assert_eq!(view.start_error, START_CONFLICT);
    assert_eq!(view.troubleshooter.active, None);
    assert!(view.troubleshooter.status_message.is_empty());
    assert!(view.highlighted.is_empty());
}

#[test]
fn plain_start_clears_a_lingering_preset_focus() {
    init_logging();
    let state = preset_started(PresetKind::Lan);
    let (state, _) = update(
        state,
        Msg::StreamDone(RunDoneUpdate {
            outcome: RunOutcome::Finished,
            message: None,
        }),
    );

    let (state, _) = update(
        state,
        Msg::StartClicked {
            target: "8.8.8.8".to_string(),
            scan: false,
        },
    );
    let (state, _) = update(state, Msg::StartFinished(Ok(())));

    let view = state.view();
    assert_eq!(view.troubleshooter.active, None);
    assert!(view.highlighted.is_empty());
}

#[test]
fn plain_start_during_a_preset_run_is_left_to_the_agent() {
    init_logging();
    let state = preset_started(PresetKind::Lan);

    // Not refused locally; the agent decides (and answers 409).
    let (_state, effects) = update(
        state,
        Msg::StartClicked {
            target: String::new(),
            scan: true,
        },
    );

    assert_eq!(
        effects,
        vec![Effect::StartRun(StartRequest {
            target: String::new(),
            scan: true,
        })]
    );
}
