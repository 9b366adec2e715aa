use std::path::PathBuf;

use crate::{
    DetailPurpose, HistoryEntry, PresetKind, RunDoneUpdate, RunId, RunPhaseUpdate, RunResult,
    RunStatus, RunStepUpdate, VendorField,
};

#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// User submitted a plain run start.
    StartClicked { target: String, scan: bool },
    /// User selected a guided troubleshooter preset.
    PresetClicked(PresetKind),
    /// User selected a run from the history list.
    HistorySelected(RunId),
    /// User pinned (or toggled off) a run as the compare reference.
    ComparePinned(RunId),
    /// User cleared the compare pin.
    CompareCleared,
    /// User asked to open the vendor credential prompt.
    VendorPromptOpened,
    /// User dismissed the vendor credential prompt.
    VendorPromptDismissed,
    /// User edited one vendor credential field.
    VendorFieldEdited { field: VendorField, value: String },
    /// User submitted the vendor credential form.
    VendorSubmitClicked,
    /// User asked for the displayed run's evidence bundle.
    BundleRequested,
    /// Fixed-interval status poll tick.
    PollTick,
    /// Push stream (re)connected; the server replays its retained log next.
    StreamConnected { reconnect: bool },
    /// Push stream dropped; the engine is backing off before reconnecting.
    StreamDropped,
    /// Push stream delivered a phase event.
    StreamPhase(RunPhaseUpdate),
    /// Push stream delivered a console step line.
    StreamStep(RunStepUpdate),
    /// Push stream delivered the terminal event.
    StreamDone(RunDoneUpdate),
    /// The start request finished.
    StartFinished(Result<(), StartFailure>),
    /// A status poll returned.
    StatusFetched(RunStatus),
    /// The completed-run result fetch returned.
    ResultsFetched(ResultsResponse),
    /// The history list fetch returned.
    HistoryFetched(Vec<HistoryEntry>),
    /// A historical run detail fetch returned.
    RunDetailFetched {
        run_id: RunId,
        purpose: DetailPurpose,
        outcome: DetailOutcome,
    },
    /// The vendor credential submission finished; `Err` carries the
    /// server's plain-text reason.
    VendorSubmitFinished(Result<(), String>),
    /// The evidence bundle download finished.
    BundleFetched(Result<PathBuf, BundleFailure>),
    /// Fallback for placeholder wiring.
    NoOp,
}

/// Start request failures, as seen by the state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartFailure {
    /// Another run is active (409); carries the server's reason text.
    Conflict(String),
    /// The server refused the request for any other reason.
    Rejected,
    /// The request never completed.
    Transport,
}

/// Outcome of the completed-run result fetch.
#[derive(Debug, Clone, PartialEq)]
pub enum ResultsResponse {
    Ready(RunResult),
    /// Explicit empty response: no completed run to show yet.
    NotReady,
    Failed,
}

/// Outcome of a historical run detail fetch.
#[derive(Debug, Clone, PartialEq)]
pub enum DetailOutcome {
    Ready(RunResult),
    /// The entry has been pruned server-side.
    NotFound,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BundleFailure {
    /// Explicit empty response: no bundle for the current state.
    Unavailable,
    Failed,
}
