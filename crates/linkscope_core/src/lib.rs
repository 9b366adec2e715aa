//! LinkScope core: pure state machine and view-model helpers.
mod compare;
mod effect;
mod msg;
mod phase;
mod report;
mod state;
mod update;
mod vendor;
mod view_model;

pub use compare::{
    compare_rows, format_delta, format_metric, format_percent, CompareRow, NOT_APPLICABLE,
};
pub use effect::{DetailPurpose, Effect};
pub use msg::{BundleFailure, DetailOutcome, Msg, ResultsResponse, StartFailure};
pub use phase::Phase;
pub use report::{
    DiscoveredHost, DnsProbe, Finding, HistoryEntry, InterfaceInfo, MtuProbe, NetInfo, PingStats,
    RunDoneUpdate, RunId, RunOutcome, RunPhaseUpdate, RunResult, RunStatus, RunStepUpdate,
    StartRequest, TraceProbe, VendorCredentials,
};
pub use state::{
    AppState, CompareSelection, PresetKind, ProgressModel, BUNDLE_DOWNLOADING, BUNDLE_FAILED,
    BUNDLE_UNAVAILABLE, CONSOLE_CAP, NOTE_LOAD_FAILED, NOTE_NOT_READY, NOTE_RUN_FAILED,
    NOTE_RUN_NOT_FOUND, NOTE_WORKING, POLL_INTERVAL, PRESET_BUSY, START_CONFLICT, START_REJECTED,
    START_TRANSPORT, STARTING_MESSAGE,
};
pub use update::{session_start, update};
pub use vendor::{
    section_suggested, validate_submission, VendorField, VendorForm, VendorStage, VendorTag,
    VendorWorkflow, VENDOR_BAD_PORT, VENDOR_CISCO_INCOMPLETE, VENDOR_FORTI_INCOMPLETE,
    VENDOR_NO_SECTION,
};
pub use view_model::{
    AppViewModel, CompareView, HistoryRowView, Panel, TroubleshooterView, VendorCardView,
};
