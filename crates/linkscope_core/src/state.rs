use std::collections::{BTreeMap, VecDeque};
use std::time::Duration;

use crate::view_model::AppViewModel;
use crate::{
    HistoryEntry, Phase, RunId, RunPhaseUpdate, RunResult, RunStatus, VendorStage, VendorWorkflow,
};

/// Fixed interval of the status poll tick.
pub const POLL_INTERVAL: Duration = Duration::from_millis(1500);

/// Console lines retained; mirrors the agent's retained stream log.
pub const CONSOLE_CAP: usize = 500;

pub const NOTE_WORKING: &str = "(Working…)";
pub const NOTE_NOT_READY: &str = "(Results not available yet)";
pub const NOTE_LOAD_FAILED: &str = "(Unable to load results)";
pub const NOTE_RUN_FAILED: &str = "(Run failed)";
pub const NOTE_RUN_NOT_FOUND: &str = "(Run not found)";

pub const START_CONFLICT: &str = "A run is already in progress.";
pub const START_REJECTED: &str = "Unable to start diagnostics.";
pub const START_TRANSPORT: &str = "Unexpected error starting diagnostics.";
pub const PRESET_BUSY: &str = "A guided check is already running.";
pub const STARTING_MESSAGE: &str = "Starting diagnostics…";

pub const BUNDLE_DOWNLOADING: &str = "Downloading evidence bundle…";
pub const BUNDLE_UNAVAILABLE: &str = "(Bundle not available)";
pub const BUNDLE_FAILED: &str = "Unable to download evidence bundle.";

/// Guided troubleshooter presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresetKind {
    /// Local-network focus: device scan enabled.
    Lan,
    /// Wide-area focus: device scan skipped.
    Wan,
}

impl PresetKind {
    pub fn scan(self) -> bool {
        matches!(self, PresetKind::Lan)
    }

    pub fn running_message(self) -> &'static str {
        match self {
            PresetKind::Lan => "Local network check running…",
            PresetKind::Wan => "Internet path check running…",
        }
    }

    pub fn success_message(self) -> &'static str {
        match self {
            PresetKind::Lan => "Local network check complete.",
            PresetKind::Wan => "Internet path check complete.",
        }
    }

    pub fn failure_message(self, detail: &str) -> String {
        let prefix = match self {
            PresetKind::Lan => "Local network check failed",
            PresetKind::Wan => "Internet path check failed",
        };
        if detail.is_empty() {
            format!("{prefix}.")
        } else {
            format!("{prefix}: {detail}")
        }
    }
}

/// Live phase/percent/message projection written by both update channels.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProgressModel {
    pub phase: Phase,
    pub percent: f64,
    pub message: String,
}

/// Append-only console log, capped at [`CONSOLE_CAP`] lines.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub(crate) struct Console {
    lines: VecDeque<String>,
}

impl Console {
    fn push(&mut self, line: String) {
        if self.lines.len() == CONSOLE_CAP {
            self.lines.pop_front();
        }
        self.lines.push_back(line);
    }

    fn clear(&mut self) {
        self.lines.clear();
    }

    pub(crate) fn to_vec(&self) -> Vec<String> {
        self.lines.iter().cloned().collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub(crate) struct LauncherState {
    pub(crate) start_pending: bool,
    pub(crate) start_error: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub(crate) struct TroubleshooterState {
    pub(crate) active: Option<PresetKind>,
    /// True from an accepted preset start until its terminal event.
    pub(crate) pending: bool,
    pub(crate) status_message: String,
}

/// What result is currently shown and whether the bundle action applies.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct DisplayState {
    pub(crate) displayed_result: Option<RunResult>,
    pub(crate) displayed_run_id: Option<RunId>,
    /// Most recent run produced by this client session.
    pub(crate) latest_run_id: Option<RunId>,
    pub(crate) bundle_enabled: bool,
    /// Placeholder shown in place of a result.
    pub(crate) results_note: String,
    pub(crate) bundle_note: String,
}

impl Default for DisplayState {
    fn default() -> Self {
        Self {
            displayed_result: None,
            displayed_run_id: None,
            latest_run_id: None,
            bundle_enabled: false,
            results_note: NOTE_NOT_READY.to_string(),
            bundle_note: String::new(),
        }
    }
}

/// At most one run pinned as the compare reference.
#[derive(Debug, Clone, PartialEq)]
pub struct CompareSelection {
    pub run_id: RunId,
    pub result: RunResult,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppState {
    pub(crate) progress: ProgressModel,
    pub(crate) console: Console,
    pub(crate) launcher: LauncherState,
    pub(crate) troubleshooter: TroubleshooterState,
    pub(crate) vendor: VendorWorkflow,
    pub(crate) display: DisplayState,
    pub(crate) compare: Option<CompareSelection>,
    pub(crate) history: Vec<HistoryEntry>,
    pub(crate) cache: BTreeMap<RunId, RunResult>,
    pub(crate) stream_connected: bool,
    /// The terminal action for the current lineage has already run.
    pub(crate) terminal_seen: bool,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> AppViewModel {
        AppViewModel::from_state(self)
    }

    /// Returns whether a render is due and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Applies a push-channel phase event to the projection.
    pub(crate) fn apply_phase(&mut self, update: &RunPhaseUpdate) {
        if update.reset {
            self.reset_transients();
        }
        self.progress.phase = update.name;
        self.progress.percent = update
            .percent
            .unwrap_or_else(|| update.name.default_percent());
        if let Some(message) = update.message.as_deref() {
            if !message.is_empty() {
                self.progress.message = message.to_string();
            }
        }
        // A run moving again re-arms the terminal action (vendor re-runs).
        if !update.name.is_terminal() {
            self.terminal_seen = false;
        }
        self.mark_dirty();
    }

    /// Applies a poll response to the projection. Last applied wins; a stale
    /// poll racing a fresher push is an accepted inconsistency window.
    pub(crate) fn apply_status(&mut self, status: RunStatus) {
        self.progress.phase = status.phase;
        self.progress.percent = status.percent;
        self.progress.message = status.message;
        self.mark_dirty();
    }

    pub(crate) fn push_console_line(&mut self, line: String) {
        self.console.push(line);
        self.mark_dirty();
    }

    pub(crate) fn clear_console(&mut self) {
        self.console.clear();
        self.mark_dirty();
    }

    /// Tears down all transient per-run UI state on a `reset` signal.
    /// The troubleshooter highlight and `latest_run_id` survive; the run
    /// that is starting will resolve or replace them itself.
    pub(crate) fn reset_transients(&mut self) {
        self.console.clear();
        self.vendor = VendorWorkflow::default();
        self.compare = None;
        self.display.displayed_result = None;
        self.display.displayed_run_id = None;
        self.display.bundle_enabled = false;
        self.display.results_note = NOTE_WORKING.to_string();
        self.display.bundle_note.clear();
        self.terminal_seen = false;
        self.mark_dirty();
    }

    /// Bundle availability invariant: only the unpersisted live result or
    /// the latest session run may offer the evidence bundle.
    pub(crate) fn bundle_allowed_for(&self, run_id: Option<&RunId>) -> bool {
        match run_id {
            None => true,
            Some(id) => self.display.latest_run_id.as_ref() == Some(id),
        }
    }

    /// Replaces the displayed result and recomputes dependent panel state.
    pub(crate) fn apply_run_data(
        &mut self,
        result: RunResult,
        run_id: Option<RunId>,
        allow_bundle: bool,
    ) {
        self.display.bundle_enabled = allow_bundle && self.bundle_allowed_for(run_id.as_ref());
        self.display.displayed_result = Some(result);
        self.display.displayed_run_id = run_id;
        self.display.results_note.clear();
        self.mark_dirty();
    }

    /// Clears the results panel to a placeholder.
    pub(crate) fn clear_results_panel(&mut self, note: &str) {
        self.display.displayed_result = None;
        self.display.displayed_run_id = None;
        self.display.bundle_enabled = false;
        self.display.results_note = note.to_string();
        self.mark_dirty();
    }

    /// Caches a persisted terminal result and promotes it to latest.
    pub(crate) fn record_latest(&mut self, result: &RunResult) -> Option<RunId> {
        let run_id = result.history_id.clone()?;
        self.cache.insert(run_id.clone(), result.clone());
        self.display.latest_run_id = Some(run_id.clone());
        Some(run_id)
    }

    /// Inspects a live-lineage result for vendor suggestions and drives the
    /// workflow stage. The one-time automatic prompt is gated per lineage.
    pub(crate) fn inspect_result_for_vendor(&mut self, result: &RunResult) {
        if !result.vendor_summaries.is_empty() || !result.vendor_findings.is_empty() {
            self.vendor.stage = VendorStage::Summarized;
            self.vendor.suggestions = result.vendor_suggestions.clone();
            self.vendor.submitting = false;
            self.mark_dirty();
            return;
        }

        if result.vendor_suggestions.is_empty() {
            self.vendor.stage = VendorStage::Idle;
            self.vendor.suggestions.clear();
            self.mark_dirty();
            return;
        }

        // Credentials already submitted; suggestions alone must not
        // regress the stage while the vendor checks run.
        if self.vendor.stage == VendorStage::Submitted {
            self.vendor.suggestions = result.vendor_suggestions.clone();
            return;
        }

        self.vendor.suggestions = result.vendor_suggestions.clone();
        self.vendor.form.clear_unsuggested(&self.vendor.suggestions);
        if !self.vendor.prompt_shown {
            self.vendor.stage = VendorStage::Prompting;
            self.vendor.prompt_shown = true;
        } else if self.vendor.stage == VendorStage::Idle {
            self.vendor.stage = VendorStage::Suggested;
        }
        self.mark_dirty();
    }

    pub(crate) fn set_compare(&mut self, run_id: RunId, result: RunResult) {
        self.compare = Some(CompareSelection { run_id, result });
        self.mark_dirty();
    }
}
