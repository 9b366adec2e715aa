use crate::compare::{compare_rows, format_percent, CompareRow};
use crate::state::AppState;
use crate::vendor::section_suggested;
use crate::{Phase, PresetKind, RunId, RunResult, VendorForm, VendorStage, VendorTag};

/// Panels a troubleshooter preset can put in focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Panel {
    LocalPerformance,
    WanPerformance,
    Devices,
    Compare,
    Console,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryRowView {
    pub id: RunId,
    pub when_label: String,
    pub target: String,
    pub classification: String,
    pub displayed: bool,
    pub pinned: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompareView {
    pub reference_id: RunId,
    /// Empty when nothing is displayed to compare against.
    pub rows: Vec<CompareRow>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VendorCardView {
    pub visible: bool,
    pub stage: VendorStage,
    pub suggestion_labels: Vec<String>,
    pub prompt_open: bool,
    /// Whether the firewall credential section is offered by the prompt.
    pub forti_section: bool,
    /// Whether the router/switch credential section is offered.
    pub cisco_section: bool,
    pub form: VendorForm,
    pub error: String,
    pub submitting: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TroubleshooterView {
    pub active: Option<PresetKind>,
    pub status_message: String,
}

/// Immutable render projection of the whole application state.
#[derive(Debug, Clone, PartialEq)]
pub struct AppViewModel {
    pub phase: Phase,
    /// Clamped to 0..100, one decimal.
    pub percent_label: String,
    pub status_message: String,
    pub stream_connected: bool,
    pub console: Vec<String>,
    pub start_error: String,
    pub results_note: String,
    pub displayed: Option<RunResult>,
    pub displayed_run_id: Option<RunId>,
    pub latest_run_id: Option<RunId>,
    pub bundle_enabled: bool,
    pub bundle_note: String,
    pub history: Vec<HistoryRowView>,
    pub compare: Option<CompareView>,
    pub vendor: VendorCardView,
    pub troubleshooter: TroubleshooterView,
    pub highlighted: Vec<Panel>,
    pub dirty: bool,
}

impl AppViewModel {
    pub(crate) fn from_state(state: &AppState) -> Self {
        let displayed = state.display.displayed_result.clone();

        let history = state
            .history
            .iter()
            .map(|entry| HistoryRowView {
                id: entry.id.clone(),
                when_label: entry
                    .when
                    .map(|when| when.format("%Y-%m-%d %H:%M").to_string())
                    .unwrap_or_default(),
                target: entry.target.clone(),
                classification: entry.classification.clone(),
                displayed: state.display.displayed_run_id.as_ref() == Some(&entry.id),
                pinned: state
                    .compare
                    .as_ref()
                    .is_some_and(|sel| sel.run_id == entry.id),
            })
            .collect();

        let compare = state.compare.as_ref().map(|sel| CompareView {
            reference_id: sel.run_id.clone(),
            rows: displayed
                .as_ref()
                .map(|current| compare_rows(current, &sel.result))
                .unwrap_or_default(),
        });

        let vendor = VendorCardView {
            visible: state.vendor.stage != VendorStage::Idle
                || !state.vendor.suggestions.is_empty(),
            stage: state.vendor.stage,
            suggestion_labels: state
                .vendor
                .suggestions
                .iter()
                .map(|tag| match VendorTag::from_wire(tag) {
                    Some(known) => known.label().to_string(),
                    None => tag.clone(),
                })
                .collect(),
            prompt_open: state.vendor.stage == VendorStage::Prompting,
            forti_section: section_suggested(&state.vendor.suggestions, VendorTag::Fortigate),
            cisco_section: section_suggested(&state.vendor.suggestions, VendorTag::CiscoIos),
            form: state.vendor.form.clone(),
            error: state.vendor.error.clone(),
            submitting: state.vendor.submitting,
        };

        let highlighted = match state.troubleshooter.active {
            Some(PresetKind::Lan) => {
                vec![Panel::LocalPerformance, Panel::Devices, Panel::Console]
            }
            Some(PresetKind::Wan) => {
                vec![Panel::WanPerformance, Panel::Compare, Panel::Console]
            }
            None => Vec::new(),
        };

        Self {
            phase: state.progress.phase,
            percent_label: format_percent(state.progress.percent),
            status_message: state.progress.message.clone(),
            stream_connected: state.stream_connected,
            console: state.console.to_vec(),
            start_error: state.launcher.start_error.clone(),
            results_note: state.display.results_note.clone(),
            displayed,
            displayed_run_id: state.display.displayed_run_id.clone(),
            latest_run_id: state.display.latest_run_id.clone(),
            bundle_enabled: state.display.bundle_enabled,
            bundle_note: state.display.bundle_note.clone(),
            history,
            compare,
            vendor,
            troubleshooter: TroubleshooterView {
                active: state.troubleshooter.active,
                status_message: state.troubleshooter.status_message.clone(),
            },
            highlighted,
            dirty: state.is_dirty(),
        }
    }
}
