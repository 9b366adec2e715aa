use crate::{RunId, StartRequest, VendorCredentials};

/// IO requested by the update loop; executed by the platform shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Open the push event stream (held open and reconnected by the engine).
    ConnectStream,
    /// Submit a run start request.
    StartRun(StartRequest),
    /// Poll the live status projection once.
    FetchStatus,
    /// Fetch the completed run's full result.
    FetchResults,
    /// Refresh the history list.
    FetchHistory,
    /// Fetch one historical run's detail.
    FetchRunDetail { run_id: RunId, purpose: DetailPurpose },
    /// Submit vendor credentials for the follow-up checks.
    SubmitVendor(VendorCredentials),
    /// Download the evidence bundle of the displayed run.
    FetchBundle,
}

/// What a fetched run detail is for once it arrives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailPurpose {
    /// Show it as the displayed result.
    Display,
    /// Pin it as the compare reference.
    ComparePin,
}
