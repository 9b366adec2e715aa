use thiserror::Error;

/// Failures of plain request/response endpoints.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(String),
    #[error("request timed out")]
    Timeout,
    #[error("unexpected status {0}")]
    HttpStatus(u16),
    #[error("invalid response body: {0}")]
    Decode(String),
}

impl ApiError {
    pub(crate) fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::Timeout
        } else {
            ApiError::Transport(err.to_string())
        }
    }
}

/// Failures of the run start request.
#[derive(Debug, Error)]
pub enum StartError {
    /// The agent refused because a run is active; carries its reason text.
    #[error("{0}")]
    Conflict(String),
    #[error("start refused with status {0}")]
    Rejected(u16),
    #[error("start request failed: {0}")]
    Transport(String),
}

/// Failures of the vendor credential submission.
#[derive(Debug, Error)]
pub enum VendorSubmitError {
    /// The agent refused the submission; carries its reason text.
    #[error("{0}")]
    Rejected(String),
    #[error("vendor request failed: {0}")]
    Transport(String),
}

/// Failures of the evidence bundle download.
#[derive(Debug, Error)]
pub enum BundleError {
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("could not save bundle: {0}")]
    Save(#[from] std::io::Error),
}
