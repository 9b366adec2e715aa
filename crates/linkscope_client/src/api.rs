use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::StatusCode;
use url::Url;

use linkscope_core::{HistoryEntry, RunResult, RunStatus, StartRequest, VendorCredentials};

use crate::bundle::attachment_filename;
use crate::error::{ApiError, StartError, VendorSubmitError};
use crate::settings::ClientSettings;

/// A downloaded evidence bundle, not yet written to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundlePayload {
    /// Filename hinted by the agent, if it sent a usable one.
    pub filename: Option<String>,
    pub bytes: Vec<u8>,
}

/// Request/response surface of the diagnostics agent.
#[async_trait::async_trait]
pub trait DiagnosticsApi: Send + Sync {
    async fn start(&self, request: &StartRequest) -> Result<(), StartError>;
    async fn status(&self) -> Result<RunStatus, ApiError>;
    /// `None` when the agent has no completed run yet (204).
    async fn results(&self) -> Result<Option<RunResult>, ApiError>;
    async fn history(&self) -> Result<Vec<HistoryEntry>, ApiError>;
    async fn run_detail(&self, run_id: &str) -> Result<RunResult, ApiError>;
    async fn submit_vendor(&self, creds: &VendorCredentials) -> Result<(), VendorSubmitError>;
    /// `None` when no bundle is available for the current state (204).
    async fn bundle(&self) -> Result<Option<BundlePayload>, ApiError>;
}

pub struct HttpApi {
    client: reqwest::Client,
    base: Url,
    request_timeout: std::time::Duration,
}

impl HttpApi {
    pub fn new(settings: &ClientSettings) -> Result<Self, ApiError> {
        // No client-level request timeout: the push stream request stays
        // open indefinitely. Plain endpoints set one per request.
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .build()
            .map_err(|err| ApiError::Transport(err.to_string()))?;
        Ok(Self {
            client,
            base: settings.base_url.clone(),
            request_timeout: settings.request_timeout,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        self.base
            .join(path)
            .map_err(|err| ApiError::Transport(err.to_string()))
    }

    fn get(&self, url: Url) -> reqwest::RequestBuilder {
        self.client.get(url).timeout(self.request_timeout)
    }

    /// Opens the push event stream request. The caller owns reconnects.
    pub(crate) async fn open_stream(&self) -> Result<reqwest::Response, ApiError> {
        let url = self.endpoint("api/stream")?;
        let response = self
            .client
            .get(url)
            .header(ACCEPT, "text/event-stream")
            .send()
            .await
            .map_err(ApiError::from_reqwest)?;
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::HttpStatus(status.as_u16()));
        }
        Ok(response)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = self
            .get(self.endpoint(path)?)
            .send()
            .await
            .map_err(ApiError::from_reqwest)?;
        let status = response.status();
        if status != StatusCode::OK {
            return Err(ApiError::HttpStatus(status.as_u16()));
        }
        decode_json(response).await
    }
}

#[async_trait::async_trait]
impl DiagnosticsApi for HttpApi {
    async fn start(&self, request: &StartRequest) -> Result<(), StartError> {
        let url = self
            .endpoint("api/start")
            .map_err(|err| StartError::Transport(err.to_string()))?;
        let body = serde_json::to_vec(request)
            .map_err(|err| StartError::Transport(err.to_string()))?;
        let response = self
            .client
            .post(url)
            .timeout(self.request_timeout)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(|err| StartError::Transport(err.to_string()))?;

        match response.status() {
            StatusCode::CONFLICT => Err(StartError::Conflict(plain_reason(response).await)),
            status if status.is_success() => Ok(()),
            status => Err(StartError::Rejected(status.as_u16())),
        }
    }

    async fn status(&self) -> Result<RunStatus, ApiError> {
        self.get_json("api/status").await
    }

    async fn results(&self) -> Result<Option<RunResult>, ApiError> {
        let response = self
            .get(self.endpoint("api/results")?)
            .send()
            .await
            .map_err(ApiError::from_reqwest)?;
        match response.status() {
            StatusCode::OK => Ok(Some(decode_json(response).await?)),
            StatusCode::NO_CONTENT => Ok(None),
            status => Err(ApiError::HttpStatus(status.as_u16())),
        }
    }

    async fn history(&self) -> Result<Vec<HistoryEntry>, ApiError> {
        self.get_json("api/history").await
    }

    async fn run_detail(&self, run_id: &str) -> Result<RunResult, ApiError> {
        self.get_json(&format!("api/run/{run_id}")).await
    }

    async fn submit_vendor(&self, creds: &VendorCredentials) -> Result<(), VendorSubmitError> {
        let url = self
            .endpoint("api/vendor")
            .map_err(|err| VendorSubmitError::Transport(err.to_string()))?;
        let body = serde_json::to_vec(creds)
            .map_err(|err| VendorSubmitError::Transport(err.to_string()))?;
        let response = self
            .client
            .post(url)
            .timeout(self.request_timeout)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(|err| VendorSubmitError::Transport(err.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let mut reason = plain_reason(response).await;
        if reason.is_empty() {
            reason = format!("vendor request refused with status {}", status.as_u16());
        }
        Err(VendorSubmitError::Rejected(reason))
    }

    async fn bundle(&self) -> Result<Option<BundlePayload>, ApiError> {
        let response = self
            .get(self.endpoint("api/bundle")?)
            .send()
            .await
            .map_err(ApiError::from_reqwest)?;
        match response.status() {
            StatusCode::OK => {
                let filename = response
                    .headers()
                    .get(reqwest::header::CONTENT_DISPOSITION)
                    .and_then(|value| value.to_str().ok())
                    .and_then(attachment_filename);
                let bytes = response
                    .bytes()
                    .await
                    .map_err(ApiError::from_reqwest)?
                    .to_vec();
                Ok(Some(BundlePayload { filename, bytes }))
            }
            StatusCode::NO_CONTENT => Ok(None),
            status => Err(ApiError::HttpStatus(status.as_u16())),
        }
    }
}

async fn decode_json<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, ApiError> {
    let bytes = response.bytes().await.map_err(ApiError::from_reqwest)?;
    serde_json::from_slice(&bytes).map_err(|err| ApiError::Decode(err.to_string()))
}

/// The agent answers refusals with a short plain-text reason body.
async fn plain_reason(response: reqwest::Response) -> String {
    response
        .text()
        .await
        .map(|text| text.trim().to_string())
        .unwrap_or_default()
}
