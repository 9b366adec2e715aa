use std::path::{Path, PathBuf};
use std::sync::{mpsc, Arc, Mutex};
use std::thread;

use tokio_util::sync::CancellationToken;

use linkscope_core::{
    DetailPurpose, HistoryEntry, RunDoneUpdate, RunId, RunPhaseUpdate, RunResult, RunStatus,
    RunStepUpdate, StartRequest, VendorCredentials,
};

use crate::api::{DiagnosticsApi, HttpApi};
use crate::bundle::{save_bundle, DEFAULT_BUNDLE_NAME};
use crate::error::{ApiError, BundleError, StartError, VendorSubmitError};
use crate::settings::ClientSettings;
use crate::stream;

enum ClientCommand {
    ConnectStream,
    Start(StartRequest),
    FetchStatus,
    FetchResults,
    FetchHistory,
    FetchRunDetail { run_id: RunId, purpose: DetailPurpose },
    SubmitVendor(VendorCredentials),
    FetchBundle,
}

/// Everything the worker reports back to the shell.
#[derive(Debug)]
pub enum ClientEvent {
    StreamConnected {
        reconnect: bool,
    },
    StreamDropped,
    StreamPhase(RunPhaseUpdate),
    StreamStep(RunStepUpdate),
    StreamDone(RunDoneUpdate),
    StartFinished(Result<(), StartError>),
    StatusFetched(Result<RunStatus, ApiError>),
    ResultsFetched(Result<Option<RunResult>, ApiError>),
    HistoryFetched(Result<Vec<HistoryEntry>, ApiError>),
    RunDetailFetched {
        run_id: RunId,
        purpose: DetailPurpose,
        result: Result<RunResult, ApiError>,
    },
    VendorSubmitFinished(Result<(), VendorSubmitError>),
    BundleFetched(Result<Option<PathBuf>, BundleError>),
}

/// Owns the IO worker thread and its tokio runtime. Commands go in over a
/// channel; completion events come back out, drained with [`try_recv`].
/// The event receiver sits behind a mutex so the handle can be shared
/// through an `Arc` with a pump thread.
///
/// [`try_recv`]: ClientHandle::try_recv
pub struct ClientHandle {
    cmd_tx: mpsc::Sender<ClientCommand>,
    event_rx: Mutex<mpsc::Receiver<ClientEvent>>,
}

impl ClientHandle {
    pub fn new(settings: ClientSettings) -> Result<Self, ApiError> {
        let api = Arc::new(HttpApi::new(&settings)?);
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();

        thread::spawn(move || {
            let runtime = tokio::runtime::Runtime::new().expect("tokio runtime");
            let stream_token = CancellationToken::new();
            while let Ok(command) = cmd_rx.recv() {
                match command {
                    ClientCommand::ConnectStream => {
                        runtime.spawn(stream::run_stream(
                            api.clone(),
                            event_tx.clone(),
                            stream_token.child_token(),
                            settings.stream_backoff_base,
                            settings.stream_backoff_cap,
                        ));
                    }
                    command => {
                        let api = api.clone();
                        let event_tx = event_tx.clone();
                        let download_dir = settings.download_dir.clone();
                        runtime.spawn(async move {
                            run_command(api.as_ref(), command, &event_tx, &download_dir).await;
                        });
                    }
                }
            }
            // The shell is gone: stop the stream so the runtime winds down.
            stream_token.cancel();
        });

        Ok(Self {
            cmd_tx,
            event_rx: Mutex::new(event_rx),
        })
    }

    pub fn connect_stream(&self) {
        self.send(ClientCommand::ConnectStream);
    }

    pub fn start(&self, request: StartRequest) {
        self.send(ClientCommand::Start(request));
    }

    pub fn fetch_status(&self) {
        self.send(ClientCommand::FetchStatus);
    }

    pub fn fetch_results(&self) {
        self.send(ClientCommand::FetchResults);
    }

    pub fn fetch_history(&self) {
        self.send(ClientCommand::FetchHistory);
    }

    pub fn fetch_run_detail(&self, run_id: RunId, purpose: DetailPurpose) {
        self.send(ClientCommand::FetchRunDetail { run_id, purpose });
    }

    pub fn submit_vendor(&self, creds: VendorCredentials) {
        self.send(ClientCommand::SubmitVendor(creds));
    }

    pub fn fetch_bundle(&self) {
        self.send(ClientCommand::FetchBundle);
    }

    /// Non-blocking drain of the next completion event, if any.
    pub fn try_recv(&self) -> Option<ClientEvent> {
        self.event_rx.lock().ok()?.try_recv().ok()
    }

    fn send(&self, command: ClientCommand) {
        let _ = self.cmd_tx.send(command);
    }
}

async fn run_command(
    api: &dyn DiagnosticsApi,
    command: ClientCommand,
    events: &mpsc::Sender<ClientEvent>,
    download_dir: &Path,
) {
    let event = match command {
        // Handled by the worker loop.
        ClientCommand::ConnectStream => return,
        ClientCommand::Start(request) => ClientEvent::StartFinished(api.start(&request).await),
        ClientCommand::FetchStatus => ClientEvent::StatusFetched(api.status().await),
        ClientCommand::FetchResults => ClientEvent::ResultsFetched(api.results().await),
        ClientCommand::FetchHistory => ClientEvent::HistoryFetched(api.history().await),
        ClientCommand::FetchRunDetail { run_id, purpose } => {
            let result = api.run_detail(&run_id).await;
            ClientEvent::RunDetailFetched {
                run_id,
                purpose,
                result,
            }
        }
        ClientCommand::SubmitVendor(creds) => {
            ClientEvent::VendorSubmitFinished(api.submit_vendor(&creds).await)
        }
        ClientCommand::FetchBundle => {
            ClientEvent::BundleFetched(fetch_bundle(api, download_dir).await)
        }
    };
    let _ = events.send(event);
}

async fn fetch_bundle(
    api: &dyn DiagnosticsApi,
    download_dir: &Path,
) -> Result<Option<PathBuf>, BundleError> {
    match api.bundle().await? {
        None => Ok(None),
        Some(payload) => {
            let filename = payload.filename.as_deref().unwrap_or(DEFAULT_BUNDLE_NAME);
            let path = save_bundle(download_dir, filename, &payload.bytes)?;
            Ok(Some(path))
        }
    }
}
