use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use console_logging::{console_info, console_warn};
use linkscope_client::{
    ApiError, ClientEvent, ClientHandle, ClientSettings, StartError, VendorSubmitError,
};
use linkscope_core::{BundleFailure, DetailOutcome, Effect, Msg, ResultsResponse, StartFailure};

use super::app::ShellEvent;

/// Shown in the vendor prompt when the submit request itself never made it
/// to the agent; the wire detail goes to the log instead.
const VENDOR_UNREACHABLE: &str = "Unable to reach the diagnostics agent.";

pub(crate) struct EffectRunner {
    client: Arc<ClientHandle>,
}

impl EffectRunner {
    pub(crate) fn new(
        settings: ClientSettings,
        event_tx: mpsc::Sender<ShellEvent>,
    ) -> Result<Self, ApiError> {
        let client = Arc::new(ClientHandle::new(settings)?);
        let runner = Self { client };
        runner.spawn_event_loop(event_tx);
        Ok(runner)
    }

    pub(crate) fn enqueue(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::ConnectStream => {
                    console_info!("ConnectStream");
                    self.client.connect_stream();
                }
                Effect::StartRun(request) => {
                    console_info!(
                        "StartRun target={:?} scan={}",
                        request.target,
                        request.scan
                    );
                    self.client.start(request);
                }
                Effect::FetchStatus => {
                    self.client.fetch_status();
                }
                Effect::FetchResults => {
                    console_info!("FetchResults");
                    self.client.fetch_results();
                }
                Effect::FetchHistory => {
                    self.client.fetch_history();
                }
                Effect::FetchRunDetail { run_id, purpose } => {
                    console_info!("FetchRunDetail run_id={} purpose={:?}", run_id, purpose);
                    self.client.fetch_run_detail(run_id, purpose);
                }
                Effect::SubmitVendor(credentials) => {
                    // Credentials stay out of the log.
                    console_info!("SubmitVendor");
                    self.client.submit_vendor(credentials);
                }
                Effect::FetchBundle => {
                    console_info!("FetchBundle");
                    self.client.fetch_bundle();
                }
            }
        }
    }

    fn spawn_event_loop(&self, event_tx: mpsc::Sender<ShellEvent>) {
        let client = self.client.clone();
        thread::spawn(move || loop {
            if let Some(event) = client.try_recv() {
                if event_tx.send(ShellEvent::Core(map_event(event))).is_err() {
                    return;
                }
            } else {
                thread::sleep(Duration::from_millis(20));
            }
        });
    }
}

/// Maps client completion events onto core messages, folding transport
/// detail into the log where the state machine only wants an outcome.
fn map_event(event: ClientEvent) -> Msg {
    match event {
        ClientEvent::StreamConnected { reconnect } => Msg::StreamConnected { reconnect },
        ClientEvent::StreamDropped => Msg::StreamDropped,
        ClientEvent::StreamPhase(update) => Msg::StreamPhase(update),
        ClientEvent::StreamStep(update) => Msg::StreamStep(update),
        ClientEvent::StreamDone(update) => Msg::StreamDone(update),
        ClientEvent::StartFinished(result) => {
            Msg::StartFinished(result.map_err(map_start_error))
        }
        ClientEvent::StatusFetched(Ok(status)) => Msg::StatusFetched(status),
        ClientEvent::StatusFetched(Err(err)) => {
            // The next poll tick retries; the last projection stays up.
            console_warn!("status poll failed: {}", err);
            Msg::NoOp
        }
        ClientEvent::ResultsFetched(Ok(Some(result))) => {
            Msg::ResultsFetched(ResultsResponse::Ready(result))
        }
        ClientEvent::ResultsFetched(Ok(None)) => Msg::ResultsFetched(ResultsResponse::NotReady),
        ClientEvent::ResultsFetched(Err(err)) => {
            console_warn!("results fetch failed: {}", err);
            Msg::ResultsFetched(ResultsResponse::Failed)
        }
        ClientEvent::HistoryFetched(Ok(entries)) => Msg::HistoryFetched(entries),
        ClientEvent::HistoryFetched(Err(err)) => {
            console_warn!("history fetch failed: {}", err);
            Msg::NoOp
        }
        ClientEvent::RunDetailFetched {
            run_id,
            purpose,
            result,
        } => {
            let outcome = match result {
                Ok(result) => DetailOutcome::Ready(result),
                Err(ApiError::HttpStatus(status)) if status == 404 || status == 400 => {
                    console_warn!("run {} not available: status {}", run_id, status);
                    DetailOutcome::NotFound
                }
                Err(err) => {
                    console_warn!("run {} detail fetch failed: {}", run_id, err);
                    DetailOutcome::Failed
                }
            };
            Msg::RunDetailFetched {
                run_id,
                purpose,
                outcome,
            }
        }
        ClientEvent::VendorSubmitFinished(result) => {
            Msg::VendorSubmitFinished(result.map_err(|err| match err {
                VendorSubmitError::Rejected(reason) => reason,
                VendorSubmitError::Transport(detail) => {
                    console_warn!("vendor submit failed: {}", detail);
                    VENDOR_UNREACHABLE.to_string()
                }
            }))
        }
        ClientEvent::BundleFetched(Ok(Some(path))) => Msg::BundleFetched(Ok(path)),
        ClientEvent::BundleFetched(Ok(None)) => {
            Msg::BundleFetched(Err(BundleFailure::Unavailable))
        }
        ClientEvent::BundleFetched(Err(err)) => {
            console_warn!("bundle download failed: {}", err);
            Msg::BundleFetched(Err(BundleFailure::Failed))
        }
    }
}

fn map_start_error(err: StartError) -> StartFailure {
    match err {
        StartError::Conflict(reason) => StartFailure::Conflict(reason),
        StartError::Rejected(status) => {
            console_warn!("start refused: status {}", status);
            StartFailure::Rejected
        }
        StartError::Transport(detail) => {
            console_warn!("start request failed: {}", detail);
            StartFailure::Transport
        }
    }
}
