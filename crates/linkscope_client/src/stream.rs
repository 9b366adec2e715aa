use std::sync::mpsc;
use std::sync::Arc;
use std::time::Duration;

use console_logging::{console_debug, console_info, console_warn};
use futures_util::StreamExt;
use tokio_util::sync::CancellationToken;

use linkscope_core::{RunDoneUpdate, RunPhaseUpdate, RunStepUpdate};

use crate::api::HttpApi;
use crate::handle::ClientEvent;

/// Holds the push stream open, decoding its events, and reconnects with
/// exponential backoff until cancelled. The server replays its retained
/// event log on every connect, so nothing is lost across a gap.
pub(crate) async fn run_stream(
    api: Arc<HttpApi>,
    events: mpsc::Sender<ClientEvent>,
    token: CancellationToken,
    backoff_base: Duration,
    backoff_cap: Duration,
) {
    let mut delay = backoff_base;
    let mut connected_before = false;
    loop {
        match api.open_stream().await {
            Ok(response) => {
                if events
                    .send(ClientEvent::StreamConnected {
                        reconnect: connected_before,
                    })
                    .is_err()
                {
                    return;
                }
                connected_before = true;
                delay = backoff_base;
                read_stream(response, &events, &token).await;
                if events.send(ClientEvent::StreamDropped).is_err() {
                    return;
                }
            }
            Err(err) => {
                console_warn!("event stream connect failed: {err}");
            }
        }
        if token.is_cancelled() {
            return;
        }
        console_info!("retrying event stream in {}ms", delay.as_millis());
        tokio::select! {
            _ = token.cancelled() => return,
            _ = tokio::time::sleep(delay) => {}
        }
        delay = (delay * 2).min(backoff_cap);
    }
}

async fn read_stream(
    response: reqwest::Response,
    events: &mpsc::Sender<ClientEvent>,
    token: &CancellationToken,
) {
    let mut decoder = SseDecoder::default();
    let mut chunks = response.bytes_stream();
    loop {
        tokio::select! {
            _ = token.cancelled() => return,
            chunk = chunks.next() => match chunk {
                Some(Ok(bytes)) => {
                    for event in decoder.feed(&bytes) {
                        if dispatch(event, events).is_err() {
                            return;
                        }
                    }
                }
                Some(Err(err)) => {
                    console_warn!("event stream read failed: {err}");
                    return;
                }
                None => return,
            }
        }
    }
}

fn dispatch(event: SseEvent, events: &mpsc::Sender<ClientEvent>) -> Result<(), ()> {
    let message = match event.name.as_str() {
        "phase" => parse::<RunPhaseUpdate>("phase", &event.data).map(ClientEvent::StreamPhase),
        "step" => parse::<RunStepUpdate>("step", &event.data).map(ClientEvent::StreamStep),
        "done" => parse::<RunDoneUpdate>("done", &event.data).map(ClientEvent::StreamDone),
        // Unknown event names are skipped without ending the stream.
        _ => None,
    };
    match message {
        Some(message) => events.send(message).map_err(|_| ()),
        None => Ok(()),
    }
}

fn parse<T: serde::de::DeserializeOwned>(name: &str, data: &str) -> Option<T> {
    match serde_json::from_str(data) {
        Ok(value) => Some(value),
        Err(err) => {
            console_debug!("dropping malformed {name} event: {err}");
            None
        }
    }
}

/// One decoded server-sent event.
#[derive(Debug, Clone, PartialEq, Eq)]
struct SseEvent {
    name: String,
    data: String,
}

/// Incremental `text/event-stream` decoder. Bytes arrive in arbitrary
/// chunks; events are complete once their blank line has been seen.
#[derive(Default)]
struct SseDecoder {
    buffer: Vec<u8>,
    event_name: String,
    data_lines: Vec<String>,
}

impl SseDecoder {
    fn feed(&mut self, bytes: &[u8]) -> Vec<SseEvent> {
        self.buffer.extend_from_slice(bytes);
        let mut events = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') {
            let raw: Vec<u8> = self.buffer.drain(..=pos).collect();
            let line = String::from_utf8_lossy(&raw);
            if let Some(event) = self.take_line(line.trim_end_matches(['\r', '\n'])) {
                events.push(event);
            }
        }
        events
    }

    fn take_line(&mut self, line: &str) -> Option<SseEvent> {
        if line.is_empty() {
            if self.data_lines.is_empty() {
                self.event_name.clear();
                return None;
            }
            let name = if self.event_name.is_empty() {
                "message".to_string()
            } else {
                std::mem::take(&mut self.event_name)
            };
            let data = self.data_lines.join("\n");
            self.data_lines.clear();
            return Some(SseEvent { name, data });
        }
        if line.starts_with(':') {
            // Keep-alive comment.
            return None;
        }
        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };
        match field {
            "event" => self.event_name = value.to_string(),
            "data" => self.data_lines.push(value.to_string()),
            _ => {}
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(name: &str, data: &str) -> SseEvent {
        SseEvent {
            name: name.to_string(),
            data: data.to_string(),
        }
    }

    #[test]
    fn decodes_a_complete_event() {
        let mut decoder = SseDecoder::default();
        let events = decoder.feed(b"event: phase\ndata: {\"name\":\"dns\"}\n\n");
        assert_eq!(events, vec![event("phase", "{\"name\":\"dns\"}")]);
    }

    #[test]
    fn reassembles_events_split_across_chunks() {
        let mut decoder = SseDecoder::default();
        assert!(decoder.feed(b"event: st").is_empty());
        assert!(decoder.feed(b"ep\ndata: {\"msg\":\"arp ").is_empty());
        let events = decoder.feed(b"sweep\"}\n\n");
        assert_eq!(events, vec![event("step", "{\"msg\":\"arp sweep\"}")]);
    }

    #[test]
    fn decodes_several_events_from_one_chunk() {
        let mut decoder = SseDecoder::default();
        let events =
            decoder.feed(b"event: step\ndata: {\"msg\":\"a\"}\n\nevent: step\ndata: {\"msg\":\"b\"}\n\n");
        assert_eq!(
            events,
            vec![
                event("step", "{\"msg\":\"a\"}"),
                event("step", "{\"msg\":\"b\"}"),
            ]
        );
    }

    #[test]
    fn tolerates_carriage_returns_and_comments() {
        let mut decoder = SseDecoder::default();
        let events = decoder.feed(b": ping\r\nevent: done\r\ndata: {\"status\":\"finished\"}\r\n\r\n");
        assert_eq!(events, vec![event("done", "{\"status\":\"finished\"}")]);
    }

    #[test]
    fn unnamed_events_fall_back_to_message() {
        let mut decoder = SseDecoder::default();
        let events = decoder.feed(b"data: hello\n\n");
        assert_eq!(events, vec![event("message", "hello")]);
    }

    #[test]
    fn joins_multi_line_data() {
        let mut decoder = SseDecoder::default();
        let events = decoder.feed(b"data: one\ndata: two\n\n");
        assert_eq!(events, vec![event("message", "one\ntwo")]);
    }
}
