use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::Phase;

/// Server-assigned identifier of a persisted run (timestamp-derived string).
pub type RunId = String;

/// Live status projection returned by the poll endpoint.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RunStatus {
    pub phase: Phase,
    pub percent: f64,
    #[serde(default)]
    pub message: String,
}

/// `phase` event payload from the push stream.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RunPhaseUpdate {
    pub name: Phase,
    #[serde(default)]
    pub percent: Option<f64>,
    #[serde(default)]
    pub message: Option<String>,
    /// Set when a new run has begun; all transient UI state is torn down.
    #[serde(default)]
    pub reset: bool,
}

/// `step` event payload: one console line, appended, never replacing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RunStepUpdate {
    #[serde(rename = "msg")]
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunOutcome {
    Finished,
    Error,
}

/// `done` event payload: the terminal signal for a run.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RunDoneUpdate {
    #[serde(rename = "status")]
    pub outcome: RunOutcome,
    #[serde(default)]
    pub message: Option<String>,
}

/// Ping statistics for one probe series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct PingStats {
    pub avg_ms: f64,
    pub p95_ms: f64,
    pub jitter_ms: f64,
    /// Fraction of probes lost, 0.0 to 1.0.
    pub loss: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct DnsProbe {
    pub avg_ms: f64,
    #[serde(default)]
    pub answers: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct TraceProbe {
    #[serde(default)]
    pub raw: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct MtuProbe {
    /// Path MTU in bytes; 0 means the probe was inconclusive.
    #[serde(default)]
    pub path_mtu: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterfaceInfo {
    pub name: String,
    #[serde(default)]
    pub ips: Vec<String>,
    #[serde(default)]
    pub mac: String,
    #[serde(default)]
    pub up: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct NetInfo {
    #[serde(default)]
    pub hostname: String,
    #[serde(default)]
    pub interfaces: Vec<InterfaceInfo>,
    #[serde(default)]
    pub gateways: Vec<String>,
    #[serde(default)]
    pub default_gateway: String,
    #[serde(default)]
    pub dns_servers: Vec<String>,
}

/// One host found by the layer-2 discovery scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct DiscoveredHost {
    #[serde(default)]
    pub if_name: String,
    pub ip: String,
    #[serde(default)]
    pub mac: String,
    #[serde(default)]
    pub vendor: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Finding {
    #[serde(default)]
    pub severity: String,
    pub message: String,
}

/// Full diagnostic record for one run. Immutable once fetched; the client
/// only reads and caches it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct RunResult {
    /// Absent until the run has been persisted server-side.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub history_id: Option<RunId>,
    #[serde(default)]
    pub when: Option<DateTime<Utc>>,
    #[serde(default)]
    pub user_note: String,
    #[serde(default)]
    pub net_info: NetInfo,
    #[serde(default)]
    pub discovered: Vec<DiscoveredHost>,
    #[serde(default)]
    pub gw_ping: Option<PingStats>,
    #[serde(default)]
    pub wan_ping: Option<PingStats>,
    #[serde(default)]
    pub dns_local: Option<DnsProbe>,
    #[serde(default)]
    pub dns_cf: Option<DnsProbe>,
    #[serde(default)]
    pub trace: TraceProbe,
    #[serde(default)]
    pub mtu: MtuProbe,
    #[serde(default)]
    pub findings: Vec<Finding>,
    #[serde(default)]
    pub vendor_suggestions: Vec<String>,
    #[serde(default)]
    pub vendor_summaries: Vec<Finding>,
    #[serde(default)]
    pub vendor_findings: Vec<Finding>,
    #[serde(default)]
    pub target_host: String,
    #[serde(default)]
    pub has_gateway: bool,
    #[serde(default)]
    pub gateway_used: String,
    #[serde(default)]
    pub classification: String,
    #[serde(default)]
    pub reasons: Vec<String>,
}

/// Lightweight index row for the history list; rendered in server order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: RunId,
    #[serde(default)]
    pub when: Option<DateTime<Utc>>,
    #[serde(default)]
    pub target: String,
    #[serde(default)]
    pub classification: String,
}

/// Body of the start request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StartRequest {
    pub target: String,
    pub scan: bool,
}

/// Vendor credential submission. Only sections that are both suggested and
/// complete are populated; empty sections are omitted from the body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
pub struct VendorCredentials {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub forti_host: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub forti_user: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub forti_pass: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub cisco_host: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub cisco_user: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub cisco_pass: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub cisco_secret: String,
    #[serde(skip_serializing_if = "is_zero_port")]
    pub cisco_port: u16,
}

fn is_zero_port(port: &u16) -> bool {
    *port == 0
}
