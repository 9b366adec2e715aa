use serde::{Deserialize, Serialize};

/// Named stage of a diagnostic run, in pipeline order.
///
/// The set is closed: a payload naming any other stage fails to deserialize
/// and is dropped by the channel layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Phase {
    #[default]
    #[serde(rename = "idle")]
    Idle,
    #[serde(rename = "starting")]
    Starting,
    #[serde(rename = "netinfo")]
    NetInfo,
    #[serde(rename = "l2-scan")]
    L2Scan,
    #[serde(rename = "gateway")]
    Gateway,
    #[serde(rename = "dns")]
    Dns,
    #[serde(rename = "wan")]
    Wan,
    #[serde(rename = "traceroute")]
    Traceroute,
    #[serde(rename = "mtu")]
    Mtu,
    #[serde(rename = "vendor-packs")]
    VendorPacks,
    #[serde(rename = "snmp")]
    Snmp,
    #[serde(rename = "finalizing")]
    Finalizing,
    #[serde(rename = "finished")]
    Finished,
    #[serde(rename = "error")]
    Error,
}

impl Phase {
    /// The wire token for this stage.
    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Idle => "idle",
            Phase::Starting => "starting",
            Phase::NetInfo => "netinfo",
            Phase::L2Scan => "l2-scan",
            Phase::Gateway => "gateway",
            Phase::Dns => "dns",
            Phase::Wan => "wan",
            Phase::Traceroute => "traceroute",
            Phase::Mtu => "mtu",
            Phase::VendorPacks => "vendor-packs",
            Phase::Snmp => "snmp",
            Phase::Finalizing => "finalizing",
            Phase::Finished => "finished",
            Phase::Error => "error",
        }
    }

    /// Percent used when a phase update carries no explicit value.
    pub fn default_percent(self) -> f64 {
        match self {
            Phase::Idle => 0.0,
            Phase::Starting => 5.0,
            Phase::NetInfo => 12.0,
            Phase::L2Scan => 25.0,
            Phase::Gateway => 38.0,
            Phase::Dns => 52.0,
            Phase::Wan => 68.0,
            Phase::Traceroute => 80.0,
            Phase::Mtu => 88.0,
            Phase::VendorPacks => 94.0,
            Phase::Snmp => 97.0,
            Phase::Finalizing => 99.0,
            Phase::Finished | Phase::Error => 100.0,
        }
    }

    /// True once a run has ended, successfully or not.
    pub fn is_terminal(self) -> bool {
        matches!(self, Phase::Finished | Phase::Error)
    }

    /// True while the agent is actually working on a run.
    pub fn in_progress(self) -> bool {
        !matches!(self, Phase::Idle | Phase::Finished | Phase::Error)
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
