use crate::{PingStats, RunResult};

/// Marker rendered when a metric or its reference is missing.
pub const NOT_APPLICABLE: &str = "n/a";

/// Magnitudes at or above this render with 0 decimals, below it with 1.
const ROUND_THRESHOLD: f64 = 10.0;

/// Progress percent for display: clamped to 0..100, one decimal.
/// Negative or non-finite input renders as zero.
pub fn format_percent(percent: f64) -> String {
    if !percent.is_finite() {
        return "0.0".to_string();
    }
    format!("{:.1}", percent.clamp(0.0, 100.0))
}

/// Common formatting rule for metric values.
pub fn format_metric(value: f64) -> String {
    if value.abs() >= ROUND_THRESHOLD {
        format!("{value:.0}")
    } else {
        format!("{value:.1}")
    }
}

/// Signed delta between a current value and a pinned reference. A missing
/// side yields the `n/a` marker; a zero delta renders as an explicitly
/// signed zero, never blank.
pub fn format_delta(current: Option<f64>, reference: Option<f64>) -> String {
    let (current, reference) = match (current, reference) {
        (Some(c), Some(r)) => (c, r),
        _ => return NOT_APPLICABLE.to_string(),
    };
    let delta = current - reference;
    let sign = if delta < 0.0 { "-" } else { "+" };
    format!("{sign}{}", format_metric(delta.abs()))
}

/// One line of the comparison card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompareRow {
    pub label: &'static str,
    pub unit: &'static str,
    pub current: String,
    pub reference: String,
    pub delta: String,
}

/// Computes the displayed-vs-pinned comparison rows: gateway ping, WAN ping
/// and path MTU. Loss compares as a percentage of probes lost.
pub fn compare_rows(current: &RunResult, reference: &RunResult) -> Vec<CompareRow> {
    vec![
        row("Gateway avg", "ms", gw_metric(current, avg), gw_metric(reference, avg)),
        row(
            "Gateway jitter",
            "ms",
            gw_metric(current, jitter),
            gw_metric(reference, jitter),
        ),
        row(
            "Gateway loss",
            "%",
            gw_metric(current, loss_pct),
            gw_metric(reference, loss_pct),
        ),
        row("WAN avg", "ms", wan_metric(current, avg), wan_metric(reference, avg)),
        row(
            "WAN jitter",
            "ms",
            wan_metric(current, jitter),
            wan_metric(reference, jitter),
        ),
        row(
            "WAN loss",
            "%",
            wan_metric(current, loss_pct),
            wan_metric(reference, loss_pct),
        ),
        row("Path MTU", "bytes", mtu_metric(current), mtu_metric(reference)),
    ]
}

fn row(
    label: &'static str,
    unit: &'static str,
    current: Option<f64>,
    reference: Option<f64>,
) -> CompareRow {
    CompareRow {
        label,
        unit,
        current: current.map(format_metric).unwrap_or_else(|| NOT_APPLICABLE.to_string()),
        reference: reference.map(format_metric).unwrap_or_else(|| NOT_APPLICABLE.to_string()),
        delta: format_delta(current, reference),
    }
}

fn avg(stats: &PingStats) -> f64 {
    stats.avg_ms
}

fn jitter(stats: &PingStats) -> f64 {
    stats.jitter_ms
}

fn loss_pct(stats: &PingStats) -> f64 {
    stats.loss * 100.0
}

// Gateway metrics do not apply to runs that had no gateway.
fn gw_metric(result: &RunResult, metric: impl Fn(&PingStats) -> f64) -> Option<f64> {
    if !result.has_gateway {
        return None;
    }
    result.gw_ping.as_ref().map(metric)
}

fn wan_metric(result: &RunResult, metric: impl Fn(&PingStats) -> f64) -> Option<f64> {
    result.wan_ping.as_ref().map(metric)
}

// A zero path MTU means the probe was inconclusive.
fn mtu_metric(result: &RunResult) -> Option<f64> {
    if result.mtu.path_mtu == 0 {
        None
    } else {
        Some(f64::from(result.mtu.path_mtu))
    }
}
