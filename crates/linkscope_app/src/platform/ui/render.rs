//! Text rendering of the view model for the terminal shell.
//!
//! Pure projection: one call turns an [`AppViewModel`] into the full
//! dashboard text, printed whenever the state machine marks itself dirty.

use std::fmt::Write as _;

use linkscope_core::{
    format_metric, AppViewModel, CompareView, DnsProbe, Finding, Panel, PingStats, RunResult,
    VendorCardView, VendorStage,
};

const BAR: &str = "================================================================";
const RULE: &str = "----------------------------------------------------------------";

/// Longest console tail shown per redraw; the full log stays in scrollback.
const CONSOLE_TAIL: usize = 8;
/// Discovered-host rows shown before the listing is elided.
const DEVICE_ROWS: usize = 10;

pub(crate) fn render(view: &AppViewModel) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{BAR}");

    header(&mut out, view);
    results(&mut out, view);
    history(&mut out, view);
    if let Some(compare) = &view.compare {
        compare_card(&mut out, compare, focus_mark(view, Panel::Compare));
    }
    if view.vendor.visible {
        vendor_card(&mut out, &view.vendor);
    }
    console(&mut out, view);

    let _ = writeln!(out, "{BAR}");
    out
}

fn header(out: &mut String, view: &AppViewModel) {
    let stream = if view.stream_connected { "live" } else { "down" };
    let _ = writeln!(out, " LinkScope{:>44}", format!("[stream {stream}]"));
    if view.status_message.is_empty() {
        let _ = writeln!(out, " phase {} {}%", view.phase, view.percent_label);
    } else {
        let _ = writeln!(
            out,
            " phase {} {}% | {}",
            view.phase, view.percent_label, view.status_message
        );
    }
    if !view.troubleshooter.status_message.is_empty() {
        let _ = writeln!(out, " guided: {}", view.troubleshooter.status_message);
    }
    if !view.start_error.is_empty() {
        let _ = writeln!(out, " start error: {}", view.start_error);
    }
    if !view.highlighted.is_empty() {
        let labels: Vec<&str> = view.highlighted.iter().map(|p| panel_label(*p)).collect();
        let _ = writeln!(out, " focus: {}", labels.join(", "));
    }
}

fn results(out: &mut String, view: &AppViewModel) {
    let _ = writeln!(out, "{RULE}");
    let _ = writeln!(out, " Results");
    match &view.displayed {
        None => {
            if !view.results_note.is_empty() {
                let _ = writeln!(out, "   {}", view.results_note);
            }
        }
        Some(result) => run_details(out, view, result),
    }
    if view.bundle_enabled {
        let _ = writeln!(out, "   bundle: available ('bundle' downloads it)");
    }
    if !view.bundle_note.is_empty() {
        let _ = writeln!(out, "   bundle: {}", view.bundle_note);
    }
}

fn run_details(out: &mut String, view: &AppViewModel, result: &RunResult) {
    let id = view
        .displayed_run_id
        .clone()
        .unwrap_or_else(|| "(unsaved)".to_string());
    let _ = writeln!(
        out,
        "   run {id}  target {}  verdict {}",
        blank_as_dash(&result.target_host),
        blank_as_dash(&result.classification)
    );
    if !result.reasons.is_empty() {
        let _ = writeln!(out, "   reasons: {}", result.reasons.join("; "));
    }
    if !result.user_note.is_empty() {
        let _ = writeln!(out, "   note: {}", result.user_note);
    }

    let up = result.net_info.interfaces.iter().filter(|i| i.up).count();
    let _ = writeln!(
        out,
        "   host {}  gateway {}  dns {}  interfaces {up}/{} up",
        blank_as_dash(&result.net_info.hostname),
        blank_as_dash(&result.net_info.default_gateway),
        join_or_dash(&result.net_info.dns_servers),
        result.net_info.interfaces.len()
    );

    ping_line(
        out,
        focus_mark(view, Panel::LocalPerformance),
        "gateway ping",
        result.gw_ping.as_ref(),
    );
    ping_line(
        out,
        focus_mark(view, Panel::WanPerformance),
        "wan ping    ",
        result.wan_ping.as_ref(),
    );
    dns_line(out, "dns local   ", result.dns_local.as_ref());
    dns_line(out, "dns resolver", result.dns_cf.as_ref());

    if result.mtu.path_mtu == 0 {
        let _ = writeln!(out, "    path mtu    inconclusive");
    } else {
        let _ = writeln!(out, "    path mtu    {} bytes", result.mtu.path_mtu);
    }
    if !result.trace.raw.is_empty() {
        let _ = writeln!(
            out,
            "    traceroute  {} lines captured",
            result.trace.raw.lines().count()
        );
    }

    devices(out, view, result);
    findings(out, " findings", &result.findings);
    findings(out, " vendor summaries", &result.vendor_summaries);
    findings(out, " vendor findings", &result.vendor_findings);
}

fn devices(out: &mut String, view: &AppViewModel, result: &RunResult) {
    if result.discovered.is_empty() {
        return;
    }
    let _ = writeln!(
        out,
        "  {}devices ({})",
        focus_mark(view, Panel::Devices),
        result.discovered.len()
    );
    for host in result.discovered.iter().take(DEVICE_ROWS) {
        let _ = writeln!(
            out,
            "     {:<15}  {:<17}  {} ({})",
            host.ip,
            blank_as_dash(&host.mac),
            blank_as_dash(&host.vendor),
            blank_as_dash(&host.if_name)
        );
    }
    if result.discovered.len() > DEVICE_ROWS {
        let _ = writeln!(out, "     … and {} more", result.discovered.len() - DEVICE_ROWS);
    }
}

fn findings(out: &mut String, title: &str, findings: &[Finding]) {
    if findings.is_empty() {
        return;
    }
    let _ = writeln!(out, "  {title}:");
    for finding in findings {
        let severity = if finding.severity.is_empty() {
            "info"
        } else {
            finding.severity.as_str()
        };
        let _ = writeln!(out, "     [{severity}] {}", finding.message);
    }
}

fn history(out: &mut String, view: &AppViewModel) {
    let _ = writeln!(out, "{RULE}");
    let _ = writeln!(out, " History");
    if view.history.is_empty() {
        let _ = writeln!(out, "   no runs recorded yet");
        return;
    }
    for row in &view.history {
        let shown = if row.displayed { ">" } else { " " };
        let pinned = if row.pinned { "*" } else { " " };
        let _ = writeln!(
            out,
            "  {shown}{pinned} {}  {:<16}  {:<20}  {}",
            row.id,
            row.when_label,
            blank_as_dash(&row.target),
            blank_as_dash(&row.classification)
        );
    }
}

fn compare_card(out: &mut String, compare: &CompareView, mark: &str) {
    let _ = writeln!(out, "{RULE}");
    let _ = writeln!(out, " {mark}Compare vs {}", compare.reference_id);
    if compare.rows.is_empty() {
        let _ = writeln!(out, "   no displayed run to compare against");
        return;
    }
    for row in &compare.rows {
        let _ = writeln!(
            out,
            "   {:<14}  {:>8}  {:>8}  {:>8} {}",
            row.label, row.current, row.reference, row.delta, row.unit
        );
    }
}

fn vendor_card(out: &mut String, vendor: &VendorCardView) {
    let _ = writeln!(out, "{RULE}");
    let _ = writeln!(out, " Vendor follow-up [{}]", stage_label(vendor.stage));
    if !vendor.suggestion_labels.is_empty() {
        let _ = writeln!(out, "   suggested: {}", vendor.suggestion_labels.join(", "));
    }
    if vendor.prompt_open {
        let form = &vendor.form;
        if vendor.forti_section {
            let _ = writeln!(
                out,
                "   forti-host {:<15}  forti-user {:<10}  forti-pass {}",
                blank_as_dash(&form.forti_host),
                blank_as_dash(&form.forti_user),
                mask(&form.forti_pass)
            );
        }
        if vendor.cisco_section {
            let _ = writeln!(
                out,
                "   cisco-host {:<15}  cisco-user {:<10}  cisco-pass {}  cisco-secret {}  cisco-port {}",
                blank_as_dash(&form.cisco_host),
                blank_as_dash(&form.cisco_user),
                mask(&form.cisco_pass),
                mask(&form.cisco_secret),
                blank_as_dash(&form.cisco_port)
            );
        }
        let _ = writeln!(out, "   ('set <field> <value>' fills, 'vendor submit' sends)");
    }
    if !vendor.error.is_empty() {
        let _ = writeln!(out, "   error: {}", vendor.error);
    }
    if vendor.submitting {
        let _ = writeln!(out, "   submitting…");
    }
}

fn console(out: &mut String, view: &AppViewModel) {
    let _ = writeln!(out, "{RULE}");
    let mark = focus_mark(view, Panel::Console);
    if view.console.is_empty() {
        let _ = writeln!(out, " {mark}Console (empty)");
        return;
    }
    let tail = view.console.len().min(CONSOLE_TAIL);
    let _ = writeln!(
        out,
        " {mark}Console ({} lines, last {tail})",
        view.console.len()
    );
    for line in &view.console[view.console.len() - tail..] {
        let _ = writeln!(out, "   {line}");
    }
}

fn ping_line(out: &mut String, mark: &str, label: &str, stats: Option<&PingStats>) {
    let stats = match stats {
        Some(stats) => stats,
        None => return,
    };
    let _ = writeln!(
        out,
        "   {mark}{label} avg {} ms  p95 {} ms  jitter {} ms  loss {}%",
        format_metric(stats.avg_ms),
        format_metric(stats.p95_ms),
        format_metric(stats.jitter_ms),
        format_metric(stats.loss * 100.0)
    );
}

fn dns_line(out: &mut String, label: &str, probe: Option<&DnsProbe>) {
    let probe = match probe {
        Some(probe) => probe,
        None => return,
    };
    if probe.answers.is_empty() {
        let _ = writeln!(out, "    {label} avg {} ms", format_metric(probe.avg_ms));
    } else {
        let _ = writeln!(
            out,
            "    {label} avg {} ms  answers {}",
            format_metric(probe.avg_ms),
            probe.answers.join(", ")
        );
    }
}

fn focus_mark(view: &AppViewModel, panel: Panel) -> &'static str {
    if view.highlighted.contains(&panel) {
        "*"
    } else {
        " "
    }
}

fn panel_label(panel: Panel) -> &'static str {
    match panel {
        Panel::LocalPerformance => "local performance",
        Panel::WanPerformance => "wan performance",
        Panel::Devices => "devices",
        Panel::Compare => "compare",
        Panel::Console => "console",
    }
}

fn stage_label(stage: VendorStage) -> &'static str {
    match stage {
        VendorStage::Idle => "idle",
        VendorStage::Suggested => "suggested",
        VendorStage::Prompting => "awaiting credentials",
        VendorStage::Submitted => "checks running",
        VendorStage::Summarized => "summarized",
    }
}

fn mask(secret: &str) -> &'static str {
    if secret.is_empty() {
        "(empty)"
    } else {
        "(set)"
    }
}

fn blank_as_dash(text: &str) -> &str {
    if text.is_empty() {
        "-"
    } else {
        text
    }
}

fn join_or_dash(items: &[String]) -> String {
    if items.is_empty() {
        "-".to_string()
    } else {
        items.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use linkscope_core::{
        session_start, update, Finding, HistoryEntry, Msg, PingStats, ResultsResponse, RunResult,
        VendorField, NOTE_NOT_READY,
    };

    use super::render;

    fn result_with_metrics(id: &str) -> RunResult {
        RunResult {
            history_id: Some(id.to_string()),
            target_host: "1.1.1.1".to_string(),
            classification: "healthy".to_string(),
            gw_ping: Some(PingStats {
                avg_ms: 1.2,
                p95_ms: 2.0,
                jitter_ms: 0.3,
                loss: 0.0,
            }),
            findings: vec![Finding {
                severity: "warn".to_string(),
                message: "gateway jitter above threshold".to_string(),
            }],
            ..RunResult::default()
        }
    }

    #[test]
    fn fresh_session_shows_the_not_ready_note() {
        let (state, _) = session_start();
        let text = render(&state.view());
        assert!(text.contains("phase idle 0.0%"));
        assert!(text.contains(NOTE_NOT_READY));
        assert!(text.contains("no runs recorded yet"));
    }

    #[test]
    fn displayed_run_renders_metrics_and_findings() {
        let (state, _) = session_start();
        let (state, _) = update(
            state,
            Msg::ResultsFetched(ResultsResponse::Ready(result_with_metrics(
                "20260812-090000",
            ))),
        );
        let text = render(&state.view());
        assert!(text.contains("run 20260812-090000"));
        assert!(text.contains("gateway ping avg 1.2 ms"));
        assert!(text.contains("[warn] gateway jitter above threshold"));
        assert!(text.contains("bundle: available"));
    }

    #[test]
    fn history_marks_the_displayed_row() {
        let (state, _) = session_start();
        let (state, _) = update(
            state,
            Msg::ResultsFetched(ResultsResponse::Ready(result_with_metrics(
                "20260812-090000",
            ))),
        );
        let (state, _) = update(
            state,
            Msg::HistoryFetched(vec![HistoryEntry {
                id: "20260812-090000".to_string(),
                when: None,
                target: "1.1.1.1".to_string(),
                classification: "healthy".to_string(),
            }]),
        );
        let text = render(&state.view());
        assert!(text.contains("> "));
        assert!(text.contains("20260812-090000"));
    }

    #[test]
    fn vendor_prompt_never_prints_secrets() {
        let (state, _) = session_start();
        let mut result = result_with_metrics("20260812-090000");
        result.vendor_suggestions = vec!["fortigate".to_string()];
        let (state, _) = update(state, Msg::ResultsFetched(ResultsResponse::Ready(result)));
        let (state, _) = update(
            state,
            Msg::VendorFieldEdited {
                field: VendorField::FortiPass,
                value: "s3cret".to_string(),
            },
        );
        let text = render(&state.view());
        assert!(text.contains("Vendor follow-up"));
        assert!(text.contains("forti-pass (set)"));
        assert!(!text.contains("s3cret"));
    }
}
