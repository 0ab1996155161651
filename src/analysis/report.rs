//! Report assembly and rendering.
//!
//! Builds an immutable `FloodReport` from loaded fleet data and renders it as
//! a deterministic plain-text report. The same value serializes to JSON for
//! the structured output mode.

use super::stats::{
    cross_tabulate, expected_counts, hop_distribution, sender_universe, signal_distribution,
};
use super::types::{
    ExcludedFile, FleetData, FloodReport, NetworkVerdict, ReportMetadata, TransmitCount,
};

/// Histogram bars scale the percentage down by this divisor
const BAR_DIVISOR: f64 = 2.0;

/// Assemble the full report from loaded fleet data.
pub fn build_report(fleet: &FleetData) -> FloodReport {
    let expected = expected_counts(fleet);
    let senders = sender_universe(fleet);
    let (pairs, aggregate) = cross_tabulate(fleet, &expected);

    let mut receivers: Vec<String> = fleet
        .receivers
        .iter()
        .map(|r| r.receiver_id.clone())
        .collect();
    receivers.sort_unstable();

    let transmit_counts = expected
        .iter()
        .map(|(sender_id, expected)| TransmitCount {
            sender_id: sender_id.clone(),
            expected: *expected,
        })
        .collect();

    let excluded_files = fleet
        .unattributed
        .iter()
        .map(|u| ExcludedFile {
            path: u.path.clone(),
            entry_count: u.entries.len(),
        })
        .collect();

    let verdict = NetworkVerdict::from_loss_pct(aggregate.loss_pct);

    FloodReport {
        metadata: ReportMetadata {
            generated_at: chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC").to_string(),
            files_analyzed: fleet.receivers.len() + fleet.unattributed.len(),
            receiver_count: receivers.len(),
            sender_count: senders.len(),
        },
        receivers,
        senders,
        transmit_counts,
        pairs,
        aggregate,
        hop_distribution: hop_distribution(fleet),
        signal_distribution: signal_distribution(fleet),
        excluded_files,
        skipped_short_rows: fleet.skipped_short_rows,
        verdict,
    }
}

fn bar(pct: f64) -> String {
    "█".repeat((pct / BAR_DIVISOR) as usize)
}

/// Render the human-readable text report.
pub fn render_text(report: &FloodReport) -> String {
    let mut lines: Vec<String> = Vec::new();

    lines.push("=".repeat(60));
    lines.push("            MESH FLOOD-TEST STATISTICS REPORT".to_string());
    lines.push("=".repeat(60));
    lines.push(String::new());
    lines.push(format!("Generated: {}", report.metadata.generated_at));
    lines.push(format!("Files analyzed: {}", report.metadata.files_analyzed));
    lines.push(String::new());

    lines.push(format!(
        "{} receiver node(s): {}",
        report.metadata.receiver_count,
        report.receivers.join(", ")
    ));
    lines.push(format!(
        "{} sender node(s): {}",
        report.metadata.sender_count,
        report.senders.join(", ")
    ));
    lines.push(String::new());

    lines.push("Transmission counts:".to_string());
    for tc in &report.transmit_counts {
        lines.push(format!("  {}: sent {} packet(s)", tc.sender_id, tc.expected));
    }
    lines.push(String::new());

    lines.push("Per-pair packet loss:".to_string());
    lines.push("-".repeat(60));
    lines.push(format!(
        "{:<10} {:<10} {:<8} {:<8} {:<10} {:<10}",
        "Sender", "Receiver", "Expected", "Received", "Loss", "Avg SNR"
    ));
    lines.push("-".repeat(60));
    for pair in &report.pairs {
        lines.push(format!(
            "{:<10} {:<10} {:<8} {:<8} {:>6.1}%    {:>6.1} dB",
            pair.sender_id,
            pair.receiver_id,
            pair.expected,
            pair.received,
            pair.loss_pct,
            pair.avg_snr_db
        ));
    }
    lines.push("-".repeat(60));
    lines.push(format!(
        "{:<10} {:<10} {:<8} {:<8} {:>6.1}%",
        "Total",
        "",
        report.aggregate.total_expected,
        report.aggregate.total_received,
        report.aggregate.loss_pct
    ));
    lines.push(String::new());

    lines.push("Path length distribution (hops):".to_string());
    for bucket in &report.hop_distribution {
        lines.push(format!(
            "  {} hop(s): {:>5} ({:>5.1}%) {}",
            bucket.path_length,
            bucket.count,
            bucket.pct,
            bar(bucket.pct)
        ));
    }
    lines.push(String::new());

    lines.push("Signal strength (RSSI) distribution:".to_string());
    for bucket in &report.signal_distribution {
        lines.push(format!(
            "  {:<10} {:>5} ({:>5.1}%) {}",
            bucket.quality.to_string(),
            bucket.count,
            bucket.pct,
            bar(bucket.pct)
        ));
    }
    lines.push(String::new());

    if !report.excluded_files.is_empty() {
        lines.push("Files without a receiver id (excluded from pair table):".to_string());
        for file in &report.excluded_files {
            lines.push(format!("  {} ({} entries)", file.path, file.entry_count));
        }
        lines.push(String::new());
    }
    if report.skipped_short_rows > 0 {
        lines.push(format!(
            "Skipped {} row(s) with fewer than 7 fields",
            report.skipped_short_rows
        ));
        lines.push(String::new());
    }

    lines.push("=".repeat(60));
    lines.push(format!("Network quality: {}", report.verdict));
    lines.push("=".repeat(60));

    lines.join("\n")
}
