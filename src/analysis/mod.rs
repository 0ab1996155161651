//! Packet-loss and path-length analysis for mesh flood-test logs.
//!
//! This module ingests per-receiver CSV capture files, reconstructs the
//! expected transmission count per sender, and produces delivery and
//! hop-count statistics for the whole fleet.

pub mod types;
pub mod csv_ingest;
pub mod stats;
pub mod report;

pub use types::*;
pub use csv_ingest::{load_fleet, parse_log_file};
pub use stats::{cross_tabulate, expected_counts, hop_distribution, signal_distribution};
pub use report::{build_report, render_text};
