//! Core data types for flood-test log analysis.

use serde::Serialize;

/// One observed reception event, as captured by a receiving node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogEntry {
    /// Identifier of the transmitting node (short hex string, case-sensitive)
    pub sender_id: String,
    /// The sender's monotonically increasing broadcast counter
    pub sequence: u64,
    /// Hop count; 0 means the packet was received directly
    pub path_length: u32,
    /// Raw SNR reading in quarter-dB units
    pub snr: i64,
    /// Received signal strength in dBm
    pub rssi: i64,
}

/// All entries captured by one receiving node.
#[derive(Debug, Clone, Serialize)]
pub struct ReceiverLog {
    pub receiver_id: String,
    /// Insertion order is arrival order, not sequence order
    pub entries: Vec<LogEntry>,
}

/// Entries from a file that carried no receiver identifier.
///
/// These still feed the sender/sequence universe and the hop and signal
/// distributions, but the file cannot appear as a receiver in the pair table.
#[derive(Debug, Clone, Serialize)]
pub struct UnattributedLog {
    pub path: String,
    pub entries: Vec<LogEntry>,
}

/// Everything loaded for one analysis run. Built once at startup,
/// immutable afterwards.
#[derive(Debug, Default)]
pub struct FleetData {
    pub receivers: Vec<ReceiverLog>,
    pub unattributed: Vec<UnattributedLog>,
    /// Data rows rejected for having fewer than 7 fields
    pub skipped_short_rows: usize,
}

impl FleetData {
    /// Iterate over every entry in every log, attributed or not.
    pub fn all_entries(&self) -> impl Iterator<Item = &LogEntry> {
        self.receivers
            .iter()
            .flat_map(|r| r.entries.iter())
            .chain(self.unattributed.iter().flat_map(|u| u.entries.iter()))
    }
}

/// Errors that can occur while ingesting a capture file
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed row in {path} at line {line}: {reason}")]
    MalformedRow {
        path: String,
        line: usize,
        reason: String,
    },
}

/// Report metadata
#[derive(Debug, Clone, Serialize)]
pub struct ReportMetadata {
    pub generated_at: String,
    pub files_analyzed: usize,
    pub receiver_count: usize,
    pub sender_count: usize,
}

/// Per-sender inferred transmission count
#[derive(Debug, Clone, Serialize)]
pub struct TransmitCount {
    pub sender_id: String,
    /// Highest observed sequence number plus one, across all logs
    pub expected: u64,
}

/// Delivery statistics for one ordered (sender, receiver) pair
#[derive(Debug, Clone, Serialize)]
pub struct PairStats {
    pub sender_id: String,
    pub receiver_id: String,
    pub expected: u64,
    /// Distinct sequence numbers heard from this sender at this receiver
    pub received: u64,
    pub loss_pct: f64,
    /// Mean SNR in dB over every reception for this pair; 0 when none
    pub avg_snr_db: f64,
}

/// Network-wide delivery totals accumulated over all pairs
#[derive(Debug, Clone, Serialize)]
pub struct AggregateStats {
    pub total_expected: u64,
    pub total_received: u64,
    pub loss_pct: f64,
}

/// One row of the hop-count histogram
#[derive(Debug, Clone, Serialize)]
pub struct HopBucket {
    pub path_length: u32,
    pub count: usize,
    pub pct: f64,
}

/// Signal quality category derived from RSSI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SignalQuality {
    Excellent,
    Good,
    Fair,
    Poor,
}

impl std::fmt::Display for SignalQuality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SignalQuality::Excellent => write!(f, "Excellent"),
            SignalQuality::Good => write!(f, "Good"),
            SignalQuality::Fair => write!(f, "Fair"),
            SignalQuality::Poor => write!(f, "Poor"),
        }
    }
}

/// One row of the RSSI distribution
#[derive(Debug, Clone, Serialize)]
pub struct SignalBucket {
    pub quality: SignalQuality,
    pub count: usize,
    pub pct: f64,
}

/// Overall assessment derived from the aggregate loss rate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NetworkVerdict {
    /// Loss below 1%
    Excellent,
    /// Loss 1-5%
    Good,
    /// Loss 5-10%
    Fair,
    /// Loss above 10%
    Poor,
}

impl std::fmt::Display for NetworkVerdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NetworkVerdict::Excellent => write!(f, "Excellent (loss < 1%)"),
            NetworkVerdict::Good => write!(f, "Good (loss 1-5%)"),
            NetworkVerdict::Fair => write!(f, "Fair (loss 5-10%)"),
            NetworkVerdict::Poor => write!(f, "Poor (loss > 10%)"),
        }
    }
}

/// Summary of a file excluded from the pair table
#[derive(Debug, Clone, Serialize)]
pub struct ExcludedFile {
    pub path: String,
    pub entry_count: usize,
}

/// Complete analysis report, rendered as text or serialized as JSON
#[derive(Debug, Clone, Serialize)]
pub struct FloodReport {
    pub metadata: ReportMetadata,
    pub receivers: Vec<String>,
    pub senders: Vec<String>,
    pub transmit_counts: Vec<TransmitCount>,
    pub pairs: Vec<PairStats>,
    pub aggregate: AggregateStats,
    pub hop_distribution: Vec<HopBucket>,
    pub signal_distribution: Vec<SignalBucket>,
    pub excluded_files: Vec<ExcludedFile>,
    pub skipped_short_rows: usize,
    pub verdict: NetworkVerdict,
}
