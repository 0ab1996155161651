//! CSV ingestion for flood-test capture files.
//!
//! Each receiving node exports one line-oriented CSV: `#`-prefixed metadata
//! lines (one of which carries the receiver device id), a header row, then
//! data rows of the form `sender_id,seq,tx_time,rx_time,delay_sec,snr,rssi,path_len`.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use super::types::{FleetData, IngestError, LogEntry, ReceiverLog, UnattributedLog};

/// Field index of the optional hop-count column
const PATH_LEN_FIELD: usize = 7;

/// Minimum field count for a data row to be accepted
const MIN_FIELDS: usize = 7;

/// Compiled patterns for metadata lines
pub struct MetadataPatterns {
    /// Match: "# Receiver Device ID: <id>"
    pub receiver_id: Regex,
}

impl MetadataPatterns {
    pub fn new() -> Self {
        Self {
            receiver_id: Regex::new(r"^#\s*Receiver Device ID:\s*(\S+)")
                .expect("Invalid receiver_id regex"),
        }
    }
}

impl Default for MetadataPatterns {
    fn default() -> Self {
        Self::new()
    }
}

/// Global patterns instance
pub static PATTERNS: LazyLock<MetadataPatterns> = LazyLock::new(MetadataPatterns::new);

/// Result of parsing a single capture file
#[derive(Debug)]
pub struct ParsedLog {
    /// Receiver identifier from the metadata header, if present
    pub receiver_id: Option<String>,
    pub entries: Vec<LogEntry>,
    /// Data rows rejected for having fewer than 7 fields
    pub skipped_short_rows: usize,
}

fn parse_int_field<T: std::str::FromStr>(
    raw: &str,
    field: &str,
    path: &str,
    line: usize,
) -> Result<T, IngestError> {
    raw.trim().parse().map_err(|_| IngestError::MalformedRow {
        path: path.to_string(),
        line,
        reason: format!("non-integer {field} field: {raw:?}"),
    })
}

/// Parse a single capture file.
///
/// Comment lines are scanned only for the receiver-id metadata field; the
/// header row (first field `sender_id`) is skipped; rows with fewer than 7
/// fields are skipped and counted; non-integer numeric fields abort the run.
pub fn parse_log_file(path: &Path) -> Result<ParsedLog, IngestError> {
    let display = path.display().to_string();
    let file = File::open(path).map_err(|source| IngestError::Io {
        path: display.clone(),
        source,
    })?;
    let reader = BufReader::new(file);

    let mut receiver_id = None;
    let mut entries = Vec::new();
    let mut skipped_short_rows = 0;

    for (index, line_result) in reader.lines().enumerate() {
        let line_no = index + 1;
        let line = line_result.map_err(|source| IngestError::Io {
            path: display.clone(),
            source,
        })?;

        if line.starts_with('#') {
            if let Some(caps) = PATTERNS.receiver_id.captures(&line) {
                receiver_id = Some(caps[1].to_string());
            }
            continue;
        }
        if line.trim().is_empty() {
            continue;
        }

        let fields: Vec<&str> = line.trim().split(',').collect();
        if fields[0] == "sender_id" {
            // Header row
            continue;
        }
        if fields.len() < MIN_FIELDS {
            log::warn!(
                "{}:{}: skipping row with {} fields (expected at least {})",
                display,
                line_no,
                fields.len(),
                MIN_FIELDS
            );
            skipped_short_rows += 1;
            continue;
        }

        let sequence = parse_int_field(fields[1], "seq", &display, line_no)?;
        let snr = parse_int_field(fields[5], "snr", &display, line_no)?;
        let rssi = parse_int_field(fields[6], "rssi", &display, line_no)?;
        let path_length = match fields.get(PATH_LEN_FIELD) {
            Some(raw) => parse_int_field(raw, "path_len", &display, line_no)?,
            // Older exports have no hop column
            None => 0,
        };

        entries.push(LogEntry {
            sender_id: fields[0].to_string(),
            sequence,
            path_length,
            snr,
            rssi,
        });
    }

    Ok(ParsedLog {
        receiver_id,
        entries,
        skipped_short_rows,
    })
}

/// Parse every input file and assemble the fleet-wide data set.
///
/// Files sharing a receiver identifier are merged by concatenating entries;
/// files without one are kept aside so they can feed the sender universe
/// without appearing as receivers.
pub fn load_fleet<P: AsRef<Path>>(paths: &[P]) -> Result<FleetData, IngestError> {
    let mut by_receiver: HashMap<String, Vec<LogEntry>> = HashMap::new();
    let mut order: Vec<String> = Vec::new();
    let mut unattributed = Vec::new();
    let mut skipped_short_rows = 0;

    for path in paths {
        let path = path.as_ref();
        let parsed = parse_log_file(path)?;
        skipped_short_rows += parsed.skipped_short_rows;

        match parsed.receiver_id {
            Some(id) => {
                log::info!(
                    "Loaded {} (receiver {}, {} entries)",
                    path.display(),
                    id,
                    parsed.entries.len()
                );
                match by_receiver.get_mut(&id) {
                    Some(existing) => {
                        log::warn!(
                            "Receiver {} appears in multiple files; merging {} entries",
                            id,
                            parsed.entries.len()
                        );
                        existing.extend(parsed.entries);
                    }
                    None => {
                        order.push(id.clone());
                        by_receiver.insert(id, parsed.entries);
                    }
                }
            }
            None => {
                log::warn!(
                    "{}: no receiver device id found; excluding from pair table",
                    path.display()
                );
                unattributed.push(UnattributedLog {
                    path: path.display().to_string(),
                    entries: parsed.entries,
                });
            }
        }
    }

    let receivers = order
        .into_iter()
        .map(|id| {
            let entries = by_receiver.remove(&id).unwrap_or_default();
            ReceiverLog {
                receiver_id: id,
                entries,
            }
        })
        .collect();

    Ok(FleetData {
        receivers,
        unattributed,
        skipped_short_rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_temp(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_receiver_id_pattern() {
        let caps = PATTERNS
            .receiver_id
            .captures("# Receiver Device ID: 5061")
            .unwrap();
        assert_eq!(&caps[1], "5061");
    }

    #[test]
    fn test_parse_full_file() {
        let file = write_temp(
            "# MeshCore Network Test Log\n\
             # Receiver Device ID: 5061\n\
             # Export Time: 2026-08-01 10:00:00\n\
             #\n\
             sender_id,seq,tx_time,rx_time,delay_sec,snr,rssi,path_len\n\
             69F5,0,100,101,1,40,-72,0\n\
             69F5,1,110,112,2,38,-75,1\n",
        );
        let parsed = parse_log_file(file.path()).unwrap();
        assert_eq!(parsed.receiver_id.as_deref(), Some("5061"));
        assert_eq!(parsed.entries.len(), 2);
        assert_eq!(parsed.entries[0].sender_id, "69F5");
        assert_eq!(parsed.entries[0].sequence, 0);
        assert_eq!(parsed.entries[1].path_length, 1);
        assert_eq!(parsed.entries[1].rssi, -75);
        assert_eq!(parsed.skipped_short_rows, 0);
    }

    #[test]
    fn test_seven_field_row_defaults_hop_to_zero() {
        let file = write_temp(
            "# Receiver Device ID: 5061\n\
             sender_id,seq,tx_time,rx_time,delay_sec,snr,rssi\n\
             69F5,3,100,101,1,40,-72\n",
        );
        let parsed = parse_log_file(file.path()).unwrap();
        assert_eq!(parsed.entries.len(), 1);
        assert_eq!(parsed.entries[0].path_length, 0);
    }

    #[test]
    fn test_six_field_row_is_skipped_and_counted() {
        let file = write_temp(
            "# Receiver Device ID: 5061\n\
             69F5,3,100,101,1,40\n\
             69F5,4,100,101,1,40,-72,0\n",
        );
        let parsed = parse_log_file(file.path()).unwrap();
        assert_eq!(parsed.entries.len(), 1);
        assert_eq!(parsed.skipped_short_rows, 1);
    }

    #[test]
    fn test_non_integer_sequence_is_fatal() {
        let file = write_temp(
            "# Receiver Device ID: 5061\n\
             69F5,abc,100,101,1,40,-72,0\n",
        );
        let err = parse_log_file(file.path()).unwrap_err();
        match err {
            IngestError::MalformedRow { line, reason, .. } => {
                assert_eq!(line, 2);
                assert!(reason.contains("seq"), "unexpected reason: {reason}");
            }
            other => panic!("expected MalformedRow, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_metadata_goes_unattributed() {
        let file = write_temp("sender_id,seq,tx_time,rx_time,delay_sec,snr,rssi,path_len\n69F5,0,1,2,1,40,-72,0\n");
        let fleet = load_fleet(&[file.path()]).unwrap();
        assert!(fleet.receivers.is_empty());
        assert_eq!(fleet.unattributed.len(), 1);
        assert_eq!(fleet.unattributed[0].entries.len(), 1);
    }

    #[test]
    fn test_duplicate_receiver_files_are_merged() {
        let a = write_temp("# Receiver Device ID: 5061\n69F5,0,1,2,1,40,-72,0\n");
        let b = write_temp("# Receiver Device ID: 5061\n69F5,1,1,2,1,40,-72,0\n");
        let fleet = load_fleet(&[a.path(), b.path()]).unwrap();
        assert_eq!(fleet.receivers.len(), 1);
        assert_eq!(fleet.receivers[0].entries.len(), 2);
    }
}
