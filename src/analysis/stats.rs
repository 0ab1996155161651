//! Loss and path-length statistics for a loaded fleet.
//!
//! Pure functions over borrowed fleet data; every accumulator is local and
//! returned as part of an immutable result.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use super::types::{
    AggregateStats, FleetData, HopBucket, NetworkVerdict, PairStats, SignalBucket, SignalQuality,
};

/// RSSI floor (dBm) for each quality category, checked in order
const RSSI_LADDER: [(i64, SignalQuality); 3] = [
    (-70, SignalQuality::Excellent),
    (-85, SignalQuality::Good),
    (-100, SignalQuality::Fair),
];

/// SNR readings are exported in quarter-dB units
const SNR_SCALE: f64 = 4.0;

/// Infer how many packets each sender transmitted.
///
/// Any single receiver may have missed the highest-numbered packet, so only
/// the maximum sequence across all logs is a safe lower bound: expected
/// count = global max sequence + 1.
pub fn expected_counts(fleet: &FleetData) -> BTreeMap<String, u64> {
    let mut max_seq: BTreeMap<String, u64> = BTreeMap::new();
    for entry in fleet.all_entries() {
        max_seq
            .entry(entry.sender_id.clone())
            .and_modify(|s| *s = (*s).max(entry.sequence))
            .or_insert(entry.sequence);
    }
    max_seq.into_iter().map(|(id, seq)| (id, seq + 1)).collect()
}

/// All sender identifiers observed anywhere, sorted ascending.
pub fn sender_universe(fleet: &FleetData) -> Vec<String> {
    let ids: BTreeSet<&str> = fleet.all_entries().map(|e| e.sender_id.as_str()).collect();
    ids.into_iter().map(String::from).collect()
}

fn loss_pct(expected: u64, received: u64) -> f64 {
    if expected == 0 {
        0.0
    } else {
        (1.0 - received as f64 / expected as f64) * 100.0
    }
}

/// Delivery statistics for every (sender, receiver) pair.
///
/// Rows are ordered by receiver then sender, both ascending. A sender is
/// never paired with itself. Repeated receptions of the same (sender,
/// sequence) pair count once toward `received`.
pub fn cross_tabulate(
    fleet: &FleetData,
    expected: &BTreeMap<String, u64>,
) -> (Vec<PairStats>, AggregateStats) {
    let senders = sender_universe(fleet);

    let mut receiver_ids: Vec<&str> = fleet
        .receivers
        .iter()
        .map(|r| r.receiver_id.as_str())
        .collect();
    receiver_ids.sort_unstable();

    struct PairAccum {
        seqs: HashSet<u64>,
        snr_sum: i64,
        count: u64,
    }

    // Per-receiver accumulation keyed by sender
    let mut per_receiver: HashMap<&str, HashMap<&str, PairAccum>> = HashMap::new();
    for log in &fleet.receivers {
        let senders_here = per_receiver.entry(log.receiver_id.as_str()).or_default();
        for entry in &log.entries {
            let accum = senders_here
                .entry(entry.sender_id.as_str())
                .or_insert_with(|| PairAccum {
                    seqs: HashSet::new(),
                    snr_sum: 0,
                    count: 0,
                });
            accum.seqs.insert(entry.sequence);
            accum.snr_sum += entry.snr;
            accum.count += 1;
        }
    }

    let mut pairs = Vec::new();
    let mut total_expected = 0u64;
    let mut total_received = 0u64;

    for receiver_id in &receiver_ids {
        for sender_id in &senders {
            if sender_id.as_str() == *receiver_id {
                continue;
            }
            let expected_count = expected.get(sender_id).copied().unwrap_or(0);
            let accum = per_receiver
                .get(receiver_id)
                .and_then(|m| m.get(sender_id.as_str()));
            let received = accum.map_or(0, |a| a.seqs.len() as u64);
            let avg_snr_db = accum.map_or(0.0, |a| {
                if a.count == 0 {
                    0.0
                } else {
                    a.snr_sum as f64 / a.count as f64 / SNR_SCALE
                }
            });

            total_expected += expected_count;
            total_received += received;

            pairs.push(PairStats {
                sender_id: sender_id.clone(),
                receiver_id: receiver_id.to_string(),
                expected: expected_count,
                received,
                loss_pct: loss_pct(expected_count, received),
                avg_snr_db,
            });
        }
    }

    let aggregate = AggregateStats {
        total_expected,
        total_received,
        loss_pct: loss_pct(total_expected, total_received),
    };
    (pairs, aggregate)
}

/// Hop-count histogram over every recorded reception.
///
/// No deduplication: the same packet arriving at different receivers, or via
/// different relay depths, is a distinct observation. Buckets are returned in
/// ascending path-length order.
pub fn hop_distribution(fleet: &FleetData) -> Vec<HopBucket> {
    let mut counts: BTreeMap<u32, usize> = BTreeMap::new();
    let mut total = 0usize;
    for entry in fleet.all_entries() {
        *counts.entry(entry.path_length).or_insert(0) += 1;
        total += 1;
    }

    counts
        .into_iter()
        .map(|(path_length, count)| HopBucket {
            path_length,
            count,
            pct: if total == 0 {
                0.0
            } else {
                count as f64 / total as f64 * 100.0
            },
        })
        .collect()
}

fn classify_rssi(rssi: i64) -> SignalQuality {
    for (floor, quality) in RSSI_LADDER {
        if rssi >= floor {
            return quality;
        }
    }
    SignalQuality::Poor
}

/// RSSI quality distribution over every recorded reception.
pub fn signal_distribution(fleet: &FleetData) -> Vec<SignalBucket> {
    let mut counts: HashMap<SignalQuality, usize> = HashMap::new();
    let mut total = 0usize;
    for entry in fleet.all_entries() {
        *counts.entry(classify_rssi(entry.rssi)).or_insert(0) += 1;
        total += 1;
    }

    [
        SignalQuality::Excellent,
        SignalQuality::Good,
        SignalQuality::Fair,
        SignalQuality::Poor,
    ]
    .into_iter()
    .map(|quality| {
        let count = counts.get(&quality).copied().unwrap_or(0);
        SignalBucket {
            quality,
            count,
            pct: if total == 0 {
                0.0
            } else {
                count as f64 / total as f64 * 100.0
            },
        }
    })
    .collect()
}

impl NetworkVerdict {
    /// Classify the aggregate loss rate.
    pub fn from_loss_pct(loss: f64) -> Self {
        if loss < 1.0 {
            NetworkVerdict::Excellent
        } else if loss < 5.0 {
            NetworkVerdict::Good
        } else if loss < 10.0 {
            NetworkVerdict::Fair
        } else {
            NetworkVerdict::Poor
        }
    }
}
