//! # Floodstat - packet-loss statistics for mesh radio flood tests
//!
//! This library analyzes CSV capture logs produced during a flood test, where
//! every node broadcasts periodically and every other node records what it
//! hears. From one file per receiving node it reconstructs how many packets
//! each sender transmitted, computes per-(sender, receiver) delivery ratios
//! and an aggregate loss rate, and tallies hop-count and signal-quality
//! distributions.
//!
//! ## Architecture
//!
//! - `analysis::types`: the data model and report value types
//! - `analysis::csv_ingest`: capture-file parsing and fleet assembly
//! - `analysis::stats`: expected counts, cross-tabulation, distributions
//! - `analysis::report`: report assembly and text rendering
//!
//! ## Example usage
//!
//! ```rust,no_run
//! use floodstat::analysis;
//!
//! let fleet = analysis::load_fleet(&["mesh_test_5061.csv", "mesh_test_69F5.csv"])?;
//! let report = analysis::build_report(&fleet);
//! println!("{}", analysis::render_text(&report));
//! # Ok::<(), floodstat::analysis::IngestError>(())
//! ```

pub mod analysis;
