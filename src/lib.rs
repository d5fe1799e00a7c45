//! Parallel per-station min/mean/max over large `station;value` files.
//!
//! The input is memory-mapped, split into one line-aligned [`Segment`] per
//! worker, scanned concurrently into a shared [`StationMap`] and reduced into
//! a sorted [`Report`].

pub mod aggregate;
pub mod config;
pub mod error;
pub mod partition;
pub mod pipeline;
pub mod scanner;
pub mod stats;

pub use aggregate::{Report, ReportRow, StationMap};
pub use config::ScanConfig;
pub use error::{ScanError, ScanResult};
pub use partition::{partition, Segment};
pub use pipeline::{aggregate_bytes, aggregate_file, run};
pub use scanner::{LineScanner, Record};
pub use stats::StationStats;
