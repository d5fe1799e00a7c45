use std::fs::File;
use std::num::NonZeroUsize;
use std::path::Path;

use memmap2::Mmap;
use rayon::prelude::*;
use tracing::{debug, info};

use crate::aggregate::{Report, StationMap};
use crate::config::ScanConfig;
use crate::error::{ScanError, ScanResult};
use crate::partition::{partition, Segment};
use crate::scanner::LineScanner;

// Typical inputs carry a few hundred to ten thousand stations.
const INITIAL_STATIONS: usize = 1 << 14;

/// Per-worker tallies, used for logging only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SegmentSummary {
    pub records: u64,
    pub skipped: u64,
}

/// Runs a full aggregation for the configured input file.
pub fn run(config: &ScanConfig) -> ScanResult<Report> {
    aggregate_file(&config.input_path, config.thread_count)
}

/// Memory-maps `path` and aggregates it with `threads` workers.
pub fn aggregate_file(path: &Path, threads: NonZeroUsize) -> ScanResult<Report> {
    info!("Aggregating {} with {} workers", path.display(), threads);

    let file = File::open(path).map_err(|e| ScanError::from_io(path, e))?;
    let len = file
        .metadata()
        .map_err(|e| ScanError::from_io(path, e))?
        .len();
    if len == 0 {
        debug!("{} is empty, nothing to aggregate", path.display());
        return Ok(Report::default());
    }

    // SAFETY: the mapping is read-only and the input is not expected to be
    // modified while a run is in progress.
    let mmap = unsafe { Mmap::map(&file) }.map_err(|e| ScanError::from_io(path, e))?;

    aggregate_bytes(&mmap, threads)
}

/// Partitions `data` into one segment per worker, scans the segments in
/// parallel into a shared map and reduces it once every worker has joined.
pub fn aggregate_bytes(data: &[u8], threads: NonZeroUsize) -> ScanResult<Report> {
    let segments = partition(data, threads)?;

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(threads.get())
        .thread_name(|i| format!("onebrc-worker-{i}"))
        .build()
        .map_err(|e| ScanError::ThreadPool(e.to_string()))?;

    let map = StationMap::with_capacity(INITIAL_STATIONS);

    let summaries: Vec<SegmentSummary> = pool.install(|| {
        segments
            .par_iter()
            .enumerate()
            .map(|(index, &segment)| scan_segment(data, index, segment, &map))
            .collect()
    });

    let records: u64 = summaries.iter().map(|s| s.records).sum();
    let skipped: u64 = summaries.iter().map(|s| s.skipped).sum();
    info!(
        "Aggregated {} records into {} stations ({} malformed lines skipped)",
        records,
        map.len(),
        skipped
    );

    Ok(map.into_report())
}

/// Worker body: folds every record of `segment` into the shared map.
pub fn scan_segment(
    data: &[u8],
    index: usize,
    segment: Segment,
    map: &StationMap,
) -> SegmentSummary {
    let mut scanner = LineScanner::new(data, segment);
    for record in scanner.by_ref() {
        map.observe(record.station, record.value);
    }

    let summary = SegmentSummary {
        records: scanner.records(),
        skipped: scanner.skipped(),
    };
    debug!(
        "Segment {} [{}, {}): {} records, {} skipped",
        index, segment.start, segment.end, summary.records, summary.skipped
    );
    summary
}
