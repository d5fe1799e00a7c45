use std::num::NonZeroUsize;

use onebrc::{aggregate_bytes, partition, LineScanner};

const STATIONS: [&str; 7] = ["Abha", "Bangkok", "Cape Town", "Dakar", "Oslo", "São Paulo", "Zürich"];

// Deterministic pseudo-random input. Values are multiples of 0.5 so sums are
// exact whatever order the workers apply them in.
fn measurements(lines: usize) -> Vec<u8> {
    let mut state: u64 = 0x2545_f491_4f6c_dd1d;
    let mut out = String::new();
    for i in 0..lines {
        state = state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);
        let station = STATIONS[(state >> 33) as usize % STATIONS.len()];
        let halves = ((state >> 17) % 400) as i64 - 200;
        out.push_str(&format!("{};{:.1}\n", station, halves as f64 / 2.0));
        if i % 97 == 0 {
            out.push_str("garbage line without delimiter\n");
        }
        if i % 89 == 0 {
            out.push_str(&format!("{};not-a-number\n", station));
        }
    }
    out.into_bytes()
}

fn records(data: &[u8], workers: usize) -> Vec<(Vec<u8>, String)> {
    let segments = partition(data, NonZeroUsize::new(workers).unwrap()).unwrap();
    let mut all: Vec<_> = segments
        .iter()
        .flat_map(|&segment| LineScanner::new(data, segment))
        .map(|r| (r.station.to_vec(), format!("{:.1}", r.value)))
        .collect();
    all.sort();
    all
}

#[test]
fn test_partitioning_neither_drops_nor_duplicates_records() {
    let data = measurements(2_000);
    let baseline = records(&data, 1);
    assert_eq!(baseline.len(), 2_000);

    for workers in [2, 3, 5, 7, 8, 16, 31, 64, 500, 5_000] {
        assert_eq!(records(&data, workers), baseline, "with {workers} workers");
    }
}

#[test]
fn test_report_is_identical_for_any_worker_count() {
    let data = measurements(5_000);
    let baseline = aggregate_bytes(&data, NonZeroUsize::new(1).unwrap())
        .unwrap()
        .to_string();

    for workers in [2, 4, 9, 13, 32] {
        let report = aggregate_bytes(&data, NonZeroUsize::new(workers).unwrap()).unwrap();
        assert_eq!(report.to_string(), baseline, "with {workers} workers");
    }
}

#[test]
fn test_malformed_lines_never_count() {
    let clean = b"Oslo;1.0\nOslo;3.0\n";
    let noisy = b"Oslo;1.0\nOslo\nOslo;\nOslo;abc\n;\nOslo;1.0.0\nOslo;3.0\n";

    let workers = NonZeroUsize::new(3).unwrap();
    let clean = aggregate_bytes(clean, workers).unwrap();
    let noisy = aggregate_bytes(noisy, workers).unwrap();
    assert_eq!(noisy, clean);
    assert_eq!(noisy.to_string(), "Oslo;1.0;2.0;3.0\n");
}

#[test]
fn test_output_keys_strictly_increasing() {
    let data = measurements(1_000);
    let report = aggregate_bytes(&data, NonZeroUsize::new(4).unwrap()).unwrap();
    assert_eq!(report.len(), STATIONS.len());
    for pair in report.rows.windows(2) {
        assert!(pair[0].station.as_bytes() < pair[1].station.as_bytes());
    }
}
