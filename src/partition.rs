use std::num::NonZeroUsize;
use std::ops::Range;

use memchr::memrchr;
use tracing::debug;

use crate::error::{ScanError, ScanResult};

/// Half-open byte range of the input owned by a single worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    pub start: usize,
    pub end: usize,
}

impl Segment {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }
}

/// Splits `data` into `workers` contiguous, line-aligned segments.
///
/// Nominal starts are `i * (len / workers)`. Every nominal start past zero is
/// moved back to the byte after the closest `\n` at or before it, so no
/// record straddles two segments. The last segment absorbs the remainder.
pub fn partition(data: &[u8], workers: NonZeroUsize) -> ScanResult<Vec<Segment>> {
    let len = data.len();
    let workers = workers.get();
    let width = len / workers;

    let starts: Vec<usize> = (0..workers)
        .map(|i| line_start_at_or_before(data, i * width))
        .collect();

    let segments: Vec<Segment> = starts
        .iter()
        .enumerate()
        .map(|(i, &start)| Segment {
            start,
            end: starts.get(i + 1).copied().unwrap_or(len),
        })
        .collect();

    validate(data, &segments)?;

    debug!(
        "Partitioned {} bytes into {} segments of nominal width {}",
        len, workers, width
    );

    Ok(segments)
}

/// Start of the record containing `offset`. A prefix with no terminator is
/// one record that begins at zero.
fn line_start_at_or_before(data: &[u8], offset: usize) -> usize {
    if offset == 0 || offset >= data.len() {
        return offset.min(data.len());
    }
    memrchr(b'\n', &data[..=offset]).map_or(0, |nl| nl + 1)
}

/// Rejects any partition that would drop, duplicate or split a record.
fn validate(data: &[u8], segments: &[Segment]) -> ScanResult<()> {
    let mut expected_start = 0;
    for segment in segments {
        if segment.start != expected_start {
            return Err(ScanError::boundary(
                segment.start,
                format!("segment does not start where the previous one ended ({expected_start})"),
            ));
        }
        if segment.end < segment.start {
            return Err(ScanError::boundary(segment.end, "segment ends before it starts"));
        }
        if segment.start > 0 && data[segment.start - 1] != b'\n' {
            return Err(ScanError::boundary(
                segment.start,
                "segment starts inside a record",
            ));
        }
        expected_start = segment.end;
    }
    if expected_start != data.len() {
        return Err(ScanError::boundary(
            expected_start,
            format!("segments stop short of end of input ({})", data.len()),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn workers(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).unwrap()
    }

    fn assert_line_aligned(data: &[u8], segments: &[Segment]) {
        assert_eq!(segments.first().unwrap().start, 0);
        assert_eq!(segments.last().unwrap().end, data.len());
        for pair in segments.windows(2) {
            assert_eq!(pair[0].end, pair[1].start);
        }
        for segment in segments {
            assert!(segment.start == 0 || data[segment.start - 1] == b'\n');
        }
    }

    #[test]
    fn test_single_worker_covers_everything() {
        let data = b"a;1\nb;2\n";
        let segments = partition(data, workers(1)).unwrap();
        assert_eq!(segments, vec![Segment { start: 0, end: data.len() }]);
    }

    #[test]
    fn test_boundaries_move_back_to_line_start() {
        // 18 bytes, nominal starts at 0, 6 and 12
        let data = b"a;1\nbb;22\nccc;333\n";
        let segments = partition(data, workers(3)).unwrap();
        assert_line_aligned(data, &segments);
        assert_eq!(
            segments,
            vec![
                Segment { start: 0, end: 4 },
                Segment { start: 4, end: 10 },
                Segment { start: 10, end: 18 },
            ]
        );
    }

    #[test]
    fn test_offset_on_terminator_belongs_to_previous_segment() {
        // width 4, nominal start 4 is the first '\n'
        let data = b"ab;1\nc;2\n";
        let segments = partition(data, workers(2)).unwrap();
        assert_eq!(segments[0], Segment { start: 0, end: 5 });
        assert_eq!(segments[1], Segment { start: 5, end: 9 });
    }

    #[test]
    fn test_more_workers_than_lines_yields_empty_segments() {
        let data = b"x;1\ny;2\n";
        let segments = partition(data, workers(16)).unwrap();
        assert_eq!(segments.len(), 16);
        assert_line_aligned(data, &segments);
        assert!(segments.iter().filter(|s| s.is_empty()).count() >= 14);
        assert_eq!(segments.iter().map(Segment::len).sum::<usize>(), data.len());
    }

    #[test]
    fn test_empty_input() {
        let segments = partition(b"", workers(4)).unwrap();
        assert_eq!(segments.len(), 4);
        assert!(segments.iter().all(Segment::is_empty));
    }

    #[test]
    fn test_single_long_line_without_terminator() {
        let data = b"a-very-long-station-name;12.3";
        let segments = partition(data, workers(4)).unwrap();
        assert_line_aligned(data, &segments);
        let owners: Vec<_> = segments.iter().filter(|s| !s.is_empty()).collect();
        assert_eq!(owners.len(), 1);
        assert_eq!(owners[0].range(), 0..data.len());
    }

    #[test]
    fn test_validate_rejects_mid_record_start() {
        let data = b"a;1\nb;2\n";
        let bad = [Segment { start: 0, end: 2 }, Segment { start: 2, end: 8 }];
        let err = validate(data, &bad).unwrap_err();
        assert!(matches!(err, ScanError::Boundary { offset: 2, .. }));
    }

    #[test]
    fn test_validate_rejects_gaps() {
        let data = b"a;1\nb;2\n";
        let bad = [Segment { start: 0, end: 4 }];
        assert!(matches!(
            validate(data, &bad),
            Err(ScanError::Boundary { offset: 4, .. })
        ));
    }
}
