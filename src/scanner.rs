use memchr::memchr;
use tracing::trace;

use crate::partition::Segment;

/// A parsed `station;value` line borrowed from the input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Record<'a> {
    pub station: &'a [u8],
    pub value: f64,
}

/// Lazily walks the lines of one segment, yielding well-formed records.
///
/// Lines without a `;` or with a value that is not a plain decimal number are
/// skipped and tallied in [`LineScanner::skipped`]. The scanner never reads
/// past the segment end.
pub struct LineScanner<'a> {
    rest: &'a [u8],
    records: u64,
    skipped: u64,
}

impl<'a> LineScanner<'a> {
    pub fn new(data: &'a [u8], segment: Segment) -> Self {
        Self::from_bytes(&data[segment.range()])
    }

    /// Scans a buffer that already holds whole lines.
    pub fn from_bytes(chunk: &'a [u8]) -> Self {
        Self {
            rest: chunk,
            records: 0,
            skipped: 0,
        }
    }

    /// Records yielded so far.
    pub fn records(&self) -> u64 {
        self.records
    }

    /// Malformed lines dropped so far.
    pub fn skipped(&self) -> u64 {
        self.skipped
    }

    fn next_line(&mut self) -> Option<&'a [u8]> {
        if self.rest.is_empty() {
            return None;
        }
        let (line, rest) = match memchr(b'\n', self.rest) {
            Some(nl) => (&self.rest[..nl], &self.rest[nl + 1..]),
            None => (self.rest, &self.rest[self.rest.len()..]),
        };
        self.rest = rest;
        Some(line.strip_suffix(b"\r").unwrap_or(line))
    }
}

impl<'a> Iterator for LineScanner<'a> {
    type Item = Record<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(line) = self.next_line() {
            if line.is_empty() {
                continue;
            }
            match parse_line(line) {
                Some(record) => {
                    self.records += 1;
                    return Some(record);
                }
                None => {
                    self.skipped += 1;
                    trace!("Skipping malformed line: {}", String::from_utf8_lossy(line));
                }
            }
        }
        None
    }
}

/// Splits at the first `;` and parses the remainder as a number.
pub fn parse_line(line: &[u8]) -> Option<Record<'_>> {
    let sep = memchr(b';', line)?;
    let value = parse_value(&line[sep + 1..])?;
    Some(Record {
        station: &line[..sep],
        value,
    })
}

/// Parses `[+-]?digits[.digits]` independent of locale. Exponents,
/// whitespace, `inf`/`nan` and anything else are rejected.
pub fn parse_value(text: &[u8]) -> Option<f64> {
    let digits = match text.first() {
        Some(b'+') | Some(b'-') => &text[1..],
        _ => text,
    };

    let mut seen_dot = false;
    let mut seen_digit = false;
    for &b in digits {
        match b {
            b'0'..=b'9' => seen_digit = true,
            b'.' if !seen_dot => seen_dot = true,
            _ => return None,
        }
    }
    if !seen_digit {
        return None;
    }

    lexical_core::parse::<f64>(text).ok()
}
