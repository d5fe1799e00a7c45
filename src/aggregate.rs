use std::fmt;
use std::io::{self, Write};

use ahash::RandomState;
use dashmap::DashMap;

use crate::stats::StationStats;

/// Station -> running stats, shared by every worker.
///
/// Backed by a sharded `DashMap`: an update locks only the shard that owns
/// the key, so workers touching different stations rarely contend, and a
/// single station's read-modify-write is never interleaved.
#[derive(Debug)]
pub struct StationMap {
    inner: DashMap<Box<[u8]>, StationStats, RandomState>,
}

impl Default for StationMap {
    fn default() -> Self {
        Self::new()
    }
}

impl StationMap {
    pub fn new() -> Self {
        Self {
            inner: DashMap::with_hasher(RandomState::new()),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: DashMap::with_capacity_and_hasher(capacity, RandomState::new()),
        }
    }

    /// Folds one observation into the entry for `station`, creating it on
    /// first sight.
    pub fn observe(&self, station: &[u8], value: f64) {
        // Only allocate the owned key when the station is new.
        if let Some(mut stats) = self.inner.get_mut(station) {
            stats.observe(value);
            return;
        }
        self.inner
            .entry(Box::from(station))
            .and_modify(|stats| stats.observe(value))
            .or_insert_with(|| StationStats::new(value));
    }

    /// Folds a partial aggregate into the entry for `station`.
    pub fn merge(&self, station: &[u8], partial: &StationStats) {
        if let Some(mut stats) = self.inner.get_mut(station) {
            stats.merge(partial);
            return;
        }
        self.inner
            .entry(Box::from(station))
            .and_modify(|stats| stats.merge(partial))
            .or_insert(*partial);
    }

    pub fn get(&self, station: &[u8]) -> Option<StationStats> {
        self.inner.get(station).map(|stats| *stats)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Reduces the map into a report sorted byte-wise by station.
    ///
    /// Takes the map by value, so it can only run once every worker has
    /// released its borrow.
    pub fn into_report(self) -> Report {
        let mut stations: Vec<(Box<[u8]>, StationStats)> = self.inner.into_iter().collect();
        stations.sort_unstable_by(|a, b| a.0.cmp(&b.0));

        let rows = stations
            .into_iter()
            .map(|(station, stats)| ReportRow {
                station: String::from_utf8_lossy(&station).into_owned(),
                min: stats.min,
                mean: stats.mean(),
                max: stats.max,
            })
            .collect();

        Report { rows }
    }
}

/// One output line.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportRow {
    pub station: String,
    pub min: f64,
    pub mean: f64,
    pub max: f64,
}

/// Renders as `station;min;mean;max` with one fractional digit each.
///
/// `{:.1}` rounds the exact binary value half-to-even, so `0.25` prints as
/// `0.2` and `0.75` as `0.8`.
impl fmt::Display for ReportRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{};{:.1};{:.1};{:.1}",
            self.station, self.min, self.mean, self.max
        )
    }
}

/// Final sorted result of a run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Report {
    pub rows: Vec<ReportRow>,
}

impl Report {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Writes one `\n`-terminated line per station.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        for row in &self.rows {
            writeln!(writer, "{}", row)?;
        }
        writer.flush()
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in &self.rows {
            writeln!(f, "{}", row)?;
        }
        Ok(())
    }
}
