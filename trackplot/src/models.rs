use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Deserializer};

use crate::error::{Error, ErrorKind, Result};

/// Strand column of a feature row.
///
/// Anything other than `+` or `-` is carried verbatim in `Other`. Ordering
/// follows the text of the column, so `+` sorts before `-` and `-` before `.`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
#[serde(from = "String")]
pub enum Strand {
    Plus,
    Minus,
    Other(String),
}

impl Strand {
    pub fn as_str(&self) -> &str {
        match self {
            Strand::Plus => "+",
            Strand::Minus => "-",
            Strand::Other(s) => s,
        }
    }
}

impl From<String> for Strand {
    fn from(s: String) -> Self {
        match s.as_str() {
            "+" => Strand::Plus,
            "-" => Strand::Minus,
            _ => Strand::Other(s),
        }
    }
}

impl From<&str> for Strand {
    fn from(s: &str) -> Self {
        Strand::from(s.to_string())
    }
}

impl Ord for Strand {
    fn cmp(&self, other: &Self) -> Ordering {
        self.as_str().cmp(other.as_str())
    }
}

impl PartialOrd for Strand {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Strand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of a 9-column feature table, in column order.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FeatureRecord {
    pub genome: String,
    pub source: String,
    pub feature: String,
    pub start: u64,
    pub end: u64,
    /// `None` when the column holds the `.` placeholder.
    #[serde(deserialize_with = "deserialize_score")]
    pub score: Option<f64>,
    pub strand: Strand,
    pub frame: String,
    pub attr: String,
}

fn deserialize_score<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    match raw.trim() {
        "." | "" => Ok(None),
        s => s.parse::<f64>().map(Some).map_err(serde::de::Error::custom),
    }
}

/// Start, score and strand of a score table row.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreRecord {
    pub start: u64,
    pub score: f64,
    pub strand: Strand,
}

impl ScoreRecord {
    pub fn new(start: u64, score: f64, strand: impl Into<Strand>) -> Self {
        ScoreRecord {
            start,
            score,
            strand: strand.into(),
        }
    }

    /// Keep the three columns a profile needs. `line` is only used for the error.
    pub(crate) fn from_feature(record: FeatureRecord, line: u64) -> Result<Self> {
        let score = record
            .score
            .ok_or_else(|| Error::new(ErrorKind::MissingScore { line }))?;
        Ok(ScoreRecord {
            start: record.start,
            score,
            strand: record.strand,
        })
    }
}

/// A gene to draw as an arrow.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotationRow {
    pub name: String,
    pub start: u64,
    pub end: u64,
    pub strand: Strand,
}

impl AnnotationRow {
    pub fn new(name: impl Into<String>, start: u64, end: u64, strand: impl Into<Strand>) -> Self {
        AnnotationRow {
            name: name.into(),
            start,
            end,
            strand: strand.into(),
        }
    }
}

/// Genomic interval to plot. Signal is read over `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoordinateWindow {
    pub start: u64,
    pub end: u64,
}

impl CoordinateWindow {
    pub fn new(start: u64, end: u64) -> Self {
        CoordinateWindow { start, end }
    }

    pub fn len(&self) -> u64 {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Inclusive on both sides: a feature ending at `start` or beginning at
    /// `end` still overlaps.
    pub fn overlaps(&self, start: u64, end: u64) -> bool {
        end >= self.start && start <= self.end
    }

    /// Evenly spaced tick positions from `start`, stepping by
    /// `(end - start) / tick_count` and stopping before `end`.
    ///
    /// Windows shorter than `tick_count` get a step of one rather than
    /// failing on a zero step, so every position becomes a tick.
    /// An empty window, `tick_count == 0`, or an `end` past `i64::MAX`
    /// (the plotting axis is signed) is an `InvalidWindow` error.
    pub fn ticks(&self, tick_count: usize) -> Result<Vec<u64>> {
        if self.is_empty() || tick_count == 0 || i64::try_from(self.end).is_err() {
            return Err(Error::new(ErrorKind::InvalidWindow {
                start: self.start,
                end: self.end,
                tick_count,
            }));
        }
        let step = (self.len() / tick_count as u64).max(1);
        Ok((self.start..self.end).step_by(step as usize).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strand_orders_like_its_text() {
        let mut strands = vec![Strand::from("."), Strand::Minus, Strand::Plus];
        strands.sort();
        assert_eq!(strands, vec![Strand::Plus, Strand::Minus, Strand::from(".")]);
    }

    #[test]
    fn overlap_is_inclusive_on_both_edges() {
        let window = CoordinateWindow::new(100, 200);
        assert!(window.overlaps(50, 105));
        assert!(window.overlaps(200, 250));
        assert!(window.overlaps(10, 100));
        assert!(!window.overlaps(10, 99));
        assert!(!window.overlaps(201, 250));
    }

    #[test]
    fn ticks_use_integer_step() {
        let window = CoordinateWindow::new(100, 200);
        let ticks = window.ticks(20).unwrap();
        assert_eq!(ticks.len(), 20);
        assert_eq!(ticks[0], 100);
        assert_eq!(ticks[1], 105);
        assert_eq!(*ticks.last().unwrap(), 195);

        let ticks = CoordinateWindow::new(0, 45).ticks(20).unwrap();
        assert_eq!(ticks, (0..45).step_by(2).collect::<Vec<_>>());
    }

    #[test]
    fn short_window_ticks_every_position() {
        let ticks = CoordinateWindow::new(10, 15).ticks(20).unwrap();
        assert_eq!(ticks, vec![10, 11, 12, 13, 14]);
    }

    #[test]
    fn window_past_signed_axis_has_no_ticks() {
        let window = CoordinateWindow::new(u64::MAX - 100, u64::MAX);
        let err = window.ticks(20).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::InvalidWindow { tick_count: 20, .. }));
        assert!(CoordinateWindow::new(0, i64::MAX as u64).ticks(1).is_ok());
    }

    #[test]
    fn degenerate_window_has_no_ticks() {
        let err = CoordinateWindow::new(10, 10).ticks(20).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::InvalidWindow { .. }));
        let err = CoordinateWindow::new(0, 10).ticks(0).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::InvalidWindow { tick_count: 0, .. }));
    }

    #[test]
    fn missing_score_is_reported_with_line() {
        let record = FeatureRecord {
            genome: "NC_000913".into(),
            source: "RefSeq".into(),
            feature: "gene".into(),
            start: 190,
            end: 255,
            score: None,
            strand: Strand::Plus,
            frame: "0".into(),
            attr: "Name=thrL".into(),
        };
        let err = ScoreRecord::from_feature(record, 7).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::MissingScore { line: 7 }));
    }
}
