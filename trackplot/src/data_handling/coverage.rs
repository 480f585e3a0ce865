use std::collections::BTreeMap;
use std::io;
use std::path::Path;

use tracing::{debug, info};

use crate::error::{Error, ErrorKind, Result};
use crate::helper_functions::{read_tsv, read_tsv_from};
use crate::models::{CoordinateWindow, FeatureRecord, ScoreRecord, Strand};

/// Sum of all cells of a normalized profile.
pub const NORMALIZED_TOTAL: f64 = 10_000_000.0;

/// Dense per-position plus/minus scores over `0..=max_start`.
#[derive(Debug, Clone, PartialEq)]
pub struct CoverageProfile {
    score_plus: Vec<f64>,
    score_minus: Vec<f64>,
}

fn score_records(rows: Vec<(u64, FeatureRecord)>) -> Result<Vec<ScoreRecord>> {
    rows.into_iter()
        .map(|(line, record)| ScoreRecord::from_feature(record, line))
        .collect()
}

impl CoverageProfile {
    /// Build a profile from a GFF-style score table.
    pub fn build<P: AsRef<Path>>(path: P, normalize: bool) -> Result<CoverageProfile> {
        let records = score_records(read_tsv(path)?)?;
        Self::from_records(&records, normalize)
    }

    pub fn from_reader<R: io::Read>(rdr: R, normalize: bool) -> Result<CoverageProfile> {
        let records = score_records(read_tsv_from(rdr)?)?;
        Self::from_records(&records, normalize)
    }

    /// Rows are applied in order, so a later row at the same start and strand
    /// replaces the earlier score. Rows on any other strand only widen the range.
    pub fn from_records(records: &[ScoreRecord], normalize: bool) -> Result<CoverageProfile> {
        let max_start = records
            .iter()
            .map(|r| r.start)
            .max()
            .ok_or_else(|| Error::new(ErrorKind::InvalidProfile("no score records".into())))?;

        let mut plus: BTreeMap<u64, f64> = BTreeMap::new();
        let mut minus: BTreeMap<u64, f64> = BTreeMap::new();
        let mut dropped = 0usize;
        for record in records {
            match record.strand {
                Strand::Plus => {
                    plus.insert(record.start, record.score);
                }
                Strand::Minus => {
                    minus.insert(record.start, record.score);
                }
                Strand::Other(_) => dropped += 1,
            }
        }
        if dropped > 0 {
            debug!("Dropped {} rows without a +/- strand", dropped);
        }

        let len = usize::try_from(max_start)
            .ok()
            .and_then(|m| m.checked_add(1))
            .ok_or_else(|| {
                Error::new(ErrorKind::InvalidProfile(format!(
                    "start {} is out of range for a dense profile",
                    max_start
                )))
            })?;
        let dense = |sparse: &BTreeMap<u64, f64>| -> Vec<f64> {
            (0..len as u64)
                .map(|pos| sparse.get(&pos).copied().unwrap_or(0.0))
                .collect()
        };
        let profile = CoverageProfile {
            score_plus: dense(&plus),
            score_minus: dense(&minus),
        };
        info!(
            "Built profile over 0..={} ({} plus, {} minus positions)",
            max_start,
            plus.len(),
            minus.len()
        );

        if normalize {
            profile.normalized()
        } else {
            Ok(profile)
        }
    }

    /// Scale both columns so every cell sums to [`NORMALIZED_TOTAL`].
    pub fn normalized(&self) -> Result<CoverageProfile> {
        let total = self.total();
        if total == 0.0 || !total.is_finite() {
            return Err(Error::new(ErrorKind::InvalidProfile(format!(
                "cannot normalize a profile with total {}",
                total
            ))));
        }
        let factor = NORMALIZED_TOTAL / total;
        debug!("Normalizing by factor {:e}", factor);
        Ok(CoverageProfile {
            score_plus: self.score_plus.iter().map(|v| v * factor).collect(),
            score_minus: self.score_minus.iter().map(|v| v * factor).collect(),
        })
    }

    pub fn total(&self) -> f64 {
        self.score_plus.iter().sum::<f64>() + self.score_minus.iter().sum::<f64>()
    }

    /// Number of positions, `max_start + 1`.
    pub fn len(&self) -> usize {
        self.score_plus.len()
    }

    pub fn is_empty(&self) -> bool {
        self.score_plus.is_empty()
    }

    pub fn max_position(&self) -> u64 {
        self.len().saturating_sub(1) as u64
    }

    /// `(score_plus, score_minus)` at `pos`.
    pub fn get(&self, pos: u64) -> Option<(f64, f64)> {
        let i = usize::try_from(pos).ok()?;
        Some((*self.score_plus.get(i)?, *self.score_minus.get(i)?))
    }

    pub fn score_plus(&self) -> &[f64] {
        &self.score_plus
    }

    pub fn score_minus(&self) -> &[f64] {
        &self.score_minus
    }

    /// Positions in `[window.start, window.end)` that the profile covers,
    /// as `(position, score_plus, score_minus)`.
    pub fn window_points(
        &self,
        window: &CoordinateWindow,
    ) -> impl Iterator<Item = (u64, f64, f64)> + '_ {
        let lo = (window.start as usize).min(self.len());
        let hi = (window.end as usize).min(self.len()).max(lo);
        (lo..hi).map(move |i| (i as u64, self.score_plus[i], self.score_minus[i]))
    }
}
