use std::io;
use std::path::Path;

use tracing::{debug, info};

use crate::data_handling::annotation::{attribute_name, AnnotationIndex};
use crate::error::Result;
use crate::helper_functions::{read_tsv, read_tsv_from};
use crate::models::{AnnotationRow, FeatureRecord};

/// A GenBank-derived feature table, sorted by strand then start.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureTable {
    records: Vec<FeatureRecord>,
}

impl FeatureTable {
    /// Load a feature table, keeping only the feature types in `feature_filter`
    /// when one is given.
    pub fn load<P: AsRef<Path>>(path: P, feature_filter: Option<&[&str]>) -> Result<FeatureTable> {
        let rows = read_tsv(path)?;
        Ok(Self::from_rows(rows, feature_filter))
    }

    pub fn from_reader<R: io::Read>(rdr: R, feature_filter: Option<&[&str]>) -> Result<FeatureTable> {
        let rows = read_tsv_from(rdr)?;
        Ok(Self::from_rows(rows, feature_filter))
    }

    fn from_rows(rows: Vec<(u64, FeatureRecord)>, feature_filter: Option<&[&str]>) -> FeatureTable {
        let mut records: Vec<FeatureRecord> = rows.into_iter().map(|(_, r)| r).collect();
        // stable, so ties keep file order
        records.sort_by(|a, b| (&a.strand, a.start).cmp(&(&b.strand, b.start)));

        let table = FeatureTable { records };
        match feature_filter {
            Some(features) => {
                let filtered = table.filter_features(features);
                info!(
                    "Kept {} of {} rows for features {:?}",
                    filtered.len(),
                    table.len(),
                    features
                );
                filtered
            }
            None => table,
        }
    }

    /// Rows whose feature type is one of `features`, in table order.
    pub fn filter_features(&self, features: &[&str]) -> FeatureTable {
        FeatureTable {
            records: self
                .records
                .iter()
                .filter(|r| features.contains(&r.feature.as_str()))
                .cloned()
                .collect(),
        }
    }

    pub fn records(&self) -> &[FeatureRecord] {
        &self.records
    }

    pub fn iter(&self) -> impl Iterator<Item = &FeatureRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn is_sorted(&self) -> bool {
        self.records
            .windows(2)
            .all(|w| (&w[0].strand, w[0].start) <= (&w[1].strand, w[1].start))
    }

    /// Index rows by a caller supplied display name.
    pub fn annotation_with<F>(&self, name_fn: F) -> AnnotationIndex
    where
        F: Fn(&FeatureRecord) -> String,
    {
        let rows = self
            .records
            .iter()
            .map(|r| AnnotationRow {
                name: name_fn(r),
                start: r.start,
                end: r.end,
                strand: r.strand.clone(),
            })
            .collect::<Vec<_>>();
        debug!("Indexed {} annotation rows", rows.len());
        AnnotationIndex::new(rows)
    }

    /// Index rows by the gene name found in the attribute column.
    pub fn annotation(&self) -> AnnotationIndex {
        self.annotation_with(|r| attribute_name(&r.attr))
    }
}

impl<'a> IntoIterator for &'a FeatureTable {
    type Item = &'a FeatureRecord;
    type IntoIter = std::slice::Iter<'a, FeatureRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
