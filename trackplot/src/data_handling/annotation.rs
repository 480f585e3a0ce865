use std::collections::HashMap;
use std::sync::OnceLock;

use regex::Regex;

use crate::error::{Error, ErrorKind, Result};
use crate::models::{AnnotationRow, CoordinateWindow};

/// Attribute keys that carry a display name, most preferred first.
const NAME_KEYS: [&str; 6] = ["Name", "gene", "gene_name", "locus_tag", "ID", "gene_id"];

fn attribute_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    // GFF3 `key=value` or GTF `key "value"`
    PATTERN.get_or_init(|| {
        Regex::new(r#"(?:^|;)\s*([A-Za-z_]+)(?:=([^;]*)|\s+"([^"]*)")"#)
            .expect("attribute pattern is valid")
    })
}

/// Pick a gene name out of a GFF3 or GTF attribute column.
///
/// Falls back to the whole (trimmed) column when no known key is present,
/// which is what GenBank-derived tables with a bare name in column 9 need.
pub fn attribute_name(attr: &str) -> String {
    let mut found: HashMap<&str, &str> = HashMap::new();
    for caps in attribute_pattern().captures_iter(attr) {
        let (Some(key), Some(value)) = (caps.get(1), caps.get(2).or_else(|| caps.get(3))) else {
            continue;
        };
        found.entry(key.as_str()).or_insert(value.as_str().trim());
    }

    NAME_KEYS
        .iter()
        .filter_map(|key| found.get(key))
        .find(|value| !value.is_empty())
        .map(|value| value.to_string())
        .unwrap_or_else(|| attr.trim().to_string())
}

/// Annotation rows that overlap `window`, using the inclusive test.
pub fn overlapping<'a>(
    rows: &'a [AnnotationRow],
    window: &'a CoordinateWindow,
) -> impl Iterator<Item = &'a AnnotationRow> + 'a {
    rows.iter().filter(move |row| window.overlaps(row.start, row.end))
}

/// Annotation rows keyed by display name.
#[derive(Debug, Clone, Default)]
pub struct AnnotationIndex {
    rows: Vec<AnnotationRow>,
    by_name: HashMap<String, Vec<usize>>,
}

impl AnnotationIndex {
    pub fn new(rows: Vec<AnnotationRow>) -> Self {
        let mut by_name: HashMap<String, Vec<usize>> = HashMap::new();
        for (i, row) in rows.iter().enumerate() {
            by_name.entry(row.name.clone()).or_default().push(i);
        }
        AnnotationIndex { rows, by_name }
    }

    pub fn rows(&self) -> &[AnnotationRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.by_name.contains_key(id)
    }

    /// Rows for `ids` in request order. Every row sharing an id is returned.
    pub fn lookup<S: AsRef<str>>(&self, ids: &[S]) -> Result<Vec<AnnotationRow>> {
        let mut out = Vec::with_capacity(ids.len());
        for id in ids {
            let id = id.as_ref();
            let positions = self
                .by_name
                .get(id)
                .ok_or_else(|| Error::new(ErrorKind::Lookup(id.to_string())))?;
            out.extend(positions.iter().map(|&i| self.rows[i].clone()));
        }
        Ok(out)
    }

    pub fn overlapping<'a>(
        &'a self,
        window: &'a CoordinateWindow,
    ) -> impl Iterator<Item = &'a AnnotationRow> + 'a {
        overlapping(&self.rows, window)
    }
}

impl FromIterator<AnnotationRow> for AnnotationIndex {
    fn from_iter<I: IntoIterator<Item = AnnotationRow>>(iter: I) -> Self {
        AnnotationIndex::new(iter.into_iter().collect())
    }
}
