use std::io;
use std::path::Path;

use csv::{Reader, ReaderBuilder, StringRecord};
use tracing::{debug, info};

use crate::error::{Error, ErrorKind, Result};
use crate::models::FeatureRecord;

/// genome, source, feature, start, end, score, strand, frame, attr
pub const FEATURE_COLUMNS: usize = 9;

fn table_builder() -> ReaderBuilder {
    let mut builder = ReaderBuilder::new();
    builder
        .has_headers(false)
        .delimiter(b'\t')
        .quoting(false)
        .flexible(true);
    builder
}

/// Read a headerless 9-column TSV file. Each record is paired with its line number.
pub fn read_tsv<P: AsRef<Path>>(path: P) -> Result<Vec<(u64, FeatureRecord)>> {
    info!("Reading table from {}", path.as_ref().display());
    let reader = table_builder().from_path(path)?;
    read_records(reader)
}

/// Same as [`read_tsv`] over any reader.
pub fn read_tsv_from<R: io::Read>(rdr: R) -> Result<Vec<(u64, FeatureRecord)>> {
    read_records(table_builder().from_reader(rdr))
}

fn read_records<R: io::Read>(mut reader: Reader<R>) -> Result<Vec<(u64, FeatureRecord)>> {
    let mut raw = StringRecord::new();
    let mut records = Vec::new();

    while reader.read_record(&mut raw)? {
        let line = raw.position().map(|p| p.line()).unwrap_or(0);
        if raw.len() != FEATURE_COLUMNS {
            return Err(Error::new(ErrorKind::Schema {
                line,
                found: raw.len(),
            }));
        }
        let record: FeatureRecord = raw.deserialize(None)?;
        records.push((line, record));
    }

    debug!("Loaded {} rows", records.len());
    Ok(records)
}
