//! Genome-browser style plots of strand-specific coverage.
//!
//! Feature tables and score tables are headerless 9-column TSV files
//! (genome, source, feature, start, end, score, strand, frame, attr).
//!
//! ```no_run
//! use trackplot::{render_genes, CoverageProfile, FeatureTable, RenderOptions, Track};
//!
//! # fn main() -> trackplot::Result<()> {
//! let genes = FeatureTable::load("genome.tsv", Some(&["gene"]))?;
//! let wt = CoverageProfile::build("wt.gff", true)?;
//! let options = RenderOptions::default().with_labels(["wt"]);
//! let figure = render_genes(&["thrL", "thrA"], &[Track::new(&wt)], &genes.annotation(), &options, false)?;
//! figure.save_png("thr_operon.png")?;
//! # Ok(())
//! # }
//! ```

use tracing_subscriber::EnvFilter;

pub mod config;
pub mod data_handling;
pub mod error;
pub mod helper_functions;
pub mod models;
pub mod plotting;

pub use crate::config::{RenderOptions, TrackStyle};
pub use crate::data_handling::annotation::{attribute_name, AnnotationIndex};
pub use crate::data_handling::coverage::{CoverageProfile, NORMALIZED_TOTAL};
pub use crate::data_handling::feature_table::FeatureTable;
pub use crate::error::{Error, ErrorKind, Result};
pub use crate::models::{AnnotationRow, CoordinateWindow, FeatureRecord, ScoreRecord, Strand};
pub use crate::plotting::figure::{AnnotationPanel, Figure, GeneArrow, Panel, TrackPanel};
pub use crate::plotting::genes::{render_genes, resolve_window};
pub use crate::plotting::region::{render_region, Track};

/// Install a `fmt` subscriber filtered by `RUST_LOG`, defaulting to `info`.
///
/// Returns `false` if a global subscriber was already set.
pub fn init_tracing() -> bool {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .try_init()
        .is_ok()
}
