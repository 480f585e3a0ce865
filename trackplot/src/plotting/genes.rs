use tracing::info;

use crate::config::RenderOptions;
use crate::data_handling::annotation::AnnotationIndex;
use crate::error::{Error, ErrorKind, Result};
use crate::models::{AnnotationRow, CoordinateWindow};
use crate::plotting::figure::Figure;
use crate::plotting::region::{render_region, Track};

/// Smallest window covering every requested gene, together with the matched rows.
pub fn resolve_window<S: AsRef<str>>(
    gene_ids: &[S],
    annotation: &AnnotationIndex,
) -> Result<(CoordinateWindow, Vec<AnnotationRow>)> {
    let rows = annotation.lookup(gene_ids)?;
    let start = rows.iter().map(|r| r.start).min();
    let end = rows.iter().map(|r| r.end).max();
    match (start, end) {
        (Some(start), Some(end)) => {
            info!(
                "Resolved {} genes to [{}, {}]",
                gene_ids.len(),
                start,
                end
            );
            Ok((CoordinateWindow::new(start, end), rows))
        }
        _ => Err(Error::new(ErrorKind::Lookup("no gene ids given".into()))),
    }
}

/// Plot the window spanning `gene_ids`.
///
/// With `show_full_annotation` every gene of `annotation` overlapping that
/// window gets an arrow; otherwise only the requested genes do.
pub fn render_genes<S: AsRef<str>>(
    gene_ids: &[S],
    tracks: &[Track<'_>],
    annotation: &AnnotationIndex,
    options: &RenderOptions,
    show_full_annotation: bool,
) -> Result<Figure> {
    let (window, rows) = resolve_window(gene_ids, annotation)?;
    let annotation_rows = if show_full_annotation {
        annotation.rows()
    } else {
        rows.as_slice()
    };
    render_region(window, tracks, annotation_rows, options)
}
