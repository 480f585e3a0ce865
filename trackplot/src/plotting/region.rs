use tracing::{info, warn};

use crate::config::RenderOptions;
use crate::data_handling::annotation::overlapping;
use crate::data_handling::coverage::CoverageProfile;
use crate::error::{Error, ErrorKind, Result};
use crate::models::{AnnotationRow, CoordinateWindow};
use crate::plotting::figure::{AnnotationPanel, Figure, GeneArrow, Panel, TrackPanel};

/// A coverage profile to plot, with an optional y-axis label.
#[derive(Debug, Clone, Copy)]
pub struct Track<'a> {
    pub profile: &'a CoverageProfile,
    pub label: Option<&'a str>,
}

impl<'a> Track<'a> {
    pub fn new(profile: &'a CoverageProfile) -> Self {
        Track {
            profile,
            label: None,
        }
    }

    pub fn with_label(mut self, label: &'a str) -> Self {
        self.label = Some(label);
        self
    }
}

impl<'a> From<&'a CoverageProfile> for Track<'a> {
    fn from(profile: &'a CoverageProfile) -> Self {
        Track::new(profile)
    }
}

/// Lay out one panel per track plus, when `annotation` is non-empty, a gene
/// arrow panel at the bottom.
///
/// Track labels come from `options.labels` by position. When the list is
/// shorter than `tracks`, the remaining panels use the track's own label
/// (or none) rather than failing.
///
/// Fails with `InvalidWindow` when the window is empty, `tick_count` is
/// zero, or `window.end` does not fit the signed plotting axis.
pub fn render_region(
    window: CoordinateWindow,
    tracks: &[Track<'_>],
    annotation: &[AnnotationRow],
    options: &RenderOptions,
) -> Result<Figure> {
    if tracks.is_empty() {
        return Err(Error::new(ErrorKind::Render("no tracks to render".into())));
    }
    let x_ticks = window.ticks(options.tick_count)?;
    let has_annotation = !annotation.is_empty();
    let (width, height) = options.resolve_figure_size(tracks.len(), has_annotation);

    let mut panels = Vec::with_capacity(tracks.len() + 1);
    for (i, track) in tracks.iter().enumerate() {
        let label = options
            .labels
            .as_ref()
            .and_then(|labels| labels.get(i).cloned())
            .or_else(|| track.label.map(str::to_string));

        let (plus, minus) = track
            .profile
            .window_points(&window)
            .map(|(pos, p, m)| ((pos, p), (pos, -m)))
            .unzip();

        panels.push(Panel::Track(TrackPanel {
            label,
            baseline: (window.start, window.end),
            plus,
            minus,
        }));
    }

    if has_annotation {
        let arrows: Vec<GeneArrow> = overlapping(annotation, &window)
            .map(GeneArrow::from_row)
            .collect();
        if arrows.is_empty() {
            warn!(
                "None of {} annotation rows overlap [{}, {}]",
                annotation.len(),
                window.start,
                window.end
            );
        }
        panels.push(Panel::Annotation(AnnotationPanel { arrows }));
    }

    info!(
        "Laid out [{}, {}) with {} panels ({:.2} x {:.2} in)",
        window.start,
        window.end,
        panels.len(),
        width,
        height
    );

    Ok(Figure {
        window,
        width,
        height,
        panels,
        x_ticks,
        style: options.style.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ScoreRecord;

    fn profile() -> CoverageProfile {
        let records = vec![
            ScoreRecord::new(100, 4.0, "+"),
            ScoreRecord::new(150, 2.0, "-"),
            ScoreRecord::new(260, 1.0, "+"),
        ];
        CoverageProfile::from_records(&records, false).unwrap()
    }

    fn genes() -> Vec<AnnotationRow> {
        vec![
            AnnotationRow::new("left", 50, 105, "+"),
            AnnotationRow::new("edge", 200, 250, "-"),
            AnnotationRow::new("outside", 10, 99, "+"),
        ]
    }

    #[test]
    fn panel_layout_with_annotation() {
        let p = profile();
        let tracks = [Track::new(&p), Track::new(&p)];
        let figure = render_region(
            CoordinateWindow::new(100, 200),
            &tracks,
            &genes(),
            &RenderOptions::default(),
        )
        .unwrap();

        assert_eq!(figure.panels().len(), 3);
        assert_eq!(figure.height_ratios(), vec![2, 2, 1]);
        assert_eq!(figure.size(), (10.0, 3.75));
        assert_eq!(figure.pixel_size(), (1000, 375));
        assert!(matches!(figure.panels().last(), Some(Panel::Annotation(_))));
    }

    #[test]
    fn panel_layout_without_annotation() {
        let p = profile();
        let figure = render_region(
            CoordinateWindow::new(0, 100),
            &[Track::new(&p)],
            &[],
            &RenderOptions::default().with_figure_size(Some(4.0), None),
        )
        .unwrap();

        assert_eq!(figure.height_ratios(), vec![2]);
        assert_eq!(figure.size(), (4.0, 1.5));
        assert!(figure.annotation_panel().is_none());
    }

    #[test]
    fn track_curves_are_sliced_and_minus_is_negated() {
        let p = profile();
        let figure = render_region(
            CoordinateWindow::new(100, 200),
            &[Track::new(&p)],
            &[],
            &RenderOptions::default(),
        )
        .unwrap();

        let track = figure.track_panels().next().unwrap();
        assert_eq!(track.baseline, (100, 200));
        assert_eq!(track.plus.len(), 100);
        assert_eq!(track.plus.first(), Some(&(100, 4.0)));
        assert_eq!(track.plus.last().map(|p| p.0), Some(199));
        assert_eq!(track.minus[50], (150, -2.0));
        assert_eq!(track.minus[0].1, 0.0);
    }

    #[test]
    fn arrows_follow_inclusive_overlap() {
        let p = profile();
        let figure = render_region(
            CoordinateWindow::new(100, 200),
            &[Track::new(&p)],
            &genes(),
            &RenderOptions::default(),
        )
        .unwrap();

        let arrows = &figure.annotation_panel().unwrap().arrows;
        let names: Vec<&str> = arrows.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["left", "edge"]);
        assert_eq!((arrows[0].tail, arrows[0].head), (50, 105));
        assert_eq!((arrows[1].tail, arrows[1].head), (250, 200));
    }

    #[test]
    fn annotation_panel_kept_when_nothing_overlaps() {
        let p = profile();
        let figure = render_region(
            CoordinateWindow::new(300, 400),
            &[Track::new(&p)],
            &genes(),
            &RenderOptions::default(),
        )
        .unwrap();
        assert_eq!(figure.panels().len(), 2);
        assert!(figure.annotation_panel().unwrap().arrows.is_empty());
        assert!(figure.track_panels().next().unwrap().plus.is_empty());
    }

    #[test]
    fn labels_are_positional_with_track_fallback() {
        let p = profile();
        let tracks = [
            Track::new(&p).with_label("own"),
            Track::new(&p).with_label("second"),
            Track::new(&p),
        ];
        let options = RenderOptions::default().with_labels(["wt"]);
        let figure =
            render_region(CoordinateWindow::new(0, 100), &tracks, &[], &options).unwrap();
        let labels: Vec<Option<&str>> = figure
            .track_panels()
            .map(|t| t.label.as_deref())
            .collect();
        assert_eq!(labels, vec![Some("wt"), Some("second"), None]);
    }

    #[test]
    fn bottom_ticks_span_window() {
        let p = profile();
        let figure = render_region(
            CoordinateWindow::new(100, 200),
            &[Track::new(&p)],
            &[],
            &RenderOptions::default().with_tick_count(4),
        )
        .unwrap();
        assert_eq!(figure.x_ticks(), &[100, 125, 150, 175]);
    }

    #[test]
    fn zero_tracks_is_an_error() {
        let err = render_region(
            CoordinateWindow::new(0, 100),
            &[],
            &genes(),
            &RenderOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::Render(_)));
    }

    #[test]
    fn empty_window_is_an_error() {
        let p = profile();
        let err = render_region(
            CoordinateWindow::new(200, 100),
            &[Track::new(&p)],
            &[],
            &RenderOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::InvalidWindow { .. }));
    }

    fn two_track_figure() -> Figure {
        let p = profile();
        let tracks = [Track::new(&p), Track::new(&p)];
        let options = RenderOptions::default().with_labels(["wt", "mutant"]);
        render_region(CoordinateWindow::new(100, 200), &tracks, &genes(), &options).unwrap()
    }

    fn text_count(svg: &str, text: &str) -> usize {
        svg.matches(&format!(">\n{}\n</text>", text)).count()
    }

    #[test]
    fn draws_svg() {
        let svg = two_track_figure().to_svg_string().unwrap();
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains(r#"width="1000" height="375""#));

        // One y-axis title per track panel.
        assert_eq!(text_count(&svg, "wt"), 1);
        assert_eq!(text_count(&svg, "mutant"), 1);

        // One filled arrow and one name per overlapping gene.
        assert_eq!(svg.matches("<polygon").count(), 2);
        assert_eq!(text_count(&svg, "left"), 1);
        assert_eq!(text_count(&svg, "edge"), 1);
        assert_eq!(text_count(&svg, "outside"), 0);

        // Tick labels sit on the bottom panel only.
        assert_eq!(text_count(&svg, "100"), 1);
        assert_eq!(text_count(&svg, "195"), 1);
    }

    #[test]
    fn saves_svg_and_png() {
        let figure = two_track_figure();
        let dir = tempfile::tempdir().unwrap();

        let svg_path = dir.path().join("region.svg");
        figure.save_svg(&svg_path).unwrap();
        let svg = std::fs::read_to_string(&svg_path).unwrap();
        assert!(svg.starts_with("<svg"));
        assert_eq!(svg.matches("<polygon").count(), 2);

        let png_path = dir.path().join("region.png");
        figure.save_png(&png_path).unwrap();
        let png = std::fs::read(&png_path).unwrap();
        assert!(png.starts_with(b"\x89PNG"));
    }

    #[test]
    fn window_past_signed_axis_is_rejected() {
        let p = profile();
        let err = render_region(
            CoordinateWindow::new(u64::MAX - 100, u64::MAX),
            &[Track::new(&p)],
            &[],
            &RenderOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::InvalidWindow { .. }));
    }
}
