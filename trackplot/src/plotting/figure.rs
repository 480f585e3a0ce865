use std::path::Path;

use plotters::coord::combinators::{BindKeyPoints, WithKeyPoints};
use plotters::coord::types::RangedCoordi64;
use plotters::coord::Shift;
use plotters::drawing::DrawingArea;
use plotters::prelude::*;
use plotters::series::DashedLineSeries;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters_backend::DrawingBackend;
use plotters_bitmap::BitMapBackend;
use plotters_svg::SVGBackend;
use tracing::{debug, info};

use crate::config::{rgb, TrackStyle};
use crate::error::{render_err, Error, ErrorKind, Result};
use crate::models::{AnnotationRow, CoordinateWindow, Strand};

/// Y range of the annotation panel.
pub const ANNOTATION_Y_RANGE: (f64, f64) = (-0.5, 1.0);
/// Height at which gene names are written.
pub const LABEL_Y: f64 = 0.5;

const PANEL_MARGIN: i32 = 5;
const Y_LABEL_AREA: i32 = 60;
const X_LABEL_AREA: i32 = 30;
const ARROW_HALF_WIDTH: f64 = 0.1;
const ARROW_HEAD_HALF_WIDTH: f64 = 0.25;

/// One track: dashed zero baseline, plus scores above and negated minus scores below.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackPanel {
    pub label: Option<String>,
    /// `(start, end)` of the zero line.
    pub baseline: (u64, u64),
    pub plus: Vec<(u64, f64)>,
    /// Already negated.
    pub minus: Vec<(u64, f64)>,
}

impl TrackPanel {
    /// Padded y range covering both curves and zero.
    pub fn y_range(&self) -> (f64, f64) {
        let top = self.plus.iter().map(|p| p.1).fold(0.0_f64, f64::max);
        let bottom = self.minus.iter().map(|p| p.1).fold(0.0_f64, f64::min);
        if top - bottom <= 0.0 {
            return (-1.0, 1.0);
        }
        let pad = (top - bottom) * 0.05;
        (bottom - pad, top + pad)
    }
}

/// A gene arrow pointing from `tail` to `head`.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneArrow {
    pub name: String,
    pub tail: u64,
    pub head: u64,
}

impl GeneArrow {
    /// Plus-strand genes point from start to end, every other strand from end to start.
    pub fn from_row(row: &AnnotationRow) -> Self {
        let (tail, head) = match row.strand {
            Strand::Plus => (row.start, row.end),
            _ => (row.end, row.start),
        };
        GeneArrow {
            name: row.name.clone(),
            tail,
            head,
        }
    }

    pub fn is_forward(&self) -> bool {
        self.head >= self.tail
    }

    /// Midpoint where the name is centred.
    pub fn label_x(&self) -> f64 {
        (self.tail as f64 + self.head as f64) / 2.0
    }

    fn outline(&self, head_len: i64) -> Vec<(i64, f64)> {
        let tail = axis_x(self.tail);
        let head = axis_x(self.head);
        let dir = if self.is_forward() { 1 } else { -1 };
        let neck = head - dir * head_len.min((head - tail).abs());
        vec![
            (tail, -ARROW_HALF_WIDTH),
            (neck, -ARROW_HALF_WIDTH),
            (neck, -ARROW_HEAD_HALF_WIDTH),
            (head, 0.0),
            (neck, ARROW_HEAD_HALF_WIDTH),
            (neck, ARROW_HALF_WIDTH),
            (tail, ARROW_HALF_WIDTH),
            (tail, -ARROW_HALF_WIDTH),
        ]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnnotationPanel {
    pub arrows: Vec<GeneArrow>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Panel {
    Track(TrackPanel),
    Annotation(AnnotationPanel),
}

impl Panel {
    pub fn height_ratio(&self) -> u32 {
        match self {
            Panel::Track(_) => 2,
            Panel::Annotation(_) => 1,
        }
    }
}

/// A stack of panels over one coordinate window. Nothing is drawn until
/// [`Figure::draw`] or one of the save methods is called.
#[derive(Debug, Clone, PartialEq)]
pub struct Figure {
    pub(crate) window: CoordinateWindow,
    pub(crate) width: f64,
    pub(crate) height: f64,
    pub(crate) panels: Vec<Panel>,
    pub(crate) x_ticks: Vec<u64>,
    pub(crate) style: TrackStyle,
}

fn tick_label(x: &i64) -> String {
    x.to_string()
}

/// Positions past `i64::MAX` are pinned to the axis end.
fn axis_x(x: u64) -> i64 {
    i64::try_from(x).unwrap_or(i64::MAX)
}

impl Figure {
    pub fn window(&self) -> CoordinateWindow {
        self.window
    }

    /// Width and height in inches.
    pub fn size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    pub fn pixel_size(&self) -> (u32, u32) {
        let dpi = self.style.dpi as f64;
        (
            (self.width * dpi).round().max(1.0) as u32,
            (self.height * dpi).round().max(1.0) as u32,
        )
    }

    pub fn panels(&self) -> &[Panel] {
        &self.panels
    }

    pub fn height_ratios(&self) -> Vec<u32> {
        self.panels.iter().map(Panel::height_ratio).collect()
    }

    /// Tick positions on the bottom panel.
    pub fn x_ticks(&self) -> &[u64] {
        &self.x_ticks
    }

    pub fn track_panels(&self) -> impl Iterator<Item = &TrackPanel> {
        self.panels.iter().filter_map(|p| match p {
            Panel::Track(t) => Some(t),
            Panel::Annotation(_) => None,
        })
    }

    pub fn annotation_panel(&self) -> Option<&AnnotationPanel> {
        self.panels.iter().find_map(|p| match p {
            Panel::Annotation(a) => Some(a),
            Panel::Track(_) => None,
        })
    }

    pub fn style_mut(&mut self) -> &mut TrackStyle {
        &mut self.style
    }

    /// Draw every panel onto `root`, stacked top to bottom by height ratio.
    pub fn draw<DB: DrawingBackend>(&self, root: &DrawingArea<DB, Shift>) -> Result<()> {
        root.fill(&WHITE).map_err(render_err)?;

        let areas = split_by_ratio(root, &self.height_ratios());
        let last = areas.len().saturating_sub(1);
        for (i, (panel, area)) in self.panels.iter().zip(areas.iter()).enumerate() {
            let bottom = i == last;
            match panel {
                Panel::Track(track) => self.draw_track(track, area, bottom)?,
                Panel::Annotation(annotation) => self.draw_annotation(annotation, area, bottom)?,
            }
        }

        root.present().map_err(render_err)?;
        debug!("Drew {} panels", self.panels.len());
        Ok(())
    }

    fn x_range(&self) -> Result<WithKeyPoints<RangedCoordi64>> {
        let invalid = || {
            Error::new(ErrorKind::InvalidWindow {
                start: self.window.start,
                end: self.window.end,
                tick_count: self.x_ticks.len(),
            })
        };
        let start = i64::try_from(self.window.start).map_err(|_| invalid())?;
        let end = i64::try_from(self.window.end).map_err(|_| invalid())?;
        let ticks = self
            .x_ticks
            .iter()
            .map(|&t| i64::try_from(t).map_err(|_| invalid()))
            .collect::<Result<Vec<_>>>()?;
        Ok((start..end).with_key_points(ticks))
    }

    fn draw_track<DB: DrawingBackend>(
        &self,
        track: &TrackPanel,
        area: &DrawingArea<DB, Shift>,
        bottom: bool,
    ) -> Result<()> {
        let (y_min, y_max) = track.y_range();
        let font = (self.style.font_family.as_str(), self.style.font_size);

        let mut chart = ChartBuilder::on(area)
            .margin(PANEL_MARGIN)
            .x_label_area_size(if bottom { X_LABEL_AREA } else { 0 })
            .y_label_area_size(Y_LABEL_AREA)
            .build_cartesian_2d(self.x_range()?, y_min..y_max)
            .map_err(render_err)?;

        {
            let mut mesh = chart.configure_mesh();
            mesh.disable_mesh()
                .y_labels(5)
                .x_labels(self.x_ticks.len())
                .x_label_formatter(&tick_label)
                .label_style(font);
            if let Some(label) = &track.label {
                mesh.y_desc(label.as_str()).axis_desc_style(font);
            }
            if !bottom {
                mesh.disable_x_axis();
            }
            mesh.draw().map_err(render_err)?;
        }

        let (start, end) = track.baseline;
        chart
            .draw_series(DashedLineSeries::new(
                vec![(axis_x(start), 0.0), (axis_x(end), 0.0)],
                6,
                4,
                rgb(self.style.baseline_color).stroke_width(1),
            ))
            .map_err(render_err)?;

        let plus = rgb(self.style.plus_color);
        chart
            .draw_series(LineSeries::new(
                track.plus.iter().map(|&(x, y)| (axis_x(x), y)),
                &plus,
            ))
            .map_err(render_err)?;

        let minus = rgb(self.style.minus_color);
        chart
            .draw_series(LineSeries::new(
                track.minus.iter().map(|&(x, y)| (axis_x(x), y)),
                &minus,
            ))
            .map_err(render_err)?;

        Ok(())
    }

    fn draw_annotation<DB: DrawingBackend>(
        &self,
        annotation: &AnnotationPanel,
        area: &DrawingArea<DB, Shift>,
        bottom: bool,
    ) -> Result<()> {
        let font = (self.style.font_family.as_str(), self.style.font_size);
        let (y_min, y_max) = ANNOTATION_Y_RANGE;

        let mut chart = ChartBuilder::on(area)
            .margin(PANEL_MARGIN)
            .x_label_area_size(if bottom { X_LABEL_AREA } else { 0 })
            .y_label_area_size(Y_LABEL_AREA)
            .build_cartesian_2d(self.x_range()?, y_min..y_max)
            .map_err(render_err)?;

        {
            let mut mesh = chart.configure_mesh();
            mesh.disable_mesh()
                .y_labels(0)
                .x_labels(self.x_ticks.len())
                .x_label_formatter(&tick_label)
                .label_style(font);
            if !bottom {
                mesh.disable_x_axis();
            }
            mesh.draw().map_err(render_err)?;
        }

        let fill = rgb(self.style.arrow_fill);
        let edge = rgb(self.style.arrow_edge);
        let head_len = (axis_x(self.window.len()) / 50).max(1);
        let text_style = TextStyle::from(font.into_font()).pos(Pos::new(HPos::Center, VPos::Center));

        for arrow in &annotation.arrows {
            let outline = arrow.outline(head_len);
            chart
                .draw_series(std::iter::once(Polygon::new(outline.clone(), fill.filled())))
                .map_err(render_err)?;
            chart
                .draw_series(std::iter::once(PathElement::new(outline, &edge)))
                .map_err(render_err)?;
            chart
                .draw_series(std::iter::once(Text::new(
                    arrow.name.clone(),
                    (arrow.label_x().round() as i64, LABEL_Y),
                    text_style.clone(),
                )))
                .map_err(render_err)?;
        }

        Ok(())
    }

    /// Render into an SVG document held in memory.
    pub fn to_svg_string(&self) -> Result<String> {
        let mut buf = String::new();
        {
            let root = SVGBackend::with_string(&mut buf, self.pixel_size()).into_drawing_area();
            self.draw(&root)?;
        }
        Ok(buf)
    }

    pub fn save_svg<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let root = SVGBackend::new(path.as_ref(), self.pixel_size()).into_drawing_area();
        self.draw(&root)?;
        info!("Figure saved to: {}", path.as_ref().display());
        Ok(())
    }

    pub fn save_png<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let root = BitMapBackend::new(path.as_ref(), self.pixel_size()).into_drawing_area();
        self.draw(&root)?;
        info!("Figure saved to: {}", path.as_ref().display());
        Ok(())
    }
}

/// Split `root` top to bottom into one area per ratio entry.
fn split_by_ratio<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    ratios: &[u32],
) -> Vec<DrawingArea<DB, Shift>> {
    let total: u32 = ratios.iter().sum();
    let (_, height) = root.dim_in_pixel();
    let mut areas = Vec::with_capacity(ratios.len());
    if total == 0 {
        return areas;
    }

    let mut rest = root.clone();
    for (i, ratio) in ratios.iter().enumerate() {
        if i + 1 == ratios.len() {
            areas.push(rest);
            break;
        }
        let px = (height as u64 * *ratio as u64 / total as u64) as i32;
        let (top, lower) = rest.split_vertically(px);
        areas.push(top);
        rest = lower;
    }
    areas
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arrow_direction_follows_strand() {
        let forward = GeneArrow::from_row(&AnnotationRow::new("thrL", 190, 255, "+"));
        assert_eq!((forward.tail, forward.head), (190, 255));
        assert!(forward.is_forward());

        let reverse = GeneArrow::from_row(&AnnotationRow::new("yaaA", 5683, 6459, "-"));
        assert_eq!((reverse.tail, reverse.head), (6459, 5683));
        assert!(!reverse.is_forward());
        assert_eq!(reverse.label_x(), 6071.0);
    }

    #[test]
    fn arrow_outline_closes_and_points_at_head() {
        let arrow = GeneArrow::from_row(&AnnotationRow::new("b", 100, 200, "-"));
        let outline = arrow.outline(10);
        assert_eq!(outline.first(), outline.last());
        assert!(outline.contains(&(100, 0.0)));
        assert!(outline.contains(&(110, ARROW_HEAD_HALF_WIDTH)));
    }

    #[test]
    fn flat_track_gets_unit_range() {
        let panel = TrackPanel {
            label: None,
            baseline: (0, 10),
            plus: vec![(0, 0.0)],
            minus: vec![(0, -0.0)],
        };
        assert_eq!(panel.y_range(), (-1.0, 1.0));

        let panel = TrackPanel {
            plus: vec![(0, 10.0)],
            minus: vec![(0, -10.0)],
            ..panel
        };
        assert_eq!(panel.y_range(), (-11.0, 11.0));
    }

    #[test]
    fn axis_positions_are_pinned_to_i64() {
        assert_eq!(axis_x(42), 42);
        assert_eq!(axis_x(u64::MAX), i64::MAX);

        let arrow = GeneArrow::from_row(&AnnotationRow::new("far", 10, u64::MAX, "+"));
        let outline = arrow.outline(5);
        assert!(outline.contains(&(i64::MAX, 0.0)));
        assert!(outline.contains(&(i64::MAX - 5, ARROW_HEAD_HALF_WIDTH)));
    }

    #[test]
    fn unsigned_window_past_axis_fails_to_draw() {
        let window = CoordinateWindow::new(u64::MAX - 100, u64::MAX);
        let figure = Figure {
            window,
            width: 1.0,
            height: 1.0,
            panels: vec![Panel::Track(TrackPanel {
                label: None,
                baseline: (window.start, window.end),
                plus: vec![],
                minus: vec![],
            })],
            x_ticks: vec![window.start],
            style: TrackStyle::default(),
        };
        let err = figure.to_svg_string().unwrap_err();
        assert!(matches!(
            err.kind(),
            ErrorKind::InvalidWindow { tick_count: 1, .. }
        ));
    }
}
