use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use plotters::style::RGBColor;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::Result;

pub const DEFAULT_FIGURE_WIDTH: f64 = 10.0;
pub const DEFAULT_TICK_COUNT: usize = 20;

/// Colours and sizes used when a figure is drawn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackStyle {
    pub plus_color: [u8; 3],
    pub minus_color: [u8; 3],
    pub baseline_color: [u8; 3],
    pub arrow_fill: [u8; 3],
    pub arrow_edge: [u8; 3],
    /// Pixels per inch of figure size.
    pub dpi: u32,
    pub font_family: String,
    pub font_size: u32,
}

impl Default for TrackStyle {
    fn default() -> Self {
        TrackStyle {
            plus_color: [0, 0, 255],
            minus_color: [0, 128, 0],
            baseline_color: [0, 0, 0],
            arrow_fill: [211, 211, 211],
            arrow_edge: [0, 0, 0],
            dpi: 100,
            font_family: "sans-serif".to_string(),
            font_size: 12,
        }
    }
}

pub(crate) fn rgb(c: [u8; 3]) -> RGBColor {
    RGBColor(c[0], c[1], c[2])
}

/// Options for [`render_region`](crate::plotting::region::render_region).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    /// Width and height in inches; `None` picks the default for that side.
    pub figure_size: (Option<f64>, Option<f64>),
    /// Y-axis label per track, by position.
    pub labels: Option<Vec<String>>,
    pub tick_count: usize,
    pub style: TrackStyle,
}

impl Default for RenderOptions {
    fn default() -> Self {
        RenderOptions {
            figure_size: (None, None),
            labels: None,
            tick_count: DEFAULT_TICK_COUNT,
            style: TrackStyle::default(),
        }
    }
}

impl RenderOptions {
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<RenderOptions> {
        info!("Reading render options from {}", path.as_ref().display());
        let file = File::open(path)?;
        Ok(serde_json::from_reader(BufReader::new(file))?)
    }

    pub fn with_labels<S: Into<String>>(mut self, labels: impl IntoIterator<Item = S>) -> Self {
        self.labels = Some(labels.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_figure_size(mut self, width: Option<f64>, height: Option<f64>) -> Self {
        self.figure_size = (width, height);
        self
    }

    pub fn with_tick_count(mut self, tick_count: usize) -> Self {
        self.tick_count = tick_count;
        self
    }

    /// Width and height in inches, filling in defaults for unset sides.
    pub fn resolve_figure_size(&self, track_count: usize, has_annotation: bool) -> (f64, f64) {
        let (width, height) = self.figure_size;
        let width = width.unwrap_or(DEFAULT_FIGURE_WIDTH);
        let height = height.unwrap_or_else(|| {
            1.5 * track_count as f64 + if has_annotation { 0.75 } else { 0.0 }
        });
        (width, height)
    }
}
