// src/chart.rs

//! Backend-neutral description of the 3x2 chart figure.
//!
//! Everything the GUI needs to draw a panel is decided here: position in the
//! grid, colour, axis labels, gridline positions and the points themselves.
//! The GUI only translates this into `egui_plot` calls.

use chrono::{DateTime, NaiveDate, NaiveTime};

use crate::config::{
    GRID_ALPHA, GRID_COLS, GRID_ROWS, GRID_TICKS, LINE_WIDTH, PALETTE, X_AXIS_LABEL, Y_AXIS_LABEL,
};
use crate::error::TrackerError;
use crate::types::{HistoricalSeries, SeriesColumn};

const SECONDS_PER_DAY: i64 = 86_400;

/// How gridlines are stroked.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridStyle {
    pub dashed: bool,
    pub alpha: f32,
}

/// One subplot: a single line series against the shared date index.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartPanel {
    pub column: SeriesColumn,
    /// Legend text.
    pub label: &'static str,
    pub color: [u8; 3],
    pub row: usize,
    pub col: usize,
    pub x_label: &'static str,
    pub y_label: &'static str,
    pub line_width: f32,
    pub grid: GridStyle,
    /// `[days since 1970-01-01, value]`.
    pub points: Vec<[f64; 2]>,
    pub x_ticks: Vec<f64>,
    pub y_ticks: Vec<f64>,
}

/// The full figure. Panels are stored row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartGrid {
    pub rows: usize,
    pub cols: usize,
    pub panels: Vec<ChartPanel>,
}

impl ChartGrid {
    /// Lays the six columns out row-major, colour matched by position.
    pub fn build(series: &HistoricalSeries) -> Result<Self, TrackerError> {
        if series.is_empty() {
            return Err(TrackerError::Render(format!(
                "no rows to plot for {}",
                series.ticker()
            )));
        }

        let xs: Vec<f64> = series.index().iter().map(|d| date_to_x(*d)).collect();
        let (x_min, x_max) = bounds(&xs);

        let mut panels = Vec::with_capacity(GRID_ROWS * GRID_COLS);
        for (position, (column, values)) in series.iter().enumerate() {
            if let Some(bad) = values.iter().position(|v| !v.is_finite()) {
                return Err(TrackerError::Render(format!(
                    "{} has a non-finite value on {}",
                    column.label(),
                    series.index()[bad]
                )));
            }
            let (y_min, y_max) = bounds(values);
            panels.push(ChartPanel {
                column,
                label: column.label(),
                color: PALETTE[position],
                row: position / GRID_COLS,
                col: position % GRID_COLS,
                x_label: X_AXIS_LABEL,
                y_label: Y_AXIS_LABEL,
                line_width: LINE_WIDTH,
                grid: GridStyle {
                    dashed: true,
                    alpha: GRID_ALPHA,
                },
                points: xs.iter().zip(values).map(|(x, y)| [*x, *y]).collect(),
                x_ticks: nice_ticks(x_min, x_max, GRID_TICKS),
                y_ticks: nice_ticks(y_min, y_max, GRID_TICKS),
            });
        }

        Ok(Self {
            rows: GRID_ROWS,
            cols: GRID_COLS,
            panels,
        })
    }

    pub fn panel(&self, row: usize, col: usize) -> Option<&ChartPanel> {
        self.panels.iter().find(|p| p.row == row && p.col == col)
    }
}

/// Whole days since the Unix epoch, as a plot x coordinate.
pub fn date_to_x(date: NaiveDate) -> f64 {
    (date.and_time(NaiveTime::MIN).and_utc().timestamp() / SECONDS_PER_DAY) as f64
}

/// Inverse of [`date_to_x`], formatted for an axis tick. Out-of-range input gives an empty label.
pub fn format_date_tick(x: f64) -> String {
    DateTime::from_timestamp(x.round() as i64 * SECONDS_PER_DAY, 0)
        .map(|dt| dt.date_naive().format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

/// Roughly `target` evenly spaced round values covering `[min, max]`.
///
/// Steps are 1, 2 or 5 times a power of ten. A degenerate range yields the
/// single value.
pub fn nice_ticks(min: f64, max: f64, target: usize) -> Vec<f64> {
    let range = max - min;
    if !range.is_finite() || range <= 0.0 || target == 0 {
        return vec![min];
    }

    let raw_step = range / target as f64;
    let magnitude = 10f64.powf(raw_step.log10().floor());
    let residual = raw_step / magnitude;
    let nice = if residual > 5.0 {
        10.0
    } else if residual > 2.0 {
        5.0
    } else if residual > 1.0 {
        2.0
    } else {
        1.0
    };
    let step = nice * magnitude;

    let first = (min / step).ceil() * step;
    let epsilon = step * 1e-9;
    (0..)
        .map(|i| first + i as f64 * step)
        .take_while(|v| *v <= max + epsilon)
        .collect()
}

fn bounds(values: &[f64]) -> (f64, f64) {
    values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(*v), hi.max(*v))
        })
}
