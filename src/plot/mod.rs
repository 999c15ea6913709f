//! ASCII spectrum plot for terminal output
//!
//! Renders a pixel spectrum as a fixed-size scatter chart: one column per
//! sampled bin, one row per vertical band of counts. No statistics beyond
//! the min/max scaling are computed.

use std::fmt::Write;

use serde::{Deserialize, Serialize};

/// Width of the row label gutter (`"{:>10} |"`)
const LABEL_WIDTH: usize = 10;

/// Plot canvas configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlotConfig {
    /// Canvas width (columns)
    pub cols: usize,
    /// Canvas height (rows)
    pub rows: usize,
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self { cols: 70, rows: 30 }
    }
}

/// ASCII plotter for one accepted series and an optional rejected series
#[derive(Debug, Clone, Default)]
pub struct SpectrumPlot {
    config: PlotConfig,
}

impl SpectrumPlot {
    pub fn new(config: PlotConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PlotConfig {
        &self.config
    }

    /// Render the chart as text, one line per row plus the axis rule
    ///
    /// Accepted samples draw as `x`; rejected samples draw as `o` where the
    /// accepted series has no point in the band. MM1 pixels carry no
    /// rejected-event series, so the tracer always passes `None`; the
    /// second series is for library callers plotting their own counts.
    pub fn render(&self, accepted: &[u32], rejected: Option<&[u32]>) -> String {
        let mut out = String::new();
        let cols = self.config.cols.max(1);
        let rows = self.config.rows.max(2);

        if let Some((a_min, a_max)) = value_range(accepted, rejected) {
            let x_unit = accepted.len() / cols;
            let y_unit = (a_max - a_min) / (rows as u64 - 1);

            if y_unit == 0 {
                // Bands collapse; draw everything on one row
                self.render_row(&mut out, accepted, rejected, x_unit, a_min, None);
            } else {
                for r in (1..=rows as u64).rev() {
                    let y_bot = (r - 1) * y_unit + a_min;
                    // The top band is open so the maximum is never lost to rounding
                    let y_top = (r < rows as u64).then_some(r * y_unit + a_min);
                    self.render_row(&mut out, accepted, rejected, x_unit, y_bot, y_top);
                }
            }
        }

        let _ = writeln!(out, "{:width$}{}", "", "-".repeat(cols), width = LABEL_WIDTH + 2);
        out
    }

    /// One band `[y_bot, y_top)`; `None` leaves the band open upwards
    fn render_row(
        &self,
        out: &mut String,
        accepted: &[u32],
        rejected: Option<&[u32]>,
        x_unit: usize,
        y_bot: u64,
        y_top: Option<u64>,
    ) {
        let in_band = |v: u32| {
            let v = v as u64;
            v >= y_bot && y_top.is_none_or(|top| v < top)
        };

        let _ = write!(out, "{:>width$} |", y_bot, width = LABEL_WIDTH);
        for c in 1..self.config.cols.max(1) {
            let bin = c * x_unit;
            let mark = if accepted.get(bin).copied().is_some_and(in_band) {
                'x'
            } else if rejected
                .and_then(|r| r.get(bin).copied())
                .is_some_and(in_band)
            {
                'o'
            } else {
                ' '
            };
            out.push(mark);
        }
        out.push('\n');
    }
}

/// Smallest and largest count over both series; `None` when both are empty
fn value_range(accepted: &[u32], rejected: Option<&[u32]>) -> Option<(u64, u64)> {
    accepted
        .iter()
        .chain(rejected.unwrap_or(&[]).iter())
        .fold(None, |range, &v| {
            let v = v as u64;
            Some(match range {
                None => (v, v),
                Some((lo, hi)) => (lo.min(v), hi.max(v)),
            })
        })
}
