mod appearance;
mod color;
mod compose;
mod error;
mod geometry;
mod instruction;
mod record;
mod render;

#[cfg(test)]
mod tests;

use anyhow::Result;
pub use appearance::{ChartAppearance, ChartColors, ChartTexts, Palette};
pub use color::GradientMap;
pub use compose::Chart;
pub use error::ChartError;
pub use geometry::{GroupRun, bar_heights, group_runs, x_span};
pub use instruction::{HAnchor, Instruction, LegendEntry, LegendGlyph};
pub use plotters::prelude::RGBColor;
pub use record::{CaseRecord, PERCENTILE_COUNT, PERCENTILE_LABELS, load_records, load_records_file};
pub use render::{ChartFigure, render_file};

/// Lay out `records` and render the figure to `name` in one step. An empty
/// input is not an error; the chart comes back empty and no file is written.
pub fn plot(name: &str, records: &[CaseRecord], appearance: &ChartAppearance) -> Result<Chart> {
    let chart = Chart::build(records, appearance)?;
    if chart.is_empty() {
        return Ok(chart);
    }
    render_file(name, &chart, appearance)?;
    Ok(chart)
}
