use crate::chart::appearance::{ChartAppearance, ChartTexts, Palette};
use crate::chart::color::GradientMap;
use crate::chart::error::ChartError;
use crate::chart::geometry::{bar_heights, group_runs, x_span};
use crate::chart::instruction::{HAnchor, Instruction, LegendEntry, LegendGlyph};
use crate::chart::record::{CaseRecord, PERCENTILE_LABELS};
use plotters::style::colors::{BLACK, WHITE};

const BAND_OPACITY: f64 = 0.2;
// bands and separators sit 0.2 slots above each run's first row
const BAND_OVERHANG: f64 = 0.2;
const STANDARD_LINE_WIDTH: f64 = 1.4;
const SEPARATOR_LINE_WIDTH: f64 = 0.6;
const OPTIMAL_MARKER_SIZE: f64 = 6.0;
const LABEL_FONT_SIZE: f64 = 7.0;

/// A fully laid-out chart: the ordered instruction list plus the resolved
/// axis domain. Rebuilt from scratch on every call, never cached, and never
/// mutates the records it was built from.
#[derive(Clone, Debug, Default)]
pub struct Chart {
    pub x_domain: (f64, f64),
    pub rows: usize,
    pub instructions: Vec<Instruction>,
}

impl Chart {
    /// Zero records were supplied; there is nothing to render and no error.
    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    /// Lay out `records` into draw instructions. Emission order is per-row
    /// content in slot order, then group bands and separators, then the
    /// legend; a backend draws the list front to back.
    pub fn build(records: &[CaseRecord], appearance: &ChartAppearance) -> Result<Chart, ChartError> {
        if records.is_empty() {
            log::debug!("no records supplied, nothing to lay out");
            return Ok(Chart::default());
        }
        let (x_min, x_max) = x_span(records).ok_or(ChartError::MissingPercentiles)?;
        let gradient = GradientMap::by_name(&appearance.colormap)?;
        let palette = appearance.colors.resolve()?;
        let heights = bar_heights(records, appearance.min_bar_height, appearance.max_bar_height);

        let mut instructions = Vec::new();
        for (slot, record) in records.iter().enumerate() {
            build_segments(record, slot, heights[slot], &gradient, &palette, &appearance.texts.no_variation, &mut instructions);
            build_markers(record, slot, heights[slot], &palette, &mut instructions);
            build_labels(record, slot, (x_min, x_max), appearance, &mut instructions);
        }

        let x_domain = (x_min - appearance.left_margin, x_max + appearance.right_margin);
        build_bands(records, x_domain, &palette, &mut instructions);
        instructions.push(Instruction::Legend(legend_entries(&gradient, &palette, &appearance.texts)));

        log::debug!("chart composed: {} rows, {} instructions", records.len(), instructions.len());
        Ok(Chart {
            x_domain,
            rows: records.len(),
            instructions,
        })
    }
}

fn build_segments(
    record: &CaseRecord,
    slot: usize,
    height: f64,
    gradient: &GradientMap,
    palette: &Palette,
    no_variation_label: &str,
    out: &mut Vec<Instruction>,
) {
    let present = record.present_percentiles();
    if present.len() < 2 {
        return;
    }
    if record.constant_distribution {
        let value = present[0];
        out.push(Instruction::Rect {
            x0: value - 0.5,
            x1: value + 0.5,
            slot: slot as f64,
            height,
            color: palette.no_variation,
        });
        out.push(Instruction::Text {
            x: value + 1.0,
            slot: slot as f64,
            anchor: HAnchor::Left,
            content: no_variation_label.to_string(),
            size: LABEL_FONT_SIZE,
            color: palette.annotation,
        });
        return;
    }
    let Some(picker) = gradient.to_picker(&present) else { return };
    for pair in present.windows(2) {
        let (lo, hi) = (pair[0], pair[1]);
        // tied and non-monotonic pairs are dropped, never drawn
        if hi > lo {
            out.push(Instruction::Rect {
                x0: lo,
                x1: hi,
                slot: slot as f64,
                height,
                color: picker.get_color(lo, hi),
            });
        }
    }
}

fn build_markers(record: &CaseRecord, slot: usize, height: f64, palette: &Palette, out: &mut Vec<Instruction>) {
    if let Some(x) = record.standard_duration {
        out.push(Instruction::Line {
            x0: x,
            x1: x,
            slot0: slot as f64 - height / 2.0,
            slot1: slot as f64 + height / 2.0,
            color: palette.standard,
            width: STANDARD_LINE_WIDTH,
            dashed: false,
        });
    }
    if let Some(x) = record.optimal_duration {
        out.push(Instruction::Point {
            x,
            slot: slot as f64,
            color: palette.optimal,
            size: OPTIMAL_MARKER_SIZE,
        });
    }
}

fn build_labels(
    record: &CaseRecord,
    slot: usize,
    (x_min, x_max): (f64, f64),
    appearance: &ChartAppearance,
    out: &mut Vec<Instruction>,
) {
    if !record.diagnosis.is_empty() {
        out.push(Instruction::Text {
            x: x_min - appearance.left_margin + 2.0,
            slot: slot as f64,
            anchor: HAnchor::Right,
            content: record.diagnosis.clone(),
            size: LABEL_FONT_SIZE,
            color: BLACK,
        });
    }

    let mut content = record.case_id.clone();
    if let Some(count) = record.episode_count {
        content = if content.is_empty() {
            format!("({count})")
        } else {
            format!("{content} ({count})")
        };
    }
    if !content.is_empty() {
        out.push(Instruction::Text {
            x: x_max + 5.0,
            slot: slot as f64,
            anchor: HAnchor::Left,
            content,
            size: LABEL_FONT_SIZE,
            color: BLACK,
        });
    }
}

fn build_bands(records: &[CaseRecord], x_domain: (f64, f64), palette: &Palette, out: &mut Vec<Instruction>) {
    for (i, run) in group_runs(records).iter().enumerate() {
        let slot0 = run.start as f64 - BAND_OVERHANG;
        let slot1 = run.end as f64 - BAND_OVERHANG;
        out.push(Instruction::Band {
            slot0,
            slot1,
            color: if i % 2 == 0 { palette.band } else { WHITE },
            opacity: BAND_OPACITY,
        });
        if i != 0 {
            out.push(Instruction::Line {
                x0: x_domain.0,
                x1: x_domain.1,
                slot0,
                slot1: slot0,
                color: palette.separator,
                width: SEPARATOR_LINE_WIDTH,
                dashed: true,
            });
        }
    }
}

fn legend_entries(gradient: &GradientMap, palette: &Palette, texts: &ChartTexts) -> Vec<LegendEntry> {
    let mut entries = PERCENTILE_LABELS
        .iter()
        .enumerate()
        .map(|(i, &label)| LegendEntry {
            glyph: LegendGlyph::Swatch(gradient.sample(i as f64 * 0.2)),
            label: label.to_string(),
        })
        .collect::<Vec<_>>();
    entries.push(LegendEntry {
        glyph: LegendGlyph::Swatch(palette.no_variation),
        label: texts.legend_constant.clone(),
    });
    entries.push(LegendEntry {
        glyph: LegendGlyph::Line(palette.standard),
        label: texts.legend_standard.clone(),
    });
    entries.push(LegendEntry {
        glyph: LegendGlyph::Point(palette.optimal),
        label: texts.legend_optimal.clone(),
    });
    entries
}
