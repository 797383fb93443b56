// @file render.rs
// @brief chart figure renderer on top of plotters

use crate::chart::appearance::ChartAppearance;
use crate::chart::compose::Chart;
use crate::chart::instruction::{HAnchor, Instruction, LegendEntry, LegendGlyph};
use anyhow::Result;
use plotters::element::{Drawable, PointCollection};
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters_backend::{BackendStyle, DrawingErrorKind};

const FIGURE_MARGIN: i32 = 20;
const TITLE_AREA_HEIGHT: i32 = 64;
const AXIS_AREA_HEIGHT: i32 = 48;
const LEGEND_AREA_HEIGHT: i32 = 96;
const LEGEND_COLUMNS: usize = 3;
const DESIRED_TICK_PITCH: f64 = 90.0;
const GRID_COLOR: RGBColor = RGBColor(128, 128, 128);

// instruction sizes are in points; backends want pixels
fn font_px(size_pt: f64) -> i32 {
    (size_pt * 1.4).round() as i32
}

#[derive(Copy, Clone, Debug)]
struct Region {
    x0: i32,
    y0: i32,
    x1: i32,
    y1: i32,
}

impl Region {
    fn width(&self) -> i32 {
        self.x1 - self.x0
    }

    fn height(&self) -> i32 {
        self.y1 - self.y0
    }

    fn offset(self, (dx, dy): (i32, i32)) -> Region {
        Region {
            x0: self.x0 + dx,
            y0: self.y0 + dy,
            x1: self.x1 + dx,
            y1: self.y1 + dy,
        }
    }
}

/// Vertical stack of figure regions: title strip, plot plane, x axis, legend.
#[derive(Copy, Clone, Debug)]
struct FigureRegions {
    title: Region,
    plot: Region,
    axis: Region,
    legend: Region,
}

impl FigureRegions {
    fn split(dim: (u32, u32)) -> FigureRegions {
        let (w, h) = (dim.0 as i32, dim.1 as i32);
        let (x0, x1) = (FIGURE_MARGIN, w - FIGURE_MARGIN);
        let title = Region { x0, y0: FIGURE_MARGIN, x1, y1: FIGURE_MARGIN + TITLE_AREA_HEIGHT };
        let legend = Region { x0, y0: h - FIGURE_MARGIN - LEGEND_AREA_HEIGHT, x1, y1: h - FIGURE_MARGIN };
        let axis = Region { x0, y0: legend.y0 - AXIS_AREA_HEIGHT, x1, y1: legend.y0 };
        let plot = Region { x0, y0: title.y1, x1, y1: axis.y0 };
        FigureRegions { title, plot, axis, legend }
    }

    fn offset(self, pos: (i32, i32)) -> FigureRegions {
        FigureRegions {
            title: self.title.offset(pos),
            plot: self.plot.offset(pos),
            axis: self.axis.offset(pos),
            legend: self.legend.offset(pos),
        }
    }
}

/// Affine map from chart coordinates (duration, row slot) to pixels. The
/// vertical axis is inverted: slot 0 maps to the top of the plot plane.
#[derive(Copy, Clone, Debug)]
struct PlotMapper {
    region: Region,
    x_domain: (f64, f64),
    slot_domain: (f64, f64),
}

impl PlotMapper {
    fn new(region: Region, chart: &Chart) -> PlotMapper {
        // one spare slot above row 0 keeps the leading band overhang inside
        // the plane
        PlotMapper {
            region,
            x_domain: chart.x_domain,
            slot_domain: (-1.0, chart.rows as f64),
        }
    }

    fn x(&self, v: f64) -> i32 {
        let span = self.x_domain.1 - self.x_domain.0;
        let t = if span > 0.0 { (v - self.x_domain.0) / span } else { 0.5 };
        self.region.x0 + (t * self.region.width() as f64).round() as i32
    }

    fn y(&self, slot: f64) -> i32 {
        let span = self.slot_domain.1 - self.slot_domain.0;
        let t = (slot - self.slot_domain.0) / span;
        self.region.y0 + (t * self.region.height() as f64).round() as i32
    }
}

/// Choose a tick pitch in duration units for roughly the desired pixel
/// spacing, snapped to the 1 / 2.5 / 5 decades.
fn tick_pitch(units_per_pixel: f64, desired_pitch_in_pixels: f64) -> f64 {
    let unit = (desired_pitch_in_pixels * units_per_pixel).log10();
    let (f, c) = (unit - unit.floor(), unit.floor());
    if f < 2.5f64.log10() {
        10f64.powf(c)
    } else if f < 5.0f64.log10() {
        2.5 * 10f64.powf(c)
    } else {
        5.0 * 10f64.powf(c)
    }
}

fn draw_dashed_line<DB: DrawingBackend>(
    backend: &mut DB,
    start: (i32, i32),
    end: (i32, i32),
    style: &ShapeStyle,
) -> Result<(), DrawingErrorKind<DB::ErrorType>> {
    // separators are the only dashed lines; horizontal is all we need
    let (on, off) = (6, 4);
    let y = start.1;
    let mut x = start.0.min(end.0);
    let x_end = start.0.max(end.0);
    while x < x_end {
        let seg_end = (x + on).min(x_end);
        backend.draw_line((x, y), (seg_end, y), style)?;
        x = seg_end + off;
    }
    Ok(())
}

pub struct ChartFigure<'a> {
    chart: &'a Chart,
    appearance: &'a ChartAppearance,
}

impl<'a> ChartFigure<'a> {
    pub fn new(chart: &'a Chart, appearance: &'a ChartAppearance) -> ChartFigure<'a> {
        ChartFigure { chart, appearance }
    }

    pub fn get_dim(&self) -> (u32, u32) {
        (self.appearance.figure_width, self.appearance.figure_height)
    }

    fn draw_chrome<DB: DrawingBackend>(
        &self,
        regions: &FigureRegions,
        backend: &mut DB,
    ) -> Result<(), DrawingErrorKind<DB::ErrorType>> {
        let texts = &self.appearance.texts;
        let title_style = TextStyle::from(("sans-serif", font_px(14.0)).into_font()).color(&BLACK);
        backend.draw_text(&texts.main_title, &title_style, (regions.title.x0, regions.title.y0))?;

        let subtitle_style = TextStyle::from(("sans-serif", font_px(10.0)).into_font()).color(&GRID_COLOR);
        backend.draw_text(&texts.subtitle, &subtitle_style, (regions.title.x0, regions.title.y0 + font_px(14.0) + 8))?;

        let xlabel_style = TextStyle::from(("sans-serif", font_px(12.0)).into_font())
            .color(&BLACK)
            .pos(Pos::new(HPos::Center, VPos::Top));
        let center = (regions.axis.x0 + regions.axis.x1) / 2;
        backend.draw_text(&texts.xlabel, &xlabel_style, (center, regions.axis.y0 + 24))?;
        Ok(())
    }

    fn draw_axis<DB: DrawingBackend>(
        &self,
        regions: &FigureRegions,
        mapper: &PlotMapper,
        backend: &mut DB,
    ) -> Result<(), DrawingErrorKind<DB::ErrorType>> {
        let plot = regions.plot;
        let axis_style = ShapeStyle {
            color: BLACK.into(),
            filled: false,
            stroke_width: 1,
        };
        backend.draw_line((plot.x0, plot.y1), (plot.x1, plot.y1), &axis_style)?;

        let span = self.chart.x_domain.1 - self.chart.x_domain.0;
        if !(span > 0.0) {
            return Ok(());
        }
        let pitch = tick_pitch(span / plot.width().max(1) as f64, DESIRED_TICK_PITCH);
        let grid_style = ShapeStyle {
            color: GRID_COLOR.mix(0.3),
            filled: false,
            stroke_width: 1,
        };
        let label_style = TextStyle::from(("sans-serif", font_px(10.0)).into_font())
            .color(&BLACK)
            .pos(Pos::new(HPos::Center, VPos::Top));

        let mut v = (self.chart.x_domain.0 / pitch).ceil() * pitch;
        while v <= self.chart.x_domain.1 {
            let tick = if v == 0.0 { 0.0 } else { v }; // normalize -0.0 before formatting
            let x = mapper.x(tick);
            backend.draw_line((x, plot.y0), (x, plot.y1), &grid_style)?;
            backend.draw_line((x, plot.y1), (x, plot.y1 + 4), &axis_style)?;
            let label = if pitch >= 1.0 { format!("{tick:.0}") } else { format!("{tick:.1}") };
            backend.draw_text(&label, &label_style, (x, plot.y1 + 8))?;
            v += pitch;
        }
        Ok(())
    }

    fn draw_legend<DB: DrawingBackend>(
        &self,
        regions: &FigureRegions,
        backend: &mut DB,
        entries: &[LegendEntry],
    ) -> Result<(), DrawingErrorKind<DB::ErrorType>> {
        let region = regions.legend;
        let rows = entries.len().div_ceil(LEGEND_COLUMNS).max(1);
        let column_width = region.width() / LEGEND_COLUMNS as i32;
        let row_height = region.height() / rows as i32;
        let label_style = TextStyle::from(("sans-serif", font_px(9.0)).into_font())
            .color(&BLACK)
            .pos(Pos::new(HPos::Left, VPos::Center));

        for (i, entry) in entries.iter().enumerate() {
            let (row, column) = (i / LEGEND_COLUMNS, i % LEGEND_COLUMNS);
            let x = region.x0 + column as i32 * column_width;
            let y = region.y0 + row as i32 * row_height + row_height / 2;
            match entry.glyph {
                LegendGlyph::Swatch(color) => backend.draw_rect((x, y - 5), (x + 18, y + 5), &color.color(), true)?,
                LegendGlyph::Line(color) => {
                    let style = ShapeStyle {
                        color: color.into(),
                        filled: false,
                        stroke_width: 2,
                    };
                    backend.draw_line((x, y), (x + 18, y), &style)?;
                }
                LegendGlyph::Point(color) => backend.draw_circle((x + 9, y), 4, &color.color(), true)?,
            }
            backend.draw_text(&entry.label, &label_style, (x + 24, y))?;
        }
        Ok(())
    }

    fn draw_instruction<DB: DrawingBackend>(
        &self,
        regions: &FigureRegions,
        mapper: &PlotMapper,
        backend: &mut DB,
        instruction: &Instruction,
    ) -> Result<(), DrawingErrorKind<DB::ErrorType>> {
        match instruction {
            Instruction::Rect { x0, x1, slot, height, color } => {
                let upper_left = (mapper.x(*x0), mapper.y(*slot - 0.5 * *height));
                let bottom_right = (mapper.x(*x1), mapper.y(*slot + 0.5 * *height));
                backend.draw_rect(upper_left, bottom_right, &color.color(), true)?;
            }
            Instruction::Line { x0, x1, slot0, slot1, color, width, dashed } => {
                let start = (mapper.x(*x0), mapper.y(*slot0));
                let end = (mapper.x(*x1), mapper.y(*slot1));
                let style = ShapeStyle {
                    color: (*color).into(),
                    filled: false,
                    stroke_width: width.round().max(1.0) as u32,
                };
                if *dashed {
                    draw_dashed_line(backend, start, end, &style)?;
                } else {
                    backend.draw_line(start, end, &style)?;
                }
            }
            Instruction::Point { x, slot, color, size } => {
                let radius = (0.5 * size).round().max(1.0) as u32;
                backend.draw_circle((mapper.x(*x), mapper.y(*slot)), radius, &color.color(), true)?;
            }
            Instruction::Text { x, slot, anchor, content, size, color } => {
                let hpos = match anchor {
                    HAnchor::Left => HPos::Left,
                    HAnchor::Right => HPos::Right,
                };
                let style = TextStyle::from(("sans-serif", font_px(*size)).into_font())
                    .color(color)
                    .pos(Pos::new(hpos, VPos::Center));
                backend.draw_text(content, &style, (mapper.x(*x), mapper.y(*slot)))?;
            }
            Instruction::Band { slot0, slot1, color, opacity } => {
                let upper_left = (regions.plot.x0, mapper.y(*slot0));
                let bottom_right = (regions.plot.x1, mapper.y(*slot1));
                backend.draw_rect(upper_left, bottom_right, &color.mix(*opacity).color(), true)?;
            }
            Instruction::Legend(entries) => self.draw_legend(regions, backend, entries)?,
        }
        Ok(())
    }
}

impl<'a> PointCollection<'a, (i32, i32)> for &'a ChartFigure<'_> {
    type Point = &'a (i32, i32);
    type IntoIter = std::iter::Once<&'a (i32, i32)>;

    fn point_iter(self) -> Self::IntoIter {
        std::iter::once(&(0, 0))
    }
}

impl<DB> Drawable<DB> for ChartFigure<'_>
where
    DB: DrawingBackend,
{
    fn draw<I>(&self, pos: I, backend: &mut DB, _: (u32, u32)) -> Result<(), DrawingErrorKind<DB::ErrorType>>
    where
        I: Iterator<Item = (i32, i32)>,
    {
        let mut pos = pos;
        let pos = pos.next().unwrap();
        let regions = FigureRegions::split(self.get_dim()).offset(pos);
        let mapper = PlotMapper::new(regions.plot, self.chart);

        self.draw_chrome(&regions, backend)?;
        self.draw_axis(&regions, &mapper, backend)?;
        for instruction in &self.chart.instructions {
            self.draw_instruction(&regions, &mapper, backend, instruction)?;
        }
        Ok(())
    }
}

/// Rasterize or vectorize `chart` to `name`; the backend is picked from the
/// file extension (`.svg`, anything else is PNG).
pub fn render_file(name: &str, chart: &Chart, appearance: &ChartAppearance) -> Result<()> {
    let figure = ChartFigure::new(chart, appearance);
    if name.ends_with(".svg") {
        let root = SVGBackend::new(name, figure.get_dim()).into_drawing_area();
        root.fill(&WHITE)?;
        root.draw(&figure)?;
        root.present()?;
    } else {
        let root = BitMapBackend::new(name, figure.get_dim()).into_drawing_area();
        root.fill(&WHITE)?;
        root.draw(&figure)?;
        root.present()?;
    }
    Ok(())
}
