use plotters::prelude::RGBColor;

/// Horizontal text anchor, relative to the instruction position.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum HAnchor {
    Left,
    Right,
}

#[derive(Clone, Debug, PartialEq)]
pub enum LegendGlyph {
    Swatch(RGBColor),
    Line(RGBColor),
    Point(RGBColor),
}

#[derive(Clone, Debug, PartialEq)]
pub struct LegendEntry {
    pub glyph: LegendGlyph,
    pub label: String,
}

/// Backend-neutral draw instruction. `x` coordinates are duration units and
/// `slot` coordinates are row-slot units; slot 0 renders topmost. A backend
/// rasterizes the list in order.
#[derive(Clone, Debug, PartialEq)]
pub enum Instruction {
    Rect {
        x0: f64,
        x1: f64,
        slot: f64,
        height: f64,
        color: RGBColor,
    },
    Line {
        x0: f64,
        x1: f64,
        slot0: f64,
        slot1: f64,
        color: RGBColor,
        width: f64,
        dashed: bool,
    },
    Point {
        x: f64,
        slot: f64,
        color: RGBColor,
        size: f64,
    },
    Text {
        x: f64,
        slot: f64,
        anchor: HAnchor,
        content: String,
        size: f64,
        color: RGBColor,
    },
    Band {
        slot0: f64,
        slot1: f64,
        color: RGBColor,
        opacity: f64,
    },
    Legend(Vec<LegendEntry>),
}
