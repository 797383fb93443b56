use crate::chart::error::ChartError;
use plotters::prelude::RGBColor;

// 11-stop diverging palette, green through yellow to red with increasing
// value. The reversed variant is derived from the same table.
const RD_YL_GN_R: [RGBColor; 11] = [
    RGBColor(0, 104, 55),
    RGBColor(26, 152, 80),
    RGBColor(102, 189, 99),
    RGBColor(166, 217, 106),
    RGBColor(217, 239, 139),
    RGBColor(255, 255, 191),
    RGBColor(254, 224, 139),
    RGBColor(253, 174, 97),
    RGBColor(244, 109, 67),
    RGBColor(215, 48, 39),
    RGBColor(165, 0, 38),
];

/// A named, continuous color scale over `[0, 1]`.
#[derive(Clone, Debug, PartialEq)]
pub struct GradientMap {
    stops: Vec<RGBColor>,
}

impl GradientMap {
    pub fn by_name(name: &str) -> Result<GradientMap, ChartError> {
        match name.to_ascii_lowercase().as_str() {
            "rdylgn_r" => Ok(GradientMap { stops: RD_YL_GN_R.to_vec() }),
            "rdylgn" => {
                let mut stops = RD_YL_GN_R.to_vec();
                stops.reverse();
                Ok(GradientMap { stops })
            }
            _ => Err(ChartError::UnknownColorScale(name.to_string())),
        }
    }

    /// Continuous lookup at `t`; out-of-range and NaN inputs clamp.
    pub fn sample(&self, t: f64) -> RGBColor {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        let pos = t * (self.stops.len() - 1) as f64;
        let i = (pos.floor() as usize).min(self.stops.len() - 2);
        let frac = pos - i as f64;
        let (a, b) = (self.stops[i], self.stops[i + 1]);
        let mix = |x: u8, y: u8| (x as f64 + (y as f64 - x as f64) * frac).round() as u8;
        RGBColor(mix(a.0, b.0), mix(a.1, b.1), mix(a.2, b.2))
    }

    /// Picker normalized to one record's own value range, not the global
    /// domain. `None` when the range is degenerate; that case is drawn by the
    /// constant-distribution path instead.
    pub(crate) fn to_picker(&self, values: &[f64]) -> Option<SegmentColorPicker<'_>> {
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        if !(max > min) {
            return None;
        }
        Some(SegmentColorPicker {
            map: self,
            offset: min,
            scale: 1.0 / (max - min),
        })
    }
}

#[derive(Clone, Debug)]
pub(crate) struct SegmentColorPicker<'a> {
    map: &'a GradientMap,
    offset: f64,
    scale: f64,
}

impl SegmentColorPicker<'_> {
    /// The color of a segment is the scale color at the pair midpoint, not a
    /// blend of the two endpoint colors.
    pub fn get_color(&self, lo: f64, hi: f64) -> RGBColor {
        self.map.sample(self.scale * (0.5 * (lo + hi) - self.offset))
    }
}
