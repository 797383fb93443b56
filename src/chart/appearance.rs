use crate::chart::error::ChartError;
use hex_color::HexColor;
use plotters::prelude::RGBColor;
use serde::{Deserialize, Serialize};

/// All configuration knobs of the chart. Deserializable from YAML so a
/// partial override file can adjust individual fields.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartAppearance {
    pub figure_width: u32,
    pub figure_height: u32,
    pub min_bar_height: f64,
    pub max_bar_height: f64,
    pub left_margin: f64,
    pub right_margin: f64,
    pub colormap: String,
    pub colors: ChartColors,
    pub texts: ChartTexts,
}

impl Default for ChartAppearance {
    fn default() -> ChartAppearance {
        ChartAppearance {
            figure_width: 1600,
            figure_height: 1200,
            min_bar_height: 0.2,
            max_bar_height: 0.6,
            left_margin: 40.0,
            right_margin: 40.0,
            colormap: "rdylgn_r".to_string(),
            colors: ChartColors::default(),
            texts: ChartTexts::default(),
        }
    }
}

/// Fixed chart colors as hex strings; parsed once per layout call.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartColors {
    pub no_variation: String,
    pub annotation: String,
    pub standard: String,
    pub optimal: String,
    pub band: String,
    pub separator: String,
}

impl Default for ChartColors {
    fn default() -> ChartColors {
        ChartColors {
            no_variation: "#d3d3d3".to_string(),
            annotation: "#696969".to_string(),
            standard: "#000000".to_string(),
            optimal: "#0000ff".to_string(),
            band: "#d3d3d3".to_string(),
            separator: "#808080".to_string(),
        }
    }
}

/// Parsed counterpart of [`ChartColors`].
#[derive(Copy, Clone, Debug)]
pub struct Palette {
    pub no_variation: RGBColor,
    pub annotation: RGBColor,
    pub standard: RGBColor,
    pub optimal: RGBColor,
    pub band: RGBColor,
    pub separator: RGBColor,
}

fn parse_color(value: &str) -> Result<RGBColor, ChartError> {
    let c = HexColor::parse(value).map_err(|_| ChartError::InvalidColor(value.to_string()))?;
    Ok(RGBColor(c.r, c.g, c.b))
}

impl ChartColors {
    pub fn resolve(&self) -> Result<Palette, ChartError> {
        Ok(Palette {
            no_variation: parse_color(&self.no_variation)?,
            annotation: parse_color(&self.annotation)?,
            standard: parse_color(&self.standard)?,
            optimal: parse_color(&self.optimal)?,
            band: parse_color(&self.band)?,
            separator: parse_color(&self.separator)?,
        })
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartTexts {
    pub main_title: String,
    pub subtitle: String,
    pub xlabel: String,
    pub no_variation: String,
    pub legend_constant: String,
    pub legend_standard: String,
    pub legend_optimal: String,
}

impl Default for ChartTexts {
    fn default() -> ChartTexts {
        ChartTexts {
            main_title: "Comparativa INSS vs Historial Mutua".to_string(),
            subtitle: "Diagnóstico a izquierda, caso + nº episodios a derecha".to_string(),
            xlabel: "Duración (días)".to_string(),
            no_variation: "sin variación".to_string(),
            legend_constant: "Distribución constante".to_string(),
            legend_standard: "Duración estándar INSS".to_string(),
            legend_optimal: "Duración óptima INSS".to_string(),
        }
    }
}
