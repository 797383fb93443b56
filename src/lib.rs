pub mod chart;

pub use chart::{CaseRecord, Chart, ChartAppearance, ChartError};
