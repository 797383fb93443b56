use std::fmt;

/// Recoverable layout failures a caller is expected to tell apart. Per-record
/// anomalies are not errors; they only suppress the affected geometry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChartError {
    /// No percentile value is present on any record, so no x domain exists.
    MissingPercentiles,
    /// The configured color scale name is not recognized.
    UnknownColorScale(String),
    /// A configured color string is not a parseable hex color.
    InvalidColor(String),
}

impl fmt::Display for ChartError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChartError::MissingPercentiles => write!(f, "no percentile values present in any record"),
            ChartError::UnknownColorScale(name) => write!(f, "unknown color scale: {name:?}"),
            ChartError::InvalidColor(value) => write!(f, "invalid color: {value:?}"),
        }
    }
}

impl std::error::Error for ChartError {}
