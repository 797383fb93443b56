// @file record.rs
// @brief case record container and table parsers

use anyhow::{Result, anyhow};
use std::io::BufRead;

pub const PERCENTILE_COUNT: usize = 6;

/// Legend names for the six percentile positions, low to high.
pub const PERCENTILE_LABELS: [&str; PERCENTILE_COUNT] = ["Min", "P20", "P40", "P60", "P80", "P99"];

/// Header names the table loader resolves, one per percentile position.
const PERCENTILE_COLUMNS: [&str; PERCENTILE_COUNT] = ["minmin", "p20min", "p40min", "p60min", "p80min", "p99min"];

/// One row of the validated input table. Records are produced upstream,
/// already cleaned and sorted so that equal diagnoses are contiguous; the
/// layout core only reads them.
#[derive(Clone, Debug, Default)]
pub struct CaseRecord {
    pub diagnosis: String,
    pub case_id: String,
    pub episode_count: Option<u32>,
    pub percentiles: [Option<f64>; PERCENTILE_COUNT],
    pub standard_duration: Option<f64>,
    pub optimal_duration: Option<f64>,
    pub constant_distribution: bool,
}

impl CaseRecord {
    /// Percentile values that are actually present, in position order.
    pub fn present_percentiles(&self) -> Vec<f64> {
        self.percentiles.iter().filter_map(|&v| v.filter(|x| x.is_finite())).collect()
    }

    /// Establish the `constant_distribution` flag: at least one percentile
    /// present and all present values numerically identical.
    pub fn with_constant_flag(mut self) -> CaseRecord {
        let present = self.present_percentiles();
        self.constant_distribution = present.first().is_some_and(|&first| present.iter().all(|&v| v == first));
        self
    }
}

#[derive(Clone, Copy, Debug, Default)]
struct ColumnIndex {
    diagnosis: Option<usize>,
    case_id: Option<usize>,
    episode_count: Option<usize>,
    percentiles: [Option<usize>; PERCENTILE_COUNT],
    standard: Option<usize>,
    optimal: Option<usize>,
}

impl ColumnIndex {
    fn from_header(line: &str) -> ColumnIndex {
        let mut index = ColumnIndex::default();
        for (i, name) in line.trim().split('\t').enumerate() {
            let name = name.trim().to_ascii_lowercase();
            match name.as_str() {
                "diagnostico" => index.diagnosis = Some(i),
                "caso" => index.case_id = Some(i),
                "episodios" => index.episode_count = Some(i),
                "durestd_min" => index.standard = Some(i),
                "duropt_min" => index.optimal = Some(i),
                _ => {
                    if let Some(p) = PERCENTILE_COLUMNS.iter().position(|&c| c == name) {
                        index.percentiles[p] = Some(i);
                    }
                }
            }
        }
        index
    }
}

fn parse_value(field: Option<&str>) -> Result<Option<f64>> {
    let Some(field) = field else { return Ok(None) };
    let field = field.trim();
    if field.is_empty() || field.eq_ignore_ascii_case("na") || field.eq_ignore_ascii_case("nan") {
        return Ok(None);
    }
    let value = field.parse::<f64>().map_err(|_| anyhow!("failed to parse number: {field:?}"))?;
    Ok(Some(value))
}

/// Read a record table in TSV form: one header line naming the columns, one
/// line per record. Empty, `na` and `nan` cells become absent values. No
/// coercion, filtering or re-sorting happens here.
pub fn load_records<R: BufRead>(input: R) -> Result<Vec<CaseRecord>> {
    let mut lines = input.lines();
    let header = lines.next().ok_or_else(|| anyhow!("empty record table"))??;
    let index = ColumnIndex::from_header(&header);

    let mut records = Vec::new();
    for line in lines {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let cols = line.split('\t').collect::<Vec<_>>();
        let text = |i: Option<usize>| i.and_then(|i| cols.get(i)).map_or_else(String::new, |s| s.trim().to_string());
        let field = |i: Option<usize>| i.and_then(|i| cols.get(i).copied());

        let mut percentiles = [None; PERCENTILE_COUNT];
        for (p, &col) in index.percentiles.iter().enumerate() {
            percentiles[p] = parse_value(field(col))?;
        }
        let record = CaseRecord {
            diagnosis: text(index.diagnosis),
            case_id: text(index.case_id),
            episode_count: parse_value(field(index.episode_count))?.map(|v| v.round().max(0.0) as u32),
            percentiles,
            standard_duration: parse_value(field(index.standard))?,
            optimal_duration: parse_value(field(index.optimal))?,
            constant_distribution: false,
        };
        records.push(record.with_constant_flag());
    }
    Ok(records)
}

pub fn load_records_file(file: &str) -> Result<Vec<CaseRecord>> {
    if file == "-" {
        let stdin = std::io::stdin();
        return load_records(stdin.lock());
    }
    let file = std::fs::File::open(file)?;
    load_records(std::io::BufReader::new(file))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn loads_records_from_tsv() {
        let table = "diagnostico\tcaso\tepisodios\tminmin\tp20min\tp40min\tp60min\tp80min\tp99min\tdurestd_min\tduropt_min\n\
                     Lumbalgia\tC001\t15\t10\t15\t20\t25\t30\t35\t30\t25\n\
                     Cervicalgia\tC002\t\t20\t20\t20\t20\t20\t20\tna\t18\n";
        let records = load_records(Cursor::new(table)).unwrap();
        assert_eq!(records.len(), 2);

        assert_eq!(records[0].diagnosis, "Lumbalgia");
        assert_eq!(records[0].case_id, "C001");
        assert_eq!(records[0].episode_count, Some(15));
        assert_eq!(records[0].percentiles[0], Some(10.0));
        assert_eq!(records[0].percentiles[5], Some(35.0));
        assert_eq!(records[0].standard_duration, Some(30.0));
        assert!(!records[0].constant_distribution);

        assert_eq!(records[1].episode_count, None);
        assert_eq!(records[1].standard_duration, None);
        assert_eq!(records[1].optimal_duration, Some(18.0));
        assert!(records[1].constant_distribution);
    }

    #[test]
    fn header_order_does_not_matter() {
        let table = "p99min\tdiagnostico\tminmin\n40\tTendinitis\t5\n";
        let records = load_records(Cursor::new(table)).unwrap();
        assert_eq!(records[0].diagnosis, "Tendinitis");
        assert_eq!(records[0].percentiles[0], Some(5.0));
        assert_eq!(records[0].percentiles[5], Some(40.0));
        // unparseable numeric cell is an error, not a silent drop
        assert!(load_records(Cursor::new("minmin\nabc\n")).is_err());
    }

    #[test]
    fn missing_columns_yield_absent_values() {
        let table = "caso\nC001\n";
        let records = load_records(Cursor::new(table)).unwrap();
        assert_eq!(records[0].case_id, "C001");
        assert!(records[0].diagnosis.is_empty());
        assert!(records[0].percentiles.iter().all(|v| v.is_none()));
        assert!(!records[0].constant_distribution);
    }
}
