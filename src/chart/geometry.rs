use crate::chart::record::CaseRecord;

/// One maximal run of rows sharing a diagnosis; `start..end` are row slots.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GroupRun {
    pub diagnosis: String,
    pub start: usize,
    pub end: usize,
}

/// Union of all present percentile values across all records, before the
/// fixed margins are applied. `None` when nothing is present anywhere.
pub fn x_span(records: &[CaseRecord]) -> Option<(f64, f64)> {
    let mut span: Option<(f64, f64)> = None;
    for record in records {
        for v in record.present_percentiles() {
            span = Some(match span {
                Some((lo, hi)) => (lo.min(v), hi.max(v)),
                None => (v, v),
            });
        }
    }
    span
}

/// Row thickness per record, linearly scaled by episode count into
/// `[min_height, max_height]`. Records without a count, and inputs whose
/// count range is zero, fall back to the exact midpoint.
pub fn bar_heights(records: &[CaseRecord], min_height: f64, max_height: f64) -> Vec<f64> {
    let midpoint = 0.5 * (min_height + max_height);
    let counts = records.iter().filter_map(|r| r.episode_count).collect::<Vec<_>>();
    let (Some(&lo), Some(&hi)) = (counts.iter().min(), counts.iter().max()) else {
        return vec![midpoint; records.len()];
    };
    if lo == hi {
        return vec![midpoint; records.len()];
    }
    let scale = (max_height - min_height) / (hi - lo) as f64;
    records
        .iter()
        .map(|r| match r.episode_count {
            Some(count) => min_height + (count - lo) as f64 * scale,
            None => midpoint,
        })
        .collect()
}

/// Partition the rows into maximal runs of equal diagnosis. The input is
/// required to be pre-sorted so equal diagnoses are contiguous; that is the
/// caller's contract and is not re-checked here.
pub fn group_runs(records: &[CaseRecord]) -> Vec<GroupRun> {
    let mut runs: Vec<GroupRun> = Vec::new();
    for (slot, record) in records.iter().enumerate() {
        match runs.last_mut() {
            Some(run) if run.diagnosis == record.diagnosis => run.end = slot + 1,
            _ => runs.push(GroupRun {
                diagnosis: record.diagnosis.clone(),
                start: slot,
                end: slot + 1,
            }),
        }
    }
    runs
}
