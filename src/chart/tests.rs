use super::*;
use rstest::rstest;

fn record(diagnosis: &str, case_id: &str, episodes: Option<u32>, percentiles: [Option<f64>; PERCENTILE_COUNT]) -> CaseRecord {
    CaseRecord {
        diagnosis: diagnosis.to_string(),
        case_id: case_id.to_string(),
        episode_count: episodes,
        percentiles,
        ..CaseRecord::default()
    }
    .with_constant_flag()
}

fn full(values: [f64; PERCENTILE_COUNT]) -> [Option<f64>; PERCENTILE_COUNT] {
    values.map(Some)
}

fn scenario() -> Vec<CaseRecord> {
    vec![
        record("A", "C001", Some(15), full([10.0, 15.0, 20.0, 25.0, 30.0, 35.0])),
        record("A", "C002", Some(8), full([8.0, 12.0, 16.0, 20.0, 24.0, 28.0])),
        record("B", "C003", Some(12), full([12.0, 16.0, 20.0, 24.0, 28.0, 32.0])),
    ]
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

fn rects(chart: &Chart) -> Vec<(f64, f64, f64, f64)> {
    chart
        .instructions
        .iter()
        .filter_map(|i| match i {
            Instruction::Rect { x0, x1, slot, height, .. } => Some((*x0, *x1, *slot, *height)),
            _ => None,
        })
        .collect()
}

fn bands(chart: &Chart) -> Vec<(f64, f64)> {
    chart
        .instructions
        .iter()
        .filter_map(|i| match i {
            Instruction::Band { slot0, slot1, .. } => Some((*slot0, *slot1)),
            _ => None,
        })
        .collect()
}

fn separators(chart: &Chart) -> Vec<f64> {
    chart
        .instructions
        .iter()
        .filter_map(|i| match i {
            Instruction::Line { slot0, slot1, dashed: true, .. } if slot0 == slot1 => Some(*slot0),
            _ => None,
        })
        .collect()
}

#[test]
fn empty_input_is_an_empty_chart_not_an_error() {
    let chart = Chart::build(&[], &ChartAppearance::default()).unwrap();
    assert!(chart.is_empty());
    assert_eq!(chart.rows, 0);
    assert!(chart.instructions.is_empty());
}

#[test]
fn no_resolvable_percentiles_is_an_error() {
    let records = vec![record("A", "C001", Some(3), [None; PERCENTILE_COUNT]), record("B", "C002", None, [None; PERCENTILE_COUNT])];
    let err = Chart::build(&records, &ChartAppearance::default()).unwrap_err();
    assert_eq!(err, ChartError::MissingPercentiles);
}

#[test]
fn unknown_color_scale_is_an_error() {
    let mut appearance = ChartAppearance::default();
    appearance.colormap = "plasma".to_string();
    let err = Chart::build(&scenario(), &appearance).unwrap_err();
    assert_eq!(err, ChartError::UnknownColorScale("plasma".to_string()));
}

#[test]
fn invalid_hex_color_is_an_error() {
    let mut appearance = ChartAppearance::default();
    appearance.colors.optimal = "skyblue".to_string();
    let err = Chart::build(&scenario(), &appearance).unwrap_err();
    assert_eq!(err, ChartError::InvalidColor("skyblue".to_string()));
}

#[test]
fn scenario_layout() {
    let chart = Chart::build(&scenario(), &ChartAppearance::default()).unwrap();
    assert_eq!(chart.rows, 3);
    assert_eq!(chart.x_domain, (8.0 - 40.0, 35.0 + 40.0));

    // five segments per fully populated, strictly increasing record
    let rects = rects(&chart);
    for slot in 0..3 {
        assert_eq!(rects.iter().filter(|r| r.2 == slot as f64).count(), 5);
    }

    // two diagnosis runs, one separator at the start of the second
    let bands = bands(&chart);
    assert_eq!(bands.len(), 2);
    assert!(close(bands[0].0, -0.2) && close(bands[0].1, 1.8));
    assert!(close(bands[1].0, 1.8) && close(bands[1].1, 2.8));
    let separators = separators(&chart);
    assert_eq!(separators.len(), 1);
    assert!(close(separators[0], 1.8));

    // thickness follows episode count: 15 > 12 > 8
    let height_at = |slot: f64| rects.iter().find(|r| r.2 == slot).unwrap().3;
    assert!(height_at(0.0) > height_at(2.0));
    assert!(height_at(2.0) > height_at(1.0));
    assert!(close(height_at(0.0), 0.6));
    assert!(close(height_at(1.0), 0.2));
}

#[test]
fn no_rect_is_ever_emitted_with_nonpositive_width() {
    let records = vec![
        record("A", "C001", None, [Some(10.0), Some(5.0), Some(5.0), Some(20.0), None, Some(15.0)]),
        record("A", "C002", None, full([3.0, 3.0, 3.0, 9.0, 9.0, 12.0])),
        record("B", "C003", None, full([1.0, 2.0, 3.0, 4.0, 5.0, 6.0])),
    ];
    let chart = Chart::build(&records, &ChartAppearance::default()).unwrap();
    let rects = rects(&chart);
    assert!(rects.iter().all(|r| r.1 > r.0));
    // non-monotonic and tied pairs of the first record collapse to one segment
    assert_eq!(rects.iter().filter(|r| r.2 == 0.0).count(), 1);
    assert_eq!(rects.iter().filter(|r| r.2 == 1.0).count(), 2);
}

#[test]
fn constant_distribution_emits_one_gray_rect_and_one_annotation() {
    let records = vec![record("A", "C001", None, full([20.0; PERCENTILE_COUNT]))];
    assert!(records[0].constant_distribution);

    let chart = Chart::build(&records, &ChartAppearance::default()).unwrap();
    let rects = rects(&chart);
    assert_eq!(rects.len(), 1);
    assert_eq!(rects[0], (19.5, 20.5, 0.0, 0.4));

    let annotations = chart
        .instructions
        .iter()
        .filter_map(|i| match i {
            Instruction::Text { x, anchor, content, .. } if content == "sin variación" => Some((*x, *anchor)),
            _ => None,
        })
        .collect::<Vec<_>>();
    assert_eq!(annotations, vec![(21.0, HAnchor::Left)]);

    let gray = chart.instructions.iter().find_map(|i| match i {
        Instruction::Rect { color, .. } => Some(*color),
        _ => None,
    });
    assert_eq!(gray, Some(RGBColor(211, 211, 211)));
}

#[test]
fn fewer_than_two_present_percentiles_emit_no_geometry() {
    let records = vec![
        record("A", "C001", None, [Some(7.0), None, None, None, None, None]),
        record("A", "C002", None, full([1.0, 2.0, 3.0, 4.0, 5.0, 6.0])),
    ];
    let chart = Chart::build(&records, &ChartAppearance::default()).unwrap();
    assert!(rects(&chart).iter().all(|r| r.2 != 0.0));
    assert!(!chart.instructions.iter().any(|i| matches!(i, Instruction::Text { content, .. } if content == "sin variación")));
}

#[test]
fn segment_color_is_the_scale_color_at_the_pair_midpoint() {
    let records = vec![record("A", "C001", None, full([10.0, 15.0, 20.0, 25.0, 30.0, 35.0]))];
    let chart = Chart::build(&records, &ChartAppearance::default()).unwrap();
    let first = chart.instructions.iter().find_map(|i| match i {
        Instruction::Rect { x0, color, .. } if *x0 == 10.0 => Some(*color),
        _ => None,
    });
    // pair (10, 15): midpoint 12.5 normalizes to 0.1 of the record's own range
    let gradient = GradientMap::by_name("rdylgn_r").unwrap();
    assert_eq!(first, Some(gradient.sample(0.1)));
    assert_eq!(first, Some(RGBColor(26, 152, 80)));
}

#[test]
fn gradient_endpoints_and_reversal() {
    let gradient = GradientMap::by_name("rdylgn_r").unwrap();
    assert_eq!(gradient.sample(0.0), RGBColor(0, 104, 55));
    assert_eq!(gradient.sample(0.5), RGBColor(255, 255, 191));
    assert_eq!(gradient.sample(1.0), RGBColor(165, 0, 38));
    // clamped outside the unit range
    assert_eq!(gradient.sample(-3.0), gradient.sample(0.0));
    assert_eq!(gradient.sample(7.0), gradient.sample(1.0));

    let reversed = GradientMap::by_name("rdylgn").unwrap();
    assert_eq!(reversed.sample(0.0), RGBColor(165, 0, 38));
    assert_eq!(reversed.sample(1.0), RGBColor(0, 104, 55));

    assert_eq!(GradientMap::by_name("viridis").unwrap_err(), ChartError::UnknownColorScale("viridis".to_string()));
}

#[rstest]
#[case(&[Some(5), Some(5), Some(5)], &[0.4, 0.4, 0.4])]
#[case(&[None, None], &[0.4, 0.4])]
#[case(&[Some(0), Some(10), None], &[0.2, 0.6, 0.4])]
#[case(&[Some(8), Some(15), Some(12)], &[0.2, 0.6, 0.2 + 4.0 * 0.4 / 7.0])]
fn heights_scale_linearly_with_midpoint_fallback(#[case] counts: &[Option<u32>], #[case] expected: &[f64]) {
    let records = counts
        .iter()
        .map(|&c| record("A", "", c, full([1.0, 2.0, 3.0, 4.0, 5.0, 6.0])))
        .collect::<Vec<_>>();
    let heights = bar_heights(&records, 0.2, 0.6);
    assert_eq!(heights.len(), expected.len());
    for (h, e) in heights.iter().zip(expected) {
        assert!(close(*h, *e), "{h} != {e}");
        assert!((0.2..=0.6).contains(h));
    }
}

#[rstest]
#[case(&["A", "A", "B"], &[("A", 0, 2), ("B", 2, 3)])]
#[case(&["A"], &[("A", 0, 1)])]
#[case(&["A", "B", "C"], &[("A", 0, 1), ("B", 1, 2), ("C", 2, 3)])]
// a non-contiguous repeat still forms separate runs; sortedness is the caller's contract
#[case(&["A", "B", "A"], &[("A", 0, 1), ("B", 1, 2), ("A", 2, 3)])]
fn group_runs_partition_the_rows(#[case] diagnoses: &[&str], #[case] expected: &[(&str, usize, usize)]) {
    let records = diagnoses
        .iter()
        .map(|&d| record(d, "", None, full([1.0, 2.0, 3.0, 4.0, 5.0, 6.0])))
        .collect::<Vec<_>>();
    let runs = group_runs(&records);
    let got = runs.iter().map(|r| (r.diagnosis.as_str(), r.start, r.end)).collect::<Vec<_>>();
    assert_eq!(got, expected);

    // runs tile [0, len) with no gaps or overlaps
    assert_eq!(runs.first().map(|r| r.start), Some(0));
    assert_eq!(runs.last().map(|r| r.end), Some(records.len()));
    for pair in runs.windows(2) {
        assert_eq!(pair[0].end, pair[1].start);
    }
}

#[test]
fn band_boundaries_follow_the_runs() {
    let diagnoses = ["A", "A", "B", "C", "C", "C"];
    let records = diagnoses
        .iter()
        .map(|&d| record(d, "", None, full([1.0, 2.0, 3.0, 4.0, 5.0, 6.0])))
        .collect::<Vec<_>>();
    let chart = Chart::build(&records, &ChartAppearance::default()).unwrap();

    let bands = bands(&chart);
    assert_eq!(bands.len(), 3);
    assert!(close(bands[0].0, -0.2));
    assert!(close(bands[2].1, records.len() as f64 - 0.2));
    for pair in bands.windows(2) {
        assert!(close(pair[0].1, pair[1].0));
    }
    // every run start except the first gets a separator
    let separators = separators(&chart);
    assert_eq!(separators.len(), 2);
    assert!(close(separators[0], 1.8) && close(separators[1], 2.8));
}

#[test]
fn reference_markers_are_optional_overlays() {
    let mut with_both = record("A", "C001", None, full([10.0, 15.0, 20.0, 25.0, 30.0, 35.0]));
    with_both.standard_duration = Some(30.0);
    with_both.optimal_duration = Some(25.0);
    let without = record("A", "C002", None, full([10.0, 15.0, 20.0, 25.0, 30.0, 35.0]));

    let chart = Chart::build(&[with_both, without], &ChartAppearance::default()).unwrap();
    let lines = chart
        .instructions
        .iter()
        .filter_map(|i| match i {
            Instruction::Line { x0, x1, slot0, slot1, dashed: false, .. } => Some((*x0, *x1, *slot0, *slot1)),
            _ => None,
        })
        .collect::<Vec<_>>();
    // one vertical line at the standard duration, spanning the row thickness
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].0, 30.0);
    assert_eq!(lines[0].1, 30.0);
    assert!(close(lines[0].3 - lines[0].2, 0.4));

    let points = chart
        .instructions
        .iter()
        .filter_map(|i| match i {
            Instruction::Point { x, slot, .. } => Some((*x, *slot)),
            _ => None,
        })
        .collect::<Vec<_>>();
    assert_eq!(points, vec![(25.0, 0.0)]);
}

#[test]
fn row_labels_anchor_to_the_margins() {
    let records = vec![
        record("Lumbalgia", "C001", Some(15), full([10.0, 15.0, 20.0, 25.0, 30.0, 35.0])),
        record("Lumbalgia", "", Some(8), full([10.0, 15.0, 20.0, 25.0, 30.0, 35.0])),
        record("Cervicalgia", "C003", None, full([10.0, 15.0, 20.0, 25.0, 30.0, 35.0])),
    ];
    let chart = Chart::build(&records, &ChartAppearance::default()).unwrap();
    let texts = chart
        .instructions
        .iter()
        .filter_map(|i| match i {
            Instruction::Text { x, slot, anchor, content, .. } => Some((*x, *slot, *anchor, content.clone())),
            _ => None,
        })
        .collect::<Vec<_>>();

    // left labels sit just inside the left margin, right-anchored
    assert!(texts.contains(&(10.0 - 40.0 + 2.0, 0.0, HAnchor::Right, "Lumbalgia".to_string())));
    // right labels combine case id and episode count, falling back to either
    assert!(texts.contains(&(40.0, 0.0, HAnchor::Left, "C001 (15)".to_string())));
    assert!(texts.contains(&(40.0, 1.0, HAnchor::Left, "(8)".to_string())));
    assert!(texts.contains(&(40.0, 2.0, HAnchor::Left, "C003".to_string())));
}

#[test]
fn bands_follow_rows_and_the_legend_comes_last() {
    let chart = Chart::build(&scenario(), &ChartAppearance::default()).unwrap();
    let last_rect = chart.instructions.iter().rposition(|i| matches!(i, Instruction::Rect { .. })).unwrap();
    let first_band = chart.instructions.iter().position(|i| matches!(i, Instruction::Band { .. })).unwrap();
    assert!(first_band > last_rect);
    assert!(matches!(chart.instructions.last(), Some(Instruction::Legend(_))));
}

#[test]
fn legend_is_fixed_and_data_independent() {
    let legend = |records: &[CaseRecord]| {
        let chart = Chart::build(records, &ChartAppearance::default()).unwrap();
        match chart.instructions.last() {
            Some(Instruction::Legend(entries)) => entries.clone(),
            other => panic!("expected legend, got {other:?}"),
        }
    };
    let entries = legend(&scenario());
    assert_eq!(entries.len(), 9);
    assert_eq!(entries[0].label, "Min");
    assert_eq!(entries[5].label, "P99");
    let gradient = GradientMap::by_name("rdylgn_r").unwrap();
    assert_eq!(entries[0].glyph, LegendGlyph::Swatch(gradient.sample(0.0)));
    assert_eq!(entries[6].glyph, LegendGlyph::Swatch(RGBColor(211, 211, 211)));
    assert!(matches!(entries[7].glyph, LegendGlyph::Line(_)));
    assert!(matches!(entries[8].glyph, LegendGlyph::Point(_)));

    // identical regardless of the records that were laid out
    let other = legend(&scenario()[..1]);
    assert_eq!(entries, other);
}

#[test]
fn x_span_ignores_missing_values() {
    let records = vec![
        record("A", "", None, [None, Some(12.0), None, Some(40.0), None, None]),
        record("B", "", None, [Some(3.0), None, None, None, None, None]),
    ];
    assert_eq!(x_span(&records), Some((3.0, 40.0)));
    assert_eq!(x_span(&[]), None);
}

#[test]
fn appearance_accepts_partial_yaml_overrides() {
    let appearance: ChartAppearance = serde_yaml::from_str("colormap: rdylgn\nmin_bar_height: 0.3\n").unwrap();
    assert_eq!(appearance.colormap, "rdylgn");
    assert!(close(appearance.min_bar_height, 0.3));
    assert_eq!(appearance.figure_width, 1600);
    assert_eq!(appearance.texts.no_variation, "sin variación");
    assert!(appearance.colors.resolve().is_ok());
}
