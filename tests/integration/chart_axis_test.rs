use fleetmon::core::chart::{
    ema, snap_byte_ceiling, time_ticks, y_axis, DEFAULT_ALPHA, SAMPLE_INTERVAL_SECS,
};

#[test]
fn percentage_series_with_tiny_values_gets_tight_range() {
    let axis = y_axis(&[0.2, 0.4, 0.3], true);
    assert_eq!(axis.max, 1.0);

    let axis = y_axis(&[1.0, 3.0, 2.0], true);
    assert_eq!(axis.max, 5.0);
}

#[test]
fn byte_snapping_is_monotonic() {
    let mut previous = 0.0;
    let mut raw = 0.5;
    while raw < 600.0 * 1024.0 * 1024.0 * 1024.0 {
        let snapped = snap_byte_ceiling(raw);
        assert!(snapped >= raw, "axis max {} below data max {}", snapped, raw);
        assert!(snapped >= previous);
        previous = snapped;
        raw *= 1.37;
    }
}

#[test]
fn empty_series_degenerates_without_panic() {
    let percent = y_axis(&[], true);
    assert!(percent.max > 0.0);
    assert!(!percent.ticks.is_empty());

    let bytes = y_axis(&[], false);
    assert!(bytes.max > 0.0);

    assert!(ema(&[], DEFAULT_ALPHA).is_empty());
    assert!(time_ticks(0, SAMPLE_INTERVAL_SECS, 80).is_empty());
}

#[test]
fn single_sample_collapses_to_now() {
    let ticks = time_ticks(1, SAMPLE_INTERVAL_SECS, 80);
    assert_eq!(ticks.len(), 1);
    assert_eq!(ticks[0].label, "now");

    // Y axis must still be well-formed for one sample
    let axis = y_axis(&[37.0], true);
    assert_eq!(axis.max, 40.0);
}

#[test]
fn tick_labels_unique_across_windows_and_widths() {
    for samples in 0..=120usize {
        for width in [8u16, 20, 38, 60, 160] {
            let ticks = time_ticks(samples, SAMPLE_INTERVAL_SECS, width);
            let mut labels: Vec<&str> = ticks.iter().map(|t| t.label.as_str()).collect();
            let before = labels.len();
            labels.sort_unstable();
            labels.dedup();
            assert_eq!(labels.len(), before, "dup labels at samples={}", samples);
        }
    }
}

#[test]
fn narrow_charts_carry_fewer_labels() {
    let wide = time_ticks(41, SAMPLE_INTERVAL_SECS, 120);
    let narrow = time_ticks(41, SAMPLE_INTERVAL_SECS, 20);
    assert!(narrow.len() < wide.len());
    assert_eq!(narrow.last().unwrap().label, "now");
}
