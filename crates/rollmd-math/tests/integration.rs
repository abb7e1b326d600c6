use rollmd_math::{
    bottom_share, gini, hoover, palma_ratio, percentile, round_f64, theil, top_share,
};

#[test]
fn stats_pipeline_is_deterministic_for_same_input() {
    let values = [1.0, 3.0, 8.0, 21.0, 34.0, 55.0];

    let p90_a = percentile(&values, 0.90);
    let p90_b = percentile(&values, 0.90);
    let gini_a = gini(&values);
    let gini_b = gini(&values);

    assert_eq!(p90_a, p90_b);
    assert_eq!(gini_a, gini_b);
}

#[test]
fn percentile_bounds_match_input_range() {
    let values = [2.0, 4.0, 6.0, 8.0];
    assert_eq!(percentile(&values, 0.0), Some(2.0));
    assert_eq!(percentile(&values, 1.0), Some(8.0));
}

#[test]
fn concentration_indices_agree_on_a_fully_concentrated_series() {
    // All mass on one of four values: each index should sit near its
    // theoretical maximum for n = 4.
    let sorted = [0.0, 0.0, 0.0, 100.0];
    assert!((gini(&sorted).unwrap() - 0.75).abs() < 1e-12);
    assert!((hoover(&sorted).unwrap() - 0.75).abs() < 1e-12);
    assert!((top_share(&sorted, 0.25).unwrap() - 1.0).abs() < 1e-12);
    assert!((bottom_share(&sorted, 0.50).unwrap()).abs() < 1e-12);
}

#[test]
fn share_then_round_can_be_used_for_percentage_display() {
    let sorted = [1.0, 1.0, 2.0, 4.0];
    let share = top_share(&sorted, 0.25).unwrap();
    assert_eq!(round_f64(share * 100.0, 2), 50.0);
}

#[test]
fn theil_and_palma_are_null_rather_than_misleading() {
    // Signed input: entropy index has no interpretation.
    assert_eq!(theil(&[-5.0, 5.0, 10.0]), None);
    // Empty bottom segment: the ratio's denominator does not exist.
    assert_eq!(palma_ratio(&[0.0, 0.0, 0.0, 0.0, 7.0]), None);
}
