//! Assembly of the fixed distribution-statistics vector.

use rollmd_math as math;
use rollmd_types::Distribution;

/// Decimal places every published statistic is rounded to.
const DECIMALS: u32 = 4;

fn round(value: Option<f64>) -> Option<f64> {
    value.map(|v| math::round_f64(v, DECIMALS))
}

/// Compute the full statistics vector for one value set.
///
/// An empty input yields the placeholder shape: count 0, everything else
/// null. Rounding to four decimals is monotone, so the percentile ordering
/// and the direct/recursive min/max relationships survive it.
///
/// The concentration block assumes non-negative values (see
/// `rollmd-math`); pass `include_inequality = false` to publish the vector
/// without it.
#[must_use]
pub fn distribution(values: &[f64], include_inequality: bool) -> Distribution {
    let count = values.len();
    if count == 0 {
        return Distribution::default();
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).expect("metric values are finite"));

    let mean = math::mean(&sorted);
    let stddev = math::sample_stddev(&sorted);
    let p25 = math::percentile(&sorted, 0.25);
    let p50 = math::percentile(&sorted, 0.50);
    let p75 = math::percentile(&sorted, 0.75);
    let p90 = math::percentile(&sorted, 0.90);
    let p95 = math::percentile(&sorted, 0.95);
    let p99 = math::percentile(&sorted, 0.99);

    let cv = match (stddev, mean) {
        (Some(s), Some(m)) if m != 0.0 => Some(s / m),
        _ => None,
    };
    let iqr = match (p25, p75) {
        (Some(lo), Some(hi)) => Some(hi - lo),
        _ => None,
    };

    let (gini, theil, hoover, palma, top_10, top_20, bottom_50) = if include_inequality {
        (
            math::gini(&sorted),
            math::theil(&sorted),
            math::hoover(&sorted),
            math::palma_ratio(&sorted),
            math::top_share(&sorted, 0.10),
            math::top_share(&sorted, 0.20),
            math::bottom_share(&sorted, 0.50),
        )
    } else {
        (None, None, None, None, None, None, None)
    };

    Distribution {
        count,
        min: round(sorted.first().copied()),
        max: round(sorted.last().copied()),
        mean: round(mean),
        median: round(p50),
        stddev: round(stddev),
        p25: round(p25),
        p50: round(p50),
        p75: round(p75),
        p90: round(p90),
        p95: round(p95),
        p99: round(p99),
        skewness: round(math::skewness(&sorted)),
        kurtosis: round(math::excess_kurtosis(&sorted)),
        cv: round(cv),
        iqr: round(iqr),
        gini: round(gini),
        theil: round(theil),
        hoover: round(hoover),
        palma: round(palma),
        top_10_pct_share: round(top_10),
        top_20_pct_share: round(top_20),
        bottom_50_pct_share: round(bottom_50),
    }
}
