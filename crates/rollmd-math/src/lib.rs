//! Deterministic numeric and statistical helpers.
//!
//! Every function in this crate is a pure computation over a slice of
//! values. Undefined statistics return `None` rather than a sentinel zero:
//! an empty input has no minimum, two points have no meaningful skewness,
//! and a zero-sum series has no concentration. Callers decide how absence
//! is rendered.
//!
//! Functions taking a `sorted` parameter require the slice to be sorted
//! ascending; they do not re-sort.
//!
//! The inequality/concentration helpers (`gini`, `theil`, `hoover`,
//! `palma_ratio`, the share functions) assume non-negative inputs. Metric
//! values in this system are counts, sizes and scores, which are inherently
//! non-negative; feeding signed data into these functions produces numbers
//! without their usual interpretation.

#![forbid(unsafe_code)]

/// Round a floating point value to `decimals` decimal places.
#[must_use]
pub fn round_f64(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

/// Arithmetic mean. `None` on empty input.
#[must_use]
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sample standard deviation (n-1 convention). `None` when fewer than two
/// points, where the estimator is undefined.
#[must_use]
pub fn sample_stddev(values: &[f64]) -> Option<f64> {
    let n = values.len();
    if n < 2 {
        return None;
    }
    let mu = values.iter().sum::<f64>() / n as f64;
    let ss: f64 = values.iter().map(|v| (v - mu) * (v - mu)).sum();
    Some((ss / (n as f64 - 1.0)).sqrt())
}

/// Percentile by linear interpolation between order statistics.
///
/// `pct` is a fraction in `[0, 1]` (0.25 for p25). The rank
/// `pct * (n - 1)` is split into its integer neighbours and the value is
/// interpolated between them, so small inputs degrade gracefully without
/// nearest-rank special cases. `None` on empty input.
#[must_use]
pub fn percentile(sorted: &[f64], pct: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let rank = pct.clamp(0.0, 1.0) * (sorted.len() as f64 - 1.0);
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    if lo == hi {
        return Some(sorted[lo]);
    }
    let weight = rank - lo as f64;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * weight)
}

/// Fisher-Pearson skewness. `None` when fewer than three points or when the
/// series has zero spread; both cases are statistically unstable and must
/// surface as absence, not zero.
#[must_use]
pub fn skewness(values: &[f64]) -> Option<f64> {
    let n = values.len();
    if n < 3 {
        return None;
    }
    let mu = values.iter().sum::<f64>() / n as f64;
    let std = sample_stddev(values)?;
    if std == 0.0 {
        return None;
    }
    let m3: f64 = values.iter().map(|v| (v - mu).powi(3)).sum();
    Some(m3 / (n as f64 * std.powi(3)))
}

/// Excess kurtosis (normal distribution = 0). `None` when fewer than four
/// points or zero spread.
#[must_use]
pub fn excess_kurtosis(values: &[f64]) -> Option<f64> {
    let n = values.len();
    if n < 4 {
        return None;
    }
    let mu = values.iter().sum::<f64>() / n as f64;
    let std = sample_stddev(values)?;
    if std == 0.0 {
        return None;
    }
    let m4: f64 = values.iter().map(|v| (v - mu).powi(4)).sum();
    Some(m4 / (n as f64 * std.powi(4)) - 3.0)
}

/// Gini coefficient over an ascending-sorted slice.
///
/// `G = sum_i((2i - n - 1) * x_i) / (n * sum(x))` with 1-based `i`.
/// `None` on empty input or zero total.
#[must_use]
pub fn gini(sorted: &[f64]) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let n = sorted.len() as f64;
    let total: f64 = sorted.iter().sum();
    if total == 0.0 {
        return None;
    }
    let mut accum = 0.0;
    for (i, value) in sorted.iter().enumerate() {
        let rank = i as f64 + 1.0;
        accum += (2.0 * rank - n - 1.0) * value;
    }
    Some(accum / (n * total))
}

/// Theil T entropy index.
///
/// `T = (1/n) * sum((x_i / mu) * ln(x_i / mu))` where zero values
/// contribute zero (the `x ln x` limit). Requires non-negative values with
/// a positive mean; `None` otherwise.
#[must_use]
pub fn theil(values: &[f64]) -> Option<f64> {
    if values.is_empty() || values.iter().any(|v| *v < 0.0) {
        return None;
    }
    let n = values.len() as f64;
    let mu = values.iter().sum::<f64>() / n;
    if mu <= 0.0 {
        return None;
    }
    let sum: f64 = values
        .iter()
        .filter(|v| **v > 0.0)
        .map(|v| (v / mu) * (v / mu).ln())
        .sum();
    Some(sum / n)
}

/// Hoover (Robin Hood) index: the fraction of total mass that would have to
/// move to reach perfect equality.
///
/// `H = 0.5 * sum(|x_i - mu|) / sum(x)`. `None` on empty input or zero
/// total.
#[must_use]
pub fn hoover(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let total: f64 = values.iter().sum();
    if total == 0.0 {
        return None;
    }
    let mu = total / values.len() as f64;
    let deviation: f64 = values.iter().map(|v| (v - mu).abs()).sum();
    Some(0.5 * deviation / total)
}

/// Share of the total held by the top `pct` fraction of an ascending-sorted
/// slice. The segment holds `max(1, floor(n * pct))` values. `None` on
/// empty input or zero total.
#[must_use]
pub fn top_share(sorted: &[f64], pct: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let total: f64 = sorted.iter().sum();
    if total == 0.0 {
        return None;
    }
    let count = segment_len(sorted.len(), pct);
    let top: f64 = sorted[sorted.len() - count..].iter().sum();
    Some(top / total)
}

/// Share of the total held by the bottom `pct` fraction of an
/// ascending-sorted slice. Segment sizing matches [`top_share`].
#[must_use]
pub fn bottom_share(sorted: &[f64], pct: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let total: f64 = sorted.iter().sum();
    if total == 0.0 {
        return None;
    }
    let count = segment_len(sorted.len(), pct);
    let bottom: f64 = sorted[..count].iter().sum();
    Some(bottom / total)
}

/// Palma ratio: top-10% value share over bottom-40% value share.
///
/// The bottom segment holds exactly `floor(n * 0.4)` values (no minimum-one
/// floor: with fewer than three values there is no bottom 40% to speak of).
/// `None` on empty input, zero total, or a zero bottom-40% share.
#[must_use]
pub fn palma_ratio(sorted: &[f64]) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let total: f64 = sorted.iter().sum();
    if total == 0.0 {
        return None;
    }
    let bottom_count = (sorted.len() as f64 * 0.4).floor() as usize;
    let bottom: f64 = sorted[..bottom_count].iter().sum();
    if bottom == 0.0 {
        return None;
    }
    let top_count = segment_len(sorted.len(), 0.10);
    let top: f64 = sorted[sorted.len() - top_count..].iter().sum();
    Some(top / bottom)
}

fn segment_len(n: usize, pct: f64) -> usize {
    ((n as f64 * pct).floor() as usize).max(1).min(n)
}
