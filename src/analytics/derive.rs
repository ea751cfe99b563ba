//! Derived metric helpers.
//!
//! All division operations are safe against zero denominators and produce
//! `None` rather than NaN / Infinity. Frequency rankings break ties by the
//! ascending label so repeated runs agree.

use std::collections::BTreeMap;

use super::types::{AnalyticsError, AnalyticsResult, Ranked};

/// Percentage safe against zero denominator.  Returns 0.0 when denominator is
/// zero. Result is rounded to 2 decimal places.
pub fn safe_pct(numerator: u64, denominator: u64) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        let pct = (numerator as f64 / denominator as f64) * 100.0;
        round_to(pct, 2)
    }
}

/// Mean of the values, `None` for an empty input.
pub fn safe_mean(values: impl IntoIterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values
        .into_iter()
        .fold((0.0_f64, 0_u64), |(s, n), v| (s + v, n + 1));
    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}

/// Round to `decimals` places, ties to even.
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10_f64.powi(decimals as i32);
    (value * factor).round_ties_even() / factor
}

/// Render a dollar amount, e.g. `format_currency(15.0, 0) == "$ 15"`.
/// Exact halves round to even, as `{:.N}` does.
pub fn format_currency(value: f64, decimals: usize) -> String {
    format!("$ {value:.decimals$}")
}

/// Count occurrences and rank them: count descending, then label ascending.
pub fn rank_by_frequency<K, I>(labels: I) -> Vec<Ranked<K>>
where
    K: Ord,
    I: IntoIterator<Item = K>,
{
    let mut counts: BTreeMap<K, u64> = BTreeMap::new();
    for label in labels {
        *counts.entry(label).or_insert(0) += 1;
    }
    let mut ranked: Vec<Ranked<K>> = counts
        .into_iter()
        .map(|(label, count)| Ranked { label, count })
        .collect();
    // Stable sort keeps the BTreeMap's ascending label order among ties.
    ranked.sort_by(|a, b| b.count.cmp(&a.count));
    ranked
}

/// The most frequent label, or `EmptyResult(metric)` when there is none.
pub fn most_frequent<K, I>(labels: I, metric: &'static str) -> AnalyticsResult<Ranked<K>>
where
    K: Ord,
    I: IntoIterator<Item = K>,
{
    rank_by_frequency(labels)
        .into_iter()
        .next()
        .ok_or(AnalyticsError::EmptyResult(metric))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
