//! Chart-ready series.
//!
//! The month series is keyed by [`MonthKey`] so a `BTreeMap` yields it in
//! chronological order; share tables reuse the frequency ranking from
//! [`derive`](super::derive).

use std::collections::BTreeMap;

use super::bucketing::{MonthKey, hour_bucket};
use super::derive::{rank_by_frequency, safe_pct};
use super::types::*;

/// Σ line_total per calendar month, oldest first.
pub fn monthly_sales(orders: &[EnrichedOrder]) -> Vec<MonthlySales> {
    let mut by_month: BTreeMap<MonthKey, f64> = BTreeMap::new();
    for o in orders {
        let slot = by_month.entry(o.period_key).or_insert(0.0);
        if let Some(total) = o.line_total {
            *slot += total;
        }
    }
    by_month
        .into_iter()
        .map(|(period, total)| MonthlySales { period, total })
        .collect()
}

fn share_rows<'a>(labels: impl Iterator<Item = &'a str>) -> Vec<ShareRow> {
    let ranked = rank_by_frequency(labels);
    let total: u64 = ranked.iter().map(|r| r.count).sum();
    ranked
        .into_iter()
        .map(|r| ShareRow {
            label: r.label.to_string(),
            count: r.count,
            share_pct: safe_pct(r.count, total),
        })
        .collect()
}

/// Order lines per payment method. Lines without a method are left out.
pub fn payment_distribution(orders: &[EnrichedOrder]) -> Vec<ShareRow> {
    share_rows(orders.iter().filter_map(|o| o.payment_method()))
}

/// Order lines per category. Lines whose category did not resolve are left out.
pub fn category_distribution(orders: &[EnrichedOrder]) -> Vec<ShareRow> {
    share_rows(orders.iter().filter_map(|o| o.category_name()))
}

pub fn hourly_order_histogram(orders: &[EnrichedOrder]) -> [u64; 24] {
    let mut buckets = [0_u64; 24];
    for o in orders {
        buckets[hour_bucket(&o.order.order_placed)] += 1;
    }
    buckets
}

impl ChartSeries {
    pub fn compute(orders: &[EnrichedOrder]) -> Self {
        Self {
            monthly_sales: monthly_sales(orders),
            payment_distribution: payment_distribution(orders),
            category_distribution: category_distribution(orders),
            hourly_orders: hourly_order_histogram(orders),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
