//! Business metrics over the enriched views.
//!
//! Every function here is pure. Frequency lookups return
//! [`AnalyticsError::EmptyResult`] when their filtered input is empty;
//! [`MetricsReport::compute`] is the caller that turns those into
//! "not available" without disturbing the other metrics.

use rustc_hash::{FxHashMap, FxHashSet};
use tracing::debug;

use super::derive::{most_frequent, round_to, safe_mean};
use super::types::*;

/// Loyalty thresholds reported by the customer view.
pub const REPEAT_THRESHOLDS: [usize; 3] = [2, 5, 10];

// ---------------------------------------------------------------------------
// Revenue
// ---------------------------------------------------------------------------

/// Gross merchandise value: Σ line_total. Lines whose item did not resolve
/// contribute nothing.
pub fn gmv(orders: &[EnrichedOrder]) -> f64 {
    orders.iter().filter_map(|o| o.line_total).sum()
}

/// Mean line total, rounded to 2 decimals.
pub fn avg_order(orders: &[EnrichedOrder]) -> AnalyticsResult<f64> {
    safe_mean(orders.iter().filter_map(|o| o.line_total))
        .map(|v| round_to(v, 2))
        .ok_or(AnalyticsError::EmptyResult("avg_order"))
}

// ---------------------------------------------------------------------------
// Order counts
// ---------------------------------------------------------------------------

fn distinct_orders<'a>(rows: impl Iterator<Item = &'a EnrichedOrder>) -> usize {
    rows.map(|o| o.order.order_id)
        .collect::<FxHashSet<i64>>()
        .len()
}

pub fn orders_placed(orders: &[EnrichedOrder]) -> usize {
    distinct_orders(orders.iter())
}

/// Distinct orders that are Completed or In Progress.
pub fn orders_completed(orders: &[EnrichedOrder]) -> usize {
    distinct_orders(orders.iter().filter(|o| o.order.order_status.is_fulfilled()))
}

pub fn orders_canceled(orders: &[EnrichedOrder]) -> usize {
    distinct_orders(orders.iter().filter(|o| o.order.order_status.is_cancelled()))
}

// ---------------------------------------------------------------------------
// Popularity lookups
// ---------------------------------------------------------------------------

fn owned(r: Ranked<&str>) -> Ranked<String> {
    Ranked {
        label: r.label.to_string(),
        count: r.count,
    }
}

pub fn most_ordered_item(orders: &[EnrichedOrder]) -> AnalyticsResult<Ranked<String>> {
    most_frequent(orders.iter().filter_map(|o| o.item_name()), "most_ordered_item").map(owned)
}

pub fn most_ordered_category(orders: &[EnrichedOrder]) -> AnalyticsResult<Ranked<String>> {
    most_frequent(
        orders.iter().filter_map(|o| o.category_name()),
        "most_ordered_category",
    )
    .map(owned)
}

pub fn top_payment_method(orders: &[EnrichedOrder]) -> AnalyticsResult<Ranked<String>> {
    most_frequent(
        orders.iter().filter_map(|o| o.payment_method()),
        "top_payment_method",
    )
    .map(owned)
}

fn is_top_rated(f: &EnrichedFeedback) -> bool {
    f.feedback.rating == Some(5.0)
}

fn is_low_rated(f: &EnrichedFeedback) -> bool {
    f.feedback.rating.is_some_and(|r| r < 2.0)
}

/// Item named most often in 5.0-rated feedback.
pub fn most_favorite_item(feedback: &[EnrichedFeedback]) -> AnalyticsResult<Ranked<String>> {
    most_frequent(
        feedback
            .iter()
            .filter(|f| is_top_rated(f))
            .filter_map(|f| f.item_name()),
        "most_favorite_item",
    )
    .map(owned)
}

/// Feedback category cited most often in 5.0-rated feedback.
pub fn most_liked_aspect(feedback: &[EnrichedFeedback]) -> AnalyticsResult<Ranked<String>> {
    most_frequent(
        feedback
            .iter()
            .filter(|f| is_top_rated(f))
            .filter_map(|f| f.feedback_category()),
        "most_liked_aspect",
    )
    .map(owned)
}

/// Feedback category cited most often in feedback rated below 2.0.
pub fn least_liked_aspect(feedback: &[EnrichedFeedback]) -> AnalyticsResult<Ranked<String>> {
    most_frequent(
        feedback
            .iter()
            .filter(|f| is_low_rated(f))
            .filter_map(|f| f.feedback_category()),
        "least_liked_aspect",
    )
    .map(owned)
}

// ---------------------------------------------------------------------------
// Customers
// ---------------------------------------------------------------------------

pub fn unique_customers(orders: &[EnrichedOrder]) -> usize {
    orders
        .iter()
        .map(|o| o.order.customer_id)
        .collect::<FxHashSet<i64>>()
        .len()
}

/// Order-line occurrences per customer.
pub fn customer_occurrences(orders: &[EnrichedOrder]) -> FxHashMap<i64, u64> {
    let mut counts: FxHashMap<i64, u64> = FxHashMap::default();
    for o in orders {
        *counts.entry(o.order.customer_id).or_insert(0) += 1;
    }
    counts
}

/// Customer with the most order lines (ties go to the smallest id).
pub fn most_valuable_customer(orders: &[EnrichedOrder]) -> AnalyticsResult<Ranked<i64>> {
    most_frequent(
        orders.iter().map(|o| o.order.customer_id),
        "most_valuable_customer",
    )
}

/// Number of customers with more than `k` order lines.
pub fn repeat_more_than(occurrences: &FxHashMap<i64, u64>, k: usize) -> usize {
    occurrences.values().filter(|&&n| n > k as u64).count()
}

pub fn repeat_customers(orders: &[EnrichedOrder]) -> RepeatCustomers {
    let occurrences = customer_occurrences(orders);
    let [twice, five, ten] = REPEAT_THRESHOLDS.map(|k| repeat_more_than(&occurrences, k));
    RepeatCustomers {
        more_than_twice: twice,
        more_than_five: five,
        more_than_ten: ten,
    }
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

/// Catch a lookup's `EmptyResult` so it cannot sink the rest of the report.
fn available<T>(result: AnalyticsResult<T>) -> Option<T> {
    match result {
        Ok(v) => Some(v),
        Err(e) => {
            debug!(error = %e, "metric not available");
            None
        }
    }
}

impl MetricsReport {
    /// Evaluate every metric. Each lookup fails independently.
    pub fn compute(orders: &[EnrichedOrder], feedback: &[EnrichedFeedback]) -> Self {
        Self {
            gmv: gmv(orders),
            avg_order: available(avg_order(orders)),
            orders_placed: orders_placed(orders),
            orders_completed: orders_completed(orders),
            orders_canceled: orders_canceled(orders),
            unique_customers: unique_customers(orders),
            most_ordered_item: available(most_ordered_item(orders)),
            most_ordered_category: available(most_ordered_category(orders)),
            most_favorite_item: available(most_favorite_item(feedback)),
            most_liked_aspect: available(most_liked_aspect(feedback)),
            least_liked_aspect: available(least_liked_aspect(feedback)),
            most_valuable_customer: available(most_valuable_customer(orders)),
            top_payment_method: available(top_payment_method(orders)),
            repeat_customers: repeat_customers(orders),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
