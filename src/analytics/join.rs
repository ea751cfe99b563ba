//! Left joins that consolidate the base tables into the enriched views.
//!
//! Right-hand tables are hash-indexed by key (first occurrence wins on
//! duplicate keys). Left-hand rows are emitted in input order, so the output
//! is deterministic and always has exactly one row per left-hand row.

use rustc_hash::FxHashMap;
use tracing::debug;

use super::bucketing::MonthKey;
use super::types::*;

fn index_by<T, K, F>(rows: &[T], key: F) -> FxHashMap<K, &T>
where
    K: std::hash::Hash + Eq,
    F: Fn(&T) -> K,
{
    let mut index = FxHashMap::default();
    index.reserve(rows.len());
    for row in rows {
        index.entry(key(row)).or_insert(row);
    }
    index
}

/// Orders ⋈ menu (on `item_id`) ⋈ categories (on `category_id`), plus
/// `line_total` and `period_key`.
pub fn build_enriched_orders(
    orders: &[Order],
    menu: &[MenuItem],
    categories: &[Category],
) -> Vec<EnrichedOrder> {
    let menu_index = index_by(menu, |m| m.item_id);
    let category_index = index_by(categories, |c| c.category_id);

    let mut unresolved_items = 0_usize;
    let mut unresolved_categories = 0_usize;

    let enriched: Vec<EnrichedOrder> = orders
        .iter()
        .map(|order| {
            let item = menu_index.get(&order.item_id).map(|m| (*m).clone());
            let category_name = match &item {
                Some(m) => match category_index.get(&m.category_id) {
                    Some(c) => Some(c.category_name.clone()),
                    None => {
                        unresolved_categories += 1;
                        None
                    }
                },
                None => {
                    unresolved_items += 1;
                    None
                }
            };
            let line_total = item
                .as_ref()
                .and_then(|m| m.price)
                .map(|price| order.quantity as f64 * price);

            EnrichedOrder {
                period_key: MonthKey::from_datetime(&order.order_placed),
                order: order.clone(),
                item,
                category_name,
                line_total,
            }
        })
        .collect();

    debug!(
        rows = enriched.len(),
        unresolved_items, unresolved_categories, "built enriched orders"
    );
    enriched
}

/// Feedback ⋈ menu (on `item_id`).
pub fn build_enriched_feedback(feedback: &[Feedback], menu: &[MenuItem]) -> Vec<EnrichedFeedback> {
    let menu_index = index_by(menu, |m| m.item_id);

    let enriched: Vec<EnrichedFeedback> = feedback
        .iter()
        .map(|f| EnrichedFeedback {
            feedback: f.clone(),
            item: menu_index.get(&f.item_id).map(|m| (*m).clone()),
        })
        .collect();

    debug!(
        rows = enriched.len(),
        unresolved_items = enriched.iter().filter(|f| f.item.is_none()).count(),
        "built enriched feedback"
    );
    enriched
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
