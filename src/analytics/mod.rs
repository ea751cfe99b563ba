//! Data consolidation and metrics engine.
//!
//! Consumed by the session cache, the `quechat report` command and the chat
//! views. Nothing in here touches the terminal.
//!
//! # Module structure
//!
//! - [`types`] — entities, enriched views, result structs, error type
//! - [`schema`] — declared CSV schemas, coercion and loading
//! - [`join`] — left joins into the enriched views
//! - [`bucketing`] — month keys and hour buckets
//! - [`derive`] — safe arithmetic, rounding, frequency ranking
//! - [`metrics`] — business metrics and [`MetricsReport`]
//! - [`aggregate`] — chart series and [`ChartSeries`]

pub mod aggregate;
pub mod bucketing;
pub mod derive;
pub mod join;
pub mod metrics;
pub mod schema;
pub mod types;

// Re-export the most commonly used items at the crate::analytics level.
pub use bucketing::MonthKey;
pub use join::{build_enriched_feedback, build_enriched_orders};
pub use schema::{
    categories_from_reader, feedback_from_reader, load_categories, load_feedback, load_menu,
    load_orders, menu_from_reader, orders_from_reader,
};
pub use types::{
    AnalyticsError, AnalyticsResult, Category, ChartSeries, Dataset, EnrichedFeedback,
    EnrichedOrder, Feedback, MenuItem, MetricsReport, MonthlySales, NOT_AVAILABLE, Order,
    OrderStatus, Ranked, RepeatCustomers, ShareRow,
};
