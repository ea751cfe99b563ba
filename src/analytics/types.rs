//! Shared types for the analytics engine.
//!
//! Entities loaded from the four source datasets, the enriched views built by
//! the join engine, and the result structs consumed by the presentation
//! layer. Keeping them in one place lets the CLI report, the views, and the
//! chat share a single vocabulary.

use std::path::PathBuf;

use chrono::NaiveDateTime;
use serde::{Serialize, Serializer};
use thiserror::Error;

use super::bucketing::MonthKey;

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// Which of the four source datasets a value or error belongs to.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Dataset {
    Categories,
    Menu,
    Orders,
    Feedback,
}

impl Dataset {
    pub const ALL: [Dataset; 4] = [
        Dataset::Categories,
        Dataset::Menu,
        Dataset::Orders,
        Dataset::Feedback,
    ];
}

impl std::fmt::Display for Dataset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Categories => write!(f, "categories"),
            Self::Menu => write!(f, "menu"),
            Self::Orders => write!(f, "orders"),
            Self::Feedback => write!(f, "feedback"),
        }
    }
}

/// Analytics engine error.
///
/// `SourceNotFound`, `SourceUnreadable` and `SchemaMismatch` are load-time
/// failures and abort the session. `EmptyResult` is local to a single
/// frequency lookup.
#[derive(Error, Debug)]
pub enum AnalyticsError {
    #[error("{dataset} source not found: {}", .path.display())]
    SourceNotFound { dataset: Dataset, path: PathBuf },

    #[error("{dataset} source could not be read: {}: {source}", .path.display())]
    SourceUnreadable {
        dataset: Dataset,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{dataset} schema mismatch in column '{column}'{}: {detail}", row_suffix(.row))]
    SchemaMismatch {
        dataset: Dataset,
        column: String,
        /// 1-indexed data row (header excluded); `None` for header problems.
        row: Option<usize>,
        detail: String,
    },

    #[error("no rows to rank for {0}")]
    EmptyResult(&'static str),
}

fn row_suffix(row: &Option<usize>) -> String {
    row.map(|r| format!(" at row {r}")).unwrap_or_default()
}

impl AnalyticsError {
    /// Stable machine-readable kind, used in the JSON error envelope.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::SourceNotFound { .. } => "source-not-found",
            Self::SourceUnreadable { .. } => "source-unreadable",
            Self::SchemaMismatch { .. } => "schema-mismatch",
            Self::EmptyResult(_) => "empty-result",
        }
    }

    /// Get a user-friendly recovery suggestion for this error.
    pub fn suggestion(&self) -> &'static str {
        match self {
            Self::SourceNotFound { .. } => {
                "Check the data directory and file names (--data-dir, or the [data] table in config.toml)."
            }
            Self::SourceUnreadable { .. } => "Check the file permissions of the data source.",
            Self::SchemaMismatch { .. } => {
                "The file does not match the expected columns or contains a value of the wrong type."
            }
            Self::EmptyResult(_) => "There is not enough data yet to compute this metric.",
        }
    }
}

/// Convenience alias.
pub type AnalyticsResult<T> = std::result::Result<T, AnalyticsError>;

// ---------------------------------------------------------------------------
// Base entities
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Category {
    pub category_id: i64,
    pub category_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MenuItem {
    pub item_id: i64,
    pub item_name: String,
    pub description: String,
    /// `None` when the export left the price blank.
    pub price: Option<f64>,
    pub category_id: i64,
    pub is_vegetarian: Option<bool>,
    pub is_spicy: Option<bool>,
    pub is_gluten_free: Option<bool>,
}

/// Lifecycle state of an order line.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum OrderStatus {
    Completed,
    InProgress,
    Cancelled,
    Other(String),
}

impl OrderStatus {
    /// Statuses counted as fulfilled by the restaurant.
    pub fn is_fulfilled(&self) -> bool {
        matches!(self, Self::Completed | Self::InProgress)
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

impl From<&str> for OrderStatus {
    fn from(raw: &str) -> Self {
        match raw {
            "Completed" => Self::Completed,
            "In Progress" => Self::InProgress,
            "Cancelled" => Self::Cancelled,
            other => Self::Other(other.to_string()),
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderStatus::Completed => write!(f, "Completed"),
            OrderStatus::InProgress => write!(f, "In Progress"),
            OrderStatus::Cancelled => write!(f, "Cancelled"),
            OrderStatus::Other(s) => write!(f, "{}", s),
        }
    }
}

impl Serialize for OrderStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// One order line. Several rows may share an `order_id`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Order {
    pub order_id: i64,
    pub item_id: i64,
    pub customer_id: i64,
    pub quantity: i64,
    pub special_request: Option<String>,
    pub subtotal: Option<f64>,
    pub payment_method: Option<String>,
    pub order_status: OrderStatus,
    pub order_placed: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Feedback {
    pub customer_id: i64,
    pub item_id: i64,
    pub feedback_text: String,
    pub rating: Option<f64>,
    pub feedback_category: Option<String>,
    pub submission_timestamp: NaiveDateTime,
}

// ---------------------------------------------------------------------------
// Enriched views
// ---------------------------------------------------------------------------

/// Order ⋈ MenuItem ⋈ Category. Menu and category fields are `None` when the
/// corresponding key did not resolve.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrichedOrder {
    pub order: Order,
    pub item: Option<MenuItem>,
    pub category_name: Option<String>,
    /// `quantity × price`; `None` when the menu item is unknown or unpriced.
    pub line_total: Option<f64>,
    pub period_key: MonthKey,
}

impl EnrichedOrder {
    pub fn item_name(&self) -> Option<&str> {
        self.item.as_ref().map(|i| i.item_name.as_str())
    }

    pub fn price(&self) -> Option<f64> {
        self.item.as_ref().and_then(|i| i.price)
    }

    pub fn category_name(&self) -> Option<&str> {
        self.category_name.as_deref()
    }

    pub fn payment_method(&self) -> Option<&str> {
        self.order.payment_method.as_deref()
    }
}

/// Feedback ⋈ MenuItem.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrichedFeedback {
    pub feedback: Feedback,
    pub item: Option<MenuItem>,
}

impl EnrichedFeedback {
    pub fn item_name(&self) -> Option<&str> {
        self.item.as_ref().map(|i| i.item_name.as_str())
    }

    pub fn feedback_category(&self) -> Option<&str> {
        self.feedback.feedback_category.as_deref()
    }
}

// ---------------------------------------------------------------------------
// Metric results
// ---------------------------------------------------------------------------

/// Winner of a frequency ranking and the number of rows it was seen in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Ranked<T> {
    pub label: T,
    pub count: u64,
}

/// Customers whose order-line count exceeds a threshold.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RepeatCustomers {
    pub more_than_twice: usize,
    pub more_than_five: usize,
    pub more_than_ten: usize,
}

/// Every scalar and lookup metric shown by the dashboard.
///
/// Lookups that had nothing to rank are `None` and render as
/// "not available".
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsReport {
    pub gmv: f64,
    pub avg_order: Option<f64>,
    pub orders_placed: usize,
    pub orders_completed: usize,
    pub orders_canceled: usize,
    pub unique_customers: usize,
    pub most_ordered_item: Option<Ranked<String>>,
    pub most_ordered_category: Option<Ranked<String>>,
    pub most_favorite_item: Option<Ranked<String>>,
    pub most_liked_aspect: Option<Ranked<String>>,
    pub least_liked_aspect: Option<Ranked<String>>,
    pub most_valuable_customer: Option<Ranked<i64>>,
    pub top_payment_method: Option<Ranked<String>>,
    pub repeat_customers: RepeatCustomers,
}

impl MetricsReport {
    /// GMV as currency with no decimals, e.g. `"$ 15"`.
    pub fn gmv_display(&self) -> String {
        super::derive::format_currency(self.gmv, 0)
    }

    /// Average order value as currency, e.g. `"$ 7.50"`.
    pub fn avg_order_display(&self) -> String {
        self.avg_order
            .map(|v| super::derive::format_currency(v, 2))
            .unwrap_or_else(|| NOT_AVAILABLE.to_string())
    }

    /// Produce the JSON shape emitted by `quechat report`.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "revenue": {
                "gmv": self.gmv,
                "gmv_display": self.gmv_display(),
                "avg_order": self.avg_order,
                "avg_order_display": self.avg_order_display(),
            },
            "orders": {
                "placed": self.orders_placed,
                "completed": self.orders_completed,
                "canceled": self.orders_canceled,
            },
            "customers": {
                "unique": self.unique_customers,
                "most_valuable": self.most_valuable_customer,
                "repeat": self.repeat_customers,
            },
            "popularity": {
                "most_ordered_item": self.most_ordered_item,
                "most_ordered_category": self.most_ordered_category,
                "most_favorite_item": self.most_favorite_item,
                "top_payment_method": self.top_payment_method,
            },
            "feedback": {
                "most_liked_aspect": self.most_liked_aspect,
                "least_liked_aspect": self.least_liked_aspect,
            },
        })
    }
}

/// Placeholder shown for metrics whose lookup had no rows.
pub const NOT_AVAILABLE: &str = "not available";

// ---------------------------------------------------------------------------
// Chart series
// ---------------------------------------------------------------------------

/// One month of sales.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlySales {
    pub period: MonthKey,
    pub total: f64,
}

/// A labelled count and its share of the distribution, in percent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShareRow {
    pub label: String,
    pub count: u64,
    pub share_pct: f64,
}

/// Chart-ready series built by the aggregation builder.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSeries {
    /// Chronologically ordered.
    pub monthly_sales: Vec<MonthlySales>,
    /// Count descending, then label.
    pub payment_distribution: Vec<ShareRow>,
    /// Count descending, then label.
    pub category_distribution: Vec<ShareRow>,
    /// Bucket `i` counts order lines placed during hour `i`.
    pub hourly_orders: [u64; 24],
}

impl ChartSeries {
    pub fn to_json(&self) -> serde_json::Value {
        let monthly: Vec<serde_json::Value> = self
            .monthly_sales
            .iter()
            .map(|m| {
                serde_json::json!({
                    "period": m.period.to_string(),
                    "total": m.total,
                })
            })
            .collect();

        serde_json::json!({
            "monthly_sales": monthly,
            "payment_distribution": self.payment_distribution,
            "category_distribution": self.category_distribution,
            "hourly_orders": self.hourly_orders.to_vec(),
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
