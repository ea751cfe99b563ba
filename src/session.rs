//! Per-session analytics context.
//!
//! A [`Session`] owns the four loaded tables. The enriched views, the
//! metrics report and the chart series are built on first request and then
//! served from the session's cache; separate sessions never share state.

use std::time::Instant;

use once_cell::unsync::OnceCell;
use tracing::{debug, info};

use crate::analytics::{
    AnalyticsResult, Category, ChartSeries, EnrichedFeedback, EnrichedOrder, Feedback, MenuItem,
    MetricsReport, Order, build_enriched_feedback, build_enriched_orders, load_categories,
    load_feedback, load_menu, load_orders,
};
use crate::config::DataPaths;

/// The four source tables, as loaded.
#[derive(Debug, Clone, Default)]
pub struct Tables {
    pub categories: Vec<Category>,
    pub menu: Vec<MenuItem>,
    pub orders: Vec<Order>,
    pub feedback: Vec<Feedback>,
}

impl Tables {
    /// Load every source. The first failure aborts the load.
    pub fn load(paths: &DataPaths) -> AnalyticsResult<Self> {
        Ok(Self {
            categories: load_categories(&paths.categories)?,
            menu: load_menu(&paths.menu)?,
            orders: load_orders(&paths.orders)?,
            feedback: load_feedback(&paths.feedback)?,
        })
    }
}

#[derive(Debug)]
pub struct Session {
    tables: Tables,
    enriched_orders: OnceCell<Vec<EnrichedOrder>>,
    enriched_feedback: OnceCell<Vec<EnrichedFeedback>>,
    metrics: OnceCell<MetricsReport>,
    series: OnceCell<ChartSeries>,
}

impl Session {
    /// Load the sources named by `paths` and start a session over them.
    pub fn open(paths: &DataPaths) -> AnalyticsResult<Self> {
        let start = Instant::now();
        let tables = Tables::load(paths)?;
        info!(
            categories = tables.categories.len(),
            menu = tables.menu.len(),
            orders = tables.orders.len(),
            feedback = tables.feedback.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "session opened"
        );
        Ok(Self::from_tables(tables))
    }

    pub fn from_tables(tables: Tables) -> Self {
        Self {
            tables,
            enriched_orders: OnceCell::new(),
            enriched_feedback: OnceCell::new(),
            metrics: OnceCell::new(),
            series: OnceCell::new(),
        }
    }

    pub fn enriched_orders(&self) -> &[EnrichedOrder] {
        self.enriched_orders.get_or_init(|| {
            debug!("building enriched orders");
            build_enriched_orders(&self.tables.orders, &self.tables.menu, &self.tables.categories)
        })
    }

    pub fn enriched_feedback(&self) -> &[EnrichedFeedback] {
        self.enriched_feedback.get_or_init(|| {
            debug!("building enriched feedback");
            build_enriched_feedback(&self.tables.feedback, &self.tables.menu)
        })
    }

    pub fn metrics(&self) -> &MetricsReport {
        self.metrics.get_or_init(|| {
            debug!("computing metrics report");
            MetricsReport::compute(self.enriched_orders(), self.enriched_feedback())
        })
    }

    pub fn series(&self) -> &ChartSeries {
        self.series.get_or_init(|| {
            debug!("computing chart series");
            ChartSeries::compute(self.enriched_orders())
        })
    }

    /// Metrics and series in the shape printed by `quechat report`.
    pub fn report_json(&self) -> serde_json::Value {
        serde_json::json!({
            "metrics": self.metrics().to_json(),
            "charts": self.series().to_json(),
        })
    }
}
