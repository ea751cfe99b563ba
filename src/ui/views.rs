//! The dashboard views as lines of text.
//!
//! Renderers only read the metrics report and chart series; the chat loop
//! and the `view` command decide where the lines go.

use console::style;

use super::charts::{self, ChartKind};
use super::format::{format_count, pad_right};
use crate::analytics::{ChartSeries, MetricsReport, NOT_AVAILABLE, Ranked};

const TILE_WIDTH: usize = 26;

pub const FOLLOW_UP_PROMPT: &str = "Is there anything else you would like to know today?";
pub const CONTINUE_MESSAGE: &str = "Please use the prompt above to request more info.";
pub const FAREWELL: &str = "Thank you for visiting the Analytics Portal. Feel free to close this window whenever you're done.";

fn label_or_na(r: &Option<Ranked<String>>) -> &str {
    r.as_ref().map(|r| r.label.as_str()).unwrap_or(NOT_AVAILABLE)
}

fn heading(title: &str) -> Vec<String> {
    vec![
        String::new(),
        style(title).bold().cyan().to_string(),
        style("─".repeat(40)).dim().to_string(),
    ]
}

pub fn greeting(owner: &str, menu: &[&str]) -> Vec<String> {
    let mut lines = vec![
        style(format!("Hi {owner}, Welcome to your Analytics portal."))
            .bold()
            .to_string(),
        String::new(),
        "Here you will be able to find more information about your restaurant's performance. \
         We hope that the analytics compiled will help you understand your business better, \
         and help you improve your service and keep your customers happy."
            .to_string(),
        String::new(),
        "The following information is available for you to examine via this portal:".to_string(),
    ];
    lines.extend(menu.iter().map(|item| format!("  - {item}")));
    lines.push(String::new());
    lines.push(
        "To get your answers to these questions, please work with our online assistant below:"
            .to_string(),
    );
    lines
}

/// Boxed tiles laid side by side: label on the first row, value on the second.
fn kpi_row(tiles: &[(&str, String)]) -> Vec<String> {
    let edge = "─".repeat(TILE_WIDTH + 2);
    let join = |cells: Vec<String>| cells.join(" ");
    vec![
        join(tiles.iter().map(|_| format!("┌{edge}┐")).collect()),
        join(
            tiles
                .iter()
                .map(|(label, _)| {
                    format!("│ {} │", style(pad_right(label, TILE_WIDTH)).dim())
                })
                .collect(),
        ),
        join(
            tiles
                .iter()
                .map(|(_, value)| {
                    format!("│ {} │", style(pad_right(value, TILE_WIDTH)).bold())
                })
                .collect(),
        ),
        join(tiles.iter().map(|_| format!("└{edge}┘")).collect()),
    ]
}

pub fn overall(report: &MetricsReport) -> Vec<String> {
    let mut lines = heading("Overall Analytics");
    lines.extend(kpi_row(&[
        ("GMV", report.gmv_display()),
        ("Orders Placed", format_count(report.orders_placed)),
        ("Unique Customers Served", format_count(report.unique_customers)),
    ]));
    lines.extend(kpi_row(&[
        ("Average Order Value", report.avg_order_display()),
        ("Orders Completed", format_count(report.orders_completed)),
        ("Orders Canceled", format_count(report.orders_canceled)),
    ]));
    lines.push(String::new());
    lines.push(format!(
        "Your restaurant recorded {} in sales. There were a total of {} orders placed, \
         of which {} were fulfilled and {} were canceled.",
        report.gmv_display(),
        report.orders_placed,
        report.orders_completed,
        report.orders_canceled,
    ));
    lines
}

pub fn payments(report: &MetricsReport, series: &ChartSeries) -> Vec<String> {
    let mut lines = heading("Payment Trends");
    lines.push(match &report.top_payment_method {
        Some(top) => format!(
            "The most preferred payment method used by your customers was {}, used in {} transactions.",
            style(&top.label).bold(),
            format_count(top.count as usize),
        ),
        None => format!("The most preferred payment method is {NOT_AVAILABLE}."),
    });
    lines.push(String::new());
    lines.push(
        "Below shown is a breakdown of the payment methods used by customers to pay for services at your restaurant:"
            .to_string(),
    );
    lines.extend(charts::share_table(&series.payment_distribution));
    lines
}

pub fn customer(report: &MetricsReport) -> Vec<String> {
    let repeat = report.repeat_customers;
    let mvc = report
        .most_valuable_customer
        .as_ref()
        .map(|r| format!("a record {} times", r.count))
        .unwrap_or_else(|| NOT_AVAILABLE.to_string());

    let mut lines = heading("Customer Trends");
    lines.push(format!(
        "Your customers absolutely love coming back to your restaurant! Out of your {} unique customers, \
         {} ordered more than twice. {} ordered more than 5 times, and {} ORDERED MORE THAN 10 TIMES!",
        report.unique_customers, repeat.more_than_twice, repeat.more_than_five, repeat.more_than_ten,
    ));
    lines.push(format!(
        "Your MVC (Most Valuable Customer) ordered from you {mvc}!"
    ));
    lines.push(format!(
        "Customers love your {} items the most.",
        style(label_or_na(&report.most_ordered_category)).italic()
    ));
    lines.push(format!(
        "The most popular item among your customers is the {}.",
        style(label_or_na(&report.most_ordered_item)).italic()
    ));
    lines.push(format!(
        "According to customer feedback, the most loved item on your menu is the {}.",
        style(label_or_na(&report.most_favorite_item)).italic()
    ));
    lines.push(format!(
        "Finally, what do customers like the most about your restaurant? It is the {}.",
        style(label_or_na(&report.most_liked_aspect)).bold()
    ));
    lines.push(format!(
        "However, this doesn't mean that customers don't have recommendations. Taking into account \
         the feedback received from your customers, the most recommended area of improvement for \
         your restaurant is its {}.",
        style(label_or_na(&report.least_liked_aspect)).bold()
    ));
    lines
}

pub fn chart(kind: ChartKind, series: &ChartSeries) -> Vec<String> {
    let mut lines = heading(kind.label());
    match kind {
        ChartKind::OrderingTimes => {
            lines.push("Below shown is the ordering volume by time for any given day:".to_string());
            lines.extend(charts::hourly_histogram(&series.hourly_orders));
        }
        ChartKind::MonthlySales => {
            lines.push("Below shown is the sales volume for each month:".to_string());
            lines.extend(charts::monthly_sales_chart(&series.monthly_sales));
        }
        ChartKind::Categories => {
            lines.push(
                "Below shown is a breakdown of the categories ordered by customers at your restaurant:"
                    .to_string(),
            );
            lines.extend(charts::share_table(&series.category_distribution));
        }
    }
    lines
}

/// The selected charts in display order; an empty selection shows them all.
pub fn charts(selected: &[ChartKind], series: &ChartSeries) -> Vec<String> {
    let kinds: Vec<ChartKind> = ChartKind::ALL
        .into_iter()
        .filter(|k| selected.is_empty() || selected.contains(k))
        .collect();
    kinds.into_iter().flat_map(|k| chart(k, series)).collect()
}
