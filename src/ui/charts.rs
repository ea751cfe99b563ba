//! Text charts for the terminal.
//!
//! Every renderer returns plain lines; colour is applied with `console` and
//! disappears when the terminal does not support it.

use clap::ValueEnum;
use console::style;

use super::format::{display_width, format_compact, format_number, pad_right};
use crate::analytics::bucketing::hour_label;
use crate::analytics::{MonthlySales, ShareRow};

const BAR_WIDTH: usize = 32;
const LABEL_WIDTH: usize = 18;
const SPARK_LEVELS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];
const EIGHTHS: [char; 8] = [' ', '▏', '▎', '▍', '▌', '▋', '▊', '▉'];

/// Charts offered by the charts view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum ChartKind {
    OrderingTimes,
    MonthlySales,
    Categories,
}

impl ChartKind {
    pub const ALL: [ChartKind; 3] = [
        ChartKind::OrderingTimes,
        ChartKind::MonthlySales,
        ChartKind::Categories,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::OrderingTimes => "Customer Ordering Times",
            Self::MonthlySales => "Monthly Sales Volumes",
            Self::Categories => "Customer Ordering Behavior by Categories",
        }
    }
}

/// Horizontal bar `value / max` of `width` cells, with eighth-block precision.
pub fn bar(value: f64, max: f64, width: usize) -> String {
    if max <= 0.0 || value <= 0.0 || width == 0 {
        return String::new();
    }
    let eighths = ((value / max).min(1.0) * (width * 8) as f64).round() as usize;
    let mut out = "█".repeat(eighths / 8);
    if eighths % 8 > 0 {
        out.push(EIGHTHS[eighths % 8]);
    }
    out
}

/// One character per value, scaled between the series min and max.
pub fn sparkline(values: &[f64]) -> String {
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    values
        .iter()
        .map(|&v| {
            if max <= min {
                SPARK_LEVELS[SPARK_LEVELS.len() / 2]
            } else {
                let level = ((v - min) / (max - min) * (SPARK_LEVELS.len() - 1) as f64).round();
                SPARK_LEVELS[level as usize]
            }
        })
        .collect()
}

/// Count and share per label, widest bar for the largest share.
pub fn share_table(rows: &[ShareRow]) -> Vec<String> {
    let max = rows.iter().map(|r| r.count).max().unwrap_or(0) as f64;
    rows.iter()
        .map(|r| {
            let bar_text = bar(r.count as f64, max, BAR_WIDTH);
            let fill = " ".repeat(BAR_WIDTH.saturating_sub(display_width(&bar_text)));
            format!(
                "  {} {}{} {:>8} {:>6.1}%",
                pad_right(&r.label, LABEL_WIDTH),
                style(bar_text).cyan(),
                fill,
                format_number(r.count as i64),
                r.share_pct,
            )
        })
        .collect()
}

/// Order lines per hour of day, one row per hour.
pub fn hourly_histogram(buckets: &[u64; 24]) -> Vec<String> {
    let max = buckets.iter().copied().max().unwrap_or(0) as f64;
    buckets
        .iter()
        .enumerate()
        .map(|(hour, &count)| {
            format!(
                "  {} {:>7} {}",
                hour_label(hour),
                format_compact(count as i64),
                style(bar(count as f64, max, BAR_WIDTH)).green(),
            )
        })
        .collect()
}

/// Sparkline over the whole series followed by a per-month table.
pub fn monthly_sales_chart(series: &[MonthlySales]) -> Vec<String> {
    if series.is_empty() {
        return vec!["  (no sales recorded)".to_string()];
    }
    let totals: Vec<f64> = series.iter().map(|m| m.total).collect();
    let max = totals.iter().copied().fold(0.0, f64::max);

    let mut lines = Vec::with_capacity(series.len() + 2);
    lines.push(format!("  {}", style(sparkline(&totals)).yellow()));
    lines.push(String::new());
    for m in series {
        lines.push(format!(
            "  {} {:>12} {}",
            m.period,
            format!("$ {}", format_number(m.total.round() as i64)),
            style(bar(m.total, max, BAR_WIDTH)).yellow(),
        ));
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::MonthKey;

    fn plain(lines: &[String]) -> Vec<String> {
        lines
            .iter()
            .map(|l| console::strip_ansi_codes(l).into_owned())
            .collect()
    }

    #[test]
    fn bar_scales_to_width() {
        assert_eq!(bar(10.0, 10.0, 4), "████");
        assert_eq!(bar(5.0, 10.0, 4), "██");
        assert_eq!(bar(0.0, 10.0, 4), "");
        assert_eq!(bar(3.0, 0.0, 4), "");
        // 1/16 of 4 cells = 2 eighths
        assert_eq!(bar(1.0, 16.0, 4), "▎");
    }

    #[test]
    fn sparkline_spans_min_to_max() {
        let s = sparkline(&[1.0, 5.0, 9.0]);
        assert_eq!(s.chars().count(), 3);
        assert!(s.starts_with('▁'));
        assert!(s.ends_with('█'));
        assert_eq!(sparkline(&[4.0, 4.0]), "▅▅");
        assert_eq!(sparkline(&[]), "");
    }

    #[test]
    fn share_table_shows_counts_and_percent() {
        let rows = vec![
            ShareRow {
                label: "Credit Card".into(),
                count: 1748,
                share_pct: 69.92,
            },
            ShareRow {
                label: "Cash".into(),
                count: 752,
                share_pct: 30.08,
            },
        ];
        let lines = plain(&share_table(&rows));
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("Credit Card"));
        assert!(lines[0].contains("1,748"));
        assert!(lines[0].contains("69.9%"));
        assert!(lines[1].contains("30.1%"));
    }

    #[test]
    fn hourly_histogram_has_24_rows() {
        let mut buckets = [0_u64; 24];
        buckets[12] = 40;
        buckets[19] = 80;
        let lines = plain(&hourly_histogram(&buckets));
        assert_eq!(lines.len(), 24);
        assert!(lines[0].starts_with("  00:00"));
        assert!(lines[19].contains("80"));
        assert!(lines[19].contains(&"█".repeat(BAR_WIDTH)));
    }

    #[test]
    fn monthly_chart_lists_months_in_order() {
        let series = vec![
            MonthlySales {
                period: MonthKey { year: 2024, month: 12 },
                total: 1200.0,
            },
            MonthlySales {
                period: MonthKey { year: 2025, month: 1 },
                total: 900.0,
            },
        ];
        let lines = plain(&monthly_sales_chart(&series));
        assert!(lines[2].contains("12-2024"));
        assert!(lines[2].contains("$ 1,200"));
        assert!(lines[3].contains("01-2025"));
    }

    #[test]
    fn chart_kind_parses_cli_names() {
        assert_eq!(
            ChartKind::from_str("ordering-times", true).unwrap(),
            ChartKind::OrderingTimes
        );
        assert_eq!(
            ChartKind::from_str("monthly-sales", true).unwrap(),
            ChartKind::MonthlySales
        );
        assert!(ChartKind::from_str("pie", true).is_err());
    }
}
