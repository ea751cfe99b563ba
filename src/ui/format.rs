//! Number and text formatting shared by the views and charts.

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Format a large number with comma separators (e.g. 1234567 → "1,234,567").
pub fn format_number(n: i64) -> String {
    let (prefix, abs_str) = if n < 0 {
        ("-", n.unsigned_abs().to_string())
    } else {
        ("", n.to_string())
    };
    let mut result = String::with_capacity(abs_str.len() + abs_str.len() / 3 + prefix.len());
    for (i, c) in abs_str.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    let grouped: String = result.chars().rev().collect();
    format!("{prefix}{grouped}")
}

/// Format a number compactly: 1.2B, 45.3M, 12.5K, or grouped for small values.
pub fn format_compact(n: i64) -> String {
    let abs = n.unsigned_abs();
    if abs >= 1_000_000_000 {
        format!("{:.1}B", n as f64 / 1_000_000_000.0)
    } else if abs >= 1_000_000 {
        format!("{:.1}M", n as f64 / 1_000_000.0)
    } else if abs >= 10_000 {
        format!("{:.1}K", n as f64 / 1_000.0)
    } else {
        format_number(n)
    }
}

pub fn format_count(n: usize) -> String {
    format_number(i64::try_from(n).unwrap_or(i64::MAX))
}

pub fn display_width(input: &str) -> usize {
    UnicodeWidthStr::width(input)
}

/// Cut `input` to at most `width` terminal columns, ending in `…` when cut.
pub fn truncate_with_ellipsis(input: &str, width: usize) -> String {
    if width == 0 {
        return String::new();
    }
    if display_width(input) <= width {
        return input.to_string();
    }
    let mut out = String::new();
    let mut used = 0;
    for c in input.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > width - 1 {
            break;
        }
        out.push(c);
        used += w;
    }
    out.push('\u{2026}');
    out
}

/// Left-align `input` in a `width`-column cell, truncating when too wide.
pub fn pad_right(input: &str, width: usize) -> String {
    let cut = truncate_with_ellipsis(input, width);
    let fill = width.saturating_sub(display_width(&cut));
    format!("{cut}{}", " ".repeat(fill))
}
