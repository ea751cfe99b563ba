//! Time-bucket conversions for analytics.
//!
//! Orders are bucketed by calendar month for the sales series and by hour of
//! day for the ordering-times histogram. Month keys display as `MM-YYYY` but
//! order chronologically.

use chrono::{Datelike, NaiveDateTime, Timelike};
use serde::{Serialize, Serializer};

/// Calendar month of an order, ordered by `(year, month)`.
///
/// Field order matters: the derived `Ord` compares `year` first.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthKey {
    pub year: i32,
    /// 1..=12
    pub month: u32,
}

impl MonthKey {
    pub fn from_datetime(dt: &NaiveDateTime) -> Self {
        Self {
            year: dt.year(),
            month: dt.month(),
        }
    }
}

impl std::fmt::Display for MonthKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02}-{:04}", self.month, self.year)
    }
}

impl Serialize for MonthKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Hour-of-day bucket (0..24) for a timestamp.
pub fn hour_bucket(dt: &NaiveDateTime) -> usize {
    dt.hour() as usize
}

/// Human label for an hour bucket, e.g. `"14:00"`.
pub fn hour_label(hour: usize) -> String {
    format!("{hour:02}:00")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, 30, 0)
            .unwrap()
    }

    #[test]
    fn month_key_formats_as_mm_yyyy() {
        let key = MonthKey::from_datetime(&at(2024, 1, 15, 9));
        assert_eq!(key.to_string(), "01-2024");
    }

    #[test]
    fn month_key_orders_across_year_boundary() {
        let dec = MonthKey::from_datetime(&at(2024, 12, 31, 23));
        let jan = MonthKey::from_datetime(&at(2025, 1, 1, 0));
        assert!(dec < jan);
        // The display strings sort the other way round.
        assert!(jan.to_string() < dec.to_string());
    }

    #[test]
    fn hour_bucket_uses_wall_clock_hour() {
        assert_eq!(hour_bucket(&at(2024, 3, 1, 0)), 0);
        assert_eq!(hour_bucket(&at(2024, 3, 1, 13)), 13);
        assert_eq!(hour_bucket(&at(2024, 3, 1, 23)), 23);
    }

    #[test]
    fn hour_label_is_zero_padded() {
        assert_eq!(hour_label(7), "07:00");
        assert_eq!(hour_label(19), "19:00");
    }

    #[test]
    fn month_key_serializes_as_display_string() {
        let key = MonthKey { year: 2023, month: 11 };
        assert_eq!(serde_json::to_value(key).unwrap(), "11-2023");
    }
}
