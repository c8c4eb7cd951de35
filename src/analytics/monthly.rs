use chrono::{DateTime, Datelike, Utc};
use serde::Serialize;

use crate::error::{Error, Result};
use crate::models::{parse_calendar_date, MonthlyRow};

/// Month labels in calendar order.
pub const MONTH_LABELS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Number of steps on the count axis.
const AXIS_STEPS: u64 = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthBucket {
    pub label: &'static str,
    pub count: u64,
}

/// Trailing twelve-month click counts, oldest month first and the current
/// month last.
///
/// Rows are bucketed by month label alone: a January from last year and a
/// January from this year land in the same bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthlySeries {
    pub buckets: Vec<MonthBucket>,
    pub max: u64,
}

impl MonthlySeries {
    /// Bucket `rows` into the rolling window ending at the month of `now`.
    /// Any row whose `month` cannot be read as a date fails the whole series.
    pub fn from_rows(rows: &[MonthlyRow], now: DateTime<Utc>) -> Result<Self> {
        let mut totals = [0u64; 12];
        for row in rows {
            let date = parse_calendar_date(&row.month).ok_or_else(|| {
                Error::malformed("monthly clicks", format!("unreadable month `{}`", row.month))
            })?;
            let slot = &mut totals[date.month0() as usize];
            *slot = slot.saturating_add(row.click_count);
        }

        let current = now.month0() as usize;
        let buckets: Vec<MonthBucket> = (1..=12)
            .map(|offset| (current + offset) % 12)
            .map(|idx| MonthBucket {
                label: MONTH_LABELS[idx],
                count: totals[idx],
            })
            .collect();
        let max = buckets.iter().map(|b| b.count).max().unwrap_or(0);

        Ok(Self { buckets, max })
    }

    /// Tick positions for the count axis: `0, step, 2*step, ...` up to
    /// `max`, with `max` itself appended when it is not already a tick.
    pub fn axis_ticks(&self) -> Vec<u64> {
        let step = (self.max / AXIS_STEPS).max(1);
        let mut ticks: Vec<u64> = (0..=self.max).step_by(step as usize).collect();
        if ticks.last() != Some(&self.max) {
            ticks.push(self.max);
        }
        ticks
    }

    pub fn is_empty(&self) -> bool {
        self.max == 0
    }

    pub fn to_table(&self) -> MonthTable {
        MonthTable {
            header: ["Month", "Clicks"],
            rows: self.buckets.iter().map(|b| (b.label, b.count)).collect(),
            max: self.max,
            ticks: self.axis_ticks(),
            no_data: self.is_empty(),
        }
    }
}

/// Wire form of [`MonthlySeries`]: `rows` is `[[label, count], ...]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthTable {
    pub header: [&'static str; 2],
    pub rows: Vec<(&'static str, u64)>,
    pub max: u64,
    pub ticks: Vec<u64>,
    pub no_data: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn row(month: &str, click_count: u64) -> MonthlyRow {
        MonthlyRow {
            month: month.into(),
            click_count,
        }
    }

    fn june_2024() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap()
    }

    fn labels(series: &MonthlySeries) -> Vec<&'static str> {
        series.buckets.iter().map(|b| b.label).collect()
    }

    #[test]
    fn window_ends_at_current_month() {
        let series = MonthlySeries::from_rows(&[], june_2024()).unwrap();
        assert_eq!(
            labels(&series),
            vec!["Jul", "Aug", "Sep", "Oct", "Nov", "Dec", "Jan", "Feb", "Mar", "Apr", "May", "Jun"]
        );
        assert!(series.buckets.iter().all(|b| b.count == 0));
        assert!(series.is_empty());
    }

    #[test]
    fn december_window_is_calendar_order() {
        let dec = Utc.with_ymd_and_hms(2023, 12, 31, 23, 59, 59).unwrap();
        let series = MonthlySeries::from_rows(&[], dec).unwrap();
        assert_eq!(labels(&series), MONTH_LABELS.to_vec());
    }

    #[test]
    fn same_month_across_years_collapses() {
        let rows = [row("2024-01-15", 5), row("2023-01-20", 3)];
        let series = MonthlySeries::from_rows(&rows, june_2024()).unwrap();

        let jan = series.buckets.iter().find(|b| b.label == "Jan").unwrap();
        assert_eq!(jan.count, 8);
        assert_eq!(series.buckets.iter().map(|b| b.count).sum::<u64>(), 8);
        assert_eq!(series.buckets.last().unwrap().label, "Jun");
        assert_eq!(series.max, 8);
    }

    #[test]
    fn twelve_distinct_months_are_preserved_and_rotated() {
        let rows: Vec<MonthlyRow> = (1..=12)
            .map(|m| row(&format!("2024-{m:02}-01T00:00:00Z"), m as u64 * 10))
            .collect();
        let series = MonthlySeries::from_rows(&rows, june_2024()).unwrap();

        let counts: Vec<u64> = series.buckets.iter().map(|b| b.count).collect();
        assert_eq!(
            counts,
            vec![70, 80, 90, 100, 110, 120, 10, 20, 30, 40, 50, 60]
        );
        assert_eq!(series.buckets.last().unwrap(), &MonthBucket { label: "Jun", count: 60 });
        assert_eq!(series.max, 120);
    }

    #[test]
    fn offset_timestamp_buckets_by_its_own_month() {
        let rows = [row("2024-02-01T00:00:00+05:30", 9)];
        let series = MonthlySeries::from_rows(&rows, june_2024()).unwrap();
        let nonzero: Vec<&MonthBucket> = series.buckets.iter().filter(|b| b.count > 0).collect();
        assert_eq!(nonzero, vec![&MonthBucket { label: "Feb", count: 9 }]);
    }

    #[test]
    fn unreadable_month_fails_closed() {
        let rows = [row("2024-01-15", 5), row("last spring", 3)];
        let err = MonthlySeries::from_rows(&rows, june_2024()).unwrap_err();
        assert!(matches!(err, Error::Malformed { .. }));
    }

    #[test]
    fn ticks_use_five_steps_and_end_at_max() {
        let series = MonthlySeries {
            buckets: vec![],
            max: 12,
        };
        assert_eq!(series.axis_ticks(), vec![0, 2, 4, 6, 8, 10, 12]);

        let series = MonthlySeries {
            buckets: vec![],
            max: 13,
        };
        assert_eq!(series.axis_ticks(), vec![0, 2, 4, 6, 8, 10, 12, 13]);
    }

    #[test]
    fn ticks_for_small_and_zero_max() {
        let small = MonthlySeries {
            buckets: vec![],
            max: 3,
        };
        assert_eq!(small.axis_ticks(), vec![0, 1, 2, 3]);

        let zero = MonthlySeries {
            buckets: vec![],
            max: 0,
        };
        assert_eq!(zero.axis_ticks(), vec![0]);
    }

    #[test]
    fn table_is_header_plus_twelve_rows() {
        let series = MonthlySeries::from_rows(&[row("2024-06-03", 4)], june_2024()).unwrap();
        let table = series.to_table();
        assert_eq!(table.header, ["Month", "Clicks"]);
        assert_eq!(table.rows.len(), 12);
        assert_eq!(table.rows[11], ("Jun", 4));
        assert!(!table.no_data);
    }
}
