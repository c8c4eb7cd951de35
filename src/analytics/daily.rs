use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::error::{Error, Result};
use crate::models::{parse_calendar_date, DailyRow};

/// Metrics the dashboard line chart asks for when the caller names none.
pub const DEFAULT_METRICS: [&str; 2] = ["clicks", "links"];

/// Keys every [`DailyPoint`] already carries; they cannot double as metrics.
pub const RESERVED_KEYS: [&str; 2] = ["date", "formatted_date"];

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("`{0}` is not a metric and cannot be requested")]
pub struct ReservedMetric(pub String);

/// One point of the line chart: the upstream date, its `"DD Mon"` label and
/// the requested metric columns.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyPoint {
    pub date: NaiveDate,
    pub formatted_date: String,
    #[serde(flatten)]
    pub metrics: BTreeMap<String, serde_json::Number>,
}

/// Daily series in upstream order. Generic over which numeric columns are
/// requested; a requested column that is missing or not a number on any row
/// fails the whole series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailySeries {
    pub data: Vec<DailyPoint>,
    pub no_data: bool,
}

impl DailySeries {
    pub fn from_rows<S: AsRef<str>>(rows: &[DailyRow], metrics: &[S]) -> Result<Self> {
        let data = rows
            .iter()
            .map(|row| point(row, metrics))
            .collect::<Result<Vec<_>>>()?;
        let no_data = data.is_empty();
        Ok(Self { data, no_data })
    }
}

fn point<S: AsRef<str>>(row: &DailyRow, metrics: &[S]) -> Result<DailyPoint> {
    let date = parse_calendar_date(&row.date)
        .ok_or_else(|| Error::malformed("daily series", format!("unreadable date `{}`", row.date)))?;

    let metrics = metrics
        .iter()
        .map(|name| {
            let name = name.as_ref();
            match row.fields.get(name) {
                Some(serde_json::Value::Number(n)) => Ok((name.to_owned(), n.clone())),
                Some(other) => Err(Error::malformed(
                    "daily series",
                    format!("metric `{name}` on {} is not a number: {other}", row.date),
                )),
                None => Err(Error::malformed(
                    "daily series",
                    format!("metric `{name}` missing on {}", row.date),
                )),
            }
        })
        .collect::<Result<BTreeMap<_, _>>>()?;

    Ok(DailyPoint {
        date,
        formatted_date: format_label(date),
        metrics,
    })
}

/// `"07 Jun"`.
pub fn format_label(date: NaiveDate) -> String {
    date.format("%d %b").to_string()
}

/// Parse a comma separated metric list, falling back to [`DEFAULT_METRICS`]
/// when nothing usable is given.
pub fn parse_metrics(raw: Option<&str>) -> Result<Vec<String>, ReservedMetric> {
    let parsed: Vec<String> = raw
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
        .collect();
    if let Some(reserved) = parsed.iter().find(|m| RESERVED_KEYS.contains(&m.as_str())) {
        return Err(ReservedMetric(reserved.clone()));
    }
    if parsed.is_empty() {
        Ok(DEFAULT_METRICS.iter().map(|s| (*s).to_owned()).collect())
    } else {
        Ok(parsed)
    }
}

/// Requested metrics that no row carries at all. Such a name is a caller
/// mistake rather than a broken payload; a metric present on some rows and
/// missing on others is still malformed.
pub fn unknown_metrics<'m, S: AsRef<str>>(rows: &[DailyRow], metrics: &'m [S]) -> Vec<&'m str> {
    if rows.is_empty() {
        return Vec::new();
    }
    metrics
        .iter()
        .map(|name| name.as_ref())
        .filter(|name| rows.iter().all(|row| !row.fields.contains_key(*name)))
        .collect()
}
