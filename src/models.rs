use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

// ── Links ──────────────────────────────────────────────────────────────────

/// A short link as returned by `GET /api/protected/links`.
///
/// The password itself never leaves the upstream; only whether one is set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    pub id: i64,
    #[serde(default)]
    pub title: String,
    pub original_url: String,
    pub short_url: String,
    #[serde(default)]
    pub clicks: u64,
    #[serde(default)]
    pub created_at: String,
    #[serde(default, deserialize_with = "deserialize_optional_instant")]
    pub expire_at: Option<DateTime<Utc>>,
    /// `true` when the link is password protected.
    #[serde(default)]
    pub password: bool,
}

impl Link {
    /// The generated short code: last non-empty path segment of `short_url`.
    pub fn short_code(&self) -> Option<&str> {
        self.short_url
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .filter(|s| !s.is_empty())
    }
}

/// One entry of the analytics link picker (`GET /api/protected/titles`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkTitle {
    pub id: i64,
    pub title: String,
    pub shortcode: String,
}

/// Account-wide headline numbers (`GET /api/protected/analytics/summary`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardSummary {
    pub total_links: u64,
    pub total_clicks: u64,
    pub active_links: u64,
    pub expired_links: u64,
}

// ── Mutations ──────────────────────────────────────────────────────────────

/// Body of `POST /api/protected/shorten`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CreateLinkRequest {
    pub original_url: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shortcode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expire_at: Option<DateTime<Utc>>,
}

/// Response of `POST /api/protected/shorten`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShortUrlResponse {
    pub short_url: String,
}

/// Body of `POST /api/protected/edit/:code`. Cleared optional fields are
/// sent as empty strings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EditLinkRequest {
    pub title: String,
    pub original_url: String,
    #[serde(default)]
    pub expire_at: String,
    #[serde(default)]
    pub password: String,
}

// ── Raw chart rows ─────────────────────────────────────────────────────────

/// Clicks for one month (`analytics/bar`, `analytics/barchart/:code`).
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MonthlyRow {
    pub month: String,
    pub click_count: u64,
}

/// Clicks for one device category (`analytics/devices`, `analytics/piechart/:code`).
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DeviceRow {
    #[serde(default)]
    pub device_type: Option<String>,
    pub count: u64,
}

/// Clicks for one country (`analytics/worldmap`, `analytics/worldchart/:code`).
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CountryRow {
    pub country: String,
    pub clicks: u64,
}

/// One day of the line chart. The metric columns vary by endpoint, so
/// everything except `date` is kept as raw JSON until the caller names the
/// metrics it wants.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DailyRow {
    pub date: String,
    #[serde(flatten)]
    pub fields: serde_json::Map<String, serde_json::Value>,
}

// ── Date parsing ───────────────────────────────────────────────────────────

/// Parse the date-ish strings the upstream emits: RFC 3339, a naive
/// `YYYY-MM-DD HH:MM:SS` / `YYYY-MM-DDTHH:MM:SS` (taken as UTC) or a bare
/// `YYYY-MM-DD` (midnight UTC).
pub fn parse_instant(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    for fmt in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Calendar date a row belongs to. An explicit UTC offset is honoured, so
/// `2024-02-01T00:00:00+05:30` is the 1st of February; naive values are
/// read as UTC like in [`parse_instant`].
pub fn parse_calendar_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    match DateTime::parse_from_rfc3339(raw) {
        Ok(dt) => Some(dt.date_naive()),
        Err(_) => parse_instant(raw).map(|at| at.date_naive()),
    }
}

/// `expire_at` is omitted, `null` or `""` when a link never expires.
fn deserialize_optional_instant<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => parse_instant(s)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid expire_at `{s}`"))),
    }
}
