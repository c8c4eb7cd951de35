use crate::{
    analytics::{daily, CountryTable, DailySeries, DeviceDistribution, MonthTable, MonthlySeries},
    auth::Credentials,
    client::ChartScope,
    error::AppError,
    extract::QueryParams,
    AppState,
};
use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Widest window a chart may ask the upstream for.
const MAX_WINDOW_DAYS: u32 = 366;

#[derive(Debug, Default, Deserialize)]
pub struct ChartQuery {
    days: Option<u32>,
    metrics: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CountryResponse {
    #[serde(flatten)]
    pub table: CountryTable,
    pub color_max: u64,
}

// ── Handlers ───────────────────────────────────────────────────────────────
//
// Each chart is served at `/api/analytics/<chart>` for the whole account and
// `/api/analytics/<chart>/:code` for one link.

/// GET /api/analytics/monthly[/:code]
pub async fn monthly(
    State(state): State<Arc<AppState>>,
    creds: Credentials,
    code: Option<Path<String>>,
) -> Result<Json<MonthTable>, AppError> {
    let scope = scope(code);
    let rows = state.client.monthly_rows(&scope, &creds).await?;
    let series = MonthlySeries::from_rows(&rows, state.clock.now())?;
    Ok(Json(series.to_table()))
}

/// GET /api/analytics/devices[/:code]
pub async fn devices(
    State(state): State<Arc<AppState>>,
    creds: Credentials,
    code: Option<Path<String>>,
) -> Result<Json<DeviceDistribution>, AppError> {
    let scope = scope(code);
    let rows = state.client.device_rows(&scope, &creds).await?;
    Ok(Json(DeviceDistribution::from_rows(&rows)))
}

/// GET /api/analytics/daily[/:code]?days=&metrics=
pub async fn daily(
    State(state): State<Arc<AppState>>,
    creds: Credentials,
    code: Option<Path<String>>,
    QueryParams(query): QueryParams<ChartQuery>,
) -> Result<Json<DailySeries>, AppError> {
    let days = window(query.days, state.config.daily_window_days)?;
    let metrics = daily::parse_metrics(query.metrics.as_deref())
        .map_err(|e| AppError::validation(e.to_string()))?;

    let scope = scope(code);
    let rows = state.client.daily_rows(&scope, days, &creds).await?;

    let unknown = daily::unknown_metrics(&rows, &metrics);
    if !unknown.is_empty() {
        return Err(AppError::validation(format!(
            "no data for metric(s): {}",
            unknown.join(", ")
        )));
    }

    Ok(Json(DailySeries::from_rows(&rows, &metrics)?))
}

/// GET /api/analytics/countries[/:code]?days=
pub async fn countries(
    State(state): State<Arc<AppState>>,
    creds: Credentials,
    code: Option<Path<String>>,
    QueryParams(query): QueryParams<ChartQuery>,
) -> Result<Json<CountryResponse>, AppError> {
    let days = window(query.days, state.config.country_window_days)?;

    let scope = scope(code);
    let rows = state.client.country_rows(&scope, days, &creds).await?;
    let table = CountryTable::from_rows(&rows);
    Ok(Json(CountryResponse {
        color_max: table.color_max(),
        table,
    }))
}

// ── Private helpers ────────────────────────────────────────────────────────

fn scope(code: Option<Path<String>>) -> ChartScope {
    ChartScope::from_code(code.map(|Path(code)| code))
}

fn window(requested: Option<u32>, default: u32) -> Result<u32, AppError> {
    match requested {
        None => Ok(default),
        Some(days) if (1..=MAX_WINDOW_DAYS).contains(&days) => Ok(days),
        Some(days) => Err(AppError::validation(format!(
            "days must be between 1 and {MAX_WINDOW_DAYS}, got {days}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_defaults_and_bounds() {
        assert_eq!(window(None, 7).unwrap(), 7);
        assert_eq!(window(Some(30), 7).unwrap(), 30);
        assert!(window(Some(0), 7).is_err());
        assert!(window(Some(400), 7).is_err());
    }

    #[test]
    fn empty_code_means_whole_account() {
        assert_eq!(scope(None), ChartScope::Account);
        assert_eq!(scope(Some(Path("  ".into()))), ChartScope::Account);
        assert_eq!(
            scope(Some(Path("abc123".into()))),
            ChartScope::Link("abc123".into())
        );
    }
}
