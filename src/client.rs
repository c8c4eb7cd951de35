use std::time::Duration;

use reqwest::{Method, RequestBuilder, Response};
use serde::{de::DeserializeOwned, Serialize};
use url::Url;

use crate::{
    auth::Credentials,
    error::{Error, Result},
    models::{
        CountryRow, CreateLinkRequest, DailyRow, DashboardSummary, DeviceRow, EditLinkRequest,
        Link, LinkTitle, MonthlyRow, ShortUrlResponse,
    },
};

/// Which clicks a chart covers: the whole account or a single short link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChartScope {
    Account,
    Link(String),
}

impl ChartScope {
    pub fn from_code(code: Option<String>) -> Self {
        match code {
            Some(code) if !code.trim().is_empty() => ChartScope::Link(code),
            _ => ChartScope::Account,
        }
    }

    /// Path segments under `/api/protected/analytics`.
    fn segments<'a>(&'a self, account: &'a str, per_link: &'a str) -> Vec<&'a str> {
        match self {
            ChartScope::Account => vec![account],
            ChartScope::Link(code) => vec![per_link, code.as_str()],
        }
    }
}

/// HTTP client for the upstream link API.
///
/// Every call forwards the caller's [`Credentials`] and either returns a
/// fully decoded payload or an [`Error`]; nothing is retried or cached here.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
}

impl ApiClient {
    /// Build a client with a per-request `timeout`.
    pub fn new(base_url: Url, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(http, base_url))
    }

    /// Wrap an existing `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: Url) -> Self {
        Self { http, base_url }
    }

    // ── Links ──────────────────────────────────────────────────────────────

    pub async fn links(&self, creds: &Credentials) -> Result<Vec<Link>> {
        let url = self.url(&["api", "protected", "links"])?;
        self.fetch(Method::GET, url, creds, "links").await
    }

    pub async fn titles(&self, creds: &Credentials) -> Result<Vec<LinkTitle>> {
        let url = self.url(&["api", "protected", "titles"])?;
        self.fetch(Method::GET, url, creds, "titles").await
    }

    pub async fn summary(&self, creds: &Credentials) -> Result<DashboardSummary> {
        let url = self.url(&["api", "protected", "analytics", "summary"])?;
        self.fetch(Method::GET, url, creds, "summary").await
    }

    pub async fn create_link(
        &self,
        body: &CreateLinkRequest,
        creds: &Credentials,
    ) -> Result<ShortUrlResponse> {
        let url = self.url(&["api", "protected", "shorten"])?;
        self.send(Method::POST, url, Some(body), creds, "shorten").await
    }

    /// The upstream echoes the updated record in whatever shape it likes, so
    /// it is handed back untyped.
    pub async fn edit_link(
        &self,
        code: &str,
        body: &EditLinkRequest,
        creds: &Credentials,
    ) -> Result<serde_json::Value> {
        let url = self.url(&["api", "protected", "edit", code])?;
        let resp = self
            .request(Method::POST, url, creds)
            .json(body)
            .send()
            .await?;
        let bytes = check_status(resp, "edit").await?.bytes().await?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(serde_json::Value::Null);
        }
        decode(&bytes, "edit")
    }

    pub async fn delete_link(&self, code: &str, creds: &Credentials) -> Result<()> {
        let url = self.url(&["api", "protected", "links", code])?;
        let resp = self.request(Method::DELETE, url, creds).send().await?;
        check_status(resp, "delete").await?;
        Ok(())
    }

    // ── Chart rows ─────────────────────────────────────────────────────────

    pub async fn monthly_rows(
        &self,
        scope: &ChartScope,
        creds: &Credentials,
    ) -> Result<Vec<MonthlyRow>> {
        let url = self.analytics_url(scope, "bar", "barchart", None)?;
        self.fetch(Method::GET, url, creds, "monthly clicks").await
    }

    pub async fn device_rows(
        &self,
        scope: &ChartScope,
        creds: &Credentials,
    ) -> Result<Vec<DeviceRow>> {
        let url = self.analytics_url(scope, "devices", "piechart", None)?;
        self.fetch(Method::GET, url, creds, "devices").await
    }

    pub async fn daily_rows(
        &self,
        scope: &ChartScope,
        days: u32,
        creds: &Credentials,
    ) -> Result<Vec<DailyRow>> {
        let url = self.analytics_url(scope, "line", "linechart", Some(days))?;
        self.fetch(Method::GET, url, creds, "daily series").await
    }

    pub async fn country_rows(
        &self,
        scope: &ChartScope,
        days: u32,
        creds: &Credentials,
    ) -> Result<Vec<CountryRow>> {
        let url = self.analytics_url(scope, "worldmap", "worldchart", Some(days))?;
        self.fetch(Method::GET, url, creds, "countries").await
    }

    // ── Request helpers ────────────────────────────────────────────────────

    /// Append path segments to the base URL. Segments are percent-encoded,
    /// so a short code can never escape its path position.
    fn url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| Error::InvalidUrl(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn analytics_url(
        &self,
        scope: &ChartScope,
        account: &str,
        per_link: &str,
        days: Option<u32>,
    ) -> Result<Url> {
        let mut segments = vec!["api", "protected", "analytics"];
        segments.extend(scope.segments(account, per_link));
        let mut url = self.url(&segments)?;
        if let Some(days) = days {
            url.query_pairs_mut().append_pair("days", &days.to_string());
        }
        Ok(url)
    }

    fn request(&self, method: Method, url: Url, creds: &Credentials) -> RequestBuilder {
        tracing::debug!("{} {}", method, url);
        creds.apply(self.http.request(method, url))
    }

    async fn fetch<T: DeserializeOwned>(
        &self,
        method: Method,
        url: Url,
        creds: &Credentials,
        context: &str,
    ) -> Result<T> {
        self.send::<(), T>(method, url, None, creds, context).await
    }

    async fn send<B: Serialize, T: DeserializeOwned>(
        &self,
        method: Method,
        url: Url,
        body: Option<&B>,
        creds: &Credentials,
        context: &str,
    ) -> Result<T> {
        let mut builder = self.request(method, url, creds);
        if let Some(body) = body {
            builder = builder.json(body);
        }
        let resp = builder.send().await?;
        let bytes = check_status(resp, context).await?.bytes().await?;
        decode(&bytes, context)
    }
}

/// Turn a non-2xx response into [`Error::Status`], preferring the upstream's
/// `{"error": "..."}` message over the raw body.
async fn check_status(resp: Response, context: &str) -> Result<Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    let raw = resp.text().await.unwrap_or_default();
    let body = serde_json::from_str::<serde_json::Value>(&raw)
        .ok()
        .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(str::to_owned))
        .unwrap_or(raw);

    tracing::warn!("{} request failed with HTTP {}: {}", context, status, body);
    Err(Error::Status {
        status: status.as_u16(),
        body,
    })
}

fn decode<T: DeserializeOwned>(bytes: &[u8], context: &str) -> Result<T> {
    serde_json::from_slice(bytes).map_err(|e| {
        tracing::warn!("{} payload did not decode: {}", context, e);
        Error::malformed(context, e.to_string())
    })
}
