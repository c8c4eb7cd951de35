use std::time::Duration;

use anyhow::{Context, Result};
use url::Url;

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Root of the upstream link API, e.g. "http://localhost:8080".
    pub api_base_url: Url,

    /// Host to bind the HTTP server to, e.g. "0.0.0.0"
    pub host: String,

    /// Port to listen on
    pub port: u16,

    /// Timeout applied to every upstream request
    pub request_timeout: Duration,

    /// Days covered by the line chart when the caller does not say
    pub daily_window_days: u32,

    /// Days covered by the world map when the caller does not say
    pub country_window_days: u32,
}

impl AppConfig {
    /// Load configuration from environment variables (populated by dotenvy before this is called).
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from any key lookup. `from_env` is this over
    /// the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let api_base_url = parse_base_url(
            &lookup("API_BASE_URL").unwrap_or_else(|| "http://localhost:8080".into()),
        )?;

        let port = lookup("PORT")
            .unwrap_or_else(|| "3000".into())
            .parse::<u16>()
            .context("PORT must be a valid port number (1–65535)")?;

        let request_timeout = lookup("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|| "10".into())
            .parse::<u64>()
            .context("REQUEST_TIMEOUT_SECS must be a whole number of seconds")?;
        if request_timeout == 0 {
            anyhow::bail!("REQUEST_TIMEOUT_SECS must be greater than zero");
        }

        let daily_window_days = window_days(&lookup, "DAILY_WINDOW_DAYS", 7)?;
        let country_window_days = window_days(&lookup, "COUNTRY_WINDOW_DAYS", 30)?;

        Ok(Self {
            api_base_url,
            host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port,
            request_timeout: Duration::from_secs(request_timeout),
            daily_window_days,
            country_window_days,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_base_url(raw: &str) -> Result<Url> {
    let trimmed = raw.trim().trim_end_matches('/');
    let url = Url::parse(trimmed)
        .with_context(|| format!("API_BASE_URL `{raw}` is not a valid URL"))?;
    if !matches!(url.scheme(), "http" | "https") {
        anyhow::bail!("API_BASE_URL must use http or https, got `{}`", url.scheme());
    }
    Ok(url)
}

fn window_days(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: u32) -> Result<u32> {
    let days = match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<u32>()
            .with_context(|| format!("{key} must be a whole number of days"))?,
        None => default,
    };
    if days == 0 {
        anyhow::bail!("{key} must be at least 1");
    }
    Ok(days)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(pairs: &[(&str, &str)]) -> Result<AppConfig> {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        AppConfig::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        let cfg = config(&[]).unwrap();
        assert_eq!(cfg.api_base_url.as_str(), "http://localhost:8080/");
        assert_eq!(cfg.bind_addr(), "0.0.0.0:3000");
        assert_eq!(cfg.request_timeout, Duration::from_secs(10));
        assert_eq!(cfg.daily_window_days, 7);
        assert_eq!(cfg.country_window_days, 30);
    }

    #[test]
    fn base_url_keeps_path_prefix() {
        let cfg = config(&[("API_BASE_URL", "https://api.shinkr.dev/v1/")]).unwrap();
        assert_eq!(cfg.api_base_url.path(), "/v1");
    }

    #[test]
    fn rejects_bad_values() {
        assert!(config(&[("PORT", "http")]).is_err());
        assert!(config(&[("API_BASE_URL", "ftp://files")]).is_err());
        assert!(config(&[("API_BASE_URL", "not a url")]).is_err());
        assert!(config(&[("DAILY_WINDOW_DAYS", "0")]).is_err());
        assert!(config(&[("REQUEST_TIMEOUT_SECS", "0")]).is_err());
    }
}
