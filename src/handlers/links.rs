use crate::{
    auth::Credentials,
    error::AppError,
    extract::{JsonBody, QueryParams},
    models::{
        parse_instant, CreateLinkRequest, DashboardSummary, EditLinkRequest, LinkTitle,
        ShortUrlResponse,
    },
    status::{filter_links, LinkView, StatusCounts, StatusFilter},
    AppState,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Longest custom short code the upstream accepts.
const MAX_SHORTCODE_LEN: usize = 8;

// ── Query / body types ─────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct LinkListQuery {
    status: Option<String>,
    q: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LinkListResponse {
    pub filter: StatusFilter,
    pub counts: StatusCounts,
    pub links: Vec<LinkView>,
}

#[derive(Debug, Deserialize)]
pub struct CreateLinkForm {
    original_url: String,
    title: String,
    shortcode: Option<String>,
    password: Option<String>,
    expire_at: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct EditLinkForm {
    original_url: String,
    title: String,
    expire_at: Option<String>,
    password: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TitleQuery {
    q: Option<String>,
}

// ── Handlers ───────────────────────────────────────────────────────────────

/// GET /api/links?status=&q=
pub async fn list_links(
    State(state): State<Arc<AppState>>,
    creds: Credentials,
    QueryParams(query): QueryParams<LinkListQuery>,
) -> Result<Json<LinkListResponse>, AppError> {
    let filter = query
        .status
        .as_deref()
        .unwrap_or_default()
        .parse::<StatusFilter>()
        .map_err(|e| AppError::validation(e.to_string()))?;

    let links = state.client.links(&creds).await?;

    let now = state.clock.now();
    let counts = StatusCounts::tally(&links, now);
    let links = filter_links(links, filter, query.q.as_deref().unwrap_or_default(), now);

    Ok(Json(LinkListResponse {
        filter,
        counts,
        links,
    }))
}

/// POST /api/links
pub async fn create_link(
    State(state): State<Arc<AppState>>,
    creds: Credentials,
    JsonBody(form): JsonBody<CreateLinkForm>,
) -> Result<(StatusCode, Json<ShortUrlResponse>), AppError> {
    let request = validate_create(form, state.clock.now())?;
    let created = state.client.create_link(&request, &creds).await?;
    tracing::info!("Link created: {}", created.short_url);
    Ok((StatusCode::CREATED, Json(created)))
}

/// POST /api/links/:code/edit
pub async fn edit_link(
    State(state): State<Arc<AppState>>,
    creds: Credentials,
    Path(code): Path<String>,
    JsonBody(form): JsonBody<EditLinkForm>,
) -> Result<Json<serde_json::Value>, AppError> {
    let request = validate_edit(form)?;
    let updated = state.client.edit_link(&code, &request, &creds).await?;
    tracing::info!("Link '{}' updated", code);
    Ok(Json(updated))
}

/// DELETE /api/links/:code
pub async fn delete_link(
    State(state): State<Arc<AppState>>,
    creds: Credentials,
    Path(code): Path<String>,
) -> Result<StatusCode, AppError> {
    state.client.delete_link(&code, &creds).await?;
    tracing::info!("Link '{}' deleted", code);
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/summary
pub async fn summary(
    State(state): State<Arc<AppState>>,
    creds: Credentials,
) -> Result<Json<DashboardSummary>, AppError> {
    Ok(Json(state.client.summary(&creds).await?))
}

/// GET /api/titles?q=
/// Link picker for the analytics page, optionally narrowed by title.
pub async fn titles(
    State(state): State<Arc<AppState>>,
    creds: Credentials,
    QueryParams(query): QueryParams<TitleQuery>,
) -> Result<Json<Vec<LinkTitle>>, AppError> {
    let needle = query.q.unwrap_or_default().trim().to_lowercase();
    let mut titles = state.client.titles(&creds).await?;
    if !needle.is_empty() {
        titles.retain(|t| t.title.to_lowercase().contains(&needle));
    }
    Ok(Json(titles))
}

// ── Validation ─────────────────────────────────────────────────────────────

fn validate_create(form: CreateLinkForm, now: DateTime<Utc>) -> Result<CreateLinkRequest, AppError> {
    let original_url = validate_url(&form.original_url)?;
    let title = validate_title(&form.title)?;

    let shortcode = match non_empty(form.shortcode) {
        Some(code) => {
            if code.chars().count() > MAX_SHORTCODE_LEN {
                return Err(AppError::validation(format!(
                    "Custom code may be at most {MAX_SHORTCODE_LEN} characters."
                )));
            }
            if !code.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
                return Err(AppError::validation(
                    "Custom code may only contain letters, numbers, and hyphens.",
                ));
            }
            Some(code)
        }
        None => None,
    };

    let expire_at = match non_empty(form.expire_at) {
        Some(raw) => {
            let at = parse_expiry(&raw)?;
            if at < now {
                return Err(AppError::validation(
                    "Expiration cannot be before the current time.",
                ));
            }
            Some(at)
        }
        None => None,
    };

    Ok(CreateLinkRequest {
        original_url,
        title,
        shortcode,
        password: non_empty(form.password),
        expire_at,
    })
}

fn validate_edit(form: EditLinkForm) -> Result<EditLinkRequest, AppError> {
    let expire_at = match non_empty(form.expire_at) {
        Some(raw) => parse_expiry(&raw)?.to_rfc3339(),
        None => String::new(),
    };

    Ok(EditLinkRequest {
        title: validate_title(&form.title)?,
        original_url: validate_url(&form.original_url)?,
        expire_at,
        password: non_empty(form.password).unwrap_or_default(),
    })
}

fn validate_url(raw: &str) -> Result<String, AppError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(AppError::validation("URL must not be empty."));
    }
    let parsed = url::Url::parse(raw)
        .map_err(|_| AppError::validation("Enter a valid URL."))?;
    if !matches!(parsed.scheme(), "http" | "https") || parsed.host_str().is_none() {
        return Err(AppError::validation("URL must start with http:// or https://"));
    }
    Ok(raw.to_owned())
}

fn validate_title(raw: &str) -> Result<String, AppError> {
    let title = raw.trim();
    if title.is_empty() {
        return Err(AppError::validation("Title is required."));
    }
    Ok(title.to_owned())
}

fn parse_expiry(raw: &str) -> Result<DateTime<Utc>, AppError> {
    parse_instant(raw)
        .ok_or_else(|| AppError::validation(format!("`{raw}` is not a valid expiration date.")))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_owned())
        .filter(|s| !s.is_empty())
}
