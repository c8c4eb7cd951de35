//! Link state evaluation.
//!
//! A link has three independent facets: expired, protected and active.
//! They are recomputed from the link record and an explicit "now" every
//! time; nothing here is cached, since "now" keeps moving.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::Link;

// ── Facets ─────────────────────────────────────────────────────────────────

/// `true` iff an expiration is set and lies strictly before `now`.
/// A link whose expiration equals `now` has not expired yet.
pub fn is_expired(link: &Link, now: DateTime<Utc>) -> bool {
    link.expire_at.is_some_and(|at| at < now)
}

/// `true` iff the link carries a password.
pub fn is_protected(link: &Link) -> bool {
    link.password
}

/// `true` iff the link has not expired. Protection plays no part.
pub fn is_active(link: &Link, now: DateTime<Utc>) -> bool {
    !is_expired(link, now)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LinkFacets {
    pub expired: bool,
    pub protected: bool,
    pub active: bool,
}

impl LinkFacets {
    pub fn evaluate(link: &Link, now: DateTime<Utc>) -> Self {
        Self {
            expired: is_expired(link, now),
            protected: is_protected(link),
            active: is_active(link, now),
        }
    }

    /// Badges in display order.
    pub fn badges(&self) -> Vec<Badge> {
        let mut badges = Vec::with_capacity(2);
        if self.expired {
            badges.push(Badge::Expired);
        }
        if self.protected {
            badges.push(Badge::Protected);
        }
        if self.active {
            badges.push(Badge::Active);
        }
        badges
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Badge {
    Expired,
    Protected,
    Active,
}

// ── Operations ─────────────────────────────────────────────────────────────

/// What the UI may do with a link. Every link offers every operation;
/// facets only change the badges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkOperation {
    Copy,
    Preview,
    Edit,
    GenerateQr,
    Delete,
}

impl LinkOperation {
    pub const ALL: [LinkOperation; 5] = [
        LinkOperation::Copy,
        LinkOperation::Preview,
        LinkOperation::Edit,
        LinkOperation::GenerateQr,
        LinkOperation::Delete,
    ];
}

/// A link together with everything the link list needs to render it.
#[derive(Debug, Clone, Serialize)]
pub struct LinkView {
    #[serde(flatten)]
    pub link: Link,
    pub short_code: Option<String>,
    pub facets: LinkFacets,
    pub badges: Vec<Badge>,
    pub operations: [LinkOperation; 5],
}

impl LinkView {
    pub fn new(link: Link, now: DateTime<Utc>) -> Self {
        let facets = LinkFacets::evaluate(&link, now);
        Self {
            short_code: link.short_code().map(str::to_owned),
            badges: facets.badges(),
            facets,
            operations: LinkOperation::ALL,
            link,
        }
    }
}

// ── Filtering ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusFilter {
    #[default]
    All,
    Active,
    Expired,
    Protected,
}

impl StatusFilter {
    pub fn matches(self, link: &Link, now: DateTime<Utc>) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Active => is_active(link, now),
            StatusFilter::Expired => is_expired(link, now),
            StatusFilter::Protected => is_protected(link),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown status filter `{0}` (expected all, active, expired or protected)")]
pub struct UnknownStatusFilter(pub String);

impl FromStr for StatusFilter {
    type Err = UnknownStatusFilter;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "all" => Ok(StatusFilter::All),
            "active" => Ok(StatusFilter::Active),
            "expired" => Ok(StatusFilter::Expired),
            "protected" => Ok(StatusFilter::Protected),
            _ => Err(UnknownStatusFilter(s.to_owned())),
        }
    }
}

/// Case-insensitive substring search over the URL, short URL and title.
pub fn matches_search(link: &Link, query: &str) -> bool {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return true;
    }
    [&link.original_url, &link.short_url, &link.title]
        .iter()
        .any(|field| field.to_lowercase().contains(&query))
}

/// Number of links carrying each facet. The facets overlap, so the counts
/// do not have to add up to `all`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub all: usize,
    pub active: usize,
    pub expired: usize,
    pub protected: usize,
}

impl StatusCounts {
    pub fn tally(links: &[Link], now: DateTime<Utc>) -> Self {
        links.iter().fold(Self::default(), |mut counts, link| {
            let facets = LinkFacets::evaluate(link, now);
            counts.all += 1;
            counts.active += usize::from(facets.active);
            counts.expired += usize::from(facets.expired);
            counts.protected += usize::from(facets.protected);
            counts
        })
    }
}

/// Apply the status filter and search query, keeping upstream order.
pub fn filter_links(
    links: Vec<Link>,
    filter: StatusFilter,
    query: &str,
    now: DateTime<Utc>,
) -> Vec<LinkView> {
    links
        .into_iter()
        .filter(|link| filter.matches(link, now) && matches_search(link, query))
        .map(|link| LinkView::new(link, now))
        .collect()
}
