use serde::Serialize;

use crate::models::CountryRow;

/// Clicks per country for the world map.
///
/// Only countries with recorded clicks appear; the country universe is
/// open-ended, so nothing is zero-filled. Rows naming the same country are
/// summed into the first occurrence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CountryTable {
    pub header: [&'static str; 2],
    pub rows: Vec<(String, u64)>,
    /// Upper bound of the color scale; the lower bound is always zero.
    pub max: u64,
    pub no_data: bool,
}

impl CountryTable {
    pub fn from_rows(rows: &[CountryRow]) -> Self {
        let mut table: Vec<(String, u64)> = Vec::with_capacity(rows.len());
        for row in rows {
            let country = row.country.trim();
            if country.is_empty() || row.clicks == 0 {
                continue;
            }
            match table.iter_mut().find(|(name, _)| name == country) {
                Some((_, clicks)) => *clicks = clicks.saturating_add(row.clicks),
                None => table.push((country.to_owned(), row.clicks)),
            }
        }

        let max = table.iter().map(|(_, clicks)| *clicks).max().unwrap_or(0);
        let no_data = table.is_empty();

        Self {
            header: ["Country", "Clicks"],
            rows: table,
            max,
            no_data,
        }
    }

    /// Upper bound to hand a color axis, which needs a non-empty range.
    pub fn color_max(&self) -> u64 {
        self.max.max(1)
    }
}
