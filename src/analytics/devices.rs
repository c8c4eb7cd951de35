use serde::Serialize;

use crate::models::DeviceRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceCategory {
    Desktop,
    Mobile,
    Tablet,
    Unknown,
}

impl DeviceCategory {
    /// Fixed legend order.
    pub const ALL: [DeviceCategory; 4] = [
        DeviceCategory::Desktop,
        DeviceCategory::Mobile,
        DeviceCategory::Tablet,
        DeviceCategory::Unknown,
    ];

    /// Case-insensitive; missing or unrecognised values are `Unknown`.
    pub fn from_raw(raw: Option<&str>) -> Self {
        match raw.map(|s| s.trim().to_ascii_lowercase()).as_deref() {
            Some("desktop") => DeviceCategory::Desktop,
            Some("mobile") => DeviceCategory::Mobile,
            Some("tablet") => DeviceCategory::Tablet,
            _ => DeviceCategory::Unknown,
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DeviceSlice {
    pub name: DeviceCategory,
    pub value: u64,
}

/// Clicks per device category. Always exactly four slices in
/// [`DeviceCategory::ALL`] order, so chart legends and colors never shift.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceDistribution {
    pub data: [DeviceSlice; 4],
    /// Set when every slice is zero; the UI shows an empty state instead of
    /// an empty pie.
    pub no_data: bool,
}

impl DeviceDistribution {
    pub fn from_rows(rows: &[DeviceRow]) -> Self {
        let mut totals = [0u64; 4];
        for row in rows {
            let slot = &mut totals[DeviceCategory::from_raw(row.device_type.as_deref()).index()];
            *slot = slot.saturating_add(row.count);
        }

        let data = DeviceCategory::ALL.map(|name| DeviceSlice {
            name,
            value: totals[name.index()],
        });
        let no_data = data.iter().all(|slice| slice.value == 0);

        Self { data, no_data }
    }
}
