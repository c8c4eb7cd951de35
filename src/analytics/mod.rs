//! Chart aggregation.
//!
//! Each aggregator takes the raw rows of one upstream endpoint and produces
//! a fresh, fixed-shape value for one chart. Aggregation is synchronous and
//! holds no state between calls; a row that does not fit the expected shape
//! fails the whole aggregate rather than producing a partial one.

pub mod countries;
pub mod daily;
pub mod devices;
pub mod monthly;

pub use countries::CountryTable;
pub use daily::{DailyPoint, DailySeries};
pub use devices::{DeviceCategory, DeviceDistribution, DeviceSlice};
pub use monthly::{MonthBucket, MonthTable, MonthlySeries};
