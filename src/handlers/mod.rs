pub mod analytics;
pub mod links;
