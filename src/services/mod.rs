pub mod analytics;
pub mod fixture;
