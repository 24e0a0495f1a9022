pub mod analysis;
pub mod config;
pub mod data;
pub mod ingest;
pub mod plot;
pub mod report;
