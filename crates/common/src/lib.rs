pub mod config;
pub mod explorer;
pub mod observability;
pub mod types;
