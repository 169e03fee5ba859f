pub mod broker;
pub mod config;
pub mod gateway;
pub mod humanize;
pub mod loader;
pub mod observability;
pub mod scraper;
