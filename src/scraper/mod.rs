//! The scraper worker: consumes `job_requested` off `scraping-jobs`,
//! scrapes listings, optionally extracts skills, and hands the result
//! off to the loader via `loading_requested`.

mod http;
mod models;
mod pipeline;
mod site;
mod skills;
mod validation;

pub use pipeline::run;
