//! The loader worker: consumes `loading_requested` off `data-processing`,
//! deduplicates against the database, bulk-commits new jobs, and reports
//! banded progress.

mod db;
mod models;
mod parsing;
mod pipeline;

pub use pipeline::run;
