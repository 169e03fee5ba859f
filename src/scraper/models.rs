//! The scraper's per-job output record, written as a JSON array and
//! handed to the loader via `{data_dir}/{job_id}_jobs.json`.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JobListing {
    pub search_query: String,
    pub title: String,
    pub company: String,
    pub location: String,
    pub date_posted: Option<String>,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub extracted_skills: Vec<String>,
}

/// A listing card as found on a search-results page, before the detail
/// page has been fetched. Cards missing `title`, `company`, or `url` are
/// dropped before a detail fetch is attempted.
#[derive(Debug, Clone)]
pub struct JobCard {
    pub title: String,
    pub company: String,
    pub location: String,
    pub url: String,
    pub date_posted: Option<String>,
}
