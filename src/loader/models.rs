//! The loader's view of a scraped listing, read back from the per-job
//! JSON file the scraper wrote. Mirrors [`crate::scraper`]'s output
//! shape but is kept independent since the file is the only contract
//! between the two workers.

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct ScrapedListing {
    #[serde(default)]
    pub search_query: String,
    pub title: String,
    pub company: String,
    pub location: String,
    pub date_posted: Option<String>,
    pub url: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub extracted_skills: Vec<String>,
}

/// A validated, deduplicated listing ready to be bulk-inserted.
#[derive(Debug, Clone)]
pub struct NewJob {
    pub title: String,
    pub company_name: String,
    pub location: String,
    pub job_url: String,
    pub date_posted: Option<chrono::NaiveDate>,
    pub skills: Vec<String>,
}
