use crate::broker::ScrapeParameters;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScraperError {
    #[error("ValueError - {0}")]
    InvalidParameters(String),

    #[error("IOError - {0}")]
    Io(String),

    #[error("RuntimeError - {0}")]
    Runtime(String),
}

pub fn validate_parameters(parameters: &ScrapeParameters) -> Result<(), ScraperError> {
    if parameters.job_titles.trim().is_empty() {
        return Err(ScraperError::InvalidParameters(
            "job_titles must not be empty".to_string(),
        ));
    }
    if parameters.location.trim().is_empty() {
        return Err(ScraperError::InvalidParameters(
            "location must not be empty".to_string(),
        ));
    }
    if parameters.max_jobs == 0 {
        return Err(ScraperError::InvalidParameters(
            "max_jobs must be positive".to_string(),
        ));
    }
    if let Some(time_filter) = &parameters.time_filter {
        if !["24h", "1w", "1m"].contains(&time_filter.as_str()) {
            return Err(ScraperError::InvalidParameters(format!(
                "unrecognized time_filter '{time_filter}'"
            )));
        }
    }
    Ok(())
}

pub fn split_job_titles(job_titles: &str) -> Vec<String> {
    job_titles
        .split(',')
        .map(str::trim)
        .filter(|title| !title.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(job_titles: &str, location: &str, max_jobs: u32) -> ScrapeParameters {
        ScrapeParameters {
            google_api_key: String::new(),
            job_titles: job_titles.to_string(),
            location: location.to_string(),
            time_filter: None,
            max_jobs,
        }
    }

    #[test]
    fn rejects_empty_job_titles() {
        assert!(validate_parameters(&params("", "Remote", 10)).is_err());
    }

    #[test]
    fn rejects_empty_location() {
        assert!(validate_parameters(&params("Engineer", "", 10)).is_err());
    }

    #[test]
    fn rejects_zero_max_jobs() {
        assert!(validate_parameters(&params("Engineer", "Remote", 0)).is_err());
    }

    #[test]
    fn accepts_valid_parameters() {
        assert!(validate_parameters(&params("Engineer", "Remote", 10)).is_ok());
    }

    #[test]
    fn split_job_titles_trims_and_drops_empty() {
        assert_eq!(
            split_job_titles("Engineer, , Data Scientist ,"),
            vec!["Engineer".to_string(), "Data Scientist".to_string()]
        );
    }
}
