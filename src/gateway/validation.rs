use super::error::ApiError;
use super::models::PipelineTriggerRequest;

const VALID_TIME_FILTERS: &[&str] = &["24h", "1w", "1m"];

/// Validates a trigger-pipeline request per the documented rules:
/// `job_titles` non-empty, `location` non-empty, `time_filter` one of the
/// three known windows (or absent), `max_jobs > 0`.
pub fn validate_trigger_request(request: &PipelineTriggerRequest) -> Result<(), ApiError> {
    if request.job_titles.trim().is_empty() {
        return Err(ApiError::Validation("job_titles must not be empty".to_string()));
    }
    if request.location.trim().is_empty() {
        return Err(ApiError::Validation("location must not be empty".to_string()));
    }
    if let Some(filter) = &request.time_filter {
        if !VALID_TIME_FILTERS.contains(&filter.as_str()) {
            return Err(ApiError::Validation(format!(
                "time_filter must be one of {VALID_TIME_FILTERS:?}, got '{filter}'"
            )));
        }
    }
    if request.max_jobs <= 0 {
        return Err(ApiError::Validation("max_jobs must be positive".to_string()));
    }
    Ok(())
}

/// Splits a comma-delimited title list, trimming whitespace and dropping
/// empty elements (per P8: `"A, B"` yields exactly `{"A","B"}`).
pub fn split_job_titles(job_titles: &str) -> Vec<String> {
    job_titles
        .split(',')
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect()
}
