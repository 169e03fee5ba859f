//! Topic and consumer-group name constants forming the broker contract.

pub const SCRAPING_JOBS: &str = "scraping-jobs";
pub const JOB_STATUS_UPDATES: &str = "job-status-updates";
pub const DATA_PROCESSING: &str = "data-processing";
pub const SYSTEM_NOTIFICATIONS: &str = "system-notifications";

pub const SCRAPER_GROUP: &str = "scraper-group";
pub const LOADER_GROUP: &str = "loader-group";
pub const API_STATUS_LISTENER_GROUP: &str = "api_status_listener_group";
