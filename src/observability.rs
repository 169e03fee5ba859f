//! Process-wide counters, exposed via [`Metrics::snapshot`].

use std::sync::atomic::{AtomicU64, Ordering};

/// Metrics handle for recording counters across the gateway, scraper, and loader.
#[derive(Debug, Default)]
pub struct Metrics {
    jobs_triggered: AtomicU64,
    jobs_failed: AtomicU64,
    events_published: AtomicU64,
    jobs_loaded: AtomicU64,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn job_triggered(&self) {
        self.jobs_triggered.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "jobs_triggered", "metric incremented");
    }

    pub fn job_failed(&self) {
        self.jobs_failed.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "jobs_failed", "metric incremented");
    }

    pub fn event_published(&self) {
        self.events_published.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "events_published", "metric incremented");
    }

    pub fn job_loaded(&self) {
        self.jobs_loaded.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "jobs_loaded", "metric incremented");
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            jobs_triggered: self.jobs_triggered.load(Ordering::Relaxed),
            jobs_failed: self.jobs_failed.load(Ordering::Relaxed),
            events_published: self.events_published.load(Ordering::Relaxed),
            jobs_loaded: self.jobs_loaded.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone)]
pub struct MetricsSnapshot {
    pub jobs_triggered: u64,
    pub jobs_failed: u64,
    pub events_published: u64,
    pub jobs_loaded: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_increment_independently() {
        let metrics = Metrics::new();
        metrics.job_triggered();
        metrics.job_triggered();
        metrics.job_failed();
        metrics.event_published();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.jobs_triggered, 2);
        assert_eq!(snapshot.jobs_failed, 1);
        assert_eq!(snapshot.events_published, 1);
        assert_eq!(snapshot.jobs_loaded, 0);
    }
}
