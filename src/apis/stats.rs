//! Per-client request statistics.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;

#[derive(Debug, Clone, Default, Serialize)]
pub struct ApiStats {
    pub total_requests: u64,
    pub successful_requests: u64,
    pub failed_requests: u64,
    pub cache_hits: u64,
    pub last_error: Option<String>,
    pub last_success_time: Option<DateTime<Utc>>,
    pub average_response_time_ms: f64,
}

/// Thread-safe request counters for one provider client.
pub struct ApiStatsTracker {
    total_requests: AtomicU64,
    successful_requests: AtomicU64,
    failed_requests: AtomicU64,
    cache_hits: AtomicU64,
    last_error: RwLock<Option<String>>,
    last_success_time: RwLock<Option<DateTime<Utc>>>,
    avg_response_time: RwLock<f64>,
}

impl ApiStatsTracker {
    pub fn new() -> Self {
        Self {
            total_requests: AtomicU64::new(0),
            successful_requests: AtomicU64::new(0),
            failed_requests: AtomicU64::new(0),
            cache_hits: AtomicU64::new(0),
            last_error: RwLock::new(None),
            last_success_time: RwLock::new(None),
            avg_response_time: RwLock::new(0.0),
        }
    }

    pub fn record_request(&self, success: bool, response_time_ms: f64) {
        let total = self.total_requests.fetch_add(1, Ordering::Relaxed) + 1;

        if success {
            self.successful_requests.fetch_add(1, Ordering::Relaxed);
            *self.last_success_time.write() = Some(Utc::now());
        } else {
            self.failed_requests.fetch_add(1, Ordering::Relaxed);
        }

        let mut avg = self.avg_response_time.write();
        *avg = (*avg * (total - 1) as f64 + response_time_ms) / total as f64;
    }

    pub fn record_error(&self, message: impl Into<String>) {
        *self.last_error.write() = Some(message.into());
    }

    pub fn record_cache_hit(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> ApiStats {
        ApiStats {
            total_requests: self.total_requests.load(Ordering::Relaxed),
            successful_requests: self.successful_requests.load(Ordering::Relaxed),
            failed_requests: self.failed_requests.load(Ordering::Relaxed),
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            last_error: self.last_error.read().clone(),
            last_success_time: *self.last_success_time.read(),
            average_response_time_ms: *self.avg_response_time.read(),
        }
    }
}

impl Default for ApiStatsTracker {
    fn default() -> Self {
        Self::new()
    }
}
