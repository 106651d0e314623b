//! Metrics collection and exposition.
//!
//! # Metrics
//! - `portal_db_requests_total` (counter): requests that reached the
//!   data-fetch stage
//!
//! # Design Decisions
//! - Counter updates are atomic increments; lost updates under concurrent
//!   requests are not tolerated
//! - The in-process [`RequestCounter`] is readable without a scrape; the
//!   Prometheus exporter handles external exposition and batching

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};

use metrics::counter;
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter on its own listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

/// Monotonic request counter shared across workers.
#[derive(Default)]
pub struct RequestCounter {
    count: AtomicU64,
}

impl RequestCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one request. Also forwarded to the metrics recorder.
    pub fn increment(&self) {
        self.count.fetch_add(1, Ordering::Relaxed);
        counter!("portal_db_requests_total").increment(1);
    }

    pub fn get(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_no_lost_increments_under_concurrency() {
        let counter = Arc::new(RequestCounter::new());
        let mut handles = Vec::new();
        for _ in 0..8 {
            let counter = counter.clone();
            handles.push(std::thread::spawn(move || {
                for _ in 0..1000 {
                    counter.increment();
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(counter.get(), 8000);
    }
}
