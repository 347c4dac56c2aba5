use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;

/// Spaces requests to one web service at least `min_interval` apart.
///
/// One limiter is shared by every worker that talks to the service, so the
/// spacing holds across the whole pool.
#[derive(Debug)]
pub struct RateLimiter {
    service: &'static str,
    last_request: Mutex<Option<Instant>>,
    min_interval: Duration,
}

impl RateLimiter {
    pub fn new(service: &'static str, min_interval: Duration) -> Self {
        Self {
            service,
            last_request: Mutex::new(None),
            min_interval,
        }
    }

    /// Wait if necessary to comply with the rate limit
    pub async fn wait(&self) {
        let mut last = self.last_request.lock().await;

        if let Some(last_time) = *last {
            let elapsed = last_time.elapsed();
            if elapsed < self.min_interval {
                let wait_time = self.min_interval - elapsed;
                debug!("{} rate limiting: waiting {:?}", self.service, wait_time);
                tokio::time::sleep(wait_time).await;
            }
        }

        *last = Some(Instant::now());
    }
}
