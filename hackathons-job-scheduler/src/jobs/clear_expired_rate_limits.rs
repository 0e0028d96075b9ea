use hackathons_common::store::Store;

use async_trait::async_trait;
use std::time::{Duration, SystemTime};

use crate::jobs::{Job, JobError};

/// Deletes rate-limit windows that can no longer affect a request. The server already purges
/// them on every signup, so this only matters for identifiers that stopped sending requests.
pub struct ClearExpiredRateLimitsJob {
    rate_limit_window: Duration,
    store: Store,
    is_running: bool,
}

impl ClearExpiredRateLimitsJob {
    pub fn new(rate_limit_window: Duration, store: Store) -> Self {
        Self {
            rate_limit_window,
            store,
            is_running: false,
        }
    }
}

#[async_trait]
impl Job for ClearExpiredRateLimitsJob {
    fn name(&self) -> &'static str {
        "Clear Expired Rate Limits"
    }

    fn is_ready(&self) -> bool {
        !self.is_running
    }

    async fn execute(&mut self) -> Result<(), JobError> {
        self.is_running = true;

        let window_start = SystemTime::now()
            .checked_sub(self.rate_limit_window)
            .unwrap_or(SystemTime::UNIX_EPOCH);
        let result = self.store.delete_expired_rate_limits(window_start).await;

        self.is_running = false;

        let deleted_count = result?;
        log::info!("Cleared {deleted_count} expired rate limit windows");

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use hackathons_common::store::{InMemoryStore, SignupStore};

    use std::sync::Arc;

    #[tokio::test]
    async fn test_execute() {
        let store = Arc::new(InMemoryStore::new());
        let now = SystemTime::now();

        store
            .start_rate_limit_window("1.2.3.4", "signup-user", now - Duration::from_secs(300))
            .await
            .unwrap();
        store
            .start_rate_limit_window("5.6.7.8", "signup-user", now - Duration::from_secs(61))
            .await
            .unwrap();
        store
            .start_rate_limit_window("9.9.9.9", "signup-user", now)
            .await
            .unwrap();

        let mut job = ClearExpiredRateLimitsJob::new(Duration::from_secs(60), store.clone());
        assert!(job.is_ready());

        job.execute().await.unwrap();
        assert!(job.is_ready());

        let rate_limits = store.rate_limits().unwrap();
        assert_eq!(rate_limits.len(), 1);
        assert_eq!(rate_limits[0].identifier, "9.9.9.9");
    }
}
