use hackathons_common::store::SignupStore;

use std::time::{Duration, SystemTime};

use crate::handlers::error::{HttpErrorResponse, TOO_MANY_REQUESTS_MSG};

/// Fixed-window request counter keyed by `(identifier, endpoint)` and kept in the
/// `rate_limits` table.
#[derive(Clone, Copy, Debug)]
pub struct Throttle {
    max_requests: i32,
    window: Duration,
}

impl Throttle {
    pub fn new(max_requests: i32, window: Duration) -> Self {
        Self {
            max_requests,
            window,
        }
    }

    pub async fn enforce(
        &self,
        identifier: &str,
        endpoint: &'static str,
        store: &dyn SignupStore,
    ) -> Result<(), HttpErrorResponse> {
        if self.check(identifier, endpoint, store).await {
            return Ok(());
        }

        log::warn!("Rate limit exceeded for IP: {identifier}");
        Err(HttpErrorResponse::TooManyRequests(String::from(
            TOO_MANY_REQUESTS_MSG,
        )))
    }

    /// Returns `true` if the request may proceed, counting it against the current window.
    pub async fn check(&self, identifier: &str, endpoint: &str, store: &dyn SignupStore) -> bool {
        self.check_at(identifier, endpoint, store, SystemTime::now())
            .await
    }

    pub async fn check_at(
        &self,
        identifier: &str,
        endpoint: &str,
        store: &dyn SignupStore,
        now: SystemTime,
    ) -> bool {
        let window_start = now.checked_sub(self.window).unwrap_or(SystemTime::UNIX_EPOCH);

        if let Err(e) = store.delete_expired_rate_limits(window_start).await {
            log::error!("Failed to clear expired rate limits: {e}");
        }

        // Fail closed if the counter can't be read
        let request_count = match store
            .get_rate_limit_count(identifier, endpoint, window_start)
            .await
        {
            Ok(c) => c,
            Err(e) => {
                log::error!("Rate limit check failed: {e}");
                return false;
            }
        };

        match request_count {
            Some(count) if count >= self.max_requests => false,
            Some(_) => {
                if let Err(e) = store
                    .increment_rate_limit(identifier, endpoint, window_start)
                    .await
                {
                    log::error!("Failed to increment rate limit for {identifier}: {e}");
                }

                true
            }
            None => {
                if let Err(e) = store
                    .start_rate_limit_window(identifier, endpoint, now)
                    .await
                {
                    log::error!("Failed to start rate limit window for {identifier}: {e}");
                }

                true
            }
        }
    }
}
