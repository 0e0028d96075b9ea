mod in_memory_store;
mod postgres_store;

pub use in_memory_store::InMemoryStore;
pub use postgres_store::PostgresStore;

use async_trait::async_trait;
use std::sync::Arc;
use std::time::SystemTime;

use crate::db::DaoError;
use crate::models::audit_log::NewAuditLog;
use crate::models::hackathon_user::NewHackathonUser;
use crate::models::job_run::NewJobRun;

pub type Store = Arc<dyn SignupStore>;
pub type RunHistory = Arc<dyn JobRunStore>;

/// The tables the signup flow reads and writes. Every method is a single round trip to the
/// backing store; callers compose them and accept that the composition is not atomic.
#[async_trait]
pub trait SignupStore: Send + Sync {
    /// Deletes rate-limit counters for all identifiers whose window began before
    /// `window_start`, returning how many were removed.
    async fn delete_expired_rate_limits(&self, window_start: SystemTime)
        -> Result<usize, DaoError>;

    /// Returns the request count of the live window for `(identifier, endpoint)`, if any.
    async fn get_rate_limit_count(
        &self,
        identifier: &str,
        endpoint: &str,
        window_start: SystemTime,
    ) -> Result<Option<i32>, DaoError>;

    async fn increment_rate_limit(
        &self,
        identifier: &str,
        endpoint: &str,
        window_start: SystemTime,
    ) -> Result<(), DaoError>;

    /// Opens a new window with a count of one.
    async fn start_rate_limit_window(
        &self,
        identifier: &str,
        endpoint: &str,
        window_start: SystemTime,
    ) -> Result<(), DaoError>;

    async fn email_exists(&self, email: &str) -> Result<bool, DaoError>;

    /// Persists the user together with the audit entry describing its creation. Either both
    /// are stored or neither is.
    async fn create_user(
        &self,
        new_user: &NewHackathonUser<'_>,
        audit_entry: &NewAuditLog<'_>,
    ) -> Result<(), DaoError>;

    async fn record_audit_log(&self, entry: &NewAuditLog<'_>) -> Result<(), DaoError>;
}

/// History of scheduled job executions, used to resume a schedule after a restart.
#[async_trait]
pub trait JobRunStore: Send + Sync {
    async fn latest_job_run(&self, job_name: &str) -> Result<Option<SystemTime>, DaoError>;

    async fn record_job_run(&self, run: &NewJobRun<'_>) -> Result<(), DaoError>;

    /// Deletes runs that started before `cutoff`, returning how many were removed.
    async fn delete_job_runs_before(&self, cutoff: SystemTime) -> Result<usize, DaoError>;
}
