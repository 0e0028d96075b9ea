use async_trait::async_trait;
use std::time::SystemTime;

use crate::db::{self, DaoError, DbAsyncPool};
use crate::models::audit_log::NewAuditLog;
use crate::models::hackathon_user::NewHackathonUser;
use crate::models::job_run::NewJobRun;
use crate::store::{JobRunStore, SignupStore};

pub struct PostgresStore {
    rate_limit_dao: db::rate_limit::Dao,
    hackathon_user_dao: db::hackathon_user::Dao,
    audit_log_dao: db::audit_log::Dao,
    job_run_dao: db::job_run::Dao,
}

impl PostgresStore {
    pub fn new(db_async_pool: &DbAsyncPool) -> Self {
        Self {
            rate_limit_dao: db::rate_limit::Dao::new(db_async_pool),
            hackathon_user_dao: db::hackathon_user::Dao::new(db_async_pool),
            audit_log_dao: db::audit_log::Dao::new(db_async_pool),
            job_run_dao: db::job_run::Dao::new(db_async_pool),
        }
    }
}

#[async_trait]
impl SignupStore for PostgresStore {
    async fn delete_expired_rate_limits(
        &self,
        window_start: SystemTime,
    ) -> Result<usize, DaoError> {
        self.rate_limit_dao.delete_expired(window_start).await
    }

    async fn get_rate_limit_count(
        &self,
        identifier: &str,
        endpoint: &str,
        window_start: SystemTime,
    ) -> Result<Option<i32>, DaoError> {
        self.rate_limit_dao
            .get_request_count(identifier, endpoint, window_start)
            .await
    }

    async fn increment_rate_limit(
        &self,
        identifier: &str,
        endpoint: &str,
        window_start: SystemTime,
    ) -> Result<(), DaoError> {
        self.rate_limit_dao
            .increment_request_count(identifier, endpoint, window_start)
            .await
    }

    async fn start_rate_limit_window(
        &self,
        identifier: &str,
        endpoint: &str,
        window_start: SystemTime,
    ) -> Result<(), DaoError> {
        self.rate_limit_dao
            .start_window(identifier, endpoint, window_start)
            .await
    }

    async fn email_exists(&self, email: &str) -> Result<bool, DaoError> {
        self.hackathon_user_dao.email_exists(email).await
    }

    async fn create_user(
        &self,
        new_user: &NewHackathonUser<'_>,
        audit_entry: &NewAuditLog<'_>,
    ) -> Result<(), DaoError> {
        self.hackathon_user_dao
            .create_user(new_user, audit_entry)
            .await
    }

    async fn record_audit_log(&self, entry: &NewAuditLog<'_>) -> Result<(), DaoError> {
        self.audit_log_dao.record(entry).await
    }
}

#[async_trait]
impl JobRunStore for PostgresStore {
    async fn latest_job_run(&self, job_name: &str) -> Result<Option<SystemTime>, DaoError> {
        self.job_run_dao.latest_start(job_name).await
    }

    async fn record_job_run(&self, run: &NewJobRun<'_>) -> Result<(), DaoError> {
        self.job_run_dao.record(run).await
    }

    async fn delete_job_runs_before(&self, cutoff: SystemTime) -> Result<usize, DaoError> {
        self.job_run_dao.delete_started_before(cutoff).await
    }
}
