mod clear_expired_rate_limits;
mod clear_old_job_runs;

pub use clear_expired_rate_limits::ClearExpiredRateLimitsJob;
pub use clear_old_job_runs::ClearOldJobRunsJob;

use hackathons_common::db::DaoError;

use async_trait::async_trait;
use std::fmt;

#[derive(Debug)]
pub enum JobError {
    DaoFailure(Option<DaoError>),
    NotReady,
}

impl std::error::Error for JobError {}

impl fmt::Display for JobError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobError::DaoFailure(e) => {
                if let Some(inner_err) = e {
                    write!(f, "JobError: {inner_err}")
                } else {
                    write!(f, "JobError: DaoFailure")
                }
            }
            JobError::NotReady => {
                write!(f, "JobError: Attempted execution before job was ready")
            }
        }
    }
}

impl From<DaoError> for JobError {
    fn from(e: DaoError) -> Self {
        JobError::DaoFailure(Some(e))
    }
}

#[async_trait]
pub trait Job: Send {
    fn name(&self) -> &'static str;
    fn is_ready(&self) -> bool;
    async fn execute(&mut self) -> Result<(), JobError>;
}
