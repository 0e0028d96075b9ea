use diesel::{dsl, ExpressionMethods, QueryDsl};
use diesel_async::RunQueryDsl;
use std::time::SystemTime;

use crate::db::{DaoError, DbAsyncPool};
use crate::models::job_run::NewJobRun;

use crate::schema::job_runs as job_run_fields;
use crate::schema::job_runs::dsl::job_runs;

pub struct Dao {
    db_async_pool: DbAsyncPool,
}

impl Dao {
    pub fn new(db_async_pool: &DbAsyncPool) -> Self {
        Self {
            db_async_pool: db_async_pool.clone(),
        }
    }

    /// Start time of the most recent run of `job_name`, successful or not.
    pub async fn latest_start(&self, job_name: &str) -> Result<Option<SystemTime>, DaoError> {
        let mut conn = self.db_async_pool.get().await?;

        Ok(job_runs
            .filter(job_run_fields::job_name.eq(job_name))
            .select(dsl::max(job_run_fields::started_at))
            .get_result::<Option<SystemTime>>(&mut conn)
            .await?)
    }

    pub async fn record(&self, run: &NewJobRun<'_>) -> Result<(), DaoError> {
        let mut conn = self.db_async_pool.get().await?;

        dsl::insert_into(job_runs)
            .values(run)
            .execute(&mut conn)
            .await?;

        Ok(())
    }

    pub async fn delete_started_before(&self, cutoff: SystemTime) -> Result<usize, DaoError> {
        let mut conn = self.db_async_pool.get().await?;

        Ok(
            diesel::delete(job_runs.filter(job_run_fields::started_at.lt(cutoff)))
                .execute(&mut conn)
                .await?,
        )
    }
}
