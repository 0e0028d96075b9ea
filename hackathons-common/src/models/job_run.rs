use diesel::{Insertable, Queryable};
use serde::{Deserialize, Serialize};
use std::time::SystemTime;
use uuid::Uuid;

use crate::schema::job_runs;

#[derive(Clone, Debug, Serialize, Deserialize, Identifiable, Queryable)]
#[diesel(table_name = job_runs)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct JobRun {
    pub id: Uuid,
    pub job_name: String,
    pub started_at: SystemTime,
    pub succeeded: bool,
    pub error: Option<String>,
}

/// One execution of a scheduled job. `error` holds the failure text when `succeeded` is false.
#[derive(Debug, Insertable)]
#[diesel(table_name = job_runs)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewJobRun<'a> {
    pub id: Uuid,
    pub job_name: &'a str,
    pub started_at: SystemTime,
    pub succeeded: bool,
    pub error: Option<&'a str>,
}

impl From<&NewJobRun<'_>> for JobRun {
    fn from(run: &NewJobRun<'_>) -> Self {
        JobRun {
            id: run.id,
            job_name: String::from(run.job_name),
            started_at: run.started_at,
            succeeded: run.succeeded,
            error: run.error.map(String::from),
        }
    }
}
