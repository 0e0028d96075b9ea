use hackathons_common::store::RunHistory;

use async_trait::async_trait;
use std::time::{Duration, SystemTime};

use crate::jobs::{Job, JobError};

pub struct ClearOldJobRunsJob {
    retention: Duration,
    run_history: RunHistory,
    is_running: bool,
}

impl ClearOldJobRunsJob {
    pub fn new(retention: Duration, run_history: RunHistory) -> Self {
        Self {
            retention,
            run_history,
            is_running: false,
        }
    }
}

#[async_trait]
impl Job for ClearOldJobRunsJob {
    fn name(&self) -> &'static str {
        "Clear Old Job Runs"
    }

    fn is_ready(&self) -> bool {
        !self.is_running
    }

    async fn execute(&mut self) -> Result<(), JobError> {
        self.is_running = true;

        let cutoff = SystemTime::now()
            .checked_sub(self.retention)
            .unwrap_or(SystemTime::UNIX_EPOCH);
        let result = self.run_history.delete_job_runs_before(cutoff).await;

        self.is_running = false;

        let deleted_count = result?;
        log::info!("Cleared {deleted_count} job runs older than the retention period");

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use hackathons_common::models::job_run::NewJobRun;
    use hackathons_common::store::{InMemoryStore, JobRunStore};

    use std::sync::Arc;
    use uuid::Uuid;

    #[tokio::test]
    async fn test_execute() {
        let store = Arc::new(InMemoryStore::new());
        let now = SystemTime::now();

        for (job_name, age) in [("Old", 90_000), ("Recent", 60)] {
            store
                .record_job_run(&NewJobRun {
                    id: Uuid::now_v7(),
                    job_name,
                    started_at: now - Duration::from_secs(age),
                    succeeded: true,
                    error: None,
                })
                .await
                .unwrap();
        }

        let mut job = ClearOldJobRunsJob::new(Duration::from_secs(86_400), store.clone());
        job.execute().await.unwrap();
        assert!(job.is_ready());

        let runs = store.job_runs().unwrap();
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].job_name, "Recent");
    }
}
