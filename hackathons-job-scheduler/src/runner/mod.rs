use hackathons_common::models::job_run::NewJobRun;
use hackathons_common::store::RunHistory;

use futures::future;
use std::time::{Duration, Instant, SystemTime};
use tokio::time;
use uuid::Uuid;

use crate::jobs::Job;

struct JobContainer {
    job: Box<dyn Job>,
    run_frequency: Duration,
    last_run_time: SystemTime,
}

impl JobContainer {
    fn is_due(&self, now: SystemTime) -> bool {
        let time_elapsed_since_last_run = now
            .duration_since(self.last_run_time)
            .unwrap_or(Duration::from_nanos(0));

        time_elapsed_since_last_run >= self.run_frequency
    }
}

pub struct JobRunner {
    jobs: Vec<JobContainer>,
    update_frequency: Duration,
    run_history: RunHistory,
}

impl JobRunner {
    pub fn new(update_frequency: Duration, run_history: RunHistory) -> Self {
        Self {
            jobs: Vec::new(),
            update_frequency,
            run_history,
        }
    }

    /// Adds a job to the schedule. A job that has run before keeps its cadence across restarts;
    /// a job with no recorded run waits a full `run_frequency` before its first run.

    pub async fn register(&mut self, job: Box<dyn Job>, run_frequency: Duration) {
        let job_name_ref = job.name();

        log::info!(
            "Registered job \"{}\" to run every {} seconds",
            job_name_ref,
            run_frequency.as_secs()
        );

        let last_run_time = self
            .run_history
            .latest_job_run(job_name_ref)
            .await
            .unwrap_or_else(|e| {
                log::error!("Failed to read run history for job \"{job_name_ref}\": {e}");
                None
            });

        let job_container = JobContainer {
            job,
            run_frequency,
            last_run_time: last_run_time.unwrap_or(SystemTime::now()),
        };

        self.jobs.push(job_container);
    }

    /// Runs every due job once, waits for all of them, then records each outcome.
    pub async fn run_due_jobs(&mut self) {
        let now = SystemTime::now();

        let mut job_names = Vec::with_capacity(self.jobs.len());
        let mut job_futures = Vec::with_capacity(self.jobs.len());

        for job_container in &mut self.jobs {
            if !job_container.is_due(now) || !job_container.job.is_ready() {
                continue;
            }

            job_container.last_run_time = now;

            let name_ref = job_container.job.name();
            log::info!("Executing job \"{}\"", name_ref);
            job_names.push(name_ref);
            job_futures.push(job_container.job.execute());
        }

        let job_results = future::join_all(job_futures).await;

        for (job_name, result) in job_names.into_iter().zip(job_results) {
            let error = match result {
                Ok(()) => {
                    log::info!("Job \"{job_name}\" finished successfully");
                    None
                }
                Err(e) => {
                    log::error!("Job \"{job_name}\" failed: {e}");
                    Some(e.to_string())
                }
            };

            let run = NewJobRun {
                id: Uuid::now_v7(),
                job_name,
                started_at: now,
                succeeded: error.is_none(),
                error: error.as_deref(),
            };

            if let Err(e) = self.run_history.record_job_run(&run).await {
                log::error!("Error recording run of job \"{job_name}\": {e}");
            }
        }
    }

    pub async fn start(&mut self) -> ! {
        loop {
            let before = Instant::now();

            self.run_due_jobs().await;

            let delta = Instant::now() - before;

            if delta < self.update_frequency {
                time::sleep(self.update_frequency - delta).await;
            }
        }
    }
}
