use hackathons_common::db::create_db_async_pool;
use hackathons_common::store::{PostgresStore, RunHistory, Store};

use flexi_logger::{Age, Cleanup, Criterion, Duplicate, FileSpec, Logger, Naming, WriteMode};
use runner::JobRunner;
use std::sync::Arc;
use zeroize::{Zeroize, Zeroizing};

mod env;
mod jobs;
mod runner;

use jobs::{ClearExpiredRateLimitsJob, ClearOldJobRunsJob};

fn main() {
    let mut conf = match env::Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("ERROR: {e}");
            std::process::exit(1);
        }
    };

    let db_uri = Zeroizing::new(conf.database_uri());

    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(conf.worker_threads)
        .max_blocking_threads(conf.max_blocking_threads)
        .enable_all()
        .build()
        .expect("Failed to launch asynchronous runtime")
        .block_on(async {
            Logger::try_with_str(&conf.log_level)
                .expect(
                    "Invalid log level. Options: ERROR, WARN, INFO, DEBUG, TRACE. \
                     Example: `info, my::critical::module=trace`",
                )
                .log_to_file(FileSpec::default().directory("./logs"))
                .rotate(
                    Criterion::Age(Age::Day),
                    Naming::Timestamps,
                    Cleanup::KeepLogAndCompressedFiles(60, 365),
                )
                .cleanup_in_background_thread(true)
                .duplicate_to_stdout(Duplicate::All)
                .write_mode(WriteMode::BufferAndFlush)
                .format(|writer, now, record| {
                    write!(
                        writer,
                        "{:5} | {} | {}:{} | {}",
                        record.level(),
                        now.format("%Y-%m-%dT%H:%M:%S%.6fZ"),
                        record.module_path().unwrap_or("<unknown>"),
                        record.line().unwrap_or(0),
                        record.args()
                    )
                })
                .use_utc()
                .start()
                .expect("Failed to start logger");

            let db_async_pool =
                match create_db_async_pool(&db_uri, conf.db_max_connections, conf.db_idle_timeout)
                    .await
                {
                    Ok(p) => p,
                    Err(e) => {
                        log::error!("{e}");
                        eprintln!("ERROR: Failed to connect to database");
                        std::process::exit(1);
                    }
                };

            let postgres_store = Arc::new(PostgresStore::new(&db_async_pool));
            let store: Store = postgres_store.clone();
            let run_history: RunHistory = postgres_store;

            let mut job_runner = JobRunner::new(conf.update_frequency, Arc::clone(&run_history));

            job_runner
                .register(
                    Box::new(ClearExpiredRateLimitsJob::new(
                        conf.rate_limit_window,
                        store,
                    )),
                    conf.clear_expired_rate_limits_job_frequency,
                )
                .await;

            job_runner
                .register(
                    Box::new(ClearOldJobRunsJob::new(
                        conf.job_run_retention,
                        run_history,
                    )),
                    conf.clear_old_job_runs_job_frequency,
                )
                .await;

            conf.zeroize();

            job_runner.start().await;
        });
}
