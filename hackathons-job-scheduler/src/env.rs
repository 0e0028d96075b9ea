use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use zeroize::Zeroize;

const DB_USERNAME_VAR: &str = "HACKATHONS_DB_USERNAME";
const DB_PASSWORD_VAR: &str = "HACKATHONS_DB_PASSWORD";
const DB_HOSTNAME_VAR: &str = "HACKATHONS_DB_HOSTNAME";
const DB_PORT_VAR: &str = "HACKATHONS_DB_PORT";
const DB_NAME_VAR: &str = "HACKATHONS_DB_NAME";
const DB_MAX_CONNECTIONS_VAR: &str = "HACKATHONS_JOBS_DB_MAX_CONNECTIONS";
const DB_IDLE_TIMEOUT_SECS_VAR: &str = "HACKATHONS_DB_IDLE_TIMEOUT_SECS";

const UPDATE_FREQUENCY_SECS_VAR: &str = "HACKATHONS_JOBS_UPDATE_FREQUENCY_SECS";
const WORKER_THREADS_VAR: &str = "HACKATHONS_JOBS_WORKER_THREADS";
const MAX_BLOCKING_THREADS_VAR: &str = "HACKATHONS_JOBS_MAX_BLOCKING_THREADS";

const CLEAR_EXPIRED_RATE_LIMITS_JOB_FREQUENCY_SECS_VAR: &str =
    "HACKATHONS_CLEAR_EXPIRED_RATE_LIMITS_JOB_FREQUENCY_SECS";
const RATE_LIMIT_WINDOW_SECS_VAR: &str = "HACKATHONS_RATE_LIMIT_WINDOW_SECS";

const CLEAR_OLD_JOB_RUNS_JOB_FREQUENCY_SECS_VAR: &str =
    "HACKATHONS_CLEAR_OLD_JOB_RUNS_JOB_FREQUENCY_SECS";
const JOB_RUN_RETENTION_SECS_VAR: &str = "HACKATHONS_JOB_RUN_RETENTION_SECS";

const LOG_LEVEL_VAR: &str = "HACKATHONS_JOBS_LOG_LEVEL";

#[derive(Zeroize)]
pub struct Config {
    pub db_username: String,
    pub db_password: String,
    pub db_hostname: String,
    pub db_port: u16,
    pub db_name: String,
    #[zeroize(skip)]
    pub db_max_connections: u32,
    #[zeroize(skip)]
    pub db_idle_timeout: Duration,

    #[zeroize(skip)]
    pub update_frequency: Duration,
    #[zeroize(skip)]
    pub worker_threads: usize,
    #[zeroize(skip)]
    pub max_blocking_threads: usize,

    #[zeroize(skip)]
    pub clear_expired_rate_limits_job_frequency: Duration,
    #[zeroize(skip)]
    pub rate_limit_window: Duration,

    #[zeroize(skip)]
    pub clear_old_job_runs_job_frequency: Duration,
    #[zeroize(skip)]
    pub job_run_retention: Duration,

    #[zeroize(skip)]
    pub log_level: String,
}

impl Config {
    pub fn from_env() -> Result<Config, ConfigError> {
        let rate_limit_window_secs = env_var_or(RATE_LIMIT_WINDOW_SECS_VAR, 60);
        if rate_limit_window_secs == 0 {
            return Err(ConfigError::invalid(RATE_LIMIT_WINDOW_SECS_VAR));
        }

        let clear_expired_rate_limits_job_frequency_secs =
            env_var_or(CLEAR_EXPIRED_RATE_LIMITS_JOB_FREQUENCY_SECS_VAR, 300);
        let clear_old_job_runs_job_frequency_secs =
            env_var_or(CLEAR_OLD_JOB_RUNS_JOB_FREQUENCY_SECS_VAR, 86_400);

        // A job's schedule resumes from its newest run, so that run must outlive the longest
        // job frequency
        let job_run_retention_secs = env_var_or(JOB_RUN_RETENTION_SECS_VAR, 30 * 86_400);
        if job_run_retention_secs
            < clear_expired_rate_limits_job_frequency_secs.max(clear_old_job_runs_job_frequency_secs)
        {
            return Err(ConfigError::invalid(JOB_RUN_RETENTION_SECS_VAR));
        }

        Ok(Config {
            db_username: env_var(DB_USERNAME_VAR)?,
            db_password: env_var(DB_PASSWORD_VAR)?,
            db_hostname: env_var(DB_HOSTNAME_VAR)?,
            db_port: env_var(DB_PORT_VAR)?,
            db_name: env_var(DB_NAME_VAR)?,
            db_max_connections: env_var_or(DB_MAX_CONNECTIONS_VAR, 4),
            db_idle_timeout: Duration::from_secs(env_var_or(DB_IDLE_TIMEOUT_SECS_VAR, 30)),

            update_frequency: Duration::from_secs(env_var_or(UPDATE_FREQUENCY_SECS_VAR, 30)),
            worker_threads: env_var_or(WORKER_THREADS_VAR, num_cpus::get()),
            max_blocking_threads: env_var_or(MAX_BLOCKING_THREADS_VAR, 40),

            clear_expired_rate_limits_job_frequency: Duration::from_secs(
                clear_expired_rate_limits_job_frequency_secs,
            ),
            rate_limit_window: Duration::from_secs(rate_limit_window_secs),

            clear_old_job_runs_job_frequency: Duration::from_secs(
                clear_old_job_runs_job_frequency_secs,
            ),
            job_run_retention: Duration::from_secs(job_run_retention_secs),

            log_level: env_var_or(LOG_LEVEL_VAR, String::from("info")),
        })
    }

    pub fn database_uri(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}",
            self.db_username, self.db_password, self.db_hostname, self.db_port, self.db_name,
        )
    }
}

fn env_var<T: FromStr>(key: &'static str) -> Result<T, ConfigError> {
    let var = std::env::var(key).map_err(|_| ConfigError::missing(key))?;
    let var: T = var.parse().map_err(|_| ConfigError::invalid(key))?;
    Ok(var)
}

fn env_var_or<T: FromStr>(key: &'static str, default: T) -> T {
    let Ok(var) = std::env::var(key) else {
        return default;
    };

    var.parse().unwrap_or(default)
}

#[derive(Clone, Copy, Debug)]
pub enum ConfigError {
    MissingVar(&'static str),
    InvalidVar(&'static str),
}

impl ConfigError {
    fn missing(var_name: &'static str) -> Self {
        Self::MissingVar(var_name)
    }

    fn invalid(var_name: &'static str) -> Self {
        Self::InvalidVar(var_name)
    }
}

impl std::error::Error for ConfigError {}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingVar(key) => write!(f, "Missing environment variable '{}'", key),
            Self::InvalidVar(key) => write!(f, "Environment variable '{}' is invalid", key),
        }
    }
}
