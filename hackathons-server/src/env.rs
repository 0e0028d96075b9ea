use actix_web::http::header::HeaderValue;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use zeroize::Zeroize;

const DB_USERNAME_VAR: &str = "HACKATHONS_DB_USERNAME";
const DB_PASSWORD_VAR: &str = "HACKATHONS_DB_PASSWORD";
const DB_HOSTNAME_VAR: &str = "HACKATHONS_DB_HOSTNAME";
const DB_PORT_VAR: &str = "HACKATHONS_DB_PORT";
const DB_NAME_VAR: &str = "HACKATHONS_DB_NAME";
const DB_MAX_CONNECTIONS_VAR: &str = "HACKATHONS_DB_MAX_CONNECTIONS";
const DB_IDLE_TIMEOUT_SECS_VAR: &str = "HACKATHONS_DB_IDLE_TIMEOUT_SECS";

const IN_MEMORY_STORE_VAR: &str = "HACKATHONS_IN_MEMORY_STORE";

const RATE_LIMIT_MAX_REQUESTS_VAR: &str = "HACKATHONS_RATE_LIMIT_MAX_REQUESTS";
const RATE_LIMIT_WINDOW_SECS_VAR: &str = "HACKATHONS_RATE_LIMIT_WINDOW_SECS";

const CORS_ALLOWED_ORIGINS_VAR: &str = "HACKATHONS_CORS_ALLOWED_ORIGINS";

const ACTIX_WORKER_COUNT_VAR: &str = "HACKATHONS_ACTIX_WORKER_COUNT";

const LOG_LEVEL_VAR: &str = "HACKATHONS_LOG_LEVEL";

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
    pub in_memory_store: bool,

    #[zeroize(skip)]
    pub rate_limit_max_requests: i32,
    #[zeroize(skip)]
    pub rate_limit_window: Duration,

    #[zeroize(skip)]
    pub cors_allowed_origins: Vec<String>,

    #[zeroize(skip)]
    pub actix_worker_count: usize,

    #[zeroize(skip)]
    pub log_level: String,
}

impl Config {
    pub fn from_env() -> Result<Config, ConfigError> {
        let in_memory_store = env_var_or(IN_MEMORY_STORE_VAR, false);

        let rate_limit_max_requests = env_var_or(RATE_LIMIT_MAX_REQUESTS_VAR, 5);
        if rate_limit_max_requests < 1 {
            return Err(ConfigError::invalid(RATE_LIMIT_MAX_REQUESTS_VAR));
        }

        let rate_limit_window_secs = env_var_or(RATE_LIMIT_WINDOW_SECS_VAR, 60);
        if rate_limit_window_secs == 0 {
            return Err(ConfigError::invalid(RATE_LIMIT_WINDOW_SECS_VAR));
        }

        let cors_allowed_origins = parse_allowed_origins(&env_var_or(
            CORS_ALLOWED_ORIGINS_VAR,
            String::from("*"),
        ))
        .ok_or(ConfigError::invalid(CORS_ALLOWED_ORIGINS_VAR))?;

        Ok(Config {
            db_username: db_env_var(DB_USERNAME_VAR, in_memory_store)?,
            db_password: db_env_var(DB_PASSWORD_VAR, in_memory_store)?,
            db_hostname: db_env_var(DB_HOSTNAME_VAR, in_memory_store)?,
            db_port: db_env_var(DB_PORT_VAR, in_memory_store)?,
            db_name: db_env_var(DB_NAME_VAR, in_memory_store)?,
            db_max_connections: env_var_or(DB_MAX_CONNECTIONS_VAR, 48),
            db_idle_timeout: Duration::from_secs(env_var_or(DB_IDLE_TIMEOUT_SECS_VAR, 30)),

            in_memory_store,

            rate_limit_max_requests,
            rate_limit_window: Duration::from_secs(rate_limit_window_secs),

            cors_allowed_origins,

            actix_worker_count: env_var_or(ACTIX_WORKER_COUNT_VAR, num_cpus::get()),

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

/// Splits a comma-separated origin list. `*` allows every origin. Returns `None` if an entry
/// cannot be sent back as a header value.
fn parse_allowed_origins(origins: &str) -> Option<Vec<String>> {
    origins
        .split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(|origin| {
            HeaderValue::from_str(origin)
                .ok()
                .map(|_| String::from(origin))
        })
        .collect()
}

// Database settings are only required when the server is backed by PostgreSQL
fn db_env_var<T: FromStr + Default>(
    key: &'static str,
    in_memory_store: bool,
) -> Result<T, ConfigError> {
    if in_memory_store {
        Ok(env_var_or(key, T::default()))
    } else {
        env_var(key)
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
