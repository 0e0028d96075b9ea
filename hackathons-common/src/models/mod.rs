pub mod audit_log;
pub mod hackathon_user;
pub mod job_run;
pub mod rate_limit;
