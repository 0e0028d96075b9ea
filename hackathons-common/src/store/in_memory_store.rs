use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::time::SystemTime;
use uuid::Uuid;

use crate::db::DaoError;
use crate::models::audit_log::{AuditLog, NewAuditLog};
use crate::models::hackathon_user::{HackathonUser, NewHackathonUser};
use crate::models::job_run::{JobRun, NewJobRun};
use crate::models::rate_limit::RateLimit;
use crate::store::{JobRunStore, SignupStore};

#[derive(Default)]
struct Tables {
    rate_limits: Vec<RateLimit>,
    hackathon_users: Vec<HackathonUser>,
    audit_logs: Vec<AuditLog>,
    job_runs: Vec<JobRun>,
}

/// A process-local store for running the server without a database, and for tests. Contents
/// are lost when the process exits.
#[derive(Default)]
pub struct InMemoryStore {
    tables: Mutex<Tables>,
    fail_rate_limit_lookups: AtomicBool,
    fail_user_inserts: AtomicBool,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent rate-limit lookup fail until reset.
    pub fn set_fail_rate_limit_lookups(&self, should_fail: bool) {
        self.fail_rate_limit_lookups
            .store(should_fail, Ordering::Relaxed);
    }

    /// Makes every subsequent user insert fail until reset.
    pub fn set_fail_user_inserts(&self, should_fail: bool) {
        self.fail_user_inserts.store(should_fail, Ordering::Relaxed);
    }

    pub fn hackathon_users(&self) -> Result<Vec<HackathonUser>, DaoError> {
        Ok(self.lock()?.hackathon_users.clone())
    }

    pub fn audit_logs(&self) -> Result<Vec<AuditLog>, DaoError> {
        Ok(self.lock()?.audit_logs.clone())
    }

    pub fn rate_limits(&self) -> Result<Vec<RateLimit>, DaoError> {
        Ok(self.lock()?.rate_limits.clone())
    }

    pub fn job_runs(&self) -> Result<Vec<JobRun>, DaoError> {
        Ok(self.lock()?.job_runs.clone())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Tables>, DaoError> {
        self.tables
            .lock()
            .map_err(|_| DaoError::CannotRunQuery("In-memory store lock was poisoned"))
    }
}

#[async_trait]
impl SignupStore for InMemoryStore {
    async fn delete_expired_rate_limits(
        &self,
        window_start: SystemTime,
    ) -> Result<usize, DaoError> {
        let mut tables = self.lock()?;

        let count_before = tables.rate_limits.len();
        tables
            .rate_limits
            .retain(|rate_limit| rate_limit.window_start >= window_start);

        Ok(count_before - tables.rate_limits.len())
    }

    async fn get_rate_limit_count(
        &self,
        identifier: &str,
        endpoint: &str,
        window_start: SystemTime,
    ) -> Result<Option<i32>, DaoError> {
        if self.fail_rate_limit_lookups.load(Ordering::Relaxed) {
            return Err(DaoError::CannotRunQuery("Rate limit lookups are disabled"));
        }

        let tables = self.lock()?;

        Ok(tables
            .rate_limits
            .iter()
            .filter(|r| {
                r.identifier == identifier
                    && r.endpoint == endpoint
                    && r.window_start >= window_start
            })
            .max_by_key(|r| r.window_start)
            .map(|r| r.request_count))
    }

    async fn increment_rate_limit(
        &self,
        identifier: &str,
        endpoint: &str,
        window_start: SystemTime,
    ) -> Result<(), DaoError> {
        let mut tables = self.lock()?;

        tables
            .rate_limits
            .iter_mut()
            .filter(|r| {
                r.identifier == identifier
                    && r.endpoint == endpoint
                    && r.window_start >= window_start
            })
            .for_each(|r| r.request_count += 1);

        Ok(())
    }

    async fn start_rate_limit_window(
        &self,
        identifier: &str,
        endpoint: &str,
        window_start: SystemTime,
    ) -> Result<(), DaoError> {
        let mut tables = self.lock()?;

        tables.rate_limits.push(RateLimit {
            id: Uuid::now_v7(),
            identifier: String::from(identifier),
            endpoint: String::from(endpoint),
            request_count: 1,
            window_start,
            created_at: SystemTime::now(),
        });

        Ok(())
    }

    async fn email_exists(&self, email: &str) -> Result<bool, DaoError> {
        let tables = self.lock()?;
        Ok(tables.hackathon_users.iter().any(|u| u.email == email))
    }

    async fn create_user(
        &self,
        new_user: &NewHackathonUser<'_>,
        audit_entry: &NewAuditLog<'_>,
    ) -> Result<(), DaoError> {
        if self.fail_user_inserts.load(Ordering::Relaxed) {
            return Err(DaoError::CannotRunQuery("User inserts are disabled"));
        }

        let mut tables = self.lock()?;

        if tables
            .hackathon_users
            .iter()
            .any(|u| u.email == new_user.email)
        {
            return Err(DaoError::CannotRunQuery(
                "Duplicate key value violates unique constraint on email",
            ));
        }

        tables.hackathon_users.push(new_user.into());
        tables.audit_logs.push(audit_entry.into());

        Ok(())
    }

    async fn record_audit_log(&self, entry: &NewAuditLog<'_>) -> Result<(), DaoError> {
        self.lock()?.audit_logs.push(entry.into());
        Ok(())
    }
}

#[async_trait]
impl JobRunStore for InMemoryStore {
    async fn latest_job_run(&self, job_name: &str) -> Result<Option<SystemTime>, DaoError> {
        Ok(self
            .lock()?
            .job_runs
            .iter()
            .filter(|run| run.job_name == job_name)
            .map(|run| run.started_at)
            .max())
    }

    async fn record_job_run(&self, run: &NewJobRun<'_>) -> Result<(), DaoError> {
        self.lock()?.job_runs.push(run.into());
        Ok(())
    }

    async fn delete_job_runs_before(&self, cutoff: SystemTime) -> Result<usize, DaoError> {
        let mut tables = self.lock()?;

        let count_before = tables.job_runs.len();
        tables.job_runs.retain(|run| run.started_at >= cutoff);

        Ok(count_before - tables.job_runs.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::audit_log::AuditAction;
    use std::time::Duration;

    fn new_user<'a>(email: &'a str) -> NewHackathonUser<'a> {
        let now = SystemTime::now();

        NewHackathonUser {
            id: Uuid::now_v7(),
            name: "Asha Rao",
            email,
            city: "Pune",
            daily_updates: false,
            event_reminders: true,
            weekly_digest: false,
            created_at: now,
            updated_at: now,
        }
    }

    fn audit_entry(record_id: Uuid) -> NewAuditLog<'static> {
        NewAuditLog {
            id: Uuid::now_v7(),
            action: AuditAction::SignupSuccess.as_str(),
            table_name: Some("hackathon_users"),
            record_id: Some(record_id),
            new_values: None,
            ip_address: None,
            user_agent: None,
            created_at: SystemTime::now(),
        }
    }

    #[tokio::test]
    async fn test_rate_limit_windows() {
        let store = InMemoryStore::new();
        let now = SystemTime::now();
        let window_start = now - Duration::from_secs(60);

        assert_eq!(
            store
                .get_rate_limit_count("1.2.3.4", "signup-user", window_start)
                .await
                .unwrap(),
            None
        );

        store
            .start_rate_limit_window("1.2.3.4", "signup-user", now)
            .await
            .unwrap();
        store
            .increment_rate_limit("1.2.3.4", "signup-user", window_start)
            .await
            .unwrap();
        store
            .start_rate_limit_window("5.6.7.8", "signup-user", now - Duration::from_secs(90))
            .await
            .unwrap();

        assert_eq!(
            store
                .get_rate_limit_count("1.2.3.4", "signup-user", window_start)
                .await
                .unwrap(),
            Some(2)
        );

        assert_eq!(
            store.delete_expired_rate_limits(window_start).await.unwrap(),
            1
        );
        assert_eq!(store.rate_limits().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_create_user_enforces_unique_email() {
        let store = InMemoryStore::new();

        let first = new_user("asha@example.com");
        store
            .create_user(&first, &audit_entry(first.id))
            .await
            .unwrap();

        assert!(store.email_exists("asha@example.com").await.unwrap());
        assert!(!store.email_exists("ravi@example.com").await.unwrap());

        let second = new_user("asha@example.com");
        assert!(store
            .create_user(&second, &audit_entry(second.id))
            .await
            .is_err());

        // The rejected user's audit entry is not kept
        assert_eq!(store.hackathon_users().unwrap().len(), 1);
        assert_eq!(store.audit_logs().unwrap().len(), 1);
        assert_eq!(store.audit_logs().unwrap()[0].record_id, Some(first.id));
    }

    #[tokio::test]
    async fn test_job_run_history() {
        let store = InMemoryStore::new();
        let start = SystemTime::now() - Duration::from_secs(600);

        assert_eq!(store.latest_job_run("Sweep").await.unwrap(), None);

        for (offset, succeeded) in [(300, true), (0, false), (120, true)] {
            store
                .record_job_run(&NewJobRun {
                    id: Uuid::now_v7(),
                    job_name: "Sweep",
                    started_at: start + Duration::from_secs(offset),
                    succeeded,
                    error: None,
                })
                .await
                .unwrap();
        }

        assert_eq!(
            store.latest_job_run("Sweep").await.unwrap(),
            Some(start + Duration::from_secs(300))
        );
        assert_eq!(store.latest_job_run("Other").await.unwrap(), None);

        assert_eq!(
            store
                .delete_job_runs_before(start + Duration::from_secs(120))
                .await
                .unwrap(),
            1
        );
        assert_eq!(store.job_runs().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_injected_failures() {
        let store = InMemoryStore::new();

        store.set_fail_rate_limit_lookups(true);
        assert!(store
            .get_rate_limit_count("1.2.3.4", "signup-user", SystemTime::now())
            .await
            .is_err());

        store.set_fail_user_inserts(true);
        let user = new_user("asha@example.com");
        assert!(store
            .create_user(&user, &audit_entry(user.id))
            .await
            .is_err());
        assert!(store.hackathon_users().unwrap().is_empty());

        store.set_fail_user_inserts(false);
        assert!(store
            .create_user(&user, &audit_entry(user.id))
            .await
            .is_ok());
    }
}
