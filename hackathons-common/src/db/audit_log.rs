use diesel::dsl;
use diesel_async::RunQueryDsl;

use crate::db::{DaoError, DbAsyncPool};
use crate::models::audit_log::NewAuditLog;

use crate::schema::audit_logs::dsl::audit_logs;

pub struct Dao {
    db_async_pool: DbAsyncPool,
}

impl Dao {
    pub fn new(db_async_pool: &DbAsyncPool) -> Self {
        Self {
            db_async_pool: db_async_pool.clone(),
        }
    }

    pub async fn record(&self, entry: &NewAuditLog<'_>) -> Result<(), DaoError> {
        let mut conn = self.db_async_pool.get().await?;

        dsl::insert_into(audit_logs)
            .values(entry)
            .execute(&mut conn)
            .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_utils;
    use crate::models::audit_log::{AuditAction, AuditLog};
    use crate::schema::audit_logs as audit_log_fields;
    use diesel::{ExpressionMethods, QueryDsl};
    use std::time::SystemTime;
    use uuid::Uuid;

    async fn entries_for_record(dao: &Dao, record_id: Uuid) -> Vec<AuditLog> {
        let mut conn = dao.db_async_pool.get().await.unwrap();

        audit_logs
            .filter(audit_log_fields::record_id.eq(record_id))
            .order(audit_log_fields::created_at.asc())
            .load::<AuditLog>(&mut conn)
            .await
            .unwrap()
    }

    #[tokio::test]
    #[ignore = "requires a PostgreSQL database"]
    async fn recorded_entries_can_be_read_back() {
        let dao = Dao::new(test_utils::db_async_pool());
        let record_id = Uuid::now_v7();

        let entry = NewAuditLog {
            id: Uuid::now_v7(),
            action: AuditAction::SignupFailed.as_str(),
            table_name: Some("hackathon_users"),
            record_id: Some(record_id),
            new_values: Some(serde_json::json!({ "email": "x@y.in", "error": "boom" })),
            ip_address: None,
            user_agent: Some("curl/8.0"),
            created_at: SystemTime::now(),
        };

        dao.record(&entry).await.unwrap();

        let entries = entries_for_record(&dao, record_id).await;
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].action, "SIGNUP_FAILED");
        assert_eq!(entries[0].ip_address, None);
        assert_eq!(entries[0].old_values, None);
        assert_eq!(
            entries[0].new_values.as_ref().unwrap()["error"],
            serde_json::json!("boom")
        );
    }
}
