use diesel::{dsl, ExpressionMethods, QueryDsl};
use diesel_async::RunQueryDsl;

use crate::db::{DaoError, DbAsyncPool};
use crate::models::audit_log::NewAuditLog;
use crate::models::hackathon_user::NewHackathonUser;

use crate::schema::audit_logs::dsl::audit_logs;
use crate::schema::hackathon_users as hackathon_user_fields;
use crate::schema::hackathon_users::dsl::hackathon_users;

pub struct Dao {
    db_async_pool: DbAsyncPool,
}

impl Dao {
    pub fn new(db_async_pool: &DbAsyncPool) -> Self {
        Self {
            db_async_pool: db_async_pool.clone(),
        }
    }

    /// `email` is expected to already be lowercase.
    pub async fn email_exists(&self, email: &str) -> Result<bool, DaoError> {
        let mut conn = self.db_async_pool.get().await?;

        Ok(dsl::select(dsl::exists(
            hackathon_users.filter(hackathon_user_fields::email.eq(email)),
        ))
        .get_result::<bool>(&mut conn)
        .await?)
    }

    /// Inserts the user and the audit entry recording its creation in one transaction, so a
    /// user never exists without its audit trail.
    pub async fn create_user(
        &self,
        new_user: &NewHackathonUser<'_>,
        audit_entry: &NewAuditLog<'_>,
    ) -> Result<(), DaoError> {
        let mut db_connection = self.db_async_pool.get().await?;

        db_connection
            .build_transaction()
            .run::<_, diesel::result::Error, _>(|conn| {
                Box::pin(async move {
                    dsl::insert_into(hackathon_users)
                        .values(new_user)
                        .execute(conn)
                        .await?;

                    dsl::insert_into(audit_logs)
                        .values(audit_entry)
                        .execute(conn)
                        .await?;

                    Ok(())
                })
            })
            .await?;

        Ok(())
    }
}
