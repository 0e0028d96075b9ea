use diesel::{dsl, ExpressionMethods, OptionalExtension, QueryDsl};
use diesel_async::RunQueryDsl;
use std::time::SystemTime;
use uuid::Uuid;

use crate::db::{DaoError, DbAsyncPool};
use crate::models::rate_limit::NewRateLimit;

use crate::schema::rate_limits as rate_limit_fields;
use crate::schema::rate_limits::dsl::rate_limits;

pub struct Dao {
    db_async_pool: DbAsyncPool,
}

impl Dao {
    pub fn new(db_async_pool: &DbAsyncPool) -> Self {
        Self {
            db_async_pool: db_async_pool.clone(),
        }
    }

    /// Deletes the counters of every identifier whose window began before `window_start`.
    pub async fn delete_expired(&self, window_start: SystemTime) -> Result<usize, DaoError> {
        let mut conn = self.db_async_pool.get().await?;

        Ok(
            diesel::delete(rate_limits.filter(rate_limit_fields::window_start.lt(window_start)))
                .execute(&mut conn)
                .await?,
        )
    }

    pub async fn get_request_count(
        &self,
        identifier: &str,
        endpoint: &str,
        window_start: SystemTime,
    ) -> Result<Option<i32>, DaoError> {
        let mut conn = self.db_async_pool.get().await?;

        Ok(rate_limits
            .select(rate_limit_fields::request_count)
            .filter(rate_limit_fields::identifier.eq(identifier))
            .filter(rate_limit_fields::endpoint.eq(endpoint))
            .filter(rate_limit_fields::window_start.ge(window_start))
            .order(rate_limit_fields::window_start.desc())
            .first::<i32>(&mut conn)
            .await
            .optional()?)
    }

    pub async fn increment_request_count(
        &self,
        identifier: &str,
        endpoint: &str,
        window_start: SystemTime,
    ) -> Result<(), DaoError> {
        let mut conn = self.db_async_pool.get().await?;

        dsl::update(
            rate_limits
                .filter(rate_limit_fields::identifier.eq(identifier))
                .filter(rate_limit_fields::endpoint.eq(endpoint))
                .filter(rate_limit_fields::window_start.ge(window_start)),
        )
        .set(rate_limit_fields::request_count.eq(rate_limit_fields::request_count + 1))
        .execute(&mut conn)
        .await?;

        Ok(())
    }

    pub async fn start_window(
        &self,
        identifier: &str,
        endpoint: &str,
        window_start: SystemTime,
    ) -> Result<(), DaoError> {
        let new_rate_limit = NewRateLimit {
            id: Uuid::now_v7(),
            identifier,
            endpoint,
            request_count: 1,
            window_start,
            created_at: SystemTime::now(),
        };

        let mut conn = self.db_async_pool.get().await?;

        dsl::insert_into(rate_limits)
            .values(&new_rate_limit)
            .execute(&mut conn)
            .await?;

        Ok(())
    }
}
