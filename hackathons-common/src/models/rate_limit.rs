use diesel::{Insertable, Queryable};
use serde::{Deserialize, Serialize};
use std::time::SystemTime;
use uuid::Uuid;

use crate::schema::rate_limits;

#[derive(Clone, Debug, Serialize, Deserialize, Identifiable, Queryable)]
#[diesel(table_name = rate_limits)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct RateLimit {
    pub id: Uuid,
    pub identifier: String,
    pub endpoint: String,
    pub request_count: i32,
    pub window_start: SystemTime,
    pub created_at: SystemTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = rate_limits)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewRateLimit<'a> {
    pub id: Uuid,
    pub identifier: &'a str,
    pub endpoint: &'a str,
    pub request_count: i32,
    pub window_start: SystemTime,
    pub created_at: SystemTime,
}
