use diesel::{Insertable, Queryable};
use serde::{Deserialize, Serialize};
use std::time::SystemTime;
use uuid::Uuid;

use crate::schema::hackathon_users;

#[derive(Clone, Debug, Serialize, Deserialize, Identifiable, Queryable)]
#[diesel(table_name = hackathon_users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct HackathonUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub city: String,

    pub daily_updates: bool,
    pub event_reminders: bool,
    pub weekly_digest: bool,

    pub created_at: SystemTime,
    pub updated_at: SystemTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = hackathon_users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewHackathonUser<'a> {
    pub id: Uuid,
    pub name: &'a str,
    pub email: &'a str,
    pub city: &'a str,

    pub daily_updates: bool,
    pub event_reminders: bool,
    pub weekly_digest: bool,

    pub created_at: SystemTime,
    pub updated_at: SystemTime,
}

impl From<&NewHackathonUser<'_>> for HackathonUser {
    fn from(new_user: &NewHackathonUser<'_>) -> Self {
        HackathonUser {
            id: new_user.id,
            name: String::from(new_user.name),
            email: String::from(new_user.email),
            city: String::from(new_user.city),
            daily_updates: new_user.daily_updates,
            event_reminders: new_user.event_reminders,
            weekly_digest: new_user.weekly_digest,
            created_at: new_user.created_at,
            updated_at: new_user.updated_at,
        }
    }
}
