use diesel::{Insertable, Queryable};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::SystemTime;
use uuid::Uuid;

use crate::schema::audit_logs;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AuditAction {
    SignupSuccess,
    SignupFailed,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::SignupSuccess => "SIGNUP_SUCCESS",
            AuditAction::SignupFailed => "SIGNUP_FAILED",
        }
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, Identifiable, Queryable)]
#[diesel(table_name = audit_logs)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct AuditLog {
    pub id: Uuid,
    pub action: String,
    pub table_name: Option<String>,
    pub record_id: Option<Uuid>,
    pub new_values: Option<serde_json::Value>,
    pub old_values: Option<serde_json::Value>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub created_at: SystemTime,
}

/// An entry to append to the audit log. `old_values` is never written by this service, so the
/// column is left to its default (`NULL`).
#[derive(Debug, Insertable)]
#[diesel(table_name = audit_logs)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewAuditLog<'a> {
    pub id: Uuid,
    pub action: &'a str,
    pub table_name: Option<&'a str>,
    pub record_id: Option<Uuid>,
    pub new_values: Option<serde_json::Value>,
    pub ip_address: Option<&'a str>,
    pub user_agent: Option<&'a str>,
    pub created_at: SystemTime,
}

impl From<&NewAuditLog<'_>> for AuditLog {
    fn from(entry: &NewAuditLog<'_>) -> Self {
        AuditLog {
            id: entry.id,
            action: String::from(entry.action),
            table_name: entry.table_name.map(String::from),
            record_id: entry.record_id,
            new_values: entry.new_values.clone(),
            old_values: None,
            ip_address: entry.ip_address.map(String::from),
            user_agent: entry.user_agent.map(String::from),
            created_at: entry.created_at,
        }
    }
}
