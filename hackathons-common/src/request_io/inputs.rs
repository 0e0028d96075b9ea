use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A signup form as submitted by the web client. Fields are kept as raw JSON so that a value
/// of the wrong type is reported by the validator for that field rather than as an unreadable
/// body.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct InputSignup {
    #[serde(default)]
    pub name: Value,
    #[serde(default)]
    pub email: Value,
    #[serde(default)]
    pub city: Value,
    #[serde(default)]
    pub notifications: Value,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationPreferences {
    pub daily_updates: bool,
    pub event_reminders: bool,
    pub weekly_digest: bool,
}

impl NotificationPreferences {
    /// Reads the three flags from a JSON object, treating each value by its truthiness and a
    /// missing flag as `false`. An array is accepted but has no flags. Returns `None` for any
    /// other kind of value.
    pub fn from_json(value: &Value) -> Option<Self> {
        let flags = match value {
            Value::Object(flags) => Some(flags),
            Value::Array(_) => None,
            _ => return None,
        };
        let flag = |key: &str| {
            flags
                .and_then(|f| f.get(key))
                .map(is_truthy)
                .unwrap_or(false)
        };

        Some(NotificationPreferences {
            daily_updates: flag("dailyUpdates"),
            event_reminders: flag("eventReminders"),
            weekly_digest: flag("weeklyDigest"),
        })
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0 && !f.is_nan()).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
