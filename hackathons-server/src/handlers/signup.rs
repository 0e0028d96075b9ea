use hackathons_common::models::audit_log::{AuditAction, NewAuditLog};
use hackathons_common::models::hackathon_user::NewHackathonUser;
use hackathons_common::request_io::{
    InputSignup, NotificationPreferences, OutputSignedUpUser, OutputSignup,
};
use hackathons_common::store::SignupStore;
use hackathons_common::validators::{self, Validity};

use actix_web::{web, HttpResponse};
use futures::StreamExt;
use serde_json::{json, Value};
use std::time::SystemTime;
use uuid::Uuid;

use crate::handlers::error::{HttpErrorResponse, INTERNAL_ERROR_MSG};
use crate::middleware::client_info::ClientInfo;
use crate::middleware::throttle::Throttle;

pub const SIGNUP_ENDPOINT: &str = "signup-user";

const HACKATHON_USERS_TABLE: &str = "hackathon_users";

const EMAIL_ALREADY_REGISTERED_MSG: &str = "Email already registered";
const CREATION_FAILED_MSG: &str = "Failed to create account. Please try again.";

pub const MAX_BODY_SIZE: usize = 262_144;

pub async fn create(
    store: web::Data<dyn SignupStore>,
    throttle: web::Data<Throttle>,
    client: ClientInfo,
    payload: web::Payload,
) -> Result<HttpResponse, HttpErrorResponse> {
    let store = store.get_ref();

    throttle
        .enforce(&client.ip_address, SIGNUP_ENDPOINT, store)
        .await?;

    let body = read_body(payload, MAX_BODY_SIZE).await.map_err(|e| {
        log::error!("Failed to read signup request body from {}: {e}", client.ip_address);
        HttpErrorResponse::InternalError(String::from(INTERNAL_ERROR_MSG))
    })?;

    let input = match parse_input(&body) {
        Some(i) => i,
        None => {
            log::error!("Signup request body from {} was not valid JSON", client.ip_address);
            return Err(HttpErrorResponse::InternalError(String::from(
                INTERNAL_ERROR_MSG,
            )));
        }
    };

    let email = input.email.as_str().unwrap_or_default();
    let name = input.name.as_str().unwrap_or_default();
    let city = input.city.as_str().unwrap_or_default();

    for validity in [
        validators::validate_email(email),
        validators::validate_name(name),
        validators::validate_city(city),
    ] {
        if let Validity::Invalid(msg) = validity {
            return Err(HttpErrorResponse::IncorrectlyFormed(String::from(msg)));
        }
    }

    let Some(notifications) = NotificationPreferences::from_json(&input.notifications) else {
        return Err(HttpErrorResponse::IncorrectlyFormed(String::from(
            validators::INVALID_NOTIFICATIONS_MSG,
        )));
    };

    let email = validators::sanitize_input(&email.to_lowercase());
    let name = validators::sanitize_input(name);
    let city = validators::sanitize_input(city);

    match store.email_exists(&email).await {
        Ok(false) => (),
        Ok(true) => {
            return Err(HttpErrorResponse::ConflictWithExisting(String::from(
                EMAIL_ALREADY_REGISTERED_MSG,
            )));
        }
        Err(e) => {
            log::error!("{e}");
            return Err(HttpErrorResponse::InternalError(String::from(
                INTERNAL_ERROR_MSG,
            )));
        }
    }

    let now = SystemTime::now();
    let user_id = Uuid::now_v7();

    let new_user = NewHackathonUser {
        id: user_id,
        name: &name,
        email: &email,
        city: &city,
        daily_updates: notifications.daily_updates,
        event_reminders: notifications.event_reminders,
        weekly_digest: notifications.weekly_digest,
        created_at: now,
        updated_at: now,
    };

    let success_entry = NewAuditLog {
        id: Uuid::now_v7(),
        action: AuditAction::SignupSuccess.as_str(),
        table_name: Some(HACKATHON_USERS_TABLE),
        record_id: Some(user_id),
        new_values: Some(json!({ "email": &email })),
        ip_address: Some(&client.ip_address),
        user_agent: Some(&client.user_agent),
        created_at: now,
    };

    if let Err(e) = store.create_user(&new_user, &success_entry).await {
        log::error!("Failed to create hackathon user: {e}");

        let failure_entry = NewAuditLog {
            id: Uuid::now_v7(),
            action: AuditAction::SignupFailed.as_str(),
            table_name: Some(HACKATHON_USERS_TABLE),
            record_id: None,
            new_values: Some(json!({ "email": &email, "error": e.to_string() })),
            ip_address: Some(&client.ip_address),
            user_agent: Some(&client.user_agent),
            created_at: SystemTime::now(),
        };

        if let Err(e) = store.record_audit_log(&failure_entry).await {
            log::error!("Failed to record failed signup: {e}");
        }

        return Err(HttpErrorResponse::CreationFailed(String::from(
            CREATION_FAILED_MSG,
        )));
    }

    log::info!("Successful signup for email: {email}");

    Ok(HttpResponse::Ok().json(OutputSignup {
        success: true,
        user: OutputSignedUpUser { id: user_id, email },
    }))
}

async fn read_body(mut payload: web::Payload, limit: usize) -> Result<web::BytesMut, String> {
    let mut body = web::BytesMut::new();

    while let Some(chunk) = payload.next().await {
        let chunk = chunk.map_err(|e| e.to_string())?;

        if body.len() + chunk.len() > limit {
            return Err(format!("Body exceeds {limit} bytes"));
        }

        body.extend_from_slice(&chunk);
    }

    Ok(body)
}

/// Reads the body as JSON. A JSON value that is not an object carries none of the fields and
/// fails validation later; `null` and unparseable bodies are rejected here.
fn parse_input(body: &[u8]) -> Option<InputSignup> {
    match serde_json::from_slice::<Value>(body).ok()? {
        Value::Null => None,
        value @ Value::Object(_) => serde_json::from_value(value).ok(),
        _ => Some(InputSignup::default()),
    }
}
