use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct OutputSignedUpUser {
    pub id: Uuid,
    pub email: String,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct OutputSignup {
    pub success: bool,
    pub user: OutputSignedUpUser,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct OutputError {
    pub error: String,
}
