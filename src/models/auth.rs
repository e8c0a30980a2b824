use serde::{Deserialize, Serialize};

use crate::models::{Role, User};

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Result of the Google popup as reported by the client: either an ID token
/// or the provider error code the popup ended with.
#[derive(Debug, Default, Deserialize)]
pub struct GoogleAuthRequest {
    pub id_token: Option<String>,
    pub error_code: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DeleteAccountRequest {
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub uid: String,
    pub email: String,
    pub name: Option<String>,
    pub role: Role,
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub uid: String,
    pub email: String,
    pub name: Option<String>,
    pub profile: Option<User>,
}
