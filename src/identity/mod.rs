//! Identity provider gateway: credential and Google sign-in, reauthentication
//! and account deletion. Profile records live in the document store and are
//! handled by `services::auth_service`.

mod memory;
mod postgres;

pub use memory::MemoryIdentityProvider;
pub use postgres::PgIdentityProvider;

use std::str::FromStr;

use async_trait::async_trait;
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};

pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignInMethod {
    Password,
    Google,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub uid: String,
    pub email: String,
    pub display_name: Option<String>,
    pub methods: Vec<SignInMethod>,
    pub disabled: bool,
}

impl Account {
    pub fn has_password(&self) -> bool {
        self.methods.contains(&SignInMethod::Password)
    }
}

/// Verified Google identity extracted from an ID token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoogleIdentity {
    pub subject: String,
    pub email: String,
    pub name: Option<String>,
    pub email_verified: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdentityError {
    #[error("This email is already registered. Please use a different email or login.")]
    EmailExists,
    #[error("Email already registered with password. Please login with email/password")]
    PasswordAccountExists,
    #[error("Password is too weak. Please use a stronger password.")]
    WeakPassword,
    #[error("Invalid email address format.")]
    InvalidEmail,
    #[error("No account exists with this email. Please register first.")]
    UserNotFound,
    #[error("Invalid password. Please try again.")]
    WrongPassword,
    #[error("This account has been disabled. Please contact support.")]
    UserDisabled,
    #[error("Google sign-in was cancelled. Please try again.")]
    PopupClosed,
    #[error("Pop-up was blocked by the browser. Please allow pop-ups and try again.")]
    PopupBlocked,
    #[error("For security reasons, you need to sign in again before deleting your account")]
    RequiresRecentLogin,
    #[error("Google authentication failed: {0}")]
    InvalidGoogleToken(String),
    #[error("No user is currently signed in")]
    NoCurrentUser,
    #[error("Authentication failed: {0}")]
    Provider(String),
}

impl IdentityError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            IdentityError::EmailExists | IdentityError::PasswordAccountExists => {
                StatusCode::CONFLICT
            }
            IdentityError::UserDisabled => StatusCode::FORBIDDEN,
            IdentityError::UserNotFound
            | IdentityError::WrongPassword
            | IdentityError::RequiresRecentLogin
            | IdentityError::InvalidGoogleToken(_)
            | IdentityError::NoCurrentUser => StatusCode::UNAUTHORIZED,
            IdentityError::Provider(_) => StatusCode::BAD_GATEWAY,
            IdentityError::WeakPassword
            | IdentityError::InvalidEmail
            | IdentityError::PopupClosed
            | IdentityError::PopupBlocked => StatusCode::BAD_REQUEST,
        }
    }
}

/// Provider error codes as reported by web clients (`auth/...`).
impl FromStr for IdentityError {
    type Err = std::convert::Infallible;

    fn from_str(code: &str) -> Result<Self, Self::Err> {
        Ok(match code {
            "auth/email-already-in-use" => IdentityError::EmailExists,
            "auth/account-exists-with-different-credential" => {
                IdentityError::PasswordAccountExists
            }
            "auth/weak-password" => IdentityError::WeakPassword,
            "auth/invalid-email" => IdentityError::InvalidEmail,
            "auth/user-not-found" => IdentityError::UserNotFound,
            "auth/wrong-password" | "auth/invalid-credential" => IdentityError::WrongPassword,
            "auth/user-disabled" => IdentityError::UserDisabled,
            "auth/popup-closed-by-user" | "auth/cancelled-popup-request" => {
                IdentityError::PopupClosed
            }
            "auth/popup-blocked" => IdentityError::PopupBlocked,
            "auth/requires-recent-login" => IdentityError::RequiresRecentLogin,
            other => IdentityError::Provider(other.to_string()),
        })
    }
}

pub type IdentityResult<T> = std::result::Result<T, IdentityError>;

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn create_account(
        &self,
        email: &str,
        password: &str,
        display_name: &str,
    ) -> IdentityResult<Account>;

    async fn sign_in_with_password(&self, email: &str, password: &str) -> IdentityResult<Account>;

    /// Signs in with a Google ID token, creating the account on first use.
    /// The flag reports whether the account was just created.
    async fn sign_in_with_google(&self, id_token: &str) -> IdentityResult<(Account, bool)>;

    /// Confirms the password of an existing account before a sensitive
    /// operation.
    async fn reauthenticate(&self, uid: &str, password: &str) -> IdentityResult<()>;

    async fn delete_account(&self, uid: &str) -> IdentityResult<()>;

    async fn find_account(&self, uid: &str) -> IdentityResult<Option<Account>>;
}

/// Shape checks shared by every backend, run before anything is stored.
pub fn validate_credentials(email: &str, password: &str) -> IdentityResult<()> {
    let email = email.trim();
    let valid_email = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && domain.contains('.') && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        None => false,
    };
    if !valid_email || email.contains(char::is_whitespace) {
        return Err(IdentityError::InvalidEmail);
    }

    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(IdentityError::WeakPassword);
    }

    Ok(())
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
