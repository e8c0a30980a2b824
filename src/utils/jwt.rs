use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::{
    config::AuthConfig,
    error::{AppError, Result},
    identity::SignInMethod,
    models::Role,
    session::SessionUser,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub email: String,
    pub name: Option<String>,
    pub role: Role,
    pub methods: Vec<SignInMethod>,
    pub exp: usize,
}

impl Claims {
    pub fn into_session_user(self) -> SessionUser {
        SessionUser {
            uid: self.sub,
            email: self.email,
            display_name: self.name,
            role: self.role,
            methods: self.methods,
        }
    }
}

pub fn generate_token(config: &AuthConfig, user: &SessionUser) -> Result<String> {
    let expiration = chrono::Utc::now()
        .checked_add_signed(chrono::Duration::days(config.token_ttl_days))
        .ok_or_else(|| AppError::InternalError("Failed to calculate expiration".to_string()))?
        .timestamp() as usize;

    let claims = Claims {
        sub: user.uid.clone(),
        email: user.email.clone(),
        name: user.display_name.clone(),
        role: user.role,
        methods: user.methods.clone(),
        exp: expiration,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )
    .map_err(|e| AppError::InternalError(format!("Token generation failed: {}", e)))
}

pub fn verify_token(config: &AuthConfig, token: &str) -> Result<Claims> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| AppError::Unauthorized(format!("Invalid token: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> AuthConfig {
        AuthConfig {
            jwt_secret: "test-secret".to_string(),
            token_ttl_days: 1,
            google_client_id: None,
        }
    }

    #[test]
    fn token_carries_session_user() {
        let user = SessionUser {
            uid: "u1".to_string(),
            email: "u1@example.com".to_string(),
            display_name: Some("U One".to_string()),
            role: Role::Admin,
            methods: vec![SignInMethod::Google],
        };
        let token = generate_token(&config(), &user).unwrap();
        let claims = verify_token(&config(), &token).unwrap();
        assert_eq!(claims.into_session_user(), user);
    }

    #[test]
    fn foreign_signature_is_rejected() {
        let other = AuthConfig {
            jwt_secret: "other".to_string(),
            ..config()
        };
        let user = SessionUser {
            uid: "u1".to_string(),
            email: "u1@example.com".to_string(),
            display_name: None,
            role: Role::User,
            methods: vec![],
        };
        let token = generate_token(&other, &user).unwrap();
        assert!(matches!(
            verify_token(&config(), &token),
            Err(AppError::Unauthorized(_))
        ));
    }
}
