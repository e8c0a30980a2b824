use async_trait::async_trait;
use google_oauth::AsyncClient;
use sqlx::PgPool;

use super::{
    Account, GoogleIdentity, IdentityError, IdentityProvider, IdentityResult, SignInMethod,
    normalize_email, validate_credentials,
};

pub struct PgIdentityProvider {
    pool: PgPool,
    google_client: Option<AsyncClient>,
}

impl PgIdentityProvider {
    pub fn new(pool: PgPool, google_client_id: Option<&str>) -> Self {
        Self {
            pool,
            google_client: google_client_id.map(AsyncClient::new),
        }
    }

    async fn verify_google_token(&self, id_token: &str) -> IdentityResult<GoogleIdentity> {
        let client = self.google_client.as_ref().ok_or_else(|| {
            IdentityError::Provider("Google sign-in is not configured".to_string())
        })?;

        let payload = client
            .validate_id_token(id_token)
            .await
            .map_err(|e| IdentityError::InvalidGoogleToken(e.to_string()))?;

        let email = payload.email.clone().ok_or_else(|| {
            IdentityError::InvalidGoogleToken("Email not provided by Google".to_string())
        })?;

        Ok(GoogleIdentity {
            subject: payload.sub.clone(),
            email,
            name: payload.name.clone(),
            email_verified: payload.email_verified == Some(true),
        })
    }

    async fn find_by_email(&self, email: &str) -> IdentityResult<Option<AccountRow>> {
        sqlx::query_as::<_, AccountRow>("SELECT * FROM identity_accounts WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(provider_error)
    }

    async fn find_row(&self, uid: &str) -> IdentityResult<Option<AccountRow>> {
        sqlx::query_as::<_, AccountRow>("SELECT * FROM identity_accounts WHERE uid = $1")
            .bind(uid)
            .fetch_optional(&self.pool)
            .await
            .map_err(provider_error)
    }
}

#[derive(Debug, sqlx::FromRow)]
struct AccountRow {
    uid: String,
    email: String,
    display_name: Option<String>,
    password_hash: Option<String>,
    google_sub: Option<String>,
    disabled: bool,
}

impl From<&AccountRow> for Account {
    fn from(row: &AccountRow) -> Self {
        let mut methods = Vec::new();
        if row.password_hash.is_some() {
            methods.push(SignInMethod::Password);
        }
        if row.google_sub.is_some() {
            methods.push(SignInMethod::Google);
        }
        Account {
            uid: row.uid.clone(),
            email: row.email.clone(),
            display_name: row.display_name.clone(),
            methods,
            disabled: row.disabled,
        }
    }
}

fn provider_error(err: sqlx::Error) -> IdentityError {
    tracing::error!("Identity store error: {:?}", err);
    IdentityError::Provider("identity store unavailable".to_string())
}

#[async_trait]
impl IdentityProvider for PgIdentityProvider {
    async fn create_account(
        &self,
        email: &str,
        password: &str,
        display_name: &str,
    ) -> IdentityResult<Account> {
        validate_credentials(email, password)?;
        let email = normalize_email(email);

        if self.find_by_email(&email).await?.is_some() {
            return Err(IdentityError::EmailExists);
        }

        let password_hash = bcrypt::hash(password, bcrypt::DEFAULT_COST)
            .map_err(|e| IdentityError::Provider(format!("Password hashing failed: {}", e)))?;

        let row = sqlx::query_as::<_, AccountRow>(
            r#"
            INSERT INTO identity_accounts (uid, email, display_name, password_hash)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(crate::store::generate_id())
        .bind(&email)
        .bind(display_name)
        .bind(&password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => IdentityError::EmailExists,
            other => provider_error(other),
        })?;

        Ok(Account::from(&row))
    }

    async fn sign_in_with_password(&self, email: &str, password: &str) -> IdentityResult<Account> {
        let row = self
            .find_by_email(&normalize_email(email))
            .await?
            .ok_or(IdentityError::UserNotFound)?;

        if row.disabled {
            return Err(IdentityError::UserDisabled);
        }

        let password_hash = row
            .password_hash
            .as_ref()
            .ok_or(IdentityError::WrongPassword)?;

        let is_valid = bcrypt::verify(password, password_hash)
            .map_err(|e| IdentityError::Provider(format!("Password verification failed: {}", e)))?;

        if !is_valid {
            return Err(IdentityError::WrongPassword);
        }

        Ok(Account::from(&row))
    }

    async fn sign_in_with_google(&self, id_token: &str) -> IdentityResult<(Account, bool)> {
        let identity = self.verify_google_token(id_token).await?;
        if !identity.email_verified {
            return Err(IdentityError::InvalidGoogleToken(
                "Email not verified by Google".to_string(),
            ));
        }
        let email = normalize_email(&identity.email);

        let linked = sqlx::query_as::<_, AccountRow>(
            "SELECT * FROM identity_accounts WHERE google_sub = $1",
        )
        .bind(&identity.subject)
        .fetch_optional(&self.pool)
        .await
        .map_err(provider_error)?;

        if let Some(row) = linked {
            if row.disabled {
                return Err(IdentityError::UserDisabled);
            }
            return Ok((Account::from(&row), false));
        }

        if let Some(row) = self.find_by_email(&email).await? {
            return Err(if row.password_hash.is_some() {
                IdentityError::PasswordAccountExists
            } else {
                IdentityError::EmailExists
            });
        }

        let row = sqlx::query_as::<_, AccountRow>(
            r#"
            INSERT INTO identity_accounts (uid, email, display_name, google_sub)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(crate::store::generate_id())
        .bind(&email)
        .bind(&identity.name)
        .bind(&identity.subject)
        .fetch_one(&self.pool)
        .await
        .map_err(provider_error)?;

        Ok((Account::from(&row), true))
    }

    async fn reauthenticate(&self, uid: &str, password: &str) -> IdentityResult<()> {
        let row = self.find_row(uid).await?.ok_or(IdentityError::UserNotFound)?;

        let password_hash = row
            .password_hash
            .as_ref()
            .ok_or(IdentityError::RequiresRecentLogin)?;

        let is_valid = bcrypt::verify(password, password_hash)
            .map_err(|e| IdentityError::Provider(format!("Password verification failed: {}", e)))?;

        if !is_valid {
            return Err(IdentityError::WrongPassword);
        }

        Ok(())
    }

    async fn delete_account(&self, uid: &str) -> IdentityResult<()> {
        let result = sqlx::query("DELETE FROM identity_accounts WHERE uid = $1")
            .bind(uid)
            .execute(&self.pool)
            .await
            .map_err(provider_error)?;

        if result.rows_affected() == 0 {
            return Err(IdentityError::UserNotFound);
        }

        Ok(())
    }

    async fn find_account(&self, uid: &str) -> IdentityResult<Option<Account>> {
        Ok(self.find_row(uid).await?.as_ref().map(Account::from))
    }
}
