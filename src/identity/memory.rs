use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::Mutex;

use super::{
    Account, GoogleIdentity, IdentityError, IdentityProvider, IdentityResult, SignInMethod,
    normalize_email, validate_credentials,
};

const HASH_COST: u32 = 4;

struct StoredAccount {
    account: Account,
    password_hash: Option<String>,
    google_subject: Option<String>,
}

/// In-process identity provider. Google ID tokens must be registered up
/// front with `register_google_token`; deletions are recorded so callers can
/// tell which flow removed an account.
#[derive(Default)]
pub struct MemoryIdentityProvider {
    accounts: Mutex<Vec<StoredAccount>>,
    google_tokens: Mutex<HashMap<String, GoogleIdentity>>,
    deleted: Mutex<Vec<String>>,
}

impl MemoryIdentityProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_google_token(&self, token: &str, identity: GoogleIdentity) {
        self.google_tokens.lock().insert(token.to_string(), identity);
    }

    pub fn set_disabled(&self, uid: &str, disabled: bool) {
        if let Some(stored) = self.accounts.lock().iter_mut().find(|a| a.account.uid == uid) {
            stored.account.disabled = disabled;
        }
    }

    pub fn deleted_accounts(&self) -> Vec<String> {
        self.deleted.lock().clone()
    }

    pub fn account_count(&self) -> usize {
        self.accounts.lock().len()
    }
}

#[async_trait]
impl IdentityProvider for MemoryIdentityProvider {
    async fn create_account(
        &self,
        email: &str,
        password: &str,
        display_name: &str,
    ) -> IdentityResult<Account> {
        validate_credentials(email, password)?;
        let email = normalize_email(email);

        let password_hash = bcrypt::hash(password, HASH_COST)
            .map_err(|e| IdentityError::Provider(e.to_string()))?;

        let mut accounts = self.accounts.lock();
        if accounts.iter().any(|a| a.account.email == email) {
            return Err(IdentityError::EmailExists);
        }

        let account = Account {
            uid: crate::store::generate_id(),
            email,
            display_name: Some(display_name.to_string()),
            methods: vec![SignInMethod::Password],
            disabled: false,
        };
        accounts.push(StoredAccount {
            account: account.clone(),
            password_hash: Some(password_hash),
            google_subject: None,
        });

        Ok(account)
    }

    async fn sign_in_with_password(&self, email: &str, password: &str) -> IdentityResult<Account> {
        let email = normalize_email(email);
        let accounts = self.accounts.lock();
        let stored = accounts
            .iter()
            .find(|a| a.account.email == email)
            .ok_or(IdentityError::UserNotFound)?;

        if stored.account.disabled {
            return Err(IdentityError::UserDisabled);
        }

        let hash = stored
            .password_hash
            .as_deref()
            .ok_or(IdentityError::WrongPassword)?;
        if !bcrypt::verify(password, hash).unwrap_or(false) {
            return Err(IdentityError::WrongPassword);
        }

        Ok(stored.account.clone())
    }

    async fn sign_in_with_google(&self, id_token: &str) -> IdentityResult<(Account, bool)> {
        let identity = self
            .google_tokens
            .lock()
            .get(id_token)
            .cloned()
            .ok_or_else(|| IdentityError::InvalidGoogleToken("unknown token".to_string()))?;
        if !identity.email_verified {
            return Err(IdentityError::InvalidGoogleToken(
                "Email not verified by Google".to_string(),
            ));
        }
        let email = normalize_email(&identity.email);

        let mut accounts = self.accounts.lock();

        if let Some(stored) = accounts
            .iter()
            .find(|a| a.google_subject.as_deref() == Some(identity.subject.as_str()))
        {
            if stored.account.disabled {
                return Err(IdentityError::UserDisabled);
            }
            return Ok((stored.account.clone(), false));
        }

        if let Some(stored) = accounts.iter().find(|a| a.account.email == email) {
            return Err(if stored.password_hash.is_some() {
                IdentityError::PasswordAccountExists
            } else {
                IdentityError::EmailExists
            });
        }

        let account = Account {
            uid: crate::store::generate_id(),
            email,
            display_name: identity.name.clone(),
            methods: vec![SignInMethod::Google],
            disabled: false,
        };
        accounts.push(StoredAccount {
            account: account.clone(),
            password_hash: None,
            google_subject: Some(identity.subject),
        });

        Ok((account, true))
    }

    async fn reauthenticate(&self, uid: &str, password: &str) -> IdentityResult<()> {
        let accounts = self.accounts.lock();
        let stored = accounts
            .iter()
            .find(|a| a.account.uid == uid)
            .ok_or(IdentityError::UserNotFound)?;

        let hash = stored
            .password_hash
            .as_deref()
            .ok_or(IdentityError::RequiresRecentLogin)?;
        if !bcrypt::verify(password, hash).unwrap_or(false) {
            return Err(IdentityError::WrongPassword);
        }

        Ok(())
    }

    async fn delete_account(&self, uid: &str) -> IdentityResult<()> {
        let mut accounts = self.accounts.lock();
        let before = accounts.len();
        accounts.retain(|a| a.account.uid != uid);
        if accounts.len() == before {
            return Err(IdentityError::UserNotFound);
        }
        self.deleted.lock().push(uid.to_string());
        Ok(())
    }

    async fn find_account(&self, uid: &str) -> IdentityResult<Option<Account>> {
        Ok(self
            .accounts
            .lock()
            .iter()
            .find(|a| a.account.uid == uid)
            .map(|a| a.account.clone()))
    }
}
