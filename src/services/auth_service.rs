use crate::{
    config::AuthConfig,
    error::{AppError, Result},
    identity::{Account, IdentityError, IdentityProvider},
    models::{AuthResponse, NewUser, ProfileResponse, Role, User, UserStatus},
    queries::user_queries,
    services::page_cache::{ADMIN_USERS, PageCache},
    session::{Session, SessionUser},
    store::DocumentStore,
    utils::jwt,
};

/// Sign-in flows spanning the identity provider and the profile records.
pub struct AuthService<'a> {
    pub identity: &'a dyn IdentityProvider,
    pub store: &'a dyn DocumentStore,
    pub pages: &'a PageCache,
    pub config: &'a AuthConfig,
}

impl AuthService<'_> {
    pub async fn register(
        &self,
        session: &Session,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<AuthResponse> {
        let account = self.identity.create_account(email, password, name).await?;

        let profile = NewUser {
            name: name.to_string(),
            email: account.email.clone(),
            role: Role::User,
            status: UserStatus::Active,
        };
        user_queries::create_user_with_id(self.store, self.pages, &account.uid, &profile).await?;

        tracing::info!("Registered account {}", account.uid);

        self.open_session(session, &account, Role::User)
    }

    pub async fn login(&self, session: &Session, email: &str, password: &str) -> Result<AuthResponse> {
        let account = self.identity.sign_in_with_password(email, password).await?;
        let role = self
            .load_profile(&account.uid)
            .await
            .map(|p| p.role)
            .unwrap_or_default();

        self.open_session(session, &account, role)
    }

    /// Completes a Google popup sign-in. The client reports either the ID
    /// token or the provider error code the popup ended with.
    pub async fn google(
        &self,
        session: &Session,
        id_token: Option<&str>,
        error_code: Option<&str>,
    ) -> Result<AuthResponse> {
        if let Some(code) = error_code {
            let Ok(err) = code.parse::<IdentityError>();
            return Err(err.into());
        }

        let id_token = id_token
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AppError::BadRequest("Google ID token is required".to_string()))?;

        let (account, is_new) = self.identity.sign_in_with_google(id_token).await?;

        let role = match self.load_profile(&account.uid).await {
            Some(profile) => profile.role,
            None => {
                let name = account
                    .display_name
                    .clone()
                    .unwrap_or_else(|| local_part(&account.email).to_string());
                let profile = NewUser {
                    name,
                    email: account.email.clone(),
                    role: Role::User,
                    status: UserStatus::Active,
                };
                user_queries::create_user_with_id(self.store, self.pages, &account.uid, &profile)
                    .await?;
                if !is_new {
                    tracing::info!("Recreated missing profile for {}", account.uid);
                }
                Role::User
            }
        };

        self.open_session(session, &account, role)
    }

    pub fn logout(&self, session: &Session) {
        session.sign_out();
    }

    pub async fn current_user(&self, session: &Session) -> Result<ProfileResponse> {
        let user = session.current().ok_or(IdentityError::NoCurrentUser)?;
        let account = self
            .identity
            .find_account(&user.uid)
            .await?
            .ok_or(IdentityError::NoCurrentUser)?;
        let profile = self.load_profile(&account.uid).await;

        Ok(ProfileResponse {
            uid: account.uid,
            email: account.email,
            name: account.display_name,
            profile,
        })
    }

    /// Self-service deletion. Password accounts confirm their password
    /// first. The profile record goes before the identity account, and the
    /// session ends.
    pub async fn delete_own_account(&self, session: &Session, password: Option<&str>) -> Result<()> {
        let user = session.current().ok_or(IdentityError::NoCurrentUser)?;
        let account = self
            .identity
            .find_account(&user.uid)
            .await?
            .ok_or(IdentityError::NoCurrentUser)?;

        if account.has_password() {
            let password = password.filter(|p| !p.is_empty()).ok_or_else(|| {
                AppError::BadRequest("Password is required to delete your account".to_string())
            })?;
            self.identity.reauthenticate(&account.uid, password).await?;
        }

        user_queries::delete_user_record(self.store, &account.uid).await?;
        self.identity.delete_account(&account.uid).await?;
        self.pages.invalidate(ADMIN_USERS);

        tracing::info!("Account {} deleted by its owner", account.uid);

        session.sign_out();
        Ok(())
    }

    fn open_session(&self, session: &Session, account: &Account, role: Role) -> Result<AuthResponse> {
        let user = SessionUser::from_account(account, role);
        let token = jwt::generate_token(self.config, &user)?;
        session.sign_in(user);

        Ok(AuthResponse {
            token,
            uid: account.uid.clone(),
            email: account.email.clone(),
            name: account.display_name.clone(),
            role,
        })
    }

    /// Profiles are optional for signing in; a store fault is logged and
    /// treated as a missing profile.
    async fn load_profile(&self, uid: &str) -> Option<User> {
        match user_queries::find_by_id(self.store, uid).await {
            Ok(profile) => profile,
            Err(e) => {
                tracing::warn!("Profile lookup for {} failed: {}", uid, e);
                None
            }
        }
    }
}

fn local_part(email: &str) -> &str {
    email.split('@').next().unwrap_or(email)
}
