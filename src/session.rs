//! Explicit sign-in state.
//!
//! A `Session` is handed to whatever needs the current user; nothing reads
//! identity from ambient globals. Interested parties subscribe and receive
//! the current state immediately, then once per change, until they
//! unsubscribe.

use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};

use crate::{
    identity::{Account, SignInMethod},
    models::Role,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub uid: String,
    pub email: String,
    pub display_name: Option<String>,
    pub role: Role,
    pub methods: Vec<SignInMethod>,
}

impl SessionUser {
    pub fn from_account(account: &Account, role: Role) -> Self {
        Self {
            uid: account.uid.clone(),
            email: account.email.clone(),
            display_name: account.display_name.clone(),
            role,
            methods: account.methods.clone(),
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn uses_password(&self) -> bool {
        self.methods.contains(&SignInMethod::Password)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Arc<dyn Fn(Option<&SessionUser>) + Send + Sync>;

#[derive(Clone, Default)]
pub struct Session {
    inner: Arc<SessionInner>,
}

#[derive(Default)]
struct SessionInner {
    current: RwLock<Option<SessionUser>>,
    listeners: Mutex<Vec<(SubscriptionId, Listener)>>,
    next_id: AtomicU64,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Session that starts out signed in, e.g. rebuilt from a bearer token.
    pub fn restore(user: SessionUser) -> Self {
        let session = Self::new();
        *session.inner.current.write() = Some(user);
        session
    }

    pub fn current(&self) -> Option<SessionUser> {
        self.inner.current.read().clone()
    }

    pub fn is_signed_in(&self) -> bool {
        self.inner.current.read().is_some()
    }

    pub fn sign_in(&self, user: SessionUser) {
        *self.inner.current.write() = Some(user);
        self.notify();
    }

    pub fn sign_out(&self) {
        let was_signed_in = self.inner.current.write().take().is_some();
        if was_signed_in {
            self.notify();
        }
    }

    pub fn subscribe<F>(&self, listener: F) -> SubscriptionId
    where
        F: Fn(Option<&SessionUser>) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.inner.next_id.fetch_add(1, Ordering::Relaxed));
        let listener: Listener = Arc::new(listener);
        self.inner.listeners.lock().push((id, listener.clone()));

        let current = self.current();
        listener(current.as_ref());
        id
    }

    /// Returns whether the subscription was still registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut listeners = self.inner.listeners.lock();
        let before = listeners.len();
        listeners.retain(|(sid, _)| *sid != id);
        listeners.len() != before
    }

    fn notify(&self) {
        let current = self.current();
        // listeners run outside the lock so they may (un)subscribe
        let listeners: Vec<Listener> = self
            .inner
            .listeners
            .lock()
            .iter()
            .map(|(_, l)| l.clone())
            .collect();
        for listener in listeners {
            listener(current.as_ref());
        }
    }
}
