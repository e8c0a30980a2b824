// tests/common/mod.rs
#![allow(dead_code)]

use std::sync::{Arc, Once};

use glow_back::{
    AppState,
    config::AuthConfig,
    identity::MemoryIdentityProvider,
    identity::SignInMethod,
    models::{PRODUCTS, Role, USERS},
    session::SessionUser,
    storage::MemoryObjectStore,
    store::{DocumentStore, Fields, MemoryDocumentStore},
    utils::jwt,
};
use serde_json::{Value, json};
use tracing_subscriber::EnvFilter;

static TRACING_INIT: Once = Once::new();

pub fn setup_tracing() {
    TRACING_INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::new("debug"))
            .with_test_writer()
            .try_init();
    });
}

pub fn auth_config() -> AuthConfig {
    AuthConfig {
        jwt_secret: "integration-secret".to_string(),
        token_ttl_days: 1,
        google_client_id: None,
    }
}

/// Application state over in-memory gateways, with handles kept so tests
/// can inspect or sabotage each backend.
pub struct TestApp {
    pub state: AppState,
    pub store: Arc<MemoryDocumentStore>,
    pub objects: Arc<MemoryObjectStore>,
    pub identity: Arc<MemoryIdentityProvider>,
}

impl TestApp {
    pub fn new() -> Self {
        setup_tracing();
        let store = Arc::new(MemoryDocumentStore::new());
        let objects = Arc::new(MemoryObjectStore::new());
        let identity = Arc::new(MemoryIdentityProvider::new());
        let state = AppState::new(
            store.clone(),
            objects.clone(),
            identity.clone(),
            auth_config(),
        );
        Self {
            state,
            store,
            objects,
            identity,
        }
    }

    pub fn router(&self) -> axum::Router {
        glow_back::app::router(self.state.clone())
    }

    pub fn token_for(&self, uid: &str, role: Role) -> String {
        let user = SessionUser {
            uid: uid.to_string(),
            email: format!("{}@example.com", uid),
            display_name: None,
            role,
            methods: vec![SignInMethod::Password],
        };
        jwt::generate_token(&self.state.auth, &user).unwrap()
    }

    /// Seeds an admin profile for `admin-1` and returns its token.
    pub async fn admin_token(&self) -> String {
        seed_user(self.store.as_ref(), "admin-1", "admin").await;
        self.token_for("admin-1", Role::Admin)
    }
}

pub fn fields(value: Value) -> Fields {
    value.as_object().cloned().unwrap()
}

/// Stores a raw product document under `id`, bypassing normalization.
pub async fn seed_raw_product(store: &dyn DocumentStore, id: &str, data: Value) {
    store.set(PRODUCTS, id, fields(data)).await.unwrap();
}

pub async fn seed_product(store: &dyn DocumentStore, id: &str, name: &str, slug: &str) {
    seed_raw_product(
        store,
        id,
        json!({
            "name": name,
            "slug": slug,
            "sku": format!("SKU-{}", id),
            "price": 12.5,
            "category": "serums",
            "quantity": 10,
            "min_stock_level": 2,
            "max_stock_level": 50,
        }),
    )
    .await;
}

pub async fn seed_user(store: &dyn DocumentStore, id: &str, role: &str) {
    store
        .set(
            USERS,
            id,
            fields(json!({
                "name": format!("User {}", id),
                "email": format!("{}@example.com", id),
                "role": role,
                "status": "active",
                "createdAt": { "seconds": 1_714_000_000, "nanoseconds": 0 },
            })),
        )
        .await
        .unwrap();
}
