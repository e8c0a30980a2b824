use std::sync::Arc;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
};
use tower_http::cors::CorsLayer;

use crate::{
    config::{AppConfig, AuthConfig, load_s3_client},
    database,
    error::{AppError, Result},
    identity::{IdentityProvider, MemoryIdentityProvider, PgIdentityProvider},
    routes,
    services::{auth_service::AuthService, page_cache::PageCache},
    storage::{MemoryObjectStore, ObjectStore, S3ObjectStore},
    store::{DocumentStore, MemoryDocumentStore, PgDocumentStore},
};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DocumentStore>,
    pub objects: Arc<dyn ObjectStore>,
    pub identity: Arc<dyn IdentityProvider>,
    pub pages: PageCache,
    pub auth: Arc<AuthConfig>,
}

impl AppState {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        objects: Arc<dyn ObjectStore>,
        identity: Arc<dyn IdentityProvider>,
        auth: AuthConfig,
    ) -> Self {
        Self {
            store,
            objects,
            identity,
            pages: PageCache::new(),
            auth: Arc::new(auth),
        }
    }

    /// Wires every gateway from configuration. Missing database or storage
    /// settings fall back to in-process backends.
    pub async fn from_config(config: &AppConfig) -> Result<Self> {
        let (store, identity): (Arc<dyn DocumentStore>, Arc<dyn IdentityProvider>) =
            match config.database {
                Some(ref db) => {
                    let pool = database::create_pool(db).await?;
                    (
                        Arc::new(PgDocumentStore::new(pool.clone())),
                        Arc::new(PgIdentityProvider::new(
                            pool,
                            config.auth.google_client_id.as_deref(),
                        )),
                    )
                }
                None => {
                    tracing::warn!("DB_URL not set, using in-memory document store and accounts");
                    (
                        Arc::new(MemoryDocumentStore::new()),
                        Arc::new(MemoryIdentityProvider::new()),
                    )
                }
            };

        let objects: Arc<dyn ObjectStore> = match config.storage {
            Some(ref storage) => {
                let client = load_s3_client(storage).await;
                Arc::new(S3ObjectStore::new(
                    client,
                    storage.bucket.clone(),
                    storage.public_url.clone(),
                ))
            }
            None => {
                tracing::warn!("STORAGE_BUCKET not set, media uploads are kept in memory");
                Arc::new(MemoryObjectStore::new())
            }
        };

        Ok(Self::new(store, objects, identity, config.auth.clone()))
    }

    pub fn auth_service(&self) -> AuthService<'_> {
        AuthService {
            identity: self.identity.as_ref(),
            store: self.store.as_ref(),
            pages: &self.pages,
            config: &self.auth,
        }
    }
}

pub async fn build(config: &AppConfig) -> Result<Router> {
    let state = AppState::from_config(config).await?;

    let allowed_origins: Vec<HeaderValue> = config
        .cors
        .allowed_origins
        .iter()
        .map(|origin| {
            origin
                .parse::<HeaderValue>()
                .map_err(|_| AppError::ConfigError(format!("Invalid CORS origin: {}", origin)))
        })
        .collect::<Result<Vec<_>>>()?;

    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([http::header::CONTENT_TYPE, http::header::AUTHORIZATION])
        .allow_origin(allowed_origins);

    let app = router(state)
        .layer(DefaultBodyLimit::max(config.server.max_body_size))
        .layer(cors);

    Ok(app)
}

pub fn router(state: AppState) -> Router {
    routes::create_router(state.clone()).with_state(state)
}
