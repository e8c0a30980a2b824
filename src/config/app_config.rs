use crate::error::{AppError, Result};
use std::env;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: Option<DatabaseConfig>,
    pub cors: CorsConfig,
    pub storage: Option<StorageConfig>,
    pub auth: AuthConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub max_body_size: usize,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub bucket: String,
    pub endpoint: Option<String>,
    pub region: String,
    pub public_url: String,
    pub access_key: String,
    pub secret_key: String,
}

#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub token_ttl_days: i64,
    pub google_client_id: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            server: ServerConfig {
                host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: parse_var("PORT", "3000")?,
                max_body_size: parse_var("MAX_BODY_SIZE", "10485760")?,
            },
            database: match env::var("DB_URL") {
                Ok(url) => Some(DatabaseConfig {
                    url,
                    max_connections: parse_var("DB_MAX_CONNECTIONS", "20")?,
                }),
                Err(_) => None,
            },
            cors: CorsConfig {
                allowed_origins: env::var("FRONTEND_URL")?
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect(),
            },
            storage: storage_from_env()?,
            auth: AuthConfig {
                jwt_secret: env::var("JWT_SECRET")
                    .map_err(|_| AppError::ConfigError("JWT_SECRET not set".to_string()))?,
                token_ttl_days: parse_var("JWT_TTL_DAYS", "30")?,
                google_client_id: env::var("GOOGLE_CLIENT_ID").ok(),
            },
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

fn storage_from_env() -> Result<Option<StorageConfig>> {
    let Ok(bucket) = env::var("STORAGE_BUCKET") else {
        return Ok(None);
    };

    let endpoint = env::var("STORAGE_ENDPOINT").ok();
    let public_url = match env::var("STORAGE_PUBLIC_URL") {
        Ok(url) => url,
        Err(_) => match endpoint {
            Some(ref endpoint) => format!("{}/{}", endpoint.trim_end_matches('/'), bucket),
            None => format!("https://{}.s3.amazonaws.com", bucket),
        },
    };

    Ok(Some(StorageConfig {
        bucket,
        endpoint,
        region: env::var("STORAGE_REGION").unwrap_or_else(|_| "us-east-1".to_string()),
        public_url,
        access_key: env::var("AWS_ACCESS_KEY_ID")
            .map_err(|_| AppError::ConfigError("AWS_ACCESS_KEY_ID not set".to_string()))?,
        secret_key: env::var("AWS_SECRET_ACCESS_KEY")
            .map_err(|_| AppError::ConfigError("AWS_SECRET_ACCESS_KEY not set".to_string()))?,
    }))
}

fn parse_var<T: std::str::FromStr>(name: &str, default: &str) -> Result<T> {
    env::var(name)
        .unwrap_or_else(|_| default.to_string())
        .parse()
        .map_err(|_| AppError::ConfigError(format!("Invalid {} value", name)))
}
