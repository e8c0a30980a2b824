pub mod app;
pub mod cart;
pub mod config;
pub mod database;
pub mod error;
pub mod forms;
pub mod identity;
pub mod middleware;
pub mod models;
pub mod queries;
pub mod routes;
pub mod services;
pub mod session;
pub mod storage;
pub mod store;
pub mod utils;

pub use app::AppState;
pub use config::AppConfig;
pub use error::{AppError, Result};
