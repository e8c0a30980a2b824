pub mod auth_service;
pub mod media_service;
pub mod page_cache;
pub mod stats_service;
