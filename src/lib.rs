//! Asset Tracker Server
//!
//! Tracks IT assets through registration, relocation, loan cycles and
//! maintenance, with every state change recorded in a hash-chained audit
//! ledger. Exposed as a REST JSON API.

use std::sync::Arc;

pub mod api;
pub mod authz;
pub mod config;
pub mod error;
pub mod lifecycle;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}

impl AppState {
    /// Wire services over `repository` using the given configuration
    pub fn new(config: AppConfig, repository: repository::Repository) -> Self {
        let services = services::Services::new(repository, config.auth.clone(), config.reminders.clone());
        Self {
            config: Arc::new(config),
            services: Arc::new(services),
        }
    }
}
