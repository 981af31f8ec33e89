//! Business logic services

pub mod assets;
pub mod audit;
pub mod auth;
pub mod lifecycle;
pub mod stats;

use crate::{
    config::{AuthConfig, RemindersConfig},
    error::AppResult,
    repository::{Repository, Store},
};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub auth: auth::AuthService,
    pub assets: assets::AssetsService,
    pub lifecycle: lifecycle::LifecycleService,
    pub audit: audit::AuditService,
    pub stats: stats::StatsService,
    repository: Repository,
}

impl Services {
    /// Create all services over one shared store
    pub fn new(repository: Repository, auth_config: AuthConfig, reminders_config: RemindersConfig) -> Self {
        Self {
            auth: auth::AuthService::new(repository.clone(), auth_config),
            assets: assets::AssetsService::new(repository.clone()),
            lifecycle: lifecycle::LifecycleService::new(repository.clone()),
            audit: audit::AuditService::new(repository.clone()),
            stats: stats::StatsService::new(repository.clone(), reminders_config),
            repository,
        }
    }

    /// Check that the store answers
    pub async fn ping(&self) -> AppResult<()> {
        self.repository.ping().await
    }
}
