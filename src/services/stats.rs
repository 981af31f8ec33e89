//! Dashboard statistics service

use chrono::{Duration, Utc};

use crate::{
    api::stats::StatsResponse,
    config::RemindersConfig,
    error::AppResult,
    repository::{AssetsRepository, AuditRepository, Repository},
};

/// Number of audit entries shown on the dashboard
pub const RECENT_LOGS: i64 = 10;

#[derive(Clone)]
pub struct StatsService {
    repository: Repository,
    reminders: RemindersConfig,
}

impl StatsService {
    pub fn new(repository: Repository, reminders: RemindersConfig) -> Self {
        Self { repository, reminders }
    }

    pub async fn get_stats(&self) -> AppResult<StatsResponse> {
        let now = Utc::now();
        let until = now + Duration::days(self.reminders.window_days);

        let total_assets = self.repository.assets_count().await?;
        let assets_by_status = self.repository.assets_count_by_status().await?;
        let assets_by_category = self.repository.assets_count_by_category().await?;
        let (recent_logs, _) = self.repository.audit_list(1, RECENT_LOGS).await?;
        let reminders = self.repository.assets_service_due(now, until).await?;

        Ok(StatsResponse {
            total_assets,
            assets_by_status,
            assets_by_category,
            recent_logs,
            reminders,
        })
    }
}
