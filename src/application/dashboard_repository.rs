// Repository trait for saved dashboard snapshots
use crate::domain::dashboard::Dashboard;
use async_trait::async_trait;
use uuid::Uuid;

#[async_trait]
pub trait DashboardRepository: Send + Sync {
    /// All saved dashboards, in the order they were first saved
    async fn list_all(&self) -> anyhow::Result<Vec<Dashboard>>;

    /// Insert or replace the dashboard with the same id
    async fn save(&self, dashboard: &Dashboard) -> anyhow::Result<()>;

    /// Remove a dashboard; unknown ids are ignored
    async fn delete(&self, id: Uuid) -> anyhow::Result<()>;
}
