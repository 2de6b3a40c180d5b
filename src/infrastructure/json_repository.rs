// JSON file repository - Single durable slot holding every saved dashboard
use crate::application::dashboard_repository::DashboardRepository;
use crate::domain::dashboard::Dashboard;
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use uuid::Uuid;

pub const STORAGE_KEY: &str = "estatevision_dashboards";

#[derive(Debug)]
pub struct JsonFileRepository {
    path: PathBuf,
    // Serializes read-modify-write cycles within this process.
    write_lock: Mutex<()>,
}

impl JsonFileRepository {
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        Self {
            path: data_dir.as_ref().join(format!("{}.json", STORAGE_KEY)),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_all(&self) -> Result<Vec<Dashboard>> {
        let raw = match tokio::fs::read(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("Failed to read {}", self.path.display()));
            }
        };

        match serde_json::from_slice::<Vec<Dashboard>>(&raw) {
            Ok(dashboards) => Ok(dashboards),
            Err(e) => {
                tracing::error!(
                    "Failed to load dashboards from {}: {}",
                    self.path.display(),
                    e
                );
                Ok(Vec::new())
            }
        }
    }

    /// Replaces the slot atomically: readers see either the old or the new
    /// contents, never a partial write.
    async fn write_all(&self, dashboards: &[Dashboard]) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            tokio::fs::create_dir_all(dir)
                .await
                .with_context(|| format!("Failed to create {}", dir.display()))?;
        }

        let payload = serde_json::to_vec(dashboards).context("Failed to serialize dashboards")?;
        let tmp_path = self.path.with_extension("json.tmp");

        tokio::fs::write(&tmp_path, payload)
            .await
            .with_context(|| format!("Failed to write {}", tmp_path.display()))?;
        tokio::fs::rename(&tmp_path, &self.path)
            .await
            .with_context(|| format!("Failed to replace {}", self.path.display()))?;

        tracing::debug!(
            "Wrote {} dashboards to {}",
            dashboards.len(),
            self.path.display()
        );
        Ok(())
    }
}

#[async_trait]
impl DashboardRepository for JsonFileRepository {
    async fn list_all(&self) -> Result<Vec<Dashboard>> {
        self.read_all().await
    }

    async fn save(&self, dashboard: &Dashboard) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut dashboards = self.read_all().await?;

        match dashboards.iter_mut().find(|d| d.id == dashboard.id) {
            Some(existing) => *existing = dashboard.clone(),
            None => dashboards.push(dashboard.clone()),
        }

        self.write_all(&dashboards).await
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut dashboards = self.read_all().await?;
        let before = dashboards.len();
        dashboards.retain(|d| d.id != id);

        if dashboards.len() == before {
            tracing::debug!("Dashboard {} not present, nothing to delete", id);
            return Ok(());
        }

        self.write_all(&dashboards).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::status_editor::set_status;
    use crate::domain::layout_image::LayoutImage;
    use crate::domain::plot::{BoundingBox, EnrichedPlot, PlotGeometry, PlotStatus};

    fn dashboard(name: &str) -> Dashboard {
        Dashboard::new(
            name.to_string(),
            LayoutImage::new("image/png", vec![7, 7, 7]),
            vec![EnrichedPlot::new(
                PlotGeometry::new("P-1", BoundingBox::new(0.0, 0.0, 10.0, 10.0)),
                None,
            )],
        )
    }

    #[tokio::test]
    async fn test_empty_when_missing() {
        let dir = tempfile::tempdir().unwrap();
        let repo = JsonFileRepository::new(dir.path().join("nested"));
        assert!(repo.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_save_upserts_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let repo = JsonFileRepository::new(dir.path());

        let first = dashboard("First");
        let second = dashboard("Second");
        repo.save(&first).await.unwrap();
        repo.save(&second).await.unwrap();

        let edited = set_status(&first, "P-1", PlotStatus::Sold).unwrap();
        repo.save(&edited).await.unwrap();

        let stored = repo.list_all().await.unwrap();
        assert_eq!(stored.len(), 2);
        assert_eq!(stored[0].id, first.id);
        assert_eq!(stored[0].plots[0].effective_status(), PlotStatus::Sold);
        assert_eq!(stored[0].layout_image, first.layout_image);
        assert_eq!(stored[1].name, "Second");
        assert!(!repo.path().with_extension("json.tmp").exists());
    }

    #[tokio::test]
    async fn test_delete() {
        let dir = tempfile::tempdir().unwrap();
        let repo = JsonFileRepository::new(dir.path());

        let keep = dashboard("Keep");
        let removed = dashboard("Drop");
        repo.save(&keep).await.unwrap();
        repo.save(&removed).await.unwrap();

        repo.delete(removed.id).await.unwrap();
        repo.delete(Uuid::new_v4()).await.unwrap();

        let stored = repo.list_all().await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].id, keep.id);
    }

    #[tokio::test]
    async fn test_corrupt_slot_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let repo = JsonFileRepository::new(dir.path());
        std::fs::write(repo.path(), b"{not json").unwrap();

        assert!(repo.list_all().await.unwrap().is_empty());
    }
}
