// Dashboard service - Upload pipeline and saved dashboard use cases
use crate::application::csv_export::{export_rows, to_csv};
use crate::application::dashboard_repository::DashboardRepository;
use crate::application::geometry_extractor::GeometryExtractor;
use crate::application::{inventory_parser, plot_merger, status_editor};
use crate::domain::dashboard::Dashboard;
use crate::domain::error::DomainError;
use crate::domain::layout_image::LayoutImage;
use crate::domain::plot::PlotStatus;
use anyhow::Context;
use bytes::Bytes;
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub bytes: Bytes,
}

#[derive(Debug, Clone)]
pub struct InventoryUpload {
    pub file_name: String,
    pub text: String,
}

/// Files picked so far. Processing only starts once both are present.
#[derive(Debug, Clone, Default)]
pub struct PendingUpload {
    pub image: Option<ImageUpload>,
    pub inventory: Option<InventoryUpload>,
}

impl PendingUpload {
    /// `None` until both files are present.
    pub fn into_ready(self) -> Option<ReadyUpload> {
        match (self.image, self.inventory) {
            (Some(image), Some(inventory)) => Some(ReadyUpload { image, inventory }),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ReadyUpload {
    pub image: ImageUpload,
    pub inventory: InventoryUpload,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedCsv {
    pub file_name: String,
    pub contents: String,
}

#[derive(Clone)]
pub struct DashboardService {
    repository: Arc<dyn DashboardRepository>,
    extractor: Arc<dyn GeometryExtractor>,
    pipeline: Arc<Mutex<()>>,
}

impl DashboardService {
    pub fn new(
        repository: Arc<dyn DashboardRepository>,
        extractor: Arc<dyn GeometryExtractor>,
    ) -> Self {
        Self {
            repository,
            extractor,
            pipeline: Arc::new(Mutex::new(())),
        }
    }

    /// Runs image conversion, inventory parsing, plot detection and merging.
    ///
    /// The new dashboard is returned, not saved. Any failure aborts the whole
    /// run, and a run started while another is in flight is rejected.
    pub async fn process(&self, upload: ReadyUpload) -> anyhow::Result<Dashboard> {
        let _guard = self
            .pipeline
            .try_lock()
            .map_err(|_| DomainError::PipelineBusy)?;

        let ReadyUpload { image, inventory } = upload;
        tracing::info!(
            "Processing layout {} with inventory {}",
            image.file_name,
            inventory.file_name
        );

        if image.bytes.is_empty() {
            anyhow::bail!("layout image {} is empty", image.file_name);
        }
        let layout_image = LayoutImage::from_file_bytes(&image.file_name, image.bytes);

        let records = inventory_parser::parse(&inventory.text);
        tracing::info!("Parsed {} inventory records", records.len());

        let geometries = self.extractor.detect(&layout_image).await;
        tracing::info!("Detected {} plots", geometries.len());

        let plots = plot_merger::merge(&geometries, &records);
        let dashboard = Dashboard::new(
            Dashboard::name_for_image(&image.file_name),
            layout_image,
            plots,
        );

        tracing::info!("Created dashboard {} ({})", dashboard.name, dashboard.id);
        Ok(dashboard)
    }

    pub async fn list(&self) -> anyhow::Result<Vec<Dashboard>> {
        self.repository.list_all().await
    }

    pub async fn open(&self, id: Uuid) -> anyhow::Result<Dashboard> {
        let dashboards = self.repository.list_all().await?;
        dashboards
            .into_iter()
            .find(|d| d.id == id)
            .ok_or_else(|| DomainError::DashboardNotFound(id.to_string()).into())
    }

    pub async fn save(&self, dashboard: &Dashboard) -> anyhow::Result<()> {
        self.repository
            .save(dashboard)
            .await
            .with_context(|| format!("Failed to save dashboard {}", dashboard.id))?;
        tracing::info!("Saved dashboard {} ({})", dashboard.name, dashboard.id);
        Ok(())
    }

    pub async fn delete(&self, id: Uuid) -> anyhow::Result<()> {
        self.repository
            .delete(id)
            .await
            .with_context(|| format!("Failed to delete dashboard {}", id))?;
        tracing::info!("Deleted dashboard {}", id);
        Ok(())
    }

    /// Applies a status edit to a saved dashboard and persists the result.
    pub async fn update_status(
        &self,
        id: Uuid,
        plot_id: &str,
        status: PlotStatus,
    ) -> anyhow::Result<Dashboard> {
        let dashboard = self.open(id).await?;
        let updated = status_editor::set_status(&dashboard, plot_id, status)?;
        self.save(&updated).await?;
        Ok(updated)
    }

    pub async fn export(&self, id: Uuid) -> anyhow::Result<ExportedCsv> {
        let dashboard = self.open(id).await?;
        Ok(Self::export_dashboard(&dashboard))
    }

    pub fn export_dashboard(dashboard: &Dashboard) -> ExportedCsv {
        ExportedCsv {
            file_name: dashboard.export_file_name(),
            contents: to_csv(&export_rows(dashboard)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::plot::{BoundingBox, PlotGeometry};
    use async_trait::async_trait;

    #[derive(Default)]
    struct InMemoryRepository {
        dashboards: std::sync::Mutex<Vec<Dashboard>>,
    }

    #[async_trait]
    impl DashboardRepository for InMemoryRepository {
        async fn list_all(&self) -> anyhow::Result<Vec<Dashboard>> {
            Ok(self.dashboards.lock().unwrap().clone())
        }

        async fn save(&self, dashboard: &Dashboard) -> anyhow::Result<()> {
            let mut dashboards = self.dashboards.lock().unwrap();
            match dashboards.iter_mut().find(|d| d.id == dashboard.id) {
                Some(existing) => *existing = dashboard.clone(),
                None => dashboards.push(dashboard.clone()),
            }
            Ok(())
        }

        async fn delete(&self, id: Uuid) -> anyhow::Result<()> {
            self.dashboards.lock().unwrap().retain(|d| d.id != id);
            Ok(())
        }
    }

    struct FixedExtractor(Vec<PlotGeometry>);

    #[async_trait]
    impl GeometryExtractor for FixedExtractor {
        async fn detect(&self, _image: &LayoutImage) -> Vec<PlotGeometry> {
            self.0.clone()
        }
    }

    fn service() -> DashboardService {
        let extractor = FixedExtractor(vec![PlotGeometry::new(
            "P-1",
            BoundingBox::new(0.0, 0.0, 100.0, 100.0),
        )]);
        DashboardService::new(
            Arc::new(InMemoryRepository::default()),
            Arc::new(extractor),
        )
    }

    fn upload() -> ReadyUpload {
        PendingUpload {
            image: Some(ImageUpload {
                file_name: "sunrise.png".to_string(),
                bytes: Bytes::from_static(&[1, 2, 3]),
            }),
            inventory: Some(InventoryUpload {
                file_name: "inventory.csv".to_string(),
                text: "plot,status\nP-1,Sold".to_string(),
            }),
        }
        .into_ready()
        .unwrap()
    }

    #[test]
    fn test_pending_upload_requires_both_files() {
        let mut pending = PendingUpload::default();
        assert!(pending.clone().into_ready().is_none());

        pending.inventory = Some(InventoryUpload {
            file_name: "inv.csv".to_string(),
            text: String::new(),
        });
        assert!(pending.clone().into_ready().is_none());

        pending.image = Some(ImageUpload {
            file_name: "a.png".to_string(),
            bytes: Bytes::from_static(&[0]),
        });
        let ready = pending.into_ready().unwrap();
        assert_eq!(ready.image.file_name, "a.png");
        assert_eq!(ready.inventory.file_name, "inv.csv");
    }

    #[tokio::test]
    async fn test_process_end_to_end() {
        let service = service();
        let dashboard = service.process(upload()).await.unwrap();

        assert_eq!(dashboard.name, "sunrise Dashboard");
        assert_eq!(dashboard.plots.len(), 1);
        assert_eq!(dashboard.plots[0].effective_status(), PlotStatus::Sold);
        assert_eq!(dashboard.layout_image.to_data_uri(), "data:image/png;base64,AQID");

        let export = DashboardService::export_dashboard(&dashboard);
        assert_eq!(export.file_name, "sunrise_Dashboard_Inventory.csv");
        assert_eq!(export.contents.lines().nth(1), Some("P-1,Sold,,,"));

        // Processing alone persists nothing.
        assert!(service.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_process_rejects_empty_image() {
        let mut upload = upload();
        upload.image.bytes = Bytes::new();
        assert!(service().process(upload).await.is_err());
    }

    #[tokio::test]
    async fn test_process_rejects_overlapping_runs() {
        let service = service();
        let _running = service.pipeline.try_lock().unwrap();

        let err = service.process(upload()).await.unwrap_err();
        assert_eq!(
            err.downcast_ref::<DomainError>(),
            Some(&DomainError::PipelineBusy)
        );
    }

    #[tokio::test]
    async fn test_save_update_export_delete() {
        let service = service();
        let dashboard = service.process(upload()).await.unwrap();
        service.save(&dashboard).await.unwrap();

        let updated = service
            .update_status(dashboard.id, "P-1", PlotStatus::Booked)
            .await
            .unwrap();
        assert_eq!(updated.plots[0].effective_status(), PlotStatus::Booked);

        let reopened = service.open(dashboard.id).await.unwrap();
        assert_eq!(reopened.plots, updated.plots);
        assert_eq!(service.list().await.unwrap().len(), 1);

        let export = service.export(dashboard.id).await.unwrap();
        assert!(export.contents.contains("P-1,Booked,,,"));

        let err = service
            .update_status(dashboard.id, "P-404", PlotStatus::Sold)
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DomainError>(),
            Some(DomainError::PlotNotFound { .. })
        ));

        service.delete(dashboard.id).await.unwrap();
        let err = service.open(dashboard.id).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DomainError>(),
            Some(DomainError::DashboardNotFound(_))
        ));
    }
}
