// Dashboard domain model
use super::layout_image::LayoutImage;
use super::plot::{EnrichedPlot, PlotStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

/// A saved project: the layout image plus one enriched plot per detected box.
///
/// Plots sit behind `Arc` so an edited snapshot shares every untouched plot
/// with the snapshot it was derived from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub id: Uuid,
    pub name: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
    pub layout_image: LayoutImage,
    pub plots: Vec<Arc<EnrichedPlot>>,
}

impl Dashboard {
    pub fn new(name: String, layout_image: LayoutImage, plots: Vec<EnrichedPlot>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            created_at: Utc::now(),
            layout_image,
            plots: plots.into_iter().map(Arc::new).collect(),
        }
    }

    /// Default project name for an uploaded image: "<file stem> Dashboard"
    pub fn name_for_image(file_name: &str) -> String {
        let stem = file_name.split('.').next().unwrap_or(file_name);
        format!("{} Dashboard", stem)
    }

    pub fn find_plot(&self, plot_id: &str) -> Option<&Arc<EnrichedPlot>> {
        self.plots.iter().find(|p| p.id() == plot_id)
    }

    pub fn summary(&self) -> SummaryStats {
        SummaryStats::from_plots(self.plots.iter().map(|p| p.as_ref()))
    }

    /// File name used when exporting this dashboard's inventory.
    pub fn export_file_name(&self) -> String {
        let name = self.name.split_whitespace().collect::<Vec<_>>().join("_");
        format!("{}_Inventory.csv", name)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SummaryStats {
    pub total: usize,
    pub available: usize,
    pub booked: usize,
    pub sold: usize,
}

impl SummaryStats {
    pub fn from_plots<'a>(plots: impl IntoIterator<Item = &'a EnrichedPlot>) -> Self {
        plots
            .into_iter()
            .fold(SummaryStats::default(), |mut stats, plot| {
                stats.total += 1;
                match plot.effective_status() {
                    PlotStatus::Available => stats.available += 1,
                    PlotStatus::Booked => stats.booked += 1,
                    PlotStatus::Sold => stats.sold += 1,
                }
                stats
            })
    }
}
