// Status editor - Copy-on-write status updates on a dashboard snapshot
use crate::domain::dashboard::Dashboard;
use crate::domain::error::DomainError;
use crate::domain::plot::PlotStatus;
use std::sync::Arc;

/// Returns a new dashboard with the status of `plot_id` set to `status`.
///
/// Untouched plots are shared with `dashboard` (same `Arc`), so holders of the
/// previous snapshot never observe the change. Plots without inventory get a
/// bare record synthesized from their geometry id.
pub fn set_status(
    dashboard: &Dashboard,
    plot_id: &str,
    status: PlotStatus,
) -> Result<Dashboard, DomainError> {
    if dashboard.find_plot(plot_id).is_none() {
        tracing::error!(
            "Status edit for unknown plot {} in dashboard {}",
            plot_id,
            dashboard.id
        );
        return Err(DomainError::PlotNotFound {
            plot_id: plot_id.to_string(),
        });
    }

    let plots = dashboard
        .plots
        .iter()
        .map(|plot| {
            if plot.id() == plot_id {
                Arc::new(plot.with_status(status))
            } else {
                Arc::clone(plot)
            }
        })
        .collect();

    tracing::debug!("Plot {} set to {}", plot_id, status);

    Ok(Dashboard {
        plots,
        ..dashboard.clone()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::layout_image::LayoutImage;
    use crate::domain::plot::{BoundingBox, EnrichedPlot, InventoryRecord, PlotGeometry};

    fn dashboard() -> Dashboard {
        let priced = InventoryRecord {
            plot_id: "P-1".to_string(),
            status: PlotStatus::Available,
            price: Some(500000.0),
            sq_ft: Some(1500.0),
            customer_name: None,
        };
        Dashboard::new(
            "Test Dashboard".to_string(),
            LayoutImage::new("image/png", vec![0]),
            vec![
                EnrichedPlot::new(
                    PlotGeometry::new("P-1", BoundingBox::new(0.0, 0.0, 100.0, 100.0)),
                    Some(priced),
                ),
                EnrichedPlot::new(
                    PlotGeometry::new("P-2", BoundingBox::new(0.0, 100.0, 100.0, 200.0)),
                    None,
                ),
            ],
        )
    }

    #[test]
    fn test_preserves_unrelated_fields() {
        let edited = set_status(&dashboard(), "P-1", PlotStatus::Sold).unwrap();
        let inventory = edited.plots[0].inventory.as_ref().unwrap();
        assert_eq!(inventory.status, PlotStatus::Sold);
        assert_eq!(inventory.price, Some(500000.0));
        assert_eq!(inventory.sq_ft, Some(1500.0));
    }

    #[test]
    fn test_synthesizes_missing_inventory() {
        let edited = set_status(&dashboard(), "P-2", PlotStatus::Booked).unwrap();
        assert_eq!(
            edited.plots[1].inventory,
            Some(InventoryRecord::bare("P-2", PlotStatus::Booked))
        );
    }

    #[test]
    fn test_shares_untouched_plots_and_leaves_original_alone() {
        let original = dashboard();
        let edited = set_status(&original, "P-2", PlotStatus::Sold).unwrap();

        assert!(Arc::ptr_eq(&original.plots[0], &edited.plots[0]));
        assert!(!Arc::ptr_eq(&original.plots[1], &edited.plots[1]));
        assert!(original.plots[1].inventory.is_none());
        assert_eq!(edited.id, original.id);
        assert_eq!(edited.name, original.name);
    }

    #[test]
    fn test_is_idempotent() {
        let once = set_status(&dashboard(), "P-2", PlotStatus::Sold).unwrap();
        let twice = set_status(&once, "P-2", PlotStatus::Sold).unwrap();
        assert_eq!(
            serde_json::to_vec(&once).unwrap(),
            serde_json::to_vec(&twice).unwrap()
        );
    }

    #[test]
    fn test_unknown_plot_is_an_error() {
        let result = set_status(&dashboard(), "p-1", PlotStatus::Sold);
        assert_eq!(
            result,
            Err(DomainError::PlotNotFound {
                plot_id: "p-1".to_string()
            })
        );
    }
}
