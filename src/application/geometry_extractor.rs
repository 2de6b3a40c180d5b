// Geometry extractor trait for plot detection on layout images
use crate::domain::layout_image::LayoutImage;
use crate::domain::plot::{BoundingBox, PlotGeometry};
use async_trait::async_trait;

const MOCK_ROWS: usize = 4;
const MOCK_COLS: usize = 5;

#[async_trait]
pub trait GeometryExtractor: Send + Sync {
    /// Detect labelled plots on the image, in detection order.
    ///
    /// Implementations are total: internal faults degrade to mock or empty
    /// output instead of surfacing an error.
    async fn detect(&self, image: &LayoutImage) -> Vec<PlotGeometry>;
}

/// Extractor used when no detection capability is configured.
#[derive(Debug, Clone, Default)]
pub struct MockGeometryExtractor;

#[async_trait]
impl GeometryExtractor for MockGeometryExtractor {
    async fn detect(&self, _image: &LayoutImage) -> Vec<PlotGeometry> {
        mock_geometry()
    }
}

/// Deterministic 4x5 grid of plots labelled `P-1`..`P-20`.
pub fn mock_geometry() -> Vec<PlotGeometry> {
    let mut plots = Vec::with_capacity(MOCK_ROWS * MOCK_COLS);
    for row in 0..MOCK_ROWS {
        for col in 0..MOCK_COLS {
            let (row, col) = (row as f64, col as f64);
            plots.push(PlotGeometry::new(
                format!("P-{}", plots.len() + 1),
                BoundingBox::new(
                    100.0 + row * 200.0,
                    50.0 + col * 180.0,
                    250.0 + row * 200.0,
                    200.0 + col * 180.0,
                ),
            ));
        }
    }
    plots
}
