// Plot domain models
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Edge length of the normalized content square plot boxes live in.
pub const CONTENT_SIZE: f64 = 1000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlotStatus {
    Available,
    Booked,
    Sold,
}

impl PlotStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlotStatus::Available => "Available",
            PlotStatus::Booked => "Booked",
            PlotStatus::Sold => "Sold",
        }
    }

    /// Loose classification used for spreadsheet cells ("SOLD OUT", "booking", ...)
    pub fn classify(raw: &str) -> Self {
        let raw = raw.to_lowercase();
        if raw.contains("sold") {
            PlotStatus::Sold
        } else if raw.contains("book") {
            PlotStatus::Booked
        } else {
            PlotStatus::Available
        }
    }
}

impl fmt::Display for PlotStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlotStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "available" => Ok(PlotStatus::Available),
            "booked" => Ok(PlotStatus::Booked),
            "sold" => Ok(PlotStatus::Sold),
            other => Err(format!("unknown plot status '{}'", other)),
        }
    }
}

/// Status filter applied to the map overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Only(PlotStatus),
}

impl StatusFilter {
    pub fn matches(&self, status: PlotStatus) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Only(wanted) => *wanted == status,
        }
    }
}

impl FromStr for StatusFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            return Ok(StatusFilter::All);
        }
        s.parse().map(StatusFilter::Only)
    }
}

/// Normalized box `[ymin, xmin, ymax, xmax]` in content units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 4]", into = "[f64; 4]")]
pub struct BoundingBox {
    pub ymin: f64,
    pub xmin: f64,
    pub ymax: f64,
    pub xmax: f64,
}

impl BoundingBox {
    pub fn new(ymin: f64, xmin: f64, ymax: f64, xmax: f64) -> Self {
        Self {
            ymin,
            xmin,
            ymax,
            xmax,
        }
    }

    // Degenerate boxes collapse to zero rather than going negative.
    pub fn width(&self) -> f64 {
        (self.xmax - self.xmin).max(0.0)
    }

    pub fn height(&self) -> f64 {
        (self.ymax - self.ymin).max(0.0)
    }

    pub fn is_degenerate(&self) -> bool {
        !(self.ymin < self.ymax && self.xmin < self.xmax)
    }

    pub fn center(&self) -> (f64, f64) {
        (
            self.xmin + self.width() / 2.0,
            self.ymin + self.height() / 2.0,
        )
    }

    /// Edge-inclusive containment test; degenerate boxes contain nothing.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        !self.is_degenerate() && x >= self.xmin && x <= self.xmax && y >= self.ymin && y <= self.ymax
    }
}

impl From<[f64; 4]> for BoundingBox {
    fn from(b: [f64; 4]) -> Self {
        BoundingBox::new(b[0], b[1], b[2], b[3])
    }
}

impl From<BoundingBox> for [f64; 4] {
    fn from(b: BoundingBox) -> Self {
        [b.ymin, b.xmin, b.ymax, b.xmax]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlotGeometry {
    pub id: String,
    #[serde(rename = "box_2d")]
    pub bbox: BoundingBox,
}

impl PlotGeometry {
    pub fn new(id: impl Into<String>, bbox: BoundingBox) -> Self {
        Self {
            id: id.into(),
            bbox,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryRecord {
    pub plot_id: String,
    pub status: PlotStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sq_ft: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_name: Option<String>,
}

impl InventoryRecord {
    /// Record carrying only an id and a status, as synthesized for plots
    /// that were detected but never listed in the spreadsheet.
    pub fn bare(plot_id: impl Into<String>, status: PlotStatus) -> Self {
        Self {
            plot_id: plot_id.into(),
            status,
            price: None,
            sq_ft: None,
            customer_name: None,
        }
    }
}

/// Normalizes a plot label for identity comparison.
pub fn plot_key(label: &str) -> String {
    label.trim().to_lowercase()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedPlot {
    #[serde(flatten)]
    pub geometry: PlotGeometry,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inventory: Option<InventoryRecord>,
}

impl EnrichedPlot {
    pub fn new(geometry: PlotGeometry, inventory: Option<InventoryRecord>) -> Self {
        Self {
            geometry,
            inventory,
        }
    }

    pub fn id(&self) -> &str {
        &self.geometry.id
    }

    pub fn bbox(&self) -> &BoundingBox {
        &self.geometry.bbox
    }

    /// Status shown on the map; plots without inventory read as available.
    pub fn effective_status(&self) -> PlotStatus {
        self.inventory
            .as_ref()
            .map(|inv| inv.status)
            .unwrap_or(PlotStatus::Available)
    }

    /// Returns a copy with the inventory replaced by one carrying `status`.
    pub fn with_status(&self, status: PlotStatus) -> Self {
        let inventory = match &self.inventory {
            Some(existing) => InventoryRecord {
                status,
                ..existing.clone()
            },
            None => InventoryRecord::bare(self.geometry.id.clone(), status),
        };

        Self {
            geometry: self.geometry.clone(),
            inventory: Some(inventory),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_status() {
        assert_eq!(PlotStatus::classify("Sold"), PlotStatus::Sold);
        assert_eq!(PlotStatus::classify("SOLD OUT"), PlotStatus::Sold);
        assert_eq!(PlotStatus::classify("booked"), PlotStatus::Booked);
        assert_eq!(PlotStatus::classify("Booking pending"), PlotStatus::Booked);
        assert_eq!(PlotStatus::classify("open"), PlotStatus::Available);
        assert_eq!(PlotStatus::classify(""), PlotStatus::Available);
    }

    #[test]
    fn test_status_filter_parse() {
        assert_eq!("all".parse::<StatusFilter>(), Ok(StatusFilter::All));
        assert_eq!(
            "Sold".parse::<StatusFilter>(),
            Ok(StatusFilter::Only(PlotStatus::Sold))
        );
        assert!("pending".parse::<StatusFilter>().is_err());
    }

    #[test]
    fn test_degenerate_box_is_safe() {
        let bbox = BoundingBox::new(100.0, 200.0, 50.0, 200.0);
        assert!(bbox.is_degenerate());
        assert_eq!(bbox.width(), 0.0);
        assert_eq!(bbox.height(), 0.0);
        assert!(!bbox.contains(200.0, 75.0));
    }

    #[test]
    fn test_contains_is_edge_inclusive() {
        let bbox = BoundingBox::new(0.0, 0.0, 100.0, 100.0);
        assert!(bbox.contains(0.0, 0.0));
        assert!(bbox.contains(100.0, 100.0));
        assert!(!bbox.contains(100.1, 50.0));
    }

    #[test]
    fn test_enriched_plot_wire_shape() {
        let plot = EnrichedPlot::new(
            PlotGeometry::new("P-1", BoundingBox::new(0.0, 10.0, 100.0, 110.0)),
            None,
        );
        let json = serde_json::to_value(&plot).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "id": "P-1", "box_2d": [0.0, 10.0, 100.0, 110.0] })
        );

        let with_inventory = plot.with_status(PlotStatus::Booked);
        let json = serde_json::to_value(&with_inventory).unwrap();
        assert_eq!(json["inventory"]["plotId"], "P-1");
        assert_eq!(json["inventory"]["status"], "Booked");
        assert!(json["inventory"].get("price").is_none());
    }

    #[test]
    fn test_with_status_keeps_other_fields() {
        let plot = EnrichedPlot::new(
            PlotGeometry::new("A1", BoundingBox::new(0.0, 0.0, 10.0, 10.0)),
            Some(InventoryRecord {
                plot_id: "a1".to_string(),
                status: PlotStatus::Available,
                price: Some(500000.0),
                sq_ft: Some(1200.0),
                customer_name: Some("Asha".to_string()),
            }),
        );

        let sold = plot.with_status(PlotStatus::Sold);
        let inventory = sold.inventory.unwrap();
        assert_eq!(inventory.status, PlotStatus::Sold);
        assert_eq!(inventory.plot_id, "a1");
        assert_eq!(inventory.price, Some(500000.0));
        assert_eq!(inventory.sq_ft, Some(1200.0));
        assert_eq!(inventory.customer_name.as_deref(), Some("Asha"));
    }
}
