// Plot merger - Joins detected geometry with inventory records
use crate::domain::plot::{EnrichedPlot, InventoryRecord, PlotGeometry, plot_key};
use std::collections::HashMap;

/// Pairs each geometry entry with the first inventory record whose id matches
/// it (trimmed, case-insensitive). Geometry order and ids are kept as given;
/// inventory rows that match no geometry are dropped.
pub fn merge(geometries: &[PlotGeometry], inventory: &[InventoryRecord]) -> Vec<EnrichedPlot> {
    // First occurrence wins, so later duplicates never overwrite an entry.
    let mut by_key: HashMap<String, &InventoryRecord> = HashMap::with_capacity(inventory.len());
    for record in inventory {
        by_key.entry(plot_key(&record.plot_id)).or_insert(record);
    }

    let plots: Vec<EnrichedPlot> = geometries
        .iter()
        .map(|geometry| {
            let matched = by_key.get(&plot_key(&geometry.id)).map(|r| (*r).clone());
            EnrichedPlot::new(geometry.clone(), matched)
        })
        .collect();

    let matched = plots.iter().filter(|p| p.inventory.is_some()).count();
    tracing::debug!(
        "Merged {} geometries with {} inventory records ({} matched, {} unmatched records dropped)",
        geometries.len(),
        inventory.len(),
        matched,
        inventory.len().saturating_sub(matched)
    );

    plots
}
