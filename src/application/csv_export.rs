// CSV export of dashboard inventory
use crate::domain::dashboard::Dashboard;
use crate::domain::plot::{InventoryRecord, PlotStatus};

pub const CSV_HEADER: &str = "plotId,status,price,sqFt,customerName";

/// One inventory row per plot. Plots without inventory get an available row.
pub fn export_rows(dashboard: &Dashboard) -> Vec<InventoryRecord> {
    dashboard
        .plots
        .iter()
        .map(|plot| {
            plot.inventory
                .clone()
                .unwrap_or_else(|| InventoryRecord::bare(plot.id(), PlotStatus::Available))
        })
        .collect()
}

pub fn to_csv(rows: &[InventoryRecord]) -> String {
    let mut out = String::from(CSV_HEADER);
    out.push('\n');

    for row in rows {
        let fields = [
            escape(&row.plot_id),
            row.status.to_string(),
            row.price.map(|v| v.to_string()).unwrap_or_default(),
            row.sq_ft.map(|v| v.to_string()).unwrap_or_default(),
            row.customer_name.as_deref().map(escape).unwrap_or_default(),
        ];
        out.push_str(&fields.join(","));
        out.push('\n');
    }

    out
}

fn escape(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
