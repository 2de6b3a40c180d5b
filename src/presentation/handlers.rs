// Command handlers for the local front-end
use crate::application::dashboard_service::{ImageUpload, InventoryUpload, PendingUpload};
use crate::domain::dashboard::{Dashboard, SummaryStats};
use crate::domain::plot::{EnrichedPlot, PlotStatus, StatusFilter};
use crate::presentation::app_state::AppState;
use crate::presentation::map_session::{MapSession, PointerButton};
use crate::presentation::selection::visible_plots;
use crate::presentation::viewport::Point;
use anyhow::Context;
use bytes::Bytes;
use std::path::{Path, PathBuf};
use uuid::Uuid;

const PROCESSING_FAILED: &str = "An error occurred while processing the files. Please try again.";

/// Pointer probe against a dashboard's map
#[derive(Debug, Clone, Default)]
pub struct ProbeRequest {
    pub at: Point,
    pub zoom_steps: i32,
    pub wheel: Option<f64>,
    pub reset: bool,
    pub filter: StatusFilter,
    pub select: Option<String>,
    pub click: bool,
    /// Status applied to the selected plot after the pointer actions
    pub status: Option<PlotStatus>,
    pub leave: bool,
}

/// List saved dashboards
pub async fn list_dashboards(state: &AppState) -> anyhow::Result<()> {
    let dashboards = state.dashboard_service.list().await?;
    if dashboards.is_empty() {
        println!("No dashboards found. Upload a layout to get started.");
        return Ok(());
    }

    for dashboard in dashboards {
        println!(
            "{}  {}  {}  {} plots",
            dashboard.id,
            dashboard.created_at.format("%Y-%m-%d"),
            dashboard.name,
            dashboard.plots.len()
        );
    }
    Ok(())
}

/// Run the upload pipeline and (unless `dry_run`) save the new dashboard
pub async fn process_upload(
    state: &AppState,
    image: &Path,
    inventory: &Path,
    dry_run: bool,
) -> anyhow::Result<()> {
    let dashboard = match run_pipeline(state, image, inventory).await {
        Ok(dashboard) => dashboard,
        Err(e) => {
            tracing::error!("Processing error: {:#}", e);
            return Err(anyhow::anyhow!(PROCESSING_FAILED));
        }
    };

    if !dry_run {
        state.dashboard_service.save(&dashboard).await?;
    }

    println!("{} ({})", dashboard.name, dashboard.id);
    print_summary(&dashboard.summary());
    Ok(())
}

async fn run_pipeline(state: &AppState, image: &Path, inventory: &Path) -> anyhow::Result<Dashboard> {
    let image_bytes = tokio::fs::read(image)
        .await
        .with_context(|| format!("Failed to read {}", image.display()))?;
    let inventory_text = tokio::fs::read_to_string(inventory)
        .await
        .with_context(|| format!("Failed to read {}", inventory.display()))?;

    let pending = PendingUpload {
        image: Some(ImageUpload {
            file_name: file_name(image),
            bytes: Bytes::from(image_bytes),
        }),
        inventory: Some(InventoryUpload {
            file_name: file_name(inventory),
            text: inventory_text,
        }),
    };
    let upload = pending
        .into_ready()
        .context("Both a layout image and an inventory file are required")?;

    state.dashboard_service.process(upload).await
}

/// Print summary and the plots passing `filter`
pub async fn show_dashboard(state: &AppState, id: Uuid, filter: StatusFilter) -> anyhow::Result<()> {
    let dashboard = state.dashboard_service.open(id).await?;

    println!("{} ({})", dashboard.name, dashboard.id);
    println!(
        "Layout {}, {} bytes",
        dashboard.layout_image.mime_type(),
        dashboard.layout_image.data().len()
    );
    print_summary(&dashboard.summary());
    println!();

    for plot in visible_plots(&dashboard, filter) {
        println!("{}", plot_line(plot));
    }
    Ok(())
}

pub async fn set_plot_status(
    state: &AppState,
    id: Uuid,
    plot_id: &str,
    status: PlotStatus,
) -> anyhow::Result<()> {
    let dashboard = state
        .dashboard_service
        .update_status(id, plot_id, status)
        .await?;

    if let Some(plot) = dashboard.find_plot(plot_id) {
        println!("{}", plot_line(plot));
    }
    print_summary(&dashboard.summary());
    Ok(())
}

/// Write the inventory CSV to `output` (a file or directory; defaults to the
/// current directory)
pub async fn export_inventory(
    state: &AppState,
    id: Uuid,
    output: Option<PathBuf>,
) -> anyhow::Result<()> {
    let export = state.dashboard_service.export(id).await?;

    let path = match output {
        Some(path) if path.is_dir() => path.join(&export.file_name),
        Some(path) => path,
        None => PathBuf::from(&export.file_name),
    };

    tokio::fs::write(&path, export.contents)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))?;

    tracing::info!("Exported dashboard {} to {}", id, path.display());
    println!("{}", path.display());
    Ok(())
}

pub async fn delete_dashboard(state: &AppState, id: Uuid) -> anyhow::Result<()> {
    state.dashboard_service.delete(id).await?;
    println!("Deleted {}", id);
    Ok(())
}

/// Open the map for a dashboard, point at a screen position and report what
/// the map shows there. A requested status edit on the selected plot is saved.
pub async fn probe_map(state: &AppState, id: Uuid, request: ProbeRequest) -> anyhow::Result<()> {
    let dashboard = state.dashboard_service.open(id).await?;
    let mut session = MapSession::new(dashboard, state.viewport.width, state.viewport.height);
    session.set_filter(request.filter);
    if let Some(plot_id) = request.select.as_deref() {
        session.select(Some(plot_id));
    }

    for _ in 0..request.zoom_steps.unsigned_abs() {
        if request.zoom_steps > 0 {
            session.zoom_in();
        } else {
            session.zoom_out();
        }
    }
    if let Some(delta) = request.wheel {
        session.wheel(request.at, delta);
    }
    if request.reset {
        session.reset_view();
    }

    session.pointer_moved(request.at);
    if request.click {
        session.pointer_pressed(request.at, PointerButton::Primary);
        session.pointer_released(request.at);
    }

    if let Some(status) = request.status {
        let plot_id = session
            .editable_plot()
            .map(|plot| plot.id().to_string())
            .context("No selected plot under the pointer to edit")?;
        session.edit_status(&plot_id, status)?;
        state.dashboard_service.save(&session.dashboard()).await?;
    }
    if request.leave {
        session.pointer_left();
    }

    let transform = session.viewport().transform();
    let content = session.viewport().screen_to_content(request.at);
    println!(
        "scale {:.3}  translate ({:.1}, {:.1})  content ({:.1}, {:.1})",
        session.viewport().scale(),
        transform.translate_x,
        transform.translate_y,
        content.x,
        content.y
    );

    print_summary(&session.summary());
    let overlay = session.overlay();
    let labelled = overlay.plots.iter().filter(|p| p.label.is_some()).count();
    println!(
        "{} plots drawn, {} labelled, stroke {:.2}",
        overlay.plots.len(),
        labelled,
        session.viewport().stroke_width()
    );

    let snapshot = session.dashboard();
    if let Some(selected) = session.selection().selected_plot(&snapshot) {
        println!("Selected plot {}", selected.id());
    }

    match session.display_plot() {
        Some(plot) => {
            let bbox = plot.bbox();
            let top_left = session
                .viewport()
                .content_to_screen(Point::new(bbox.xmin, bbox.ymin));
            let bottom_right = session
                .viewport()
                .content_to_screen(Point::new(bbox.xmax, bbox.ymax));
            for line in plot_details(plot) {
                println!("{}", line);
            }
            println!(
                "On screen ({:.1}, {:.1}) to ({:.1}, {:.1})",
                top_left.x, top_left.y, bottom_right.x, bottom_right.y
            );
            if session.editable_plot().is_some() {
                println!("Selected: status can be changed");
            }
        }
        None => println!("No plot under pointer"),
    }
    Ok(())
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn print_summary(stats: &SummaryStats) {
    println!(
        "Total {}  Available {}  Booked {}  Sold {}",
        stats.total, stats.available, stats.booked, stats.sold
    );
}

fn plot_line(plot: &EnrichedPlot) -> String {
    let inventory = plot.inventory.as_ref();
    format!(
        "{:<10} {:<9} {:>16} {:>12}",
        plot.id(),
        plot.effective_status(),
        inventory
            .and_then(|i| i.price)
            .map(format_price)
            .unwrap_or_else(|| "-".to_string()),
        inventory
            .and_then(|i| i.sq_ft)
            .map(|a| format!("{} sqft", a))
            .unwrap_or_else(|| "-".to_string()),
    )
}

/// Side panel contents for a plot
fn plot_details(plot: &EnrichedPlot) -> Vec<String> {
    let inventory = plot.inventory.as_ref();
    let mut lines = vec![
        format!("Plot {}", plot.id()),
        format!(
            "Status: {}",
            inventory.map(|i| i.status.as_str()).unwrap_or("Unknown")
        ),
        format!(
            "Area: {}",
            inventory
                .and_then(|i| i.sq_ft)
                .map(|a| format!("{} sq.ft", a))
                .unwrap_or_else(|| "N/A".to_string())
        ),
        format!(
            "Price: {}",
            inventory
                .and_then(|i| i.price)
                .map(format_price)
                .unwrap_or_else(|| "Contact for Price".to_string())
        ),
    ];

    if let Some(inv) = inventory.filter(|i| i.status != PlotStatus::Available) {
        lines.push(format!(
            "Customer: {}",
            inv.customer_name.as_deref().unwrap_or("Private")
        ));
    }
    lines
}

fn format_price(price: f64) -> String {
    let cents = (price.abs() * 100.0).round() as u64;
    let whole = (cents / 100).to_string();

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if price < 0.0 { "-" } else { "" };
    format!("{}${}.{:02}", sign, grouped, cents % 100)
}
