// Main entry point - Dependency injection and command dispatch
mod domain;
mod application;
mod infrastructure;
mod presentation;

use std::{path::PathBuf, sync::Arc};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use crate::application::dashboard_service::DashboardService;
use crate::application::geometry_extractor::{GeometryExtractor, MockGeometryExtractor};
use crate::domain::plot::{PlotStatus, StatusFilter};
use crate::infrastructure::config::{AppConfig, load_app_config};
use crate::infrastructure::gemini_extractor::GeminiExtractor;
use crate::infrastructure::json_repository::JsonFileRepository;
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{self, ProbeRequest};
use crate::presentation::viewport::Point;

#[derive(Parser, Debug)]
#[command(author, version, about = "Real-estate layout maps from images and inventory sheets", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List saved dashboards
    List,
    /// Detect plots on a layout image, merge them with an inventory CSV and save the dashboard
    Process {
        #[arg(long)]
        image: PathBuf,
        #[arg(long)]
        inventory: PathBuf,
        /// Build the dashboard without saving it
        #[arg(long)]
        dry_run: bool,
    },
    /// Show the summary and plot list of a dashboard
    Show {
        id: Uuid,
        #[arg(long, default_value = "all")]
        filter: StatusFilter,
    },
    /// Change one plot's status and save the dashboard
    SetStatus {
        id: Uuid,
        plot: String,
        status: PlotStatus,
    },
    /// Export a dashboard's inventory as CSV
    Export {
        id: Uuid,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Delete a saved dashboard
    Delete { id: Uuid },
    /// Point at a screen position on the map and show what is there
    Probe {
        id: Uuid,
        #[arg(long)]
        x: f64,
        #[arg(long)]
        y: f64,
        /// Zoom button presses before probing (negative zooms out)
        #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
        zoom: i32,
        /// Wheel delta applied at the position (negative zooms in)
        #[arg(long, allow_hyphen_values = true)]
        wheel: Option<f64>,
        /// Reset zoom and pan after zooming
        #[arg(long)]
        reset: bool,
        #[arg(long, default_value = "all")]
        filter: StatusFilter,
        /// Plot to select before probing
        #[arg(long)]
        select: Option<String>,
        /// Also click at the position
        #[arg(long)]
        click: bool,
        /// Set the status of the selected plot and save the dashboard
        #[arg(long)]
        status: Option<PlotStatus>,
        /// Move the pointer off the map before reporting
        #[arg(long)]
        leave: bool,
    },
}

fn build_extractor(config: &AppConfig) -> anyhow::Result<Arc<dyn GeometryExtractor>> {
    match config.gemini.configured_key() {
        Some(key) => Ok(Arc::new(GeminiExtractor::new(key.to_string(), &config.gemini)?)),
        None => {
            tracing::warn!("Gemini API key not configured. Using mock plot data.");
            Ok(Arc::new(MockGeometryExtractor))
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    // Load configuration
    let config = load_app_config()?;

    // Create adapters (infrastructure layer)
    let repository = Arc::new(JsonFileRepository::new(&config.storage.data_dir));
    tracing::debug!("Dashboards stored in {}", repository.path().display());
    let extractor = build_extractor(&config)?;

    // Create services (application layer)
    let dashboard_service = DashboardService::new(repository, extractor);

    let state = AppState {
        dashboard_service,
        viewport: config.viewport.clone(),
    };

    // Dispatch (presentation layer)
    match args.command {
        Command::List => handlers::list_dashboards(&state).await,
        Command::Process {
            image,
            inventory,
            dry_run,
        } => handlers::process_upload(&state, &image, &inventory, dry_run).await,
        Command::Show { id, filter } => handlers::show_dashboard(&state, id, filter).await,
        Command::SetStatus { id, plot, status } => {
            handlers::set_plot_status(&state, id, &plot, status).await
        }
        Command::Export { id, output } => handlers::export_inventory(&state, id, output).await,
        Command::Delete { id } => handlers::delete_dashboard(&state, id).await,
        Command::Probe {
            id,
            x,
            y,
            zoom,
            wheel,
            reset,
            filter,
            select,
            click,
            status,
            leave,
        } => {
            let request = ProbeRequest {
                at: Point::new(x, y),
                zoom_steps: zoom,
                wheel,
                reset,
                filter,
                select,
                click,
                status,
                leave,
            };
            handlers::probe_map(&state, id, request).await
        }
    }
}
