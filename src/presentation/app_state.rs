// Application state shared by the command handlers
use crate::application::dashboard_service::DashboardService;
use crate::infrastructure::config::ViewportSettings;

#[derive(Clone)]
pub struct AppState {
    pub dashboard_service: DashboardService,
    pub viewport: ViewportSettings,
}
