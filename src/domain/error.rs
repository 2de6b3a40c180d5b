// Domain error types
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A status edit targeted a plot id that is not part of the dashboard.
    #[error("plot '{plot_id}' not found in dashboard")]
    PlotNotFound { plot_id: String },

    #[error("dashboard '{0}' not found")]
    DashboardNotFound(String),

    #[error("invalid image data URI: {0}")]
    InvalidDataUri(String),

    /// Another upload is still being processed.
    #[error("an upload is already being processed")]
    PipelineBusy,
}
