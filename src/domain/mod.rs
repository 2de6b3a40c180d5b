// Domain layer - Plot, inventory and dashboard models
pub mod dashboard;
pub mod error;
pub mod layout_image;
pub mod plot;
