// Presentation layer - Interactive map state and command handlers
pub mod app_state;
pub mod handlers;
pub mod map_session;
pub mod selection;
pub mod viewport;
