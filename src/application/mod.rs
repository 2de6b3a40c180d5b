// Application layer - Use cases and collaborator interfaces
pub mod csv_export;
pub mod dashboard_repository;
pub mod dashboard_service;
pub mod geometry_extractor;
pub mod inventory_parser;
pub mod plot_merger;
pub mod status_editor;
