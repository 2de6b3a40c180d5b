// Infrastructure layer - External dependencies and adapters
pub mod config;
pub mod gemini_extractor;
pub mod json_repository;
