// Application layer - Use cases over the repository seam
pub mod dashboard_service;
pub mod streaming_service;
pub mod telemetry_repository;
