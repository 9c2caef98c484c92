// Domain layer - Request-scoped value objects, no I/O
pub mod advisory;
pub mod dashboard;
pub mod telemetry;
