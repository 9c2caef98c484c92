// Infrastructure layer - External dependencies and adapters
pub mod annotated_csv;
pub mod config;
pub mod influx_repository;
pub mod ndjson_stream;
