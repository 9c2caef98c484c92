// Repository trait for telemetry data access
use crate::domain::telemetry::{SeriesTable, TimeSeriesQuery};
use async_trait::async_trait;
use thiserror::Error;

/// A recoverable failure while querying the time-series store
/// (unreachable host, rejected credentials, malformed query). Carries the
/// measurement so the caller can report it without aborting independent
/// queries.
#[derive(Debug, Error)]
#[error("telemetry query for '{measurement}' failed: {cause:#}")]
pub struct QueryFailure {
    pub measurement: String,
    pub cause: anyhow::Error,
}

impl QueryFailure {
    pub fn new(measurement: impl Into<String>, cause: anyhow::Error) -> Self {
        Self {
            measurement: measurement.into(),
            cause,
        }
    }
}

#[async_trait]
pub trait TelemetryRepository: Send + Sync {
    /// Fetch the normalized series for one measurement over the trailing
    /// window `[now - range_minutes, now]`. A window with no matching
    /// data yields an empty table, not an error.
    async fn fetch_series(&self, query: &TimeSeriesQuery) -> Result<SeriesTable, QueryFailure>;
}
