// HTTP request handlers
use crate::domain::dashboard::Dashboard;
use crate::infrastructure::ndjson_stream::stream_from_receiver;
use crate::presentation::app_state::AppState;
use axum::{
    Json,
    extract::{Query, State},
    response::IntoResponse,
};
use serde::Deserialize;
use std::sync::Arc;

// Supported lookback window, matching the UI's range control
pub const MIN_RANGE_MINUTES: u32 = 10;
pub const MAX_RANGE_MINUTES: u32 = 180;
pub const DEFAULT_RANGE_MINUTES: u32 = 60;

#[derive(Deserialize)]
pub struct RangeQuery {
    pub minutes: Option<u32>,
}

fn clamp_range(minutes: Option<u32>) -> u32 {
    minutes
        .unwrap_or(DEFAULT_RANGE_MINUTES)
        .clamp(MIN_RANGE_MINUTES, MAX_RANGE_MINUTES)
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// Full dashboard document: every panel resolved, failures reported
/// per panel
pub async fn get_dashboard(
    Query(query): Query<RangeQuery>,
    State(state): State<Arc<AppState>>,
) -> Json<Dashboard> {
    let minutes = clamp_range(query.minutes);
    Json(state.dashboard_service.get_dashboard(minutes).await)
}

/// Stream the dashboard progressively (skeleton, panels, completion)
pub async fn stream_dashboard(
    Query(query): Query<RangeQuery>,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let minutes = clamp_range(query.minutes);
    let rx = state.streaming_service.stream_dashboard(minutes).await;
    stream_from_receiver(rx).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_range_defaults_and_bounds() {
        assert_eq!(clamp_range(None), 60);
        assert_eq!(clamp_range(Some(5)), 10);
        assert_eq!(clamp_range(Some(10)), 10);
        assert_eq!(clamp_range(Some(90)), 90);
        assert_eq!(clamp_range(Some(180)), 180);
        assert_eq!(clamp_range(Some(600)), 180);
    }
}
