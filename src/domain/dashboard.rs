// Dashboard domain model
use super::advisory::Advisory;
use super::telemetry::{FieldStats, SeriesTable};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub title: String,
    pub range_minutes: u32,
    pub panels: Vec<MeasurementPanel>,
}

/// One configured measurement's dashboard unit. Each panel resolves
/// independently: one measurement failing or having no data never hides
/// another's result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MeasurementPanel {
    pub id: String,
    pub title: String,
    pub measurement: String,
    #[serde(flatten)]
    pub outcome: PanelOutcome,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PanelOutcome {
    Ready(PanelData),
    NoData,
    Failed { error: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PanelData {
    pub table: SeriesTable,
    pub stats: Vec<FieldStats>,
    pub advisories: Vec<Advisory>,
}

/// Layout descriptor streamed before any data so a client can render
/// placeholders while the panel queries run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSkeleton {
    pub title: String,
    pub range_minutes: u32,
    pub panels: Vec<PanelDescriptor>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PanelDescriptor {
    pub id: String,
    pub title: String,
    pub measurement: String,
    pub columns: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionSummary {
    pub panels: usize,
    pub duration_ms: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum DashboardEvent {
    Skeleton(DashboardSkeleton),
    Panel(MeasurementPanel),
    Complete(CompletionSummary),
}
