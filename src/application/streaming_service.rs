// Streaming dashboard service - Progressive loading over NDJSON
use crate::application::dashboard_service::{DashboardService, build_panel};
use crate::domain::dashboard::{CompletionSummary, DashboardEvent};
use std::time::Instant;
use tokio::sync::mpsc;

const EVENT_CHANNEL_CAPACITY: usize = 16;

#[derive(Clone)]
pub struct StreamingDashboardService {
    dashboard_service: DashboardService,
}

impl StreamingDashboardService {
    pub fn new(dashboard_service: DashboardService) -> Self {
        Self { dashboard_service }
    }

    /// Stream the dashboard progressively: the skeleton goes out
    /// immediately, each panel as its query completes, and a completion
    /// summary once every panel task has finished. The receiver closes
    /// after the completion event.
    pub async fn stream_dashboard(&self, range_minutes: u32) -> mpsc::Receiver<DashboardEvent> {
        let (tx, rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        let start_time = Instant::now();

        let skeleton = self.dashboard_service.skeleton(range_minutes);
        let total_panels = skeleton.panels.len();
        let _ = tx.send(DashboardEvent::Skeleton(skeleton)).await;

        let mut handles = Vec::with_capacity(total_panels);
        for config in &self.dashboard_service.panels_config().panels {
            let tx = tx.clone();
            let repository = self.dashboard_service.repository();
            let config = config.clone();

            handles.push(tokio::spawn(async move {
                let panel = build_panel(repository, config, range_minutes).await;
                let _ = tx.send(DashboardEvent::Panel(panel)).await;
            }));
        }

        tokio::spawn(async move {
            for handle in handles {
                let _ = handle.await;
            }

            let summary = CompletionSummary {
                panels: total_panels,
                duration_ms: start_time.elapsed().as_millis() as i64,
            };
            let _ = tx.send(DashboardEvent::Complete(summary)).await;
        });

        rx
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::dashboard_service::tests::{
        StubOutcome, StubRepository, panels_config, sample,
    };
    use crate::domain::dashboard::PanelOutcome;
    use crate::domain::telemetry::SeriesTable;
    use crate::infrastructure::config::PanelConfig;
    use std::sync::Arc;

    fn streaming_service(
        outcomes: Vec<(&str, StubOutcome)>,
        panels: Vec<PanelConfig>,
    ) -> StreamingDashboardService {
        StreamingDashboardService::new(DashboardService::new(
            Arc::new(StubRepository::new(outcomes)),
            panels_config(panels),
        ))
    }

    fn panel(id: &str, measurement: &str, fields: &[&str]) -> PanelConfig {
        PanelConfig {
            id: id.to_string(),
            title: id.to_string(),
            measurement: measurement.to_string(),
            fields: fields.iter().map(|f| f.to_string()).collect(),
            advisories: Vec::new(),
            magnitude: None,
        }
    }

    #[tokio::test]
    async fn test_stream_sends_skeleton_panels_then_completion() {
        let air = SeriesTable::from_unsorted(
            vec!["temperature".to_string()],
            vec![sample(10, &[("temperature", 21.0)])],
        );

        let service = streaming_service(
            vec![
                ("airSensor", StubOutcome::Table(air)),
                ("uv_sensor", StubOutcome::Fail("auth rejected".to_string())),
            ],
            vec![
                panel("air", "airSensor", &["temperature"]),
                panel("uv", "uv_sensor", &["uv_index"]),
            ],
        );

        let mut rx = service.stream_dashboard(60).await;
        let mut events = Vec::new();
        while let Some(event) = rx.recv().await {
            events.push(event);
        }

        assert_eq!(events.len(), 4);
        assert!(matches!(events.first(), Some(DashboardEvent::Skeleton(_))));
        match events.last() {
            Some(DashboardEvent::Complete(summary)) => assert_eq!(summary.panels, 2),
            other => panic!("expected completion event, got {other:?}"),
        }

        // One panel succeeded, one failed, both reported individually
        let panels: Vec<_> = events
            .iter()
            .filter_map(|event| match event {
                DashboardEvent::Panel(panel) => Some(panel),
                _ => None,
            })
            .collect();
        assert_eq!(panels.len(), 2);
        assert!(panels.iter().any(|p| matches!(p.outcome, PanelOutcome::Ready(_))));
        assert!(panels.iter().any(|p| matches!(p.outcome, PanelOutcome::Failed { .. })));
    }
}
