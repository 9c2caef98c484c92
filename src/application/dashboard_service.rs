// Dashboard service - Use case for building dashboards
use crate::application::telemetry_repository::TelemetryRepository;
use crate::domain::advisory::{Advisory, AdvisoryRule, advise};
use crate::domain::dashboard::{
    Dashboard, DashboardSkeleton, MeasurementPanel, PanelData, PanelDescriptor, PanelOutcome,
};
use crate::domain::telemetry::{SeriesTable, TimeSeriesQuery};
use crate::infrastructure::config::{AdvisoryConfig, PanelConfig, PanelsConfig};
use std::sync::Arc;

#[derive(Clone)]
pub struct DashboardService {
    repository: Arc<dyn TelemetryRepository>,
    panels_config: PanelsConfig,
}

impl DashboardService {
    pub fn new(repository: Arc<dyn TelemetryRepository>, panels_config: PanelsConfig) -> Self {
        Self {
            repository,
            panels_config,
        }
    }

    pub fn panels_config(&self) -> &PanelsConfig {
        &self.panels_config
    }

    pub fn repository(&self) -> Arc<dyn TelemetryRepository> {
        self.repository.clone()
    }

    pub fn skeleton(&self, range_minutes: u32) -> DashboardSkeleton {
        DashboardSkeleton {
            title: self.title(range_minutes),
            range_minutes,
            panels: self
                .panels_config
                .panels
                .iter()
                .map(|panel| PanelDescriptor {
                    id: panel.id.clone(),
                    title: panel.title.clone(),
                    measurement: panel.measurement.clone(),
                    columns: panel.columns(),
                })
                .collect(),
        }
    }

    /// Build every configured panel concurrently. The panel queries are
    /// independent and order-insensitive; one failing never aborts the
    /// others.
    pub async fn get_dashboard(&self, range_minutes: u32) -> Dashboard {
        let panel_futures = self
            .panels_config
            .panels
            .iter()
            .map(|config| build_panel(self.repository.clone(), config.clone(), range_minutes));
        let panels = futures::future::join_all(panel_futures).await;

        Dashboard {
            title: self.title(range_minutes),
            range_minutes,
            panels,
        }
    }

    fn title(&self, range_minutes: u32) -> String {
        format!("{} (last {}m)", self.panels_config.title, range_minutes)
    }
}

/// Resolve one panel: query, derive, summarize, advise. Failures and
/// empty windows fold into the panel outcome instead of propagating.
pub(crate) async fn build_panel(
    repository: Arc<dyn TelemetryRepository>,
    config: PanelConfig,
    range_minutes: u32,
) -> MeasurementPanel {
    let query = TimeSeriesQuery::new(
        config.measurement.clone(),
        config.fields.clone(),
        range_minutes,
    );

    let outcome = match repository.fetch_series(&query).await {
        Err(failure) => {
            tracing::warn!("panel {} query failed: {}", config.id, failure);
            PanelOutcome::Failed {
                error: failure.to_string(),
            }
        }
        Ok(table) if table.is_empty() => PanelOutcome::NoData,
        Ok(table) => {
            let table = match &config.magnitude {
                Some(magnitude) => table.with_magnitude(
                    (
                        magnitude.axes[0].as_str(),
                        magnitude.axes[1].as_str(),
                        magnitude.axes[2].as_str(),
                    ),
                    &magnitude.column,
                ),
                None => table,
            };

            let stats = table
                .columns()
                .iter()
                .filter_map(|column| table.field_stats(column))
                .collect();
            let advisories = advisories_for(&table, &config.advisories);

            PanelOutcome::Ready(PanelData {
                table,
                stats,
                advisories,
            })
        }
    };

    MeasurementPanel {
        id: config.id,
        title: config.title,
        measurement: config.measurement,
        outcome,
    }
}

fn advisories_for(table: &SeriesTable, configs: &[AdvisoryConfig]) -> Vec<Advisory> {
    let mut advisories = Vec::new();

    for config in configs {
        let Some(rule) = parse_rule(&config.rule) else {
            tracing::warn!(
                "unknown advisory rule '{}' for field '{}'",
                config.rule,
                config.field
            );
            continue;
        };

        match advise(table, &config.field, rule) {
            Ok(advisory) => advisories.push(advisory),
            Err(e) => tracing::debug!("skipping advisory: {}", e),
        }
    }

    advisories
}

fn parse_rule(rule: &str) -> Option<AdvisoryRule> {
    match rule {
        "humidity" => Some(AdvisoryRule::Humidity),
        "uv" => Some(AdvisoryRule::Uv),
        _ => None,
    }
}
