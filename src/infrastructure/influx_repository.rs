// InfluxDB repository implementation
use crate::application::telemetry_repository::{QueryFailure, TelemetryRepository};
use crate::domain::telemetry::{SeriesTable, TimeSeriesQuery};
use crate::infrastructure::annotated_csv::parse_series;
use crate::infrastructure::config::InfluxSettings;
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct InfluxRepository {
    // Built once per process and reused across queries
    http: reqwest::Client,
    url: String,
    token: String,
    org: String,
    bucket: String,
}

impl InfluxRepository {
    pub fn new(settings: &InfluxSettings) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.query_timeout_secs))
            .build()
            .context("failed to build HTTP client for the time-series store")?;

        Ok(Self {
            http,
            url: settings.url.trim_end_matches('/').to_string(),
            token: settings.token.clone(),
            org: settings.org.clone(),
            bucket: settings.bucket.clone(),
        })
    }

    fn query_url(&self) -> String {
        format!(
            "{}/api/v2/query?org={}",
            self.url,
            urlencoding::encode(&self.org)
        )
    }

    /// Range-filter-pivot-sort query for one measurement: each distinct
    /// timestamp becomes one row with one column per field.
    fn build_flux(&self, query: &TimeSeriesQuery) -> String {
        let filters = query
            .fields
            .iter()
            .map(|field| format!(r#"r["_field"] == "{}""#, escape(field)))
            .collect::<Vec<_>>()
            .join(" or ");

        format!(
            r#"from(bucket: "{bucket}")
  |> range(start: -{range}m)
  |> filter(fn: (r) => r["_measurement"] == "{measurement}" and ({filters}))
  |> pivot(rowKey:["_time"], columnKey: ["_field"], valueColumn: "_value")
  |> sort(columns: ["_time"])"#,
            bucket = escape(&self.bucket),
            range = query.range_minutes,
            measurement = escape(&query.measurement),
        )
    }

    async fn execute(&self, flux: String) -> Result<String> {
        let response = self
            .http
            .post(self.query_url())
            .header("Authorization", format!("Token {}", self.token))
            .header("Content-Type", "application/vnd.flux")
            .header("Accept", "application/csv")
            .body(flux)
            .send()
            .await
            .context("failed to reach the time-series store")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!(
                "store rejected query with status {}: {}",
                status,
                store_error_message(&body)
            );
        }

        response
            .text()
            .await
            .context("failed to read query response body")
    }
}

#[async_trait]
impl TelemetryRepository for InfluxRepository {
    async fn fetch_series(&self, query: &TimeSeriesQuery) -> Result<SeriesTable, QueryFailure> {
        if query.fields.is_empty() {
            return Err(QueryFailure::new(
                &query.measurement,
                anyhow::anyhow!("no fields requested"),
            ));
        }

        let flux = self.build_flux(query);
        tracing::debug!("executing flux query:\n{}", flux);

        let body = self
            .execute(flux)
            .await
            .map_err(|e| QueryFailure::new(&query.measurement, e))?;
        let rows =
            parse_series(&body, &query.fields).map_err(|e| QueryFailure::new(&query.measurement, e))?;

        tracing::debug!(
            "measurement {} returned {} rows",
            query.measurement,
            rows.len()
        );
        Ok(SeriesTable::from_unsorted(query.fields.clone(), rows))
    }
}

fn escape(literal: &str) -> String {
    literal.replace('\\', "\\\\").replace('"', "\\\"")
}

/// The store answers errors as JSON {"code": ..., "message": ...}
fn store_error_message(body: &str) -> String {
    #[derive(Deserialize)]
    struct ErrorBody {
        message: String,
    }

    match serde_json::from_str::<ErrorBody>(body) {
        Ok(error) => error.message,
        Err(_) => body.trim().to_string(),
    }
}
