// Telemetry data domain models
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

/// A range query for one measurement and one or more of its fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeSeriesQuery {
    pub measurement: String,
    pub fields: Vec<String>,
    pub range_minutes: u32,
}

impl TimeSeriesQuery {
    pub fn new(measurement: impl Into<String>, fields: Vec<String>, range_minutes: u32) -> Self {
        Self {
            measurement: measurement.into(),
            fields,
            range_minutes,
        }
    }
}

/// One pivoted row: a timestamp plus the field values the source reported
/// at that instant. Fields the source did not report are absent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sample {
    pub time: DateTime<Utc>,
    pub values: BTreeMap<String, f64>,
}

impl Sample {
    pub fn new(time: DateTime<Utc>, values: BTreeMap<String, f64>) -> Self {
        Self { time, values }
    }

    pub fn value(&self, field: &str) -> Option<f64> {
        self.values.get(field).copied()
    }
}

/// Summary statistics for one column, over the rows where it is present.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldStats {
    pub field: String,
    pub count: usize,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    pub latest: f64,
}

/// A normalized time-series table: rows ascending by timestamp, one row
/// per distinct timestamp, columns = the requested fields plus any
/// derived ones. A zero-row table is a valid "no data in window" state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesTable {
    columns: Vec<String>,
    rows: Vec<Sample>,
}

impl SeriesTable {
    pub fn empty(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Build a table from rows in source order. Rows are stable-sorted by
    /// timestamp; rows sharing a timestamp are merged, later-read values
    /// winning per field (last-inserted wins).
    pub fn from_unsorted(columns: Vec<String>, mut rows: Vec<Sample>) -> Self {
        rows.sort_by_key(|row| row.time);

        let mut merged: Vec<Sample> = Vec::with_capacity(rows.len());
        for row in rows {
            if let Some(last) = merged.last_mut() {
                if last.time == row.time {
                    last.values.extend(row.values);
                    continue;
                }
            }
            merged.push(row);
        }

        Self {
            columns,
            rows: merged,
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Sample] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The row with the maximum timestamp, if any.
    pub fn latest(&self) -> Option<&Sample> {
        self.rows.last()
    }

    /// The most recent reported value of `field`: rows are ascending, so
    /// this is the last row that carries the field.
    pub fn latest_value(&self, field: &str) -> Option<f64> {
        self.rows.iter().rev().find_map(|row| row.value(field))
    }

    /// Augmented copy with a per-row Euclidean norm of the three axis
    /// columns. The derived value is absent for rows missing any axis.
    pub fn with_magnitude(&self, axes: (&str, &str, &str), column: &str) -> SeriesTable {
        let mut derived = self.clone();
        if !derived.columns.iter().any(|c| c == column) {
            derived.columns.push(column.to_string());
        }

        for row in &mut derived.rows {
            if let (Some(x), Some(y), Some(z)) =
                (row.value(axes.0), row.value(axes.1), row.value(axes.2))
            {
                row.values
                    .insert(column.to_string(), (x * x + y * y + z * z).sqrt());
            }
        }

        derived
    }

    /// Count/mean/min/max/latest over the present values of `field`.
    /// None when the column has no values in this table.
    pub fn field_stats(&self, field: &str) -> Option<FieldStats> {
        let values: Vec<f64> = self.rows.iter().filter_map(|row| row.value(field)).collect();
        if values.is_empty() {
            return None;
        }

        let count = values.len();
        let sum: f64 = values.iter().sum();
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let latest = *values.last()?;

        Some(FieldStats {
            field: field.to_string(),
            count,
            mean: sum / count as f64,
            min,
            max,
            latest,
        })
    }
}
