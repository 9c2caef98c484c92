// Care advisory domain model and threshold classifiers
use crate::domain::telemetry::SeriesTable;
use serde::Serialize;
use thiserror::Error;

/// Raised when classification is requested but no sample carries the
/// metric. Callers check emptiness before classifying.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("no samples available to classify '{metric}'")]
pub struct EmptyInput {
    pub metric: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AdvisoryCategory {
    Low,
    Optimal,
    High,
    Adequate,
}

/// A discrete care recommendation derived from the latest sensor value.
/// Computed fresh per request, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Advisory {
    pub metric: String,
    pub value: f64,
    pub category: AdvisoryCategory,
    pub message: String,
}

impl Advisory {
    fn new(metric: &str, value: f64, category: AdvisoryCategory, message: &str) -> Self {
        Self {
            metric: metric.to_string(),
            value,
            category,
            message: message.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvisoryRule {
    Humidity,
    Uv,
}

impl AdvisoryRule {
    pub fn classify(self, value: f64) -> Advisory {
        match self {
            AdvisoryRule::Humidity => classify_humidity(value),
            AdvisoryRule::Uv => classify_uv(value),
        }
    }
}

/// Relative humidity bands: below 40 % is LOW, above 80 % is HIGH, the
/// closed interval [40, 80] is OPTIMAL.
pub fn classify_humidity(value: f64) -> Advisory {
    if value < 40.0 {
        Advisory::new(
            "humidity",
            value,
            AdvisoryCategory::Low,
            "Humidity low: irrigate with a mister or place a tray of water nearby.",
        )
    } else if value > 80.0 {
        Advisory::new(
            "humidity",
            value,
            AdvisoryCategory::High,
            "Humidity high: improve ventilation or run a dehumidifier.",
        )
    } else {
        Advisory::new(
            "humidity",
            value,
            AdvisoryCategory::Optimal,
            "Humidity is in the optimal band.",
        )
    }
}

/// UV index above 7 is HIGH; 7 and below is ADEQUATE.
pub fn classify_uv(value: f64) -> Advisory {
    if value > 7.0 {
        Advisory::new(
            "uv",
            value,
            AdvisoryCategory::High,
            "UV index high: provide partial shade or relocate the crop.",
        )
    } else {
        Advisory::new(
            "uv",
            value,
            AdvisoryCategory::Adequate,
            "UV radiation adequate for photosynthesis.",
        )
    }
}

/// Classify the latest reported value of `field` in the table. Returns
/// `EmptyInput` when the table is empty or the field never appears;
/// callers are expected to check emptiness first.
pub fn advise(table: &SeriesTable, field: &str, rule: AdvisoryRule) -> Result<Advisory, EmptyInput> {
    match table.latest_value(field) {
        Some(value) => Ok(rule.classify(value)),
        None => Err(EmptyInput {
            metric: field.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::telemetry::{Sample, SeriesTable};
    use chrono::DateTime;

    #[test]
    fn test_humidity_boundaries() {
        assert_eq!(classify_humidity(39.9).category, AdvisoryCategory::Low);
        assert_eq!(classify_humidity(40.0).category, AdvisoryCategory::Optimal);
        assert_eq!(classify_humidity(80.0).category, AdvisoryCategory::Optimal);
        assert_eq!(classify_humidity(80.1).category, AdvisoryCategory::High);
    }

    #[test]
    fn test_uv_boundaries() {
        assert_eq!(classify_uv(7.0).category, AdvisoryCategory::Adequate);
        assert_eq!(classify_uv(7.1).category, AdvisoryCategory::High);
    }

    #[test]
    fn test_advisory_carries_metric_and_value() {
        let advisory = classify_humidity(35.5);
        assert_eq!(advisory.metric, "humidity");
        assert_eq!(advisory.value, 35.5);
        assert!(advisory.message.contains("irrigate"));
    }

    #[test]
    fn test_advise_on_empty_table_is_a_precondition_violation() {
        let table = SeriesTable::empty(vec!["humidity".to_string()]);
        let err = advise(&table, "humidity", AdvisoryRule::Humidity).unwrap_err();
        assert_eq!(err.metric, "humidity");
    }

    #[test]
    fn test_advise_uses_latest_sample() {
        let rows = vec![
            Sample::new(
                DateTime::from_timestamp(10, 0).unwrap(),
                [("humidity".to_string(), 85.0)].into_iter().collect(),
            ),
            Sample::new(
                DateTime::from_timestamp(20, 0).unwrap(),
                [("humidity".to_string(), 50.0)].into_iter().collect(),
            ),
        ];
        let table = SeriesTable::from_unsorted(vec!["humidity".to_string()], rows);

        let advisory = advise(&table, "humidity", AdvisoryRule::Humidity).unwrap();
        assert_eq!(advisory.category, AdvisoryCategory::Optimal);
        assert_eq!(advisory.value, 50.0);
    }
}
