use anyhow::bail;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct InfluxConfig {
    pub influx: InfluxSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct InfluxSettings {
    pub url: String,
    pub token: String,
    pub org: String,
    pub bucket: String,
    #[serde(default = "default_query_timeout_secs")]
    pub query_timeout_secs: u64,
}

fn default_query_timeout_secs() -> u64 {
    5
}

/// The dashboard layout: which measurements to query, with which fields,
/// and which derived columns and advisories to attach.
#[derive(Debug, Deserialize, Clone)]
pub struct PanelsConfig {
    pub title: String,
    #[serde(default)]
    pub panels: Vec<PanelConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PanelConfig {
    pub id: String,
    pub title: String,
    pub measurement: String,
    pub fields: Vec<String>,
    #[serde(default)]
    pub advisories: Vec<AdvisoryConfig>,
    #[serde(default)]
    pub magnitude: Option<MagnitudeConfig>,
}

impl PanelConfig {
    /// Queried fields plus the derived column, when configured.
    pub fn columns(&self) -> Vec<String> {
        let mut columns = self.fields.clone();
        if let Some(magnitude) = &self.magnitude {
            columns.push(magnitude.column.clone());
        }
        columns
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct AdvisoryConfig {
    pub field: String,
    pub rule: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct MagnitudeConfig {
    pub axes: [String; 3],
    pub column: String,
}

pub fn load_influx_config() -> anyhow::Result<InfluxConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/influx"))
        .build()?;

    Ok(settings.try_deserialize()?)
}

pub fn load_panels_config() -> anyhow::Result<PanelsConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/panels"))
        .build()?;

    let panels: PanelsConfig = settings.try_deserialize()?;
    validate_panels(&panels)?;
    Ok(panels)
}

/// A panel must name at least one field, and a derived magnitude can only
/// use axes that are actually queried.
pub fn validate_panels(config: &PanelsConfig) -> anyhow::Result<()> {
    for panel in &config.panels {
        if panel.fields.is_empty() {
            bail!("panel '{}' lists no fields to query", panel.id);
        }

        if let Some(magnitude) = &panel.magnitude {
            for axis in &magnitude.axes {
                if !panel.fields.contains(axis) {
                    bail!(
                        "panel '{}' derives '{}' from axis '{}' which is not queried",
                        panel.id,
                        magnitude.column,
                        axis
                    );
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_panels(toml: &str) -> PanelsConfig {
        config::Config::builder()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn test_panels_config_parses_fields_advisories_and_magnitude() {
        let config = parse_panels(
            r#"
            title = "Verdana"

            [[panels]]
            id = "air"
            title = "Temperature & Humidity"
            measurement = "airSensor"
            fields = ["temperature", "humidity"]

            [[panels.advisories]]
            field = "humidity"
            rule = "humidity"

            [[panels]]
            id = "motion"
            title = "Motion"
            measurement = "accelerometer"
            fields = ["ax", "ay", "az"]
            magnitude = { axes = ["ax", "ay", "az"], column = "accel_magnitude" }
            "#,
        );

        assert_eq!(config.panels.len(), 2);
        assert_eq!(config.panels[0].advisories[0].rule, "humidity");

        let motion = &config.panels[1];
        assert_eq!(motion.magnitude.as_ref().unwrap().column, "accel_magnitude");
        assert_eq!(
            motion.columns(),
            vec!["ax", "ay", "az", "accel_magnitude"]
        );
        assert!(validate_panels(&config).is_ok());
    }

    #[test]
    fn test_validation_rejects_empty_field_list() {
        let config = parse_panels(
            r#"
            title = "Verdana"

            [[panels]]
            id = "air"
            title = "Air"
            measurement = "airSensor"
            fields = []
            "#,
        );

        let err = validate_panels(&config).unwrap_err();
        assert!(err.to_string().contains("no fields"));
    }

    #[test]
    fn test_validation_rejects_unqueried_magnitude_axis() {
        let config = parse_panels(
            r#"
            title = "Verdana"

            [[panels]]
            id = "motion"
            title = "Motion"
            measurement = "accelerometer"
            fields = ["ax", "ay"]
            magnitude = { axes = ["ax", "ay", "az"], column = "accel_magnitude" }
            "#,
        );

        let err = validate_panels(&config).unwrap_err();
        assert!(err.to_string().contains("az"));
    }

    #[test]
    fn test_query_timeout_defaults_when_omitted() {
        let config: InfluxConfig = config::Config::builder()
            .add_source(config::File::from_str(
                r#"
                [influx]
                url = "http://localhost:8086"
                token = "dev-token"
                org = "verdana"
                bucket = "plants"
                "#,
                config::FileFormat::Toml,
            ))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.influx.query_timeout_secs, 5);
    }
}
