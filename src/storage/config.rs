use chrono::format::{Item, StrftimeItems};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::calendar::timezone::{AmbientTimezone, SystemTimezone, parse_timezone};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),
    #[error("Invalid {0} in config: {1:?}")]
    InvalidFormat(&'static str, String),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Config {
    pub calendar: CalendarConfig,
    pub agenda: AgendaConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CalendarConfig {
    /// IANA name used for events that carry no timezone of their own.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
    /// Events document read when no path is given on the command line.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub events_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AgendaConfig {
    pub date_format: String,
    pub time_format: String,
    pub maps_base_url: String,
}

impl Default for AgendaConfig {
    fn default() -> Self {
        Self {
            date_format: "%m/%d/%y".to_string(),
            time_format: "%I:%M%p".to_string(),
            maps_base_url: "https://www.google.com/maps/search/?api=1&query=".to_string(),
        }
    }
}

impl AgendaConfig {
    /// Rejects date/time patterns chrono cannot render.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_format("date_format", &self.date_format)?;
        check_format("time_format", &self.time_format)
    }
}

fn check_format(field: &'static str, format: &str) -> Result<(), ConfigError> {
    if StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
        return Err(ConfigError::InvalidFormat(field, format.to_string()));
    }
    Ok(())
}

impl Config {
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        config.agenda.validate()?;
        Ok(config)
    }

    pub fn load_or_create() -> Result<Self, ConfigError> {
        let config_path = Self::config_path();

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            let config = Self::default();
            config.save_to(&config_path)?;
            tracing::info!("Created default config at {}", config_path.display());
            Ok(config)
        }
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("gcal-today")
    }

    pub fn config_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;

        Ok(())
    }
}

/// The configured timezone, else whatever [`SystemTimezone`] reports.
impl AmbientTimezone for Config {
    fn timezone(&self) -> Tz {
        match self.calendar.timezone.as_deref() {
            Some(name) => parse_timezone(name).unwrap_or_else(|| {
                tracing::warn!("Unknown timezone in config: {}", name);
                SystemTimezone.timezone()
            }),
            None => SystemTimezone.timezone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_uses_us_style_agenda_formats() {
        let config = Config::default();
        assert_eq!(config.agenda.date_format, "%m/%d/%y");
        assert_eq!(config.agenda.time_format, "%I:%M%p");
    }

    #[test]
    fn default_config_has_no_timezone() {
        let config = Config::default();
        assert!(config.calendar.timezone.is_none());
    }

    #[test]
    fn parse_valid_toml_config() {
        let toml_content = r#"
            [calendar]
            timezone = "Pacific/Fiji"
            events_file = "/tmp/events.json"

            [agenda]
            date_format = "%Y-%m-%d"
            time_format = "%H:%M"
            maps_base_url = "https://maps.example.com/?q="
        "#;

        let config = Config::from_toml(toml_content).unwrap();

        assert_eq!(config.calendar.timezone.as_deref(), Some("Pacific/Fiji"));
        assert_eq!(config.calendar.events_file, Some(PathBuf::from("/tmp/events.json")));
        assert_eq!(config.agenda.time_format, "%H:%M");
        assert_eq!(config.timezone(), chrono_tz::Pacific::Fiji);
    }

    #[test]
    fn calendar_section_fields_are_optional() {
        let toml_content = r#"
            [calendar]

            [agenda]
            date_format = "%m/%d/%y"
            time_format = "%I:%M%p"
            maps_base_url = "https://www.google.com/maps/search/?api=1&query="
        "#;

        let config = Config::from_toml(toml_content).unwrap();

        assert_eq!(config, Config::default());
    }

    #[test]
    fn parse_invalid_toml_returns_error() {
        let invalid_toml = "this is not valid toml";
        let result = Config::from_toml(invalid_toml);
        assert!(result.is_err());
    }

    #[test]
    fn unknown_format_specifier_is_rejected_on_load() {
        let toml_content = r#"
            [calendar]

            [agenda]
            date_format = "%m/%d/%y"
            time_format = "%Q"
            maps_base_url = "https://maps.example.com/?q="
        "#;

        let result = Config::from_toml(toml_content);

        assert!(matches!(
            result,
            Err(ConfigError::InvalidFormat("time_format", ref format)) if format == "%Q"
        ));
    }

    #[test]
    fn default_formats_are_valid() {
        assert!(AgendaConfig::default().validate().is_ok());
    }

    #[test]
    fn saved_config_loads_back() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let mut config = Config::default();
        config.calendar.timezone = Some("Europe/Prague".to_string());

        config.save_to(&path).unwrap();
        let loaded = Config::load_from(&path).unwrap();

        assert_eq!(loaded, config);
    }

    #[test]
    fn loading_missing_file_is_read_error() {
        let dir = TempDir::new().unwrap();

        let result = Config::load_from(&dir.path().join("missing.toml"));

        assert!(matches!(result, Err(ConfigError::ReadError(_))));
    }
}
