use std::path::PathBuf;

use chrono::{Local, NaiveDate, Utc};
use thiserror::Error;

use gcal_today::{
    agenda::{self, AgendaError},
    calendar::AmbientTimezone,
    storage::config::{Config, ConfigError},
};

pub const USAGE: &str = "Usage: gcal-today [--date YYYY/MM/DD] [--config PATH] [EVENTS_JSON]";

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("Failed to read events file: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Agenda(#[from] AgendaError),
    #[error("No events file given and none configured")]
    NoEventsFile,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgendaOptions {
    pub date: Option<NaiveDate>,
    pub config_path: Option<PathBuf>,
    pub events_path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliMode {
    Help,
    Agenda(AgendaOptions),
}

pub fn parse_cli_mode(args: impl IntoIterator<Item = String>) -> Result<CliMode, String> {
    let mut options = AgendaOptions {
        date: None,
        config_path: None,
        events_path: None,
    };
    let mut args = args.into_iter();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--date" => {
                let date_str = args
                    .next()
                    .ok_or_else(|| "--date needs a value".to_string())?;
                let date = NaiveDate::parse_from_str(&date_str, "%Y/%m/%d")
                    .map_err(|_| format!("Invalid date '{}'. Use YYYY/MM/DD.", date_str))?;
                options.date = Some(date);
            }
            "--config" => {
                let path = args
                    .next()
                    .ok_or_else(|| "--config needs a path".to_string())?;
                options.config_path = Some(PathBuf::from(path));
            }
            "--help" | "-h" => return Ok(CliMode::Help),
            other if other.starts_with("--") => {
                return Err(format!("Unknown argument: {}", other));
            }
            _ => {
                if options.events_path.is_some() {
                    return Err(format!("Unexpected extra argument: {}", arg));
                }
                options.events_path = Some(PathBuf::from(arg));
            }
        }
    }

    Ok(CliMode::Agenda(options))
}

pub fn run_agenda_mode(options: AgendaOptions) -> Result<(), CliError> {
    let config = match &options.config_path {
        Some(path) => Config::load_from(path)?,
        None => Config::load_or_create()?,
    };
    let tz = config.timezone();
    let date = options.date.unwrap_or_else(|| today(&config, tz));

    let events_path = options
        .events_path
        .or_else(|| config.calendar.events_file.clone())
        .ok_or(CliError::NoEventsFile)?;

    tracing::info!("Reading events from {} for {}", events_path.display(), date);
    let content = std::fs::read_to_string(&events_path)?;
    let events = agenda::load_events(&content, &config)?;
    let day = agenda::events_on(&events, date, tz);

    println!("{}", agenda::format_agenda(date, &day, &config.agenda, tz)?);
    Ok(())
}

/// Today in the configured timezone, else in the system's local time.
fn today(config: &Config, tz: chrono_tz::Tz) -> NaiveDate {
    match config.calendar.timezone {
        Some(_) => Utc::now().with_timezone(&tz).date_naive(),
        None => Local::now().date_naive(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn no_arguments_shows_todays_agenda() {
        let mode = parse_cli_mode(args(&[])).unwrap();

        assert_eq!(
            mode,
            CliMode::Agenda(AgendaOptions {
                date: None,
                config_path: None,
                events_path: None,
            })
        );
    }

    #[test]
    fn parses_date_config_and_events_path() {
        let mode = parse_cli_mode(args(&[
            "--date",
            "2020/07/20",
            "--config",
            "/tmp/config.toml",
            "events.json",
        ]))
        .unwrap();

        assert_eq!(
            mode,
            CliMode::Agenda(AgendaOptions {
                date: NaiveDate::from_ymd_opt(2020, 7, 20),
                config_path: Some(PathBuf::from("/tmp/config.toml")),
                events_path: Some(PathBuf::from("events.json")),
            })
        );
    }

    #[test]
    fn help_flag_wins() {
        assert_eq!(parse_cli_mode(args(&["events.json", "--help"])).unwrap(), CliMode::Help);
    }

    #[test]
    fn rejects_bad_input() {
        assert!(parse_cli_mode(args(&["--date", "20-07-2020"])).is_err());
        assert!(parse_cli_mode(args(&["--date"])).is_err());
        assert!(parse_cli_mode(args(&["--sample"])).is_err());
        assert!(parse_cli_mode(args(&["a.json", "b.json"])).is_err());
    }

    #[test]
    fn run_agenda_mode_reads_configured_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let events_path = dir.path().join("events.json");
        std::fs::write(
            &events_path,
            r#"{"items": [{"summary": "Lunch", "start": {"date": "2020-07-20"}, "end": {"date": "2020-07-21"}}]}"#,
        )
        .unwrap();
        let config_path = dir.path().join("config.toml");
        let mut config = Config::default();
        config.calendar.timezone = Some("Pacific/Fiji".to_string());
        config.calendar.events_file = Some(events_path);
        config.save_to(&config_path).unwrap();

        let result = run_agenda_mode(AgendaOptions {
            date: NaiveDate::from_ymd_opt(2020, 7, 20),
            config_path: Some(config_path),
            events_path: None,
        });

        assert!(result.is_ok());
    }

    #[test]
    fn today_follows_configured_timezone() {
        let mut config = Config::default();
        config.calendar.timezone = Some("Pacific/Kiritimati".to_string());
        let tz = config.timezone();

        assert_eq!(today(&config, tz), Utc::now().with_timezone(&tz).date_naive());
    }

    #[test]
    fn today_without_configured_timezone_is_local_date() {
        let config = Config::default();

        assert_eq!(today(&config, config.timezone()), Local::now().date_naive());
    }

    #[test]
    fn run_agenda_mode_without_events_file_fails() {
        let dir = tempfile::TempDir::new().unwrap();
        let config_path = dir.path().join("config.toml");
        Config::default().save_to(&config_path).unwrap();

        let result = run_agenda_mode(AgendaOptions {
            date: None,
            config_path: Some(config_path),
            events_path: None,
        });

        assert!(matches!(result, Err(CliError::NoEventsFile)));
    }
}
