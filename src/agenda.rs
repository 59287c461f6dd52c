use std::fmt::Write;

use chrono::NaiveDate;
use chrono_tz::Tz;
use serde_json::Value;
use thiserror::Error;

use crate::calendar::{AmbientTimezone, Event, EventTime};
use crate::serializer;
use crate::storage::config::AgendaConfig;

#[derive(Debug, Error)]
pub enum AgendaError {
    #[error("Invalid events document: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Events document must be an array or an object with an \"items\" array")]
    UnexpectedShape,
    #[error("Cannot render agenda line with date format {0:?} and time format {1:?}")]
    InvalidFormat(String, String),
}

/// Decodes an `events.list` response or a bare array of events. Entries that
/// fail to decode are logged and skipped.
pub fn load_events<A>(text: &str, ambient: &A) -> Result<Vec<Event>, AgendaError>
where
    A: AmbientTimezone + ?Sized,
{
    let document: Value = serde_json::from_str(text)?;
    let items = match &document {
        Value::Array(items) => items,
        Value::Object(object) => object
            .get("items")
            .and_then(Value::as_array)
            .ok_or(AgendaError::UnexpectedShape)?,
        _ => return Err(AgendaError::UnexpectedShape),
    };

    let events: Vec<Event> = items
        .iter()
        .filter_map(|item| match serializer::to_object(item, ambient) {
            Ok(event) => Some(event),
            Err(e) => {
                let summary = item.get("summary").and_then(Value::as_str).unwrap_or("<untitled>");
                tracing::warn!("Skipping event {:?} that failed to decode: {}", summary, e);
                None
            }
        })
        .collect();

    tracing::info!("Loaded {} of {} events", events.len(), items.len());
    Ok(events)
}

/// Events starting on `date` as seen from `tz`, earliest first.
pub fn events_on(events: &[Event], date: NaiveDate, tz: Tz) -> Vec<&Event> {
    let mut day: Vec<&Event> = events
        .iter()
        .filter(|event| event.start().date_in(tz) == date)
        .collect();
    day.sort_by(|a, b| a.chronological_cmp(b));
    day
}

/// Fails instead of panicking when a configured format cannot be rendered.
pub fn format_line(event: &Event, config: &AgendaConfig, tz: Tz) -> Result<String, AgendaError> {
    let invalid = |_: std::fmt::Error| AgendaError::InvalidFormat(config.date_format.clone(), config.time_format.clone());
    let start = event.start();
    let date = start.date_in(tz);
    let text = event
        .description
        .as_deref()
        .filter(|d| !d.trim().is_empty())
        .unwrap_or(&event.summary);

    let mut line = String::new();
    write!(line, "{} {} --> ", date.format("%A"), date.format(&config.date_format)).map_err(invalid)?;
    match start {
        EventTime::Date(_) => line.push_str("All day"),
        EventTime::DateTime(dt) => {
            write!(line, "{}", dt.with_timezone(&tz).format(&config.time_format)).map_err(invalid)?
        }
    }
    write!(line, " {text}").map_err(invalid)?;
    Ok(line)
}

/// Link that shows the event's location on a map. Locations that are already
/// URLs are returned as they are.
pub fn maps_link(event: &Event, base_url: &str) -> Option<String> {
    let location = event.location.as_deref()?.trim();
    if location.is_empty() {
        return None;
    }
    if location.starts_with("http://") || location.starts_with("https://") {
        return Some(location.to_string());
    }
    Some(format!("{}{}", base_url, urlencoding::encode(location)))
}

pub fn format_agenda(
    date: NaiveDate,
    events: &[&Event],
    config: &AgendaConfig,
    tz: Tz,
) -> Result<String, AgendaError> {
    let mut lines = Vec::new();
    lines.push(format!("Agenda for {}", date.format("%A, %B %d, %Y")));
    lines.push(String::new());

    if events.is_empty() {
        lines.push("No events scheduled.".to_string());
    } else {
        for event in events {
            lines.push(format_line(event, config, tz)?);
            if let Some(link) = maps_link(event, &config.maps_base_url) {
                lines.push(format!("    Open in Google Maps: {link}"));
            }
        }
    }

    Ok(lines.join("\n"))
}
