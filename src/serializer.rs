//! Conversion between [`Event`] and the Calendar API v3 event JSON.
//!
//! `to_json` always writes `summary`, `start`, `end`, `recurrence`,
//! `visibility`, `attendees`, `reminders` and `attachments`; the optional
//! fields are written only when set. Entries of [`Event::other`] are merged
//! into the top-level object unless they name a known field, and `to_object`
//! collects every unknown top-level key back into it.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use chrono_tz::Tz;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use thiserror::Error;

use crate::calendar::recurrence::{self, RecurrenceError};
use crate::calendar::timezone::{AmbientTimezone, parse_timezone};
use crate::calendar::{
    Attachment, Attendee, Event, EventError, EventTime, Gadget, Reminder, TimeInput, Visibility,
};

#[derive(Debug, Error)]
pub enum SerializeError {
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Event JSON must be an object")]
    NotAnObject,
    #[error("Missing required field: {0}")]
    MissingField(&'static str),
    #[error("Unrecognized {0} value: {1}")]
    UnrecognizedTime(&'static str, String),
    #[error("Invalid {0}: {1}")]
    InvalidField(&'static str, String),
    #[error("Recurrence error: {0}")]
    Recurrence(#[from] RecurrenceError),
    #[error("Event error: {0}")]
    Event(#[from] EventError),
}

const DATE_FORMAT: &str = "%Y-%m-%d";
const NAIVE_DATE_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

const KNOWN_KEYS: [&str; 13] = [
    "summary",
    "start",
    "end",
    "recurrence",
    "visibility",
    "attendees",
    "reminders",
    "attachments",
    "description",
    "location",
    "id",
    "colorId",
    "gadget",
];

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct GoogleTime {
    date: Option<String>,
    date_time: Option<String>,
    time_zone: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GoogleReminders {
    use_default: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    overrides: Vec<Reminder>,
}

/// Input accepted by [`to_object`]: parsed JSON or raw JSON text.
#[derive(Debug, Clone, Copy)]
pub enum EventJson<'a> {
    Value(&'a Value),
    Text(&'a str),
}

impl<'a> From<&'a Value> for EventJson<'a> {
    fn from(value: &'a Value) -> Self {
        EventJson::Value(value)
    }
}

impl<'a> From<&'a str> for EventJson<'a> {
    fn from(text: &'a str) -> Self {
        EventJson::Text(text)
    }
}

impl<'a> From<&'a String> for EventJson<'a> {
    fn from(text: &'a String) -> Self {
        EventJson::Text(text)
    }
}

pub fn to_json(event: &Event) -> Value {
    let mut object = Map::new();

    object.insert("summary".to_string(), json!(event.summary));
    object.insert("start".to_string(), time_to_json(event.start()));
    object.insert("end".to_string(), time_to_json(event.end()));
    object.insert(
        "recurrence".to_string(),
        Value::Array(
            event
                .recurrence
                .iter()
                .map(|r| Value::String(recurrence::encode(r)))
                .collect(),
        ),
    );
    object.insert("visibility".to_string(), json!(event.visibility));
    object.insert("attendees".to_string(), json!(event.attendees));
    let reminders = GoogleReminders {
        use_default: event.default_reminders(),
        overrides: event.reminders().to_vec(),
    };
    object.insert("reminders".to_string(), json!(reminders));
    object.insert("attachments".to_string(), json!(event.attachments));

    if let Some(description) = &event.description {
        object.insert("description".to_string(), json!(description));
    }
    if let Some(location) = &event.location {
        object.insert("location".to_string(), json!(location));
    }
    if let Some(id) = &event.event_id {
        object.insert("id".to_string(), json!(id));
    }
    if let Some(color) = &event.color {
        object.insert("colorId".to_string(), json!(color));
    }
    if let Some(gadget) = &event.gadget {
        object.insert("gadget".to_string(), json!(gadget));
    }

    for (key, value) in &event.other {
        if KNOWN_KEYS.contains(&key.as_str()) {
            tracing::warn!("Extra field {} shadows a known event field, skipping", key);
            continue;
        }
        object.insert(key.clone(), value.clone());
    }

    Value::Object(object)
}

fn time_to_json(time: EventTime) -> Value {
    match time {
        EventTime::Date(date) => json!({ "date": date.format(DATE_FORMAT).to_string() }),
        EventTime::DateTime(dt) => json!({
            "dateTime": dt.to_rfc3339(),
            "timeZone": dt.timezone().name(),
        }),
    }
}

/// Decodes an event. `ambient` supplies the timezone when neither `start` nor
/// `end` carries a `timeZone`.
pub fn to_object<'a, A>(input: impl Into<EventJson<'a>>, ambient: &A) -> Result<Event, SerializeError>
where
    A: AmbientTimezone + ?Sized,
{
    match input.into() {
        EventJson::Value(value) => from_value(value, ambient),
        EventJson::Text(text) => {
            let value: Value = serde_json::from_str(text)?;
            from_value(&value, ambient)
        }
    }
}

fn from_value<A>(value: &Value, ambient: &A) -> Result<Event, SerializeError>
where
    A: AmbientTimezone + ?Sized,
{
    let object = value.as_object().ok_or(SerializeError::NotAnObject)?;

    let start_json = object.get("start").ok_or(SerializeError::MissingField("start"))?;
    let end_json = object.get("end").ok_or(SerializeError::MissingField("end"))?;
    let (start, start_zone) = time_from_json("start", start_json)?;
    let (end, end_zone) = time_from_json("end", end_json)?;
    let timezone = start_zone.or(end_zone).unwrap_or_else(|| ambient.timezone());

    let summary: Option<String> = field(object, "summary")?;
    let recurrence = field::<Vec<String>>(object, "recurrence")?
        .unwrap_or_default()
        .iter()
        .map(|token| recurrence::decode(token))
        .collect::<Result<Vec<_>, _>>()?;
    let reminders: GoogleReminders = field(object, "reminders")?.unwrap_or_default();

    let mut builder = Event::builder(summary.unwrap_or_default(), start)
        .end(end)
        .timezone(timezone)
        .recurrence(recurrence)
        .visibility(field::<Visibility>(object, "visibility")?.unwrap_or_default())
        .attendees(field::<Vec<Attendee>>(object, "attendees")?.unwrap_or_default())
        .reminders(reminders.overrides)
        .default_reminders(reminders.use_default)
        .attachments(field::<Vec<Attachment>>(object, "attachments")?.unwrap_or_default())
        .other(
            object
                .iter()
                .filter(|(key, _)| !KNOWN_KEYS.contains(&key.as_str()))
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect(),
        );

    if let Some(description) = field::<String>(object, "description")? {
        builder = builder.description(description);
    }
    if let Some(location) = field::<String>(object, "location")? {
        builder = builder.location(location);
    }
    if let Some(id) = field::<String>(object, "id")? {
        builder = builder.event_id(id);
    }
    if let Some(color) = field::<String>(object, "colorId")? {
        builder = builder.color(color);
    }
    if let Some(gadget) = field::<Gadget>(object, "gadget")? {
        builder = builder.gadget(gadget);
    }

    let event = builder.build_with(ambient)?;
    tracing::debug!("Decoded event {}", event);
    Ok(event)
}

/// Reads an optional field; `null` counts as absent.
fn field<T: DeserializeOwned>(
    object: &Map<String, Value>,
    key: &'static str,
) -> Result<Option<T>, SerializeError> {
    object
        .get(key)
        .filter(|value| !value.is_null())
        .map(|value| T::deserialize(value).map_err(|e| SerializeError::InvalidField(key, e.to_string())))
        .transpose()
}

fn time_from_json(
    key: &'static str,
    value: &Value,
) -> Result<(TimeInput, Option<Tz>), SerializeError> {
    let unrecognized = || SerializeError::UnrecognizedTime(key, value.to_string());
    let time = GoogleTime::deserialize(value).map_err(|_| unrecognized())?;

    let zone = match &time.time_zone {
        Some(name) => Some(
            parse_timezone(name).ok_or_else(|| SerializeError::InvalidField("timeZone", name.clone()))?,
        ),
        None => None,
    };

    let input = match (&time.date, &time.date_time) {
        (Some(date), None) => NaiveDate::parse_from_str(date, DATE_FORMAT)
            .map(TimeInput::Date)
            .map_err(|_| unrecognized())?,
        (None, Some(date_time)) => parse_date_time(date_time).ok_or_else(unrecognized)?,
        _ => return Err(unrecognized()),
    };

    Ok((input, zone))
}

/// Offset-carrying values keep their instant; naive ones are localized later
/// in the event timezone.
fn parse_date_time(s: &str) -> Option<TimeInput> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(TimeInput::from(dt));
    }
    NaiveDateTime::parse_from_str(s, NAIVE_DATE_TIME_FORMAT)
        .ok()
        .map(TimeInput::Naive)
}
