use std::cmp::Ordering;
use std::fmt;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeDelta, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use super::attachment::Attachment;
use super::attendee::Attendee;
use super::gadget::Gadget;
use super::recurrence::Recurrence;
use super::reminder::{MAX_REMINDERS, Reminder};
use super::timezone::{AmbientTimezone, SystemTimezone, localize, start_of_day};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EventError {
    #[error("Start and end must both be dates or both be date-times")]
    MismatchedTimeKinds,
    #[error("Too many reminders: {0} (at most 5 allowed)")]
    TooManyReminders(usize),
    #[error("Explicit reminders cannot be combined with default reminders")]
    DefaultRemindersConflict,
    #[error("{0} does not exist in timezone {1}")]
    NonexistentLocalTime(NaiveDateTime, Tz),
    #[error("Event time out of range")]
    OutOfRange,
}

/// Start or end of an event: a whole day, or an instant in the event's timezone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventTime {
    Date(NaiveDate),
    DateTime(DateTime<Tz>),
}

impl EventTime {
    pub fn is_whole_day(&self) -> bool {
        matches!(self, EventTime::Date(_))
    }

    /// Calendar date in `tz`; whole-day values keep their own date.
    pub fn date_in(&self, tz: Tz) -> NaiveDate {
        match self {
            EventTime::Date(date) => *date,
            EventTime::DateTime(dt) => dt.with_timezone(&tz).date_naive(),
        }
    }

    /// Whole-day values are placed at midnight in `tz`.
    pub fn instant(&self, tz: Tz) -> DateTime<Tz> {
        match self {
            EventTime::Date(date) => start_of_day(*date, tz),
            EventTime::DateTime(dt) => *dt,
        }
    }

    fn default_end(&self) -> Result<EventTime, EventError> {
        match self {
            EventTime::Date(date) => date
                .succ_opt()
                .map(EventTime::Date)
                .ok_or(EventError::OutOfRange),
            EventTime::DateTime(dt) => dt
                .checked_add_signed(TimeDelta::hours(1))
                .map(EventTime::DateTime)
                .ok_or(EventError::OutOfRange),
        }
    }
}

impl fmt::Display for EventTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventTime::Date(date) => write!(f, "{}", date.format("%Y-%m-%d")),
            EventTime::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S%:z")),
        }
    }
}

/// A start or end value as supplied by the caller, before the event timezone
/// is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeInput {
    Date(NaiveDate),
    Naive(NaiveDateTime),
    Zoned(DateTime<Tz>),
}

impl TimeInput {
    fn resolve(self, tz: Tz) -> Result<EventTime, EventError> {
        match self {
            TimeInput::Date(date) => Ok(EventTime::Date(date)),
            TimeInput::Naive(naive) => localize(naive, tz)
                .map(EventTime::DateTime)
                .ok_or(EventError::NonexistentLocalTime(naive, tz)),
            TimeInput::Zoned(dt) => Ok(EventTime::DateTime(dt.with_timezone(&tz))),
        }
    }
}

impl From<NaiveDate> for TimeInput {
    fn from(date: NaiveDate) -> Self {
        TimeInput::Date(date)
    }
}

impl From<NaiveDateTime> for TimeInput {
    fn from(naive: NaiveDateTime) -> Self {
        TimeInput::Naive(naive)
    }
}

impl From<DateTime<Tz>> for TimeInput {
    fn from(dt: DateTime<Tz>) -> Self {
        TimeInput::Zoned(dt)
    }
}

impl From<DateTime<Utc>> for TimeInput {
    fn from(dt: DateTime<Utc>) -> Self {
        TimeInput::Zoned(dt.with_timezone(&Tz::UTC))
    }
}

impl From<DateTime<FixedOffset>> for TimeInput {
    fn from(dt: DateTime<FixedOffset>) -> Self {
        TimeInput::Zoned(dt.with_timezone(&Tz::UTC))
    }
}

impl From<EventTime> for TimeInput {
    fn from(time: EventTime) -> Self {
        match time {
            EventTime::Date(date) => TimeInput::Date(date),
            EventTime::DateTime(dt) => TimeInput::Zoned(dt),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    #[default]
    Default,
    Public,
    Private,
}

/// A calendar event. `<`, `>`, `<=` and `>=` compare by start then end, but two
/// different events with the same start and end are unordered; sort with
/// [`Event::chronological_cmp`] or [`sort_chronologically`].
#[derive(Clone, PartialEq)]
pub struct Event {
    pub summary: String,
    start: EventTime,
    end: EventTime,
    pub timezone: Tz,
    pub event_id: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub recurrence: Vec<Recurrence>,
    pub visibility: Visibility,
    pub attendees: Vec<Attendee>,
    reminders: Vec<Reminder>,
    default_reminders: bool,
    pub attachments: Vec<Attachment>,
    pub gadget: Option<Gadget>,
    pub color: Option<String>,
    pub other: Map<String, Value>,
}

impl Event {
    pub fn builder(summary: impl Into<String>, start: impl Into<TimeInput>) -> EventBuilder {
        EventBuilder::new(summary, start)
    }

    pub fn start(&self) -> EventTime {
        self.start
    }

    pub fn end(&self) -> EventTime {
        self.end
    }

    pub fn is_whole_day(&self) -> bool {
        self.start.is_whole_day()
    }

    pub fn reminders(&self) -> &[Reminder] {
        &self.reminders
    }

    pub fn default_reminders(&self) -> bool {
        self.default_reminders
    }

    pub fn add_attachment(
        &mut self,
        file_url: impl Into<String>,
        title: impl Into<String>,
        mime_type: impl Into<String>,
    ) {
        self.attachments
            .push(Attachment::new(title, file_url, mime_type));
    }

    pub fn add_email_reminder(&mut self, minutes: u32) -> Result<(), EventError> {
        self.add_reminder(Reminder::email(minutes))
    }

    pub fn add_popup_reminder(&mut self, minutes: u32) -> Result<(), EventError> {
        self.add_reminder(Reminder::popup(minutes))
    }

    pub fn add_reminder(&mut self, reminder: Reminder) -> Result<(), EventError> {
        if self.default_reminders {
            return Err(EventError::DefaultRemindersConflict);
        }
        if self.reminders.len() >= MAX_REMINDERS {
            return Err(EventError::TooManyReminders(self.reminders.len() + 1));
        }
        self.reminders.push(reminder);
        Ok(())
    }

    pub fn add_attendee(&mut self, attendee: impl Into<Attendee>) {
        self.attendees.push(attendee.into());
    }

    /// Orders by start, then end. Whole-day values count from midnight in the
    /// event's own timezone.
    pub fn chronological_cmp(&self, other: &Event) -> Ordering {
        let key = |event: &Event| {
            (
                event.start.instant(event.timezone),
                event.end.instant(event.timezone),
            )
        };
        key(self).cmp(&key(other))
    }
}

pub fn sort_chronologically(events: &mut [Event]) {
    events.sort_by(Event::chronological_cmp);
}

/// Two different events sharing start and end are unordered.
impl PartialOrd for Event {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match self.chronological_cmp(other) {
            Ordering::Equal if self != other => None,
            ordering => Some(ordering),
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.start, self.summary)
    }
}

impl fmt::Debug for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !f.alternate() {
            return write!(f, "<Event {self}>");
        }
        f.debug_struct("Event")
            .field("summary", &self.summary)
            .field("start", &self.start)
            .field("end", &self.end)
            .field("timezone", &self.timezone)
            .field("event_id", &self.event_id)
            .field("description", &self.description)
            .field("location", &self.location)
            .field("recurrence", &self.recurrence)
            .field("visibility", &self.visibility)
            .field("attendees", &self.attendees)
            .field("reminders", &self.reminders)
            .field("default_reminders", &self.default_reminders)
            .field("attachments", &self.attachments)
            .field("gadget", &self.gadget)
            .field("color", &self.color)
            .field("other", &self.other)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct EventBuilder {
    summary: String,
    start: TimeInput,
    end: Option<TimeInput>,
    timezone: Option<Tz>,
    event_id: Option<String>,
    description: Option<String>,
    location: Option<String>,
    recurrence: Vec<Recurrence>,
    visibility: Visibility,
    attendees: Vec<Attendee>,
    reminders: Vec<Reminder>,
    default_reminders: bool,
    minutes_before_popup_reminder: Option<u32>,
    minutes_before_email_reminder: Option<u32>,
    attachments: Vec<Attachment>,
    gadget: Option<Gadget>,
    color: Option<String>,
    other: Map<String, Value>,
}

impl EventBuilder {
    pub fn new(summary: impl Into<String>, start: impl Into<TimeInput>) -> Self {
        Self {
            summary: summary.into(),
            start: start.into(),
            end: None,
            timezone: None,
            event_id: None,
            description: None,
            location: None,
            recurrence: Vec::new(),
            visibility: Visibility::default(),
            attendees: Vec::new(),
            reminders: Vec::new(),
            default_reminders: false,
            minutes_before_popup_reminder: None,
            minutes_before_email_reminder: None,
            attachments: Vec::new(),
            gadget: None,
            color: None,
            other: Map::new(),
        }
    }

    pub fn end(mut self, end: impl Into<TimeInput>) -> Self {
        self.end = Some(end.into());
        self
    }

    pub fn timezone(mut self, timezone: Tz) -> Self {
        self.timezone = Some(timezone);
        self
    }

    pub fn event_id(mut self, event_id: impl Into<String>) -> Self {
        self.event_id = Some(event_id.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn recurrence(mut self, recurrence: impl IntoIterator<Item = Recurrence>) -> Self {
        self.recurrence.extend(recurrence);
        self
    }

    pub fn visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    pub fn attendees<I, A>(mut self, attendees: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<Attendee>,
    {
        self.attendees.extend(attendees.into_iter().map(Into::into));
        self
    }

    pub fn reminders(mut self, reminders: impl IntoIterator<Item = Reminder>) -> Self {
        self.reminders.extend(reminders);
        self
    }

    pub fn default_reminders(mut self, default_reminders: bool) -> Self {
        self.default_reminders = default_reminders;
        self
    }

    pub fn minutes_before_popup_reminder(mut self, minutes: u32) -> Self {
        self.minutes_before_popup_reminder = Some(minutes);
        self
    }

    pub fn minutes_before_email_reminder(mut self, minutes: u32) -> Self {
        self.minutes_before_email_reminder = Some(minutes);
        self
    }

    pub fn attachments(mut self, attachments: impl IntoIterator<Item = Attachment>) -> Self {
        self.attachments.extend(attachments);
        self
    }

    pub fn gadget(mut self, gadget: Gadget) -> Self {
        self.gadget = Some(gadget);
        self
    }

    pub fn color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    pub fn other(mut self, other: Map<String, Value>) -> Self {
        self.other = other;
        self
    }

    /// Builds with the system timezone as the fallback when none was set.
    pub fn build(self) -> Result<Event, EventError> {
        self.build_with(&SystemTimezone)
    }

    pub fn build_with<A>(self, ambient: &A) -> Result<Event, EventError>
    where
        A: AmbientTimezone + ?Sized,
    {
        let timezone = self.timezone.unwrap_or_else(|| ambient.timezone());

        let start = self.start.resolve(timezone)?;
        let end = match self.end {
            Some(end) => end.resolve(timezone)?,
            None => start.default_end()?,
        };
        if start.is_whole_day() != end.is_whole_day() {
            return Err(EventError::MismatchedTimeKinds);
        }

        let mut reminders = self.reminders;
        if let Some(minutes) = self.minutes_before_popup_reminder {
            reminders.push(Reminder::popup(minutes));
        }
        if let Some(minutes) = self.minutes_before_email_reminder {
            reminders.push(Reminder::email(minutes));
        }
        if self.default_reminders && !reminders.is_empty() {
            return Err(EventError::DefaultRemindersConflict);
        }
        if reminders.len() > MAX_REMINDERS {
            return Err(EventError::TooManyReminders(reminders.len()));
        }

        Ok(Event {
            summary: self.summary,
            start,
            end,
            timezone,
            event_id: self.event_id,
            description: self.description,
            location: self.location,
            recurrence: self.recurrence,
            visibility: self.visibility,
            attendees: self.attendees,
            reminders,
            default_reminders: self.default_reminders,
            attachments: self.attachments,
            gadget: self.gadget,
            color: self.color,
            other: self.other,
        })
    }
}
