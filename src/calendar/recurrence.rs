//! Recurrence entries and their text form as used in the `recurrence` list of
//! a Calendar API event.
//!
//! Four kinds of entry are supported:
//!
//! - `RRULE:FREQ=DAILY;WKST=SU` adds occurrences,
//! - `EXRULE:FREQ=DAILY;BYDAY=MO;WKST=SU` removes occurrences,
//! - `RDATE;VALUE=DATE:20190419` adds explicit dates,
//! - `EXDATE;VALUE=DATE:20190419,20190422` removes explicit dates.
//!
//! Date lists that contain date-times are written without the `VALUE=DATE`
//! parameter, e.g. `EXDATE:20190419T110000Z`. A list of local date-times in
//! one zone keeps its `TZID`, e.g. `EXDATE;TZID=Europe/Prague:20190419T110000`.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc, Weekday};
use chrono_tz::Tz;
use thiserror::Error;

use super::timezone::{localize, parse_timezone};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RecurrenceError {
    #[error("Unknown recurrence property: {0}")]
    UnknownProperty(String),
    #[error("Unsupported recurrence parameter: {0}")]
    UnsupportedParameter(String),
    #[error("Recurrence rule has no FREQ: {0}")]
    MissingFrequency(String),
    #[error("Malformed rule part: {0}")]
    MalformedPart(String),
    #[error("Unknown rule part: {0}")]
    UnknownPart(String),
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
    #[error("Invalid recurrence date: {0}")]
    InvalidDate(String),
    #[error("COUNT and UNTIL cannot both be set")]
    CountAndUntil,
}

const DATE_FORMAT: &str = "%Y%m%d";
const DATE_TIME_FORMAT: &str = "%Y%m%dT%H%M%SZ";
const LOCAL_DATE_TIME_FORMAT: &str = "%Y%m%dT%H%M%S";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Frequency {
    Secondly,
    Minutely,
    Hourly,
    #[default]
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl AsRef<str> for Frequency {
    fn as_ref(&self) -> &str {
        match self {
            Self::Secondly => "SECONDLY",
            Self::Minutely => "MINUTELY",
            Self::Hourly => "HOURLY",
            Self::Daily => "DAILY",
            Self::Weekly => "WEEKLY",
            Self::Monthly => "MONTHLY",
            Self::Yearly => "YEARLY",
        }
    }
}

impl FromStr for Frequency {
    type Err = RecurrenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "SECONDLY" => Ok(Self::Secondly),
            "MINUTELY" => Ok(Self::Minutely),
            "HOURLY" => Ok(Self::Hourly),
            "DAILY" => Ok(Self::Daily),
            "WEEKLY" => Ok(Self::Weekly),
            "MONTHLY" => Ok(Self::Monthly),
            "YEARLY" => Ok(Self::Yearly),
            _ => Err(RecurrenceError::InvalidValue("FREQ", s.to_string())),
        }
    }
}

fn weekday_code(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "MO",
        Weekday::Tue => "TU",
        Weekday::Wed => "WE",
        Weekday::Thu => "TH",
        Weekday::Fri => "FR",
        Weekday::Sat => "SA",
        Weekday::Sun => "SU",
    }
}

fn parse_weekday(code: &str) -> Option<Weekday> {
    match code.to_uppercase().as_str() {
        "MO" => Some(Weekday::Mon),
        "TU" => Some(Weekday::Tue),
        "WE" => Some(Weekday::Wed),
        "TH" => Some(Weekday::Thu),
        "FR" => Some(Weekday::Fri),
        "SA" => Some(Weekday::Sat),
        "SU" => Some(Weekday::Sun),
        _ => None,
    }
}

/// A `BYDAY` entry: a weekday with an optional ordinal, e.g. `MO`, `1MO`, `-1FR`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByDay {
    pub ordinal: Option<i8>,
    pub weekday: Weekday,
}

impl ByDay {
    pub fn nth(ordinal: i8, weekday: Weekday) -> Self {
        Self {
            ordinal: Some(ordinal),
            weekday,
        }
    }
}

impl From<Weekday> for ByDay {
    fn from(weekday: Weekday) -> Self {
        Self {
            ordinal: None,
            weekday,
        }
    }
}

impl Display for ByDay {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if let Some(ordinal) = self.ordinal {
            write!(f, "{ordinal}")?;
        }
        f.write_str(weekday_code(self.weekday))
    }
}

impl FromStr for ByDay {
    type Err = RecurrenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || RecurrenceError::InvalidValue("BYDAY", s.to_string());
        if !s.is_ascii() || s.len() < 2 {
            return Err(invalid());
        }
        let (ordinal, code) = s.split_at(s.len() - 2);
        let weekday = parse_weekday(code).ok_or_else(invalid)?;
        let ordinal = if ordinal.is_empty() {
            None
        } else {
            Some(ordinal.parse::<i8>().map_err(|_| invalid())?)
        };
        Ok(Self { ordinal, weekday })
    }
}

/// A date, UTC date-time or zoned local date-time inside a recurrence token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecurrenceDate {
    Date(NaiveDate),
    DateTime(DateTime<Utc>),
    Zoned(DateTime<Tz>),
}

impl RecurrenceDate {
    fn zone(&self) -> Option<Tz> {
        match self {
            RecurrenceDate::Zoned(dt) => Some(dt.timezone()),
            _ => None,
        }
    }
}

impl From<NaiveDate> for RecurrenceDate {
    fn from(date: NaiveDate) -> Self {
        RecurrenceDate::Date(date)
    }
}

impl From<DateTime<Utc>> for RecurrenceDate {
    fn from(date_time: DateTime<Utc>) -> Self {
        RecurrenceDate::DateTime(date_time)
    }
}

impl From<DateTime<Tz>> for RecurrenceDate {
    fn from(date_time: DateTime<Tz>) -> Self {
        RecurrenceDate::Zoned(date_time)
    }
}

/// Zoned values are written in UTC; only a list sharing one zone keeps `TZID`.
impl Display for RecurrenceDate {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            RecurrenceDate::Date(date) => write!(f, "{}", date.format(DATE_FORMAT)),
            RecurrenceDate::DateTime(dt) => write!(f, "{}", dt.format(DATE_TIME_FORMAT)),
            RecurrenceDate::Zoned(dt) => {
                write!(f, "{}", dt.with_timezone(&Utc).format(DATE_TIME_FORMAT))
            }
        }
    }
}

impl FromStr for RecurrenceDate {
    type Err = RecurrenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() == 8 {
            parse_date(s).map(RecurrenceDate::Date)
        } else {
            NaiveDateTime::parse_from_str(s, DATE_TIME_FORMAT)
                .map(|naive| RecurrenceDate::DateTime(naive.and_utc()))
                .map_err(|_| RecurrenceError::InvalidDate(s.to_string()))
        }
    }
}

fn parse_date(s: &str) -> Result<NaiveDate, RecurrenceError> {
    NaiveDate::parse_from_str(s, DATE_FORMAT).map_err(|_| RecurrenceError::InvalidDate(s.to_string()))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleEnd {
    Count(u32),
    Until(RecurrenceDate),
}

fn valid_interval(interval: &u32) -> bool {
    *interval > 0
}

fn valid_month_day(day: &i8) -> bool {
    *day != 0 && (-31..=31).contains(day)
}

fn valid_month(month: &u32) -> bool {
    (1..=12).contains(month)
}

fn check_all<T: Display>(
    items: &[T],
    part: &'static str,
    valid: impl Fn(&T) -> bool,
) -> Result<(), RecurrenceError> {
    match items.iter().find(|item| !valid(*item)) {
        Some(item) => Err(RecurrenceError::InvalidValue(part, item.to_string())),
        None => Ok(()),
    }
}

/// The body of an `RRULE`/`EXRULE` token.
///
/// `INTERVAL`, `BYMONTHDAY` and `BYMONTH` are only settable through the
/// checked builder methods, so every rule encodes to a token `decode` accepts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecurrenceRule {
    pub freq: Frequency,
    interval: Option<u32>,
    pub end: Option<RuleEnd>,
    pub by_week_day: Vec<ByDay>,
    by_month_day: Vec<i8>,
    by_month: Vec<u32>,
    pub week_start: Weekday,
}

impl Default for RecurrenceRule {
    fn default() -> Self {
        Self::new(Frequency::default())
    }
}

impl RecurrenceRule {
    pub fn new(freq: Frequency) -> Self {
        Self {
            freq,
            interval: None,
            end: None,
            by_week_day: Vec::new(),
            by_month_day: Vec::new(),
            by_month: Vec::new(),
            week_start: Weekday::Sun,
        }
    }

    /// Fails for an interval of 0.
    pub fn interval(mut self, interval: u32) -> Result<Self, RecurrenceError> {
        if !valid_interval(&interval) {
            return Err(RecurrenceError::InvalidValue("INTERVAL", interval.to_string()));
        }
        self.interval = Some(interval);
        Ok(self)
    }

    pub fn count(mut self, count: u32) -> Self {
        self.end = Some(RuleEnd::Count(count));
        self
    }

    pub fn until(mut self, until: impl Into<RecurrenceDate>) -> Self {
        self.end = Some(RuleEnd::Until(until.into()));
        self
    }

    pub fn by_week_day<I, D>(mut self, days: I) -> Self
    where
        I: IntoIterator<Item = D>,
        D: Into<ByDay>,
    {
        self.by_week_day = days.into_iter().map(Into::into).collect();
        self
    }

    /// Days are 1..=31, or -31..=-1 counting from the end of the month.
    pub fn by_month_day(mut self, days: impl IntoIterator<Item = i8>) -> Result<Self, RecurrenceError> {
        let days: Vec<i8> = days.into_iter().collect();
        check_all(&days, "BYMONTHDAY", valid_month_day)?;
        self.by_month_day = days;
        Ok(self)
    }

    pub fn by_month(mut self, months: impl IntoIterator<Item = u32>) -> Result<Self, RecurrenceError> {
        let months: Vec<u32> = months.into_iter().collect();
        check_all(&months, "BYMONTH", valid_month)?;
        self.by_month = months;
        Ok(self)
    }

    pub fn every(&self) -> Option<u32> {
        self.interval
    }

    pub fn month_days(&self) -> &[i8] {
        &self.by_month_day
    }

    pub fn months(&self) -> &[u32] {
        &self.by_month
    }

    pub fn week_start(mut self, day: Weekday) -> Self {
        self.week_start = day;
        self
    }

    fn encode_body(&self) -> String {
        let mut parts = vec![format!("FREQ={}", self.freq.as_ref())];
        if let Some(interval) = self.interval {
            parts.push(format!("INTERVAL={interval}"));
        }
        match self.end {
            Some(RuleEnd::Count(count)) => parts.push(format!("COUNT={count}")),
            Some(RuleEnd::Until(until)) => parts.push(format!("UNTIL={until}")),
            None => {}
        }
        if !self.by_week_day.is_empty() {
            parts.push(format!("BYDAY={}", join(&self.by_week_day)));
        }
        if !self.by_month_day.is_empty() {
            parts.push(format!("BYMONTHDAY={}", join(&self.by_month_day)));
        }
        if !self.by_month.is_empty() {
            parts.push(format!("BYMONTH={}", join(&self.by_month)));
        }
        parts.push(format!("WKST={}", weekday_code(self.week_start)));
        parts.join(";")
    }

    fn decode_body(body: &str) -> Result<Self, RecurrenceError> {
        let mut freq = None;
        let mut rule = RecurrenceRule::default();

        for part in body.split(';').filter(|p| !p.is_empty()) {
            let (key, value) = part
                .split_once('=')
                .ok_or_else(|| RecurrenceError::MalformedPart(part.to_string()))?;

            match key.to_uppercase().as_str() {
                "FREQ" => freq = Some(value.parse::<Frequency>()?),
                "INTERVAL" => {
                    let interval = value
                        .parse::<u32>()
                        .ok()
                        .filter(valid_interval)
                        .ok_or_else(|| RecurrenceError::InvalidValue("INTERVAL", value.to_string()))?;
                    rule.interval = Some(interval);
                }
                "COUNT" => {
                    if rule.end.is_some() {
                        return Err(RecurrenceError::CountAndUntil);
                    }
                    let count = value
                        .parse::<u32>()
                        .map_err(|_| RecurrenceError::InvalidValue("COUNT", value.to_string()))?;
                    rule.end = Some(RuleEnd::Count(count));
                }
                "UNTIL" => {
                    if rule.end.is_some() {
                        return Err(RecurrenceError::CountAndUntil);
                    }
                    rule.end = Some(RuleEnd::Until(value.parse()?));
                }
                "BYDAY" => {
                    rule.by_week_day = value
                        .split(',')
                        .map(str::parse::<ByDay>)
                        .collect::<Result<Vec<_>, _>>()?;
                }
                "BYMONTHDAY" => {
                    rule.by_month_day = parse_list(value, "BYMONTHDAY", valid_month_day)?;
                }
                "BYMONTH" => {
                    rule.by_month = parse_list(value, "BYMONTH", valid_month)?;
                }
                "WKST" => {
                    rule.week_start = parse_weekday(value)
                        .ok_or_else(|| RecurrenceError::InvalidValue("WKST", value.to_string()))?;
                }
                _ => return Err(RecurrenceError::UnknownPart(key.to_string())),
            }
        }

        rule.freq = freq.ok_or_else(|| RecurrenceError::MissingFrequency(body.to_string()))?;
        Ok(rule)
    }
}

fn join<T: Display>(items: &[T]) -> String {
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

fn parse_list<T, F>(value: &str, part: &'static str, valid: F) -> Result<Vec<T>, RecurrenceError>
where
    T: FromStr,
    F: Fn(&T) -> bool,
{
    value
        .split(',')
        .map(|item| {
            item.parse::<T>()
                .ok()
                .filter(|parsed| valid(parsed))
                .ok_or_else(|| RecurrenceError::InvalidValue(part, item.to_string()))
        })
        .collect()
}

/// One entry of an event's `recurrence` list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recurrence {
    Rule(RecurrenceRule),
    ExcludeRule(RecurrenceRule),
    Dates(Vec<RecurrenceDate>),
    ExcludeDates(Vec<RecurrenceDate>),
}

impl Recurrence {
    pub fn rule(rule: RecurrenceRule) -> Self {
        Recurrence::Rule(rule)
    }

    pub fn exclude_rule(rule: RecurrenceRule) -> Self {
        Recurrence::ExcludeRule(rule)
    }

    pub fn dates<I, D>(dates: I) -> Self
    where
        I: IntoIterator<Item = D>,
        D: Into<RecurrenceDate>,
    {
        Recurrence::Dates(dates.into_iter().map(Into::into).collect())
    }

    pub fn exclude_dates<I, D>(dates: I) -> Self
    where
        I: IntoIterator<Item = D>,
        D: Into<RecurrenceDate>,
    {
        Recurrence::ExcludeDates(dates.into_iter().map(Into::into).collect())
    }
}

pub fn encode(recurrence: &Recurrence) -> String {
    match recurrence {
        Recurrence::Rule(rule) => format!("RRULE:{}", rule.encode_body()),
        Recurrence::ExcludeRule(rule) => format!("EXRULE:{}", rule.encode_body()),
        Recurrence::Dates(dates) => encode_dates("RDATE", dates),
        Recurrence::ExcludeDates(dates) => encode_dates("EXDATE", dates),
    }
}

fn encode_dates(name: &str, dates: &[RecurrenceDate]) -> String {
    let all_dates = dates.iter().all(|d| matches!(d, RecurrenceDate::Date(_)));
    if all_dates {
        return format!("{name};VALUE=DATE:{}", join(dates));
    }

    let zone = dates.first().and_then(RecurrenceDate::zone);
    match zone {
        Some(tz) if dates.iter().all(|d| d.zone() == Some(tz)) => {
            let local = dates
                .iter()
                .filter_map(|d| match d {
                    RecurrenceDate::Zoned(dt) => Some(dt.format(LOCAL_DATE_TIME_FORMAT).to_string()),
                    _ => None,
                })
                .collect::<Vec<_>>()
                .join(",");
            format!("{name};TZID={}:{local}", tz.name())
        }
        _ => format!("{name}:{}", join(dates)),
    }
}

pub fn decode(token: &str) -> Result<Recurrence, RecurrenceError> {
    let token = token.trim();
    let (head, body) = token
        .split_once(':')
        .ok_or_else(|| RecurrenceError::UnknownProperty(token.to_string()))?;
    let (name, parameter) = match head.split_once(';') {
        Some((name, parameter)) => (name, Some(parameter)),
        None => (head, None),
    };

    match name.to_uppercase().as_str() {
        "RRULE" | "EXRULE" => {
            if let Some(parameter) = parameter {
                return Err(RecurrenceError::UnsupportedParameter(parameter.to_string()));
            }
            let rule = RecurrenceRule::decode_body(body)?;
            if name.eq_ignore_ascii_case("RRULE") {
                Ok(Recurrence::Rule(rule))
            } else {
                Ok(Recurrence::ExcludeRule(rule))
            }
        }
        "RDATE" | "EXDATE" => {
            let dates = decode_dates(parameter, body)?;
            if name.eq_ignore_ascii_case("RDATE") {
                Ok(Recurrence::Dates(dates))
            } else {
                Ok(Recurrence::ExcludeDates(dates))
            }
        }
        _ => Err(RecurrenceError::UnknownProperty(name.to_string())),
    }
}

fn decode_dates(parameter: Option<&str>, body: &str) -> Result<Vec<RecurrenceDate>, RecurrenceError> {
    if let Some(zone) = parameter.and_then(tzid) {
        let tz = parse_timezone(zone)
            .ok_or_else(|| RecurrenceError::UnsupportedParameter(format!("TZID={zone}")))?;
        return body
            .split(',')
            .filter(|item| !item.is_empty())
            .map(|item| parse_local(item, tz))
            .collect();
    }

    // `EXDATE:VALUE=DATE:...` shows up in hand-written payloads; read it like
    // the `;VALUE=DATE` form.
    let (dates_only, body) = match parameter {
        Some(p) if p.eq_ignore_ascii_case("VALUE=DATE") => (true, body),
        Some(p) => return Err(RecurrenceError::UnsupportedParameter(p.to_string())),
        None => match body.strip_prefix("VALUE=DATE:") {
            Some(rest) => (true, rest),
            None => (false, body),
        },
    };

    body.split(',')
        .filter(|item| !item.is_empty())
        .map(|item| {
            if dates_only {
                parse_date(item).map(RecurrenceDate::Date)
            } else {
                item.parse()
            }
        })
        .collect()
}

fn tzid(parameter: &str) -> Option<&str> {
    let (key, value) = parameter.split_once('=')?;
    key.eq_ignore_ascii_case("TZID").then_some(value)
}

fn parse_local(item: &str, tz: Tz) -> Result<RecurrenceDate, RecurrenceError> {
    NaiveDateTime::parse_from_str(item, LOCAL_DATE_TIME_FORMAT)
        .ok()
        .and_then(|naive| localize(naive, tz))
        .map(RecurrenceDate::Zoned)
        .ok_or_else(|| RecurrenceError::InvalidDate(item.to_string()))
}

impl Display for Recurrence {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&encode(self))
    }
}

impl FromStr for Recurrence {
    type Err = RecurrenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        decode(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn breakfast_recurrence() -> Vec<Recurrence> {
        vec![
            Recurrence::rule(RecurrenceRule::new(Frequency::Daily)),
            Recurrence::exclude_rule(RecurrenceRule::default().by_week_day([Weekday::Mon])),
            Recurrence::exclude_dates([date(2019, 4, 19), date(2019, 4, 22), date(2019, 5, 12)]),
        ]
    }

    #[test]
    fn encode_daily_rule_with_exclusions() {
        let tokens: Vec<String> = breakfast_recurrence().iter().map(encode).collect();

        assert_eq!(
            tokens,
            vec![
                "RRULE:FREQ=DAILY;WKST=SU",
                "EXRULE:FREQ=DAILY;BYDAY=MO;WKST=SU",
                "EXDATE;VALUE=DATE:20190419,20190422,20190512",
            ]
        );
    }

    #[test]
    fn decode_reverses_encode() {
        for recurrence in breakfast_recurrence() {
            assert_eq!(decode(&encode(&recurrence)).unwrap(), recurrence);
        }
    }

    #[test]
    fn encode_full_rule_in_canonical_order() {
        let rule = RecurrenceRule::new(Frequency::Monthly)
            .interval(2)
            .unwrap()
            .count(10)
            .by_week_day([ByDay::nth(-1, Weekday::Fri)])
            .by_month([1, 6])
            .unwrap()
            .week_start(Weekday::Mon);

        let token = encode(&Recurrence::rule(rule.clone()));

        assert_eq!(token, "RRULE:FREQ=MONTHLY;INTERVAL=2;COUNT=10;BYDAY=-1FR;BYMONTH=1,6;WKST=MO");
        assert_eq!(decode(&token).unwrap(), Recurrence::Rule(rule));
    }

    #[test]
    fn rule_with_interval_month_days_and_months_decodes_back() {
        let rule = RecurrenceRule::new(Frequency::Yearly)
            .interval(3)
            .unwrap()
            .by_month_day([1, 15, -1])
            .unwrap()
            .by_month([2, 12])
            .unwrap();

        let token = encode(&Recurrence::rule(rule.clone()));

        assert_eq!(token, "RRULE:FREQ=YEARLY;INTERVAL=3;BYMONTHDAY=1,15,-1;BYMONTH=2,12;WKST=SU");
        let Recurrence::Rule(decoded) = decode(&token).unwrap() else {
            panic!("expected an inclusion rule");
        };
        assert_eq!(decoded, rule);
        assert_eq!(decoded.every(), Some(3));
        assert_eq!(decoded.month_days(), &[1, 15, -1]);
        assert_eq!(decoded.months(), &[2, 12]);
    }

    #[test]
    fn builder_rejects_values_decode_would_refuse() {
        let rule = RecurrenceRule::new(Frequency::Daily);

        assert_eq!(
            rule.clone().interval(0),
            Err(RecurrenceError::InvalidValue("INTERVAL", "0".to_string()))
        );
        assert_eq!(
            rule.clone().by_month_day([5, 0]),
            Err(RecurrenceError::InvalidValue("BYMONTHDAY", "0".to_string()))
        );
        assert_eq!(
            rule.clone().by_month_day([-32]),
            Err(RecurrenceError::InvalidValue("BYMONTHDAY", "-32".to_string()))
        );
        assert_eq!(
            rule.by_month([13]),
            Err(RecurrenceError::InvalidValue("BYMONTH", "13".to_string()))
        );
    }

    #[test]
    fn until_date_time_is_written_in_utc() {
        let until = Utc.with_ymd_and_hms(2020, 1, 1, 11, 22, 33).unwrap();
        let rule = RecurrenceRule::new(Frequency::Weekly).until(until);

        let token = encode(&Recurrence::rule(rule));

        assert_eq!(token, "RRULE:FREQ=WEEKLY;UNTIL=20200101T112233Z;WKST=SU");
    }

    #[test]
    fn decode_defaults_week_start_to_sunday() {
        let decoded = decode("RRULE:FREQ=WEEKLY;BYDAY=MO,WE").unwrap();

        let Recurrence::Rule(rule) = decoded else {
            panic!("expected an inclusion rule");
        };
        assert_eq!(rule.week_start, Weekday::Sun);
        assert_eq!(rule.by_week_day, vec![ByDay::from(Weekday::Mon), ByDay::from(Weekday::Wed)]);
    }

    #[test]
    fn decode_accepts_colon_separated_value_parameter() {
        let decoded = decode("EXDATE:VALUE=DATE:20190419,20190422,20190512").unwrap();

        assert_eq!(
            decoded,
            Recurrence::exclude_dates([date(2019, 4, 19), date(2019, 4, 22), date(2019, 5, 12)])
        );
    }

    #[test]
    fn date_times_are_written_without_value_parameter() {
        let instant = Utc.with_ymd_and_hms(2019, 4, 19, 11, 0, 0).unwrap();
        let recurrence = Recurrence::dates([RecurrenceDate::from(instant), date(2019, 4, 20).into()]);

        let token = encode(&recurrence);

        assert_eq!(token, "RDATE:20190419T110000Z,20190420");
        assert_eq!(decode(&token).unwrap(), recurrence);
    }

    #[test]
    fn zoned_exclusions_keep_their_tzid() {
        let token = "EXDATE;TZID=Europe/Prague:20190419T100000,20190426T100000";

        let decoded = decode(token).unwrap();

        let Recurrence::ExcludeDates(dates) = &decoded else {
            panic!("expected an exclusion list");
        };
        let prague = chrono_tz::Europe::Prague;
        assert_eq!(
            dates[0],
            RecurrenceDate::Zoned(prague.with_ymd_and_hms(2019, 4, 19, 10, 0, 0).unwrap())
        );
        assert_eq!(dates[0].to_string(), "20190419T080000Z");
        assert_eq!(encode(&decoded), token);
    }

    #[test]
    fn mixed_zones_fall_back_to_utc() {
        let prague = chrono_tz::Europe::Prague.with_ymd_and_hms(2019, 4, 19, 10, 0, 0).unwrap();
        let fiji = chrono_tz::Pacific::Fiji.with_ymd_and_hms(2019, 4, 20, 10, 0, 0).unwrap();

        let token = encode(&Recurrence::exclude_dates([prague, fiji]));

        assert_eq!(token, "EXDATE:20190419T080000Z,20190419T220000Z");
    }

    #[test]
    fn zoned_time_in_dst_gap_is_invalid() {
        assert_eq!(
            decode("EXDATE;TZID=Europe/Prague:20210328T023000"),
            Err(RecurrenceError::InvalidDate("20210328T023000".to_string()))
        );
    }

    #[test]
    fn decode_rule_without_freq_fails() {
        assert_eq!(
            decode("RRULE:BYDAY=MO;WKST=SU"),
            Err(RecurrenceError::MissingFrequency("BYDAY=MO;WKST=SU".to_string()))
        );
    }

    #[test]
    fn decode_rejects_count_with_until() {
        assert_eq!(
            decode("RRULE:FREQ=DAILY;COUNT=3;UNTIL=20200101"),
            Err(RecurrenceError::CountAndUntil)
        );
    }

    #[test]
    fn decode_rejects_unknown_parts_and_properties() {
        assert!(matches!(
            decode("RRULE:FREQ=DAILY;BYHOUR=9"),
            Err(RecurrenceError::UnknownPart(_))
        ));
        assert!(matches!(
            decode("EXDATE;X-FOO=1:20190419T100000Z"),
            Err(RecurrenceError::UnsupportedParameter(_))
        ));
        assert!(matches!(
            decode("EXDATE;TZID=Mars/Olympus_Mons:20190419T100000"),
            Err(RecurrenceError::UnsupportedParameter(_))
        ));
        assert!(matches!(
            decode("VTIMEZONE:FOO"),
            Err(RecurrenceError::UnknownProperty(_))
        ));
        assert!(matches!(
            decode("RRULE:FREQ=FORTNIGHTLY"),
            Err(RecurrenceError::InvalidValue("FREQ", _))
        ));
    }

    #[test]
    fn decode_rejects_bad_dates() {
        assert!(matches!(
            decode("EXDATE;VALUE=DATE:20190231"),
            Err(RecurrenceError::InvalidDate(_))
        ));
    }
}
