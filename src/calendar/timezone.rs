use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone};
use chrono_tz::Tz;

/// Source of the timezone used when an event does not name one.
pub trait AmbientTimezone {
    fn timezone(&self) -> Tz;
}

impl AmbientTimezone for Tz {
    fn timezone(&self) -> Tz {
        *self
    }
}

/// The machine's zone: `TZ` from the environment, else the zone the
/// operating system reports, else UTC.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTimezone;

impl AmbientTimezone for SystemTimezone {
    fn timezone(&self) -> Tz {
        let from_env = std::env::var("TZ").ok();
        let from_system = iana_time_zone::get_timezone()
            .map_err(|e| tracing::debug!("Failed to get system timezone: {}", e))
            .ok();
        resolve_system_timezone(from_env.as_deref(), from_system.as_deref())
    }
}

fn resolve_system_timezone(from_env: Option<&str>, from_system: Option<&str>) -> Tz {
    let from_env = from_env.filter(|name| !name.trim().is_empty()).and_then(|name| {
        let tz = parse_timezone(name.trim_start_matches(':'));
        if tz.is_none() {
            tracing::warn!("Ignoring unknown TZ value: {}", name);
        }
        tz
    });

    from_env
        .or_else(|| from_system.and_then(parse_timezone))
        .unwrap_or_else(|| {
            tracing::warn!("Failed to get timezone, using UTC");
            Tz::UTC
        })
}

pub fn parse_timezone(name: &str) -> Option<Tz> {
    name.trim().parse::<Tz>().ok()
}

/// Attaches `tz` to a naive date-time. Ambiguous times (DST fold) resolve to
/// the earlier instant; times inside a DST gap yield `None`.
pub fn localize(naive: NaiveDateTime, tz: Tz) -> Option<DateTime<Tz>> {
    tz.from_local_datetime(&naive).earliest()
}

/// Midnight of `date` in `tz`, or the first instant of the day when midnight
/// falls inside a DST gap.
pub fn start_of_day(date: NaiveDate, tz: Tz) -> DateTime<Tz> {
    let midnight = date.and_time(chrono::NaiveTime::MIN);
    localize(midnight, tz).unwrap_or_else(|| tz.from_utc_datetime(&midnight))
}
