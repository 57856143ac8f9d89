//! ICS feed parsing on top of the icalendar crate's parser.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use icalendar::parser::{read_calendar, unfold, Component, Property};
use thiserror::Error;
use tracing::{debug, trace};

use crate::Event;

const DATE_TIME_FMT: &str = "%Y%m%dT%H%M%S";
const DATE_FMT: &str = "%Y%m%d";

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("not a calendar (starts with {0:?})")]
    NotACalendar(String),

    #[error("malformed calendar: {0}")]
    Malformed(String),

    #[error("invalid {property} value {value:?}")]
    InvalidTime {
        property: &'static str,
        value: String,
    },
}

/// Parse an ICS document into its events, in feed order.
///
/// Floating times and all-day dates are interpreted in `local`.
pub fn parse_calendar(ics: &str, local: Tz) -> Result<Vec<Event>, ParseError> {
    let unfolded = unfold(ics);

    if !unfolded.trim_start().starts_with("BEGIN:VCALENDAR") {
        let head = unfolded.trim_start().lines().next().unwrap_or("");
        return Err(ParseError::NotACalendar(head.chars().take(40).collect()));
    }

    let calendar = read_calendar(&unfolded).map_err(|e| ParseError::Malformed(e.to_string()))?;

    let mut events = Vec::new();
    collect_events(&calendar.components, local, &mut events)?;

    debug!("parsed {} events", events.len());

    Ok(events)
}

fn collect_events(
    components: &[Component<'_>],
    local: Tz,
    events: &mut Vec<Event>,
) -> Result<(), ParseError> {
    for component in components {
        if component.name == "VEVENT" {
            events.push(to_event(component, local)?);
        } else {
            collect_events(&component.components, local, events)?;
        }
    }

    Ok(())
}

fn to_event(vevent: &Component<'_>, local: Tz) -> Result<Event, ParseError> {
    let text = |name: &str| {
        vevent
            .find_prop(name)
            .map(|p| unescape(p.val.as_ref()))
            .filter(|s| !s.trim().is_empty())
    };

    Ok(Event {
        start: time_prop(vevent, "DTSTART", local)?,
        end: time_prop(vevent, "DTEND", local)?,
        name: text("SUMMARY"),
        location: text("LOCATION"),
        description: text("DESCRIPTION"),
    })
}

fn time_prop(
    vevent: &Component<'_>,
    property: &'static str,
    local: Tz,
) -> Result<Option<DateTime<Utc>>, ParseError> {
    let Some(prop) = vevent.find_prop(property) else {
        return Ok(None);
    };

    parse_time(prop, local)
        .map(Some)
        .ok_or_else(|| ParseError::InvalidTime {
            property,
            value: prop.val.to_string(),
        })
}

fn param<'p>(prop: &'p Property<'_>, key: &str) -> Option<&'p str> {
    prop.params
        .iter()
        .find(|p| p.key == key)
        .and_then(|p| p.val.as_ref())
        .map(|v| v.as_ref())
}

/// Handles `VALUE=DATE`, UTC (`...Z`), `TZID=` and floating values.
fn parse_time(prop: &Property<'_>, local: Tz) -> Option<DateTime<Utc>> {
    let value = prop.val.as_ref().trim();

    let bare_date = value.len() == 8 && value.bytes().all(|b| b.is_ascii_digit());

    if param(prop, "VALUE") == Some("DATE") || bare_date {
        let date = NaiveDate::parse_from_str(value, DATE_FMT).ok()?;
        return in_zone(date.and_hms_opt(0, 0, 0)?, local);
    }

    if let Some(utc) = value.strip_suffix('Z') {
        let naive = NaiveDateTime::parse_from_str(utc, DATE_TIME_FMT).ok()?;
        return Some(Utc.from_utc_datetime(&naive));
    }

    let naive = NaiveDateTime::parse_from_str(value, DATE_TIME_FMT).ok()?;

    match param(prop, "TZID") {
        Some(tzid) => match tzid.parse::<Tz>() {
            Ok(tz) => in_zone(naive, tz),
            Err(_) => {
                trace!(tzid, "unknown tzid, using local zone");
                in_zone(naive, local)
            }
        },
        None => in_zone(naive, local),
    }
}

/// Times skipped by a DST jump are moved forward past the gap.
fn in_zone(naive: NaiveDateTime, tz: Tz) -> Option<DateTime<Utc>> {
    tz.from_local_datetime(&naive)
        .earliest()
        .or_else(|| tz.from_local_datetime(&(naive + Duration::hours(1))).earliest())
        .map(|dt| dt.with_timezone(&Utc))
}

/// Undo RFC 5545 text escaping.
fn unescape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }

        match chars.next() {
            Some('n' | 'N') => out.push('\n'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }

    out
}
