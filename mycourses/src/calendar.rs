//! Calendar export feed: locating, extracting and summarizing.

use std::{fs, io, path::Path};

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use mycourses_agenda::{parse_calendar, sort_by_start, Event};
use reqwest::Url;
use tracing::{instrument, warn};

use crate::{ConfigError, Error, Result, Summary};

/// Longest description shown before it is cut.
pub const DESCRIPTION_PREVIEW_CHARS: usize = 100;

const TIME_FMT: &str = "%a %b %d, %Y %H:%M";

/// Read the feed URL from the single-line file at `path`.
///
/// # Errors
///
/// A [`ConfigError`] when the file is missing, unreadable or empty, or does
/// not hold an HTTP(S) URL.
pub fn read_feed_url(path: &Path) -> Result<Url> {
    let contents = fs::read_to_string(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => ConfigError::FeedUrlMissing(path.to_owned()),
        _ => ConfigError::Unreadable {
            path: path.to_owned(),
            source: e,
        },
    })?;

    let url = contents.trim();

    if url.is_empty() {
        return Err(ConfigError::FeedUrlEmpty(path.to_owned()).into());
    }

    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err(ConfigError::InvalidFeedUrl(url.to_owned()).into());
    }

    url.parse()
        .map_err(|_| ConfigError::InvalidFeedUrl(url.to_owned()).into())
}

/// Parse a feed and sort its events by start time, undated events first.
///
/// When the feed cannot be parsed the raw payload is written to
/// `debug_file` before the error is returned.
///
/// # Errors
///
/// [`Error::Parse`], carrying the debug file path if it was written.
#[instrument(skip(ics), fields(len = ics.len()))]
pub fn extract_events(ics: &str, local: Tz, debug_file: &Path) -> Result<Vec<Event>> {
    match parse_calendar(ics, local) {
        Ok(mut events) => {
            sort_by_start(&mut events);
            Ok(events)
        }
        Err(source) => {
            warn!("calendar parse failed: {source}");

            let debug_file = match fs::write(debug_file, ics) {
                Ok(()) => Some(debug_file.to_owned()),
                Err(e) => {
                    warn!("could not save debug file: {e}");
                    None
                }
            };

            Err(Error::Parse { source, debug_file })
        }
    }
}

/// Format an event time in `tz`, e.g. `Mon Nov 18, 2024 09:00`.
#[must_use]
pub fn format_time(time: Option<DateTime<Utc>>, tz: Tz) -> String {
    match time {
        Some(time) => time.with_timezone(&tz).format(TIME_FMT).to_string(),
        None => "No date".to_owned(),
    }
}

fn preview(description: &str) -> Option<String> {
    let description = description.trim();

    if description.is_empty() {
        return None;
    }

    if description.chars().count() > DESCRIPTION_PREVIEW_CHARS {
        let mut cut = description
            .chars()
            .take(DESCRIPTION_PREVIEW_CHARS - 3)
            .collect::<String>();
        cut.push_str("...");
        return Some(cut);
    }

    Some(description.to_owned())
}

/// List `events` in their given order, showing times in `tz`.
#[must_use]
pub fn summarize(events: &[Event], tz: Tz) -> Summary {
    let mut summary = Summary::new("CALENDAR EVENTS");

    if events.is_empty() {
        summary.push("Events", "No events found in the calendar");
        return summary;
    }

    summary.push("Events", format!("Found {} event(s)", events.len()));

    for event in events {
        summary.push("When", format_time(event.start, tz));

        if let Some(name) = &event.name {
            summary.push("What", name);
        }
        if let Some(end) = event.distinct_end() {
            summary.push("Ends", format_time(Some(end), tz));
        }
        if let Some(location) = &event.location {
            summary.push("Location", location);
        }
        if let Some(notes) = event.description.as_deref().and_then(preview) {
            summary.push("Notes", notes);
        }
    }

    summary
}
