use chrono::{DateTime, Utc};

mod parse;

pub use parse::{parse_calendar, ParseError};

/// A single entry of a calendar feed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Event {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub name: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
}

impl Event {
    /// The end time, if the event has one that differs from its start.
    pub fn distinct_end(&self) -> Option<DateTime<Utc>> {
        self.end.filter(|end| Some(*end) != self.start)
    }
}

/// Sort events by start time, earliest first.
///
/// Events without a start time come before everything else. The sort is
/// stable, so events sharing a start keep their feed order.
pub fn sort_by_start(events: &mut [Event]) {
    events.sort_by_key(|e| e.start);
}
