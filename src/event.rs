//! Calendar event value type.
//!
//! An `Event` is one occurrence on a calendar, timed or all-day. Start and
//! end are naive datetimes interpreted in the owning calendar's timezone.
//! Identity (equality and hashing) is the (subject, start, end) triple;
//! two events sharing that triple are duplicates and can never coexist in
//! one calendar.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

/// Visibility of an event.
///
/// Only these two values are exercised by the model; there is no separate
/// "busy" status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventStatus {
    Public,
    Private,
}

impl EventStatus {
    /// Lenient parse used by status edits: "public" (any case) maps to
    /// `Public`, everything else to `Private`.
    pub fn parse_lenient(value: &str) -> EventStatus {
        if value.eq_ignore_ascii_case("public") {
            EventStatus::Public
        } else {
            EventStatus::Private
        }
    }
}

/// All-day events span the working day in the calendar's local time.
pub(crate) fn working_day_start() -> NaiveTime {
    NaiveTime::from_hms_opt(8, 0, 0).unwrap()
}

pub(crate) fn working_day_end() -> NaiveTime {
    NaiveTime::from_hms_opt(17, 0, 0).unwrap()
}

/// A single calendar occurrence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub subject: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub description: Option<String>,
    pub location: Option<String>,
    pub status: EventStatus,
    pub all_day: bool,
    /// `None` for standalone events; set by series materialization.
    pub series_id: Option<String>,
}

impl Event {
    /// Timed event with minimal properties. Defaults to `Public`.
    pub fn timed(subject: impl Into<String>, start: NaiveDateTime, end: NaiveDateTime) -> Event {
        Event::timed_with_details(subject, start, end, None, None, Some(EventStatus::Public))
    }

    /// Timed event with all properties. An explicit `None` status means the
    /// caller withheld visibility, which defaults to `Private`.
    pub fn timed_with_details(
        subject: impl Into<String>,
        start: NaiveDateTime,
        end: NaiveDateTime,
        description: Option<String>,
        location: Option<String>,
        status: Option<EventStatus>,
    ) -> Event {
        Event {
            subject: subject.into(),
            start,
            end,
            description,
            location,
            status: status.unwrap_or(EventStatus::Private),
            all_day: false,
            series_id: None,
        }
    }

    /// All-day event with minimal properties.
    pub fn all_day(subject: impl Into<String>, date: NaiveDate) -> Event {
        Event::all_day_with_details(subject, date, None, None, Some(EventStatus::Public))
    }

    /// All-day event with all properties. Synthesizes 08:00-17:00 on `date`;
    /// a `None` status defaults to `Public`.
    pub fn all_day_with_details(
        subject: impl Into<String>,
        date: NaiveDate,
        description: Option<String>,
        location: Option<String>,
        status: Option<EventStatus>,
    ) -> Event {
        Event {
            subject: subject.into(),
            start: date.and_time(working_day_start()),
            end: date.and_time(working_day_end()),
            description,
            location,
            status: status.unwrap_or(EventStatus::Public),
            all_day: true,
            series_id: None,
        }
    }

    /// Duplicate test: same subject, start, and end.
    pub fn conflicts_with(&self, other: &Event) -> bool {
        self.subject == other.subject && self.start == other.start && self.end == other.end
    }

    /// Whether the inclusive [start date, end date] span contains `date`.
    /// An event running 23:00-01:00 shows up on both days.
    pub fn occurs_on_date(&self, date: NaiveDate) -> bool {
        date >= self.start.date() && date <= self.end.date()
    }

    /// Whether `at` falls inside `[start, end)`. The end instant itself
    /// does not count as active.
    pub fn is_active_at(&self, at: NaiveDateTime) -> bool {
        at >= self.start && at < self.end
    }

    pub fn duration(&self) -> chrono::TimeDelta {
        self.end - self.start
    }
}

// Identity is the (subject, start, end) triple; everything else is payload.
impl PartialEq for Event {
    fn eq(&self, other: &Self) -> bool {
        self.conflicts_with(other)
    }
}

impl Eq for Event {}

impl Hash for Event {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.subject.hash(state);
        self.start.hash(state);
        self.end.hash(state);
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let date = self.start.format("%b %d");

        if self.all_day {
            write!(f, "\u{2022} {} ({}, All Day)", self.subject, date)?;
        } else {
            write!(
                f,
                "\u{2022} {} ({}, {} - {})",
                self.subject,
                date,
                self.start.format("%-H:%M"),
                self.end.format("%-H:%M"),
            )?;
        }

        if let Some(location) = self.location.as_deref()
            && !location.trim().is_empty()
        {
            write!(f, " at {}", location)?;
        }

        Ok(())
    }
}
