//! A single named, timezone-scoped calendar.
//!
//! `Calendar` owns its event store and everything that operates on it:
//! conflict-checked insertion, series materialization, queries, and the
//! three edit-propagation scopes. Cross-calendar concerns (selection,
//! copying, series-id allocation) live in the manager.

use chrono::{Datelike, NaiveDate, NaiveDateTime, Weekday};
use log::debug;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

use crate::error::{CalendarError, CalendarResult};
use crate::event::{self, Event, EventStatus};
use crate::series::EventSeries;

/// Datetime format accepted by start/end edit values.
pub(crate) const DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M";

pub(crate) fn parse_datetime(value: &str) -> CalendarResult<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value, DATETIME_FORMAT)
        .map_err(|_| CalendarError::InvalidDateTime(value.to_string()))
}

pub(crate) fn parse_timezone(value: &str) -> CalendarResult<chrono_tz::Tz> {
    value
        .parse()
        .map_err(|_| CalendarError::InvalidTimezone(value.to_string()))
}

/// The editable properties of an event. Parsing the name up front keeps
/// property validation fail-fast: an unknown name rejects the whole edit
/// before anything mutates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventProperty {
    Subject,
    Start,
    End,
    Description,
    Location,
    Status,
}

impl FromStr for EventProperty {
    type Err = CalendarError;

    fn from_str(s: &str) -> CalendarResult<EventProperty> {
        match s.to_ascii_lowercase().as_str() {
            "subject" => Ok(EventProperty::Subject),
            "start" => Ok(EventProperty::Start),
            "end" => Ok(EventProperty::End),
            "description" => Ok(EventProperty::Description),
            "location" => Ok(EventProperty::Location),
            "status" => Ok(EventProperty::Status),
            _ => Err(CalendarError::UnknownProperty(s.to_string())),
        }
    }
}

fn apply_property(event: &mut Event, property: EventProperty, value: &str) -> CalendarResult<()> {
    match property {
        EventProperty::Subject => event.subject = value.to_string(),
        EventProperty::Start => event.start = parse_datetime(value)?,
        EventProperty::End => event.end = parse_datetime(value)?,
        EventProperty::Description => event.description = Some(value.to_string()),
        EventProperty::Location => event.location = Some(value.to_string()),
        EventProperty::Status => event.status = EventStatus::parse_lenient(value),
    }
    Ok(())
}

/// One named calendar: a timezone, an event store keyed by the
/// (subject, start, end) triple, and the series records created in it.
#[derive(Debug, Clone)]
pub struct Calendar {
    name: String,
    timezone: chrono_tz::Tz,
    events: Vec<Event>,
    series: HashMap<String, EventSeries>,
}

impl Calendar {
    pub fn new(name: impl Into<String>, timezone: chrono_tz::Tz) -> Calendar {
        Calendar {
            name: name.into(),
            timezone,
            events: Vec::new(),
            series: HashMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn timezone(&self) -> chrono_tz::Tz {
        self.timezone
    }

    pub fn set_timezone(&mut self, timezone: chrono_tz::Tz) {
        self.timezone = timezone;
    }

    /// All events, in insertion order.
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Series metadata created in this calendar, if any.
    pub fn series(&self, series_id: &str) -> Option<&EventSeries> {
        self.series.get(series_id)
    }

    // INSERTION:

    /// Insert an event unless its (subject, start, end) triple already
    /// exists. Every creation path, including cross-calendar copies,
    /// funnels through here.
    pub fn add_event(&mut self, event: Event) -> bool {
        if self.events.iter().any(|existing| existing.conflicts_with(&event)) {
            debug!(
                "calendar '{}': rejecting duplicate event '{}' at {}",
                self.name, event.subject, event.start
            );
            return false;
        }
        self.events.push(event);
        true
    }

    pub fn create_event(
        &mut self,
        subject: &str,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> bool {
        self.add_event(Event::timed(subject, start, end))
    }

    pub fn create_event_with_details(
        &mut self,
        subject: &str,
        start: NaiveDateTime,
        end: NaiveDateTime,
        description: Option<String>,
        location: Option<String>,
        status: Option<EventStatus>,
    ) -> bool {
        self.add_event(Event::timed_with_details(
            subject,
            start,
            end,
            description,
            location,
            status,
        ))
    }

    pub fn create_all_day_event(&mut self, subject: &str, date: NaiveDate) -> bool {
        self.add_event(Event::all_day(subject, date))
    }

    pub fn create_all_day_event_with_details(
        &mut self,
        subject: &str,
        date: NaiveDate,
        description: Option<String>,
        location: Option<String>,
        status: Option<EventStatus>,
    ) -> bool {
        self.add_event(Event::all_day_with_details(
            subject,
            date,
            description,
            location,
            status,
        ))
    }

    // SERIES MATERIALIZATION:
    //
    // All four variants walk calendar dates from the anchor, stage a
    // candidate on every matching weekday, and abort the whole batch on
    // the first conflict against either the store or the staged events.
    // The series record is registered only when the batch commits.

    /// Timed series bounded by an occurrence count.
    #[allow(clippy::too_many_arguments)]
    pub fn create_event_series(
        &mut self,
        subject: &str,
        start: NaiveDateTime,
        end: NaiveDateTime,
        weekdays: &HashSet<Weekday>,
        occurrences: u32,
        description: Option<String>,
        location: Option<String>,
        status: Option<EventStatus>,
        series_id: &str,
    ) -> bool {
        // An empty weekday set can never produce the requested occurrences
        if occurrences > 0 && weekdays.is_empty() {
            return false;
        }

        let series = EventSeries::new(series_id, weekdays.clone(), start.time(), end.time(), false);

        let mut staged: Vec<Event> = Vec::new();
        for date in start.date().iter_days() {
            if staged.len() as u32 == occurrences {
                break;
            }
            if !weekdays.contains(&date.weekday()) {
                continue;
            }
            let candidate = self.series_candidate(
                &staged,
                Event::timed_with_details(
                    subject,
                    date.and_time(start.time()),
                    date.and_time(end.time()),
                    description.clone(),
                    location.clone(),
                    status,
                ),
                series_id,
            );
            match candidate {
                Some(event) => staged.push(event),
                None => return self.abort_series(series_id),
            }
        }

        self.commit_series(series, staged);
        true
    }

    /// Timed series bounded by an inclusive end date.
    #[allow(clippy::too_many_arguments)]
    pub fn create_event_series_until(
        &mut self,
        subject: &str,
        start: NaiveDateTime,
        end: NaiveDateTime,
        weekdays: &HashSet<Weekday>,
        end_date: NaiveDate,
        description: Option<String>,
        location: Option<String>,
        status: Option<EventStatus>,
        series_id: &str,
    ) -> bool {
        let series = EventSeries::new(series_id, weekdays.clone(), start.time(), end.time(), false);

        let mut staged: Vec<Event> = Vec::new();
        for date in start.date().iter_days() {
            if date > end_date {
                break;
            }
            if !weekdays.contains(&date.weekday()) {
                continue;
            }
            let candidate = self.series_candidate(
                &staged,
                Event::timed_with_details(
                    subject,
                    date.and_time(start.time()),
                    date.and_time(end.time()),
                    description.clone(),
                    location.clone(),
                    status,
                ),
                series_id,
            );
            match candidate {
                Some(event) => staged.push(event),
                None => return self.abort_series(series_id),
            }
        }

        self.commit_series(series, staged);
        true
    }

    /// All-day series bounded by an occurrence count.
    #[allow(clippy::too_many_arguments)]
    pub fn create_all_day_event_series(
        &mut self,
        subject: &str,
        start_date: NaiveDate,
        weekdays: &HashSet<Weekday>,
        occurrences: u32,
        description: Option<String>,
        location: Option<String>,
        status: Option<EventStatus>,
        series_id: &str,
    ) -> bool {
        if occurrences > 0 && weekdays.is_empty() {
            return false;
        }

        let series = EventSeries::new(
            series_id,
            weekdays.clone(),
            event::working_day_start(),
            event::working_day_end(),
            true,
        );

        let mut staged: Vec<Event> = Vec::new();
        for date in start_date.iter_days() {
            if staged.len() as u32 == occurrences {
                break;
            }
            if !weekdays.contains(&date.weekday()) {
                continue;
            }
            let candidate = self.series_candidate(
                &staged,
                Event::all_day_with_details(
                    subject,
                    date,
                    description.clone(),
                    location.clone(),
                    status,
                ),
                series_id,
            );
            match candidate {
                Some(event) => staged.push(event),
                None => return self.abort_series(series_id),
            }
        }

        self.commit_series(series, staged);
        true
    }

    /// All-day series bounded by an inclusive end date.
    #[allow(clippy::too_many_arguments)]
    pub fn create_all_day_event_series_until(
        &mut self,
        subject: &str,
        start_date: NaiveDate,
        weekdays: &HashSet<Weekday>,
        end_date: NaiveDate,
        description: Option<String>,
        location: Option<String>,
        status: Option<EventStatus>,
        series_id: &str,
    ) -> bool {
        let series = EventSeries::new(
            series_id,
            weekdays.clone(),
            event::working_day_start(),
            event::working_day_end(),
            true,
        );

        let mut staged: Vec<Event> = Vec::new();
        for date in start_date.iter_days() {
            if date > end_date {
                break;
            }
            if !weekdays.contains(&date.weekday()) {
                continue;
            }
            let candidate = self.series_candidate(
                &staged,
                Event::all_day_with_details(
                    subject,
                    date,
                    description.clone(),
                    location.clone(),
                    status,
                ),
                series_id,
            );
            match candidate {
                Some(event) => staged.push(event),
                None => return self.abort_series(series_id),
            }
        }

        self.commit_series(series, staged);
        true
    }

    /// Tag a candidate with the series id and check it against both the
    /// store and the batch staged so far; `None` signals a batch abort.
    fn series_candidate(&self, staged: &[Event], mut event: Event, series_id: &str) -> Option<Event> {
        event.series_id = Some(series_id.to_string());
        if self
            .events
            .iter()
            .chain(staged)
            .any(|existing| existing.conflicts_with(&event))
        {
            return None;
        }
        Some(event)
    }

    fn abort_series(&self, series_id: &str) -> bool {
        debug!(
            "calendar '{}': aborting series '{}', conflict found mid-batch",
            self.name, series_id
        );
        false
    }

    fn commit_series(&mut self, series: EventSeries, staged: Vec<Event>) {
        self.series.insert(series.series_id.clone(), series);
        self.events.extend(staged);
    }

    // LOOKUP + QUERIES:

    /// Exact lookup by the (subject, start, end) identity triple.
    pub fn find_event(
        &self,
        subject: &str,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Option<&Event> {
        self.events
            .iter()
            .find(|e| e.subject == subject && e.start == start && e.end == end)
    }

    pub fn find_event_by_subject_and_start(
        &self,
        subject: &str,
        start: NaiveDateTime,
    ) -> Option<&Event> {
        self.events
            .iter()
            .find(|e| e.subject == subject && e.start == start)
    }

    /// Events whose inclusive date span contains `date`, sorted by start.
    pub fn get_events_on_date(&self, date: NaiveDate) -> Vec<Event> {
        let mut hits: Vec<Event> = self
            .events
            .iter()
            .filter(|e| e.occurs_on_date(date))
            .cloned()
            .collect();
        hits.sort_by_key(|e| e.start);
        hits
    }

    /// Events overlapping the inclusive range [start, end], sorted by start.
    pub fn get_events_in_range(&self, start: NaiveDateTime, end: NaiveDateTime) -> Vec<Event> {
        let mut hits: Vec<Event> = self
            .events
            .iter()
            .filter(|e| e.end >= start && e.start <= end)
            .cloned()
            .collect();
        hits.sort_by_key(|e| e.start);
        hits
    }

    /// Whether any event's `[start, end)` interval contains `at`.
    pub fn is_busy(&self, at: NaiveDateTime) -> bool {
        self.events.iter().any(|e| e.is_active_at(at))
    }

    // EDIT PROPAGATION:

    /// Edit one event, located by its identity triple.
    pub fn edit_event(
        &mut self,
        property: &str,
        subject: &str,
        start: NaiveDateTime,
        end: NaiveDateTime,
        new_value: &str,
    ) -> bool {
        let Ok(property) = property.parse::<EventProperty>() else {
            return false;
        };
        let Some(idx) = self
            .events
            .iter()
            .position(|e| e.subject == subject && e.start == start && e.end == end)
        else {
            return false;
        };
        apply_property(&mut self.events[idx], property, new_value).is_ok()
    }

    /// Edit the anchor event and every later member of its series.
    ///
    /// The anchor is located by (subject, start). If it carries no series
    /// id the edit degrades to a single-event edit. Otherwise every event
    /// sharing the series id with `start >=` the anchor's start is edited.
    /// Editing `start` detaches each mutated member from the series, since
    /// shifted starts no longer follow the weekday pattern.
    pub fn edit_events_from_date(
        &mut self,
        property: &str,
        subject: &str,
        start: NaiveDateTime,
        new_value: &str,
    ) -> bool {
        let Ok(property) = property.parse::<EventProperty>() else {
            return false;
        };
        let Some(anchor) = self
            .events
            .iter()
            .position(|e| e.subject == subject && e.start == start)
        else {
            return false;
        };

        let Some(series_id) = self.events[anchor].series_id.clone() else {
            return apply_property(&mut self.events[anchor], property, new_value).is_ok();
        };

        let members: Vec<usize> = self
            .events
            .iter()
            .enumerate()
            .filter(|(_, e)| e.series_id.as_deref() == Some(&series_id) && e.start >= start)
            .map(|(idx, _)| idx)
            .collect();
        if members.is_empty() {
            return false;
        }

        self.apply_to_members(&members, property, new_value)
    }

    /// Edit every member of the series the anchor belongs to, regardless
    /// of date. Same degrade and detach rules as `edit_events_from_date`.
    pub fn edit_entire_series(
        &mut self,
        property: &str,
        subject: &str,
        start: NaiveDateTime,
        new_value: &str,
    ) -> bool {
        let Ok(property) = property.parse::<EventProperty>() else {
            return false;
        };
        let Some(anchor) = self
            .events
            .iter()
            .position(|e| e.subject == subject && e.start == start)
        else {
            return false;
        };

        let Some(series_id) = self.events[anchor].series_id.clone() else {
            return apply_property(&mut self.events[anchor], property, new_value).is_ok();
        };

        let members: Vec<usize> = self
            .events
            .iter()
            .enumerate()
            .filter(|(_, e)| e.series_id.as_deref() == Some(&series_id))
            .map(|(idx, _)| idx)
            .collect();
        if members.is_empty() {
            return false;
        }

        self.apply_to_members(&members, property, new_value)
    }

    /// Apply one property edit to each member in turn. Not transactional:
    /// a member failure stops the walk and returns `false`, but members
    /// already edited stay edited.
    fn apply_to_members(
        &mut self,
        members: &[usize],
        property: EventProperty,
        new_value: &str,
    ) -> bool {
        for &idx in members {
            let event = &mut self.events[idx];
            if apply_property(event, property, new_value).is_err() {
                return false;
            }
            if property == EventProperty::Start {
                event.series_id = None;
            }
        }
        true
    }
}

impl fmt::Display for Calendar {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} ({}, {} events)",
            self.name,
            self.timezone,
            self.events.len()
        )
    }
}
