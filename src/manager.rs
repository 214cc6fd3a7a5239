//! Registry of calendars and the engine's single entry point.
//!
//! `CalendarManager` owns every `Calendar` by name, tracks the one
//! "current" selection, allocates series ids, and routes cross-calendar
//! copies through the `EventCopyService`. Single-calendar operations are
//! thin delegations to the current calendar; with no calendar selected
//! they return the neutral failure value (`false`, empty list, `None`).

use chrono::{NaiveDate, NaiveDateTime, Weekday};
use chrono_tz::Tz;
use log::debug;
use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::calendar::{self, Calendar};
use crate::copy::EventCopyService;
use crate::event::{Event, EventStatus};

/// Allocator for series ids, unique across every calendar one manager
/// owns. Injected at construction so hosts can control numbering.
#[derive(Debug, Clone, Default)]
pub struct SeriesIdGenerator {
    next: u64,
}

impl SeriesIdGenerator {
    pub fn new() -> SeriesIdGenerator {
        SeriesIdGenerator::default()
    }

    /// Resume numbering from `next` (ids below it are considered taken).
    pub fn starting_at(next: u64) -> SeriesIdGenerator {
        SeriesIdGenerator { next }
    }

    pub fn next_id(&mut self) -> String {
        self.next += 1;
        format!("series-{}", self.next)
    }
}

/// The multi-calendar registry.
#[derive(Debug, Default)]
pub struct CalendarManager {
    calendars: HashMap<String, Calendar>,
    current: Option<String>,
    copy_service: EventCopyService,
    series_ids: SeriesIdGenerator,
}

impl CalendarManager {
    /// Manager with no calendars and nothing selected.
    pub fn new() -> CalendarManager {
        CalendarManager::default()
    }

    /// Manager with an injected series-id generator.
    pub fn with_series_ids(series_ids: SeriesIdGenerator) -> CalendarManager {
        CalendarManager {
            series_ids,
            ..CalendarManager::default()
        }
    }

    // CALENDAR REGISTRY:

    /// Create a calendar. Fails if the name is already taken.
    pub fn create_calendar(&mut self, name: &str, timezone: Tz) -> bool {
        if self.calendars.contains_key(name) {
            return false;
        }
        debug!("creating calendar '{}' in {}", name, timezone);
        self.calendars
            .insert(name.to_string(), Calendar::new(name, timezone));
        true
    }

    /// Edit a calendar's `name` or `timezone`. Timezone values must
    /// resolve as IANA zones and renames must not collide; both are
    /// validated before anything mutates.
    pub fn edit_calendar(&mut self, name: &str, property: &str, value: &str) -> bool {
        if !self.calendars.contains_key(name) {
            return false;
        }

        match property.to_ascii_lowercase().as_str() {
            "name" => self.rename_calendar(name, value),
            "timezone" => {
                let Ok(timezone) = calendar::parse_timezone(value) else {
                    return false;
                };
                match self.calendars.get_mut(name) {
                    Some(calendar) => {
                        calendar.set_timezone(timezone);
                        true
                    }
                    None => false,
                }
            }
            _ => false,
        }
    }

    fn rename_calendar(&mut self, old_name: &str, new_name: &str) -> bool {
        if self.calendars.contains_key(new_name) {
            return false;
        }
        let Some(mut calendar) = self.calendars.remove(old_name) else {
            return false;
        };

        calendar.set_name(new_name);
        self.calendars.insert(new_name.to_string(), calendar);

        // The selection follows the rename
        if self.current.as_deref() == Some(old_name) {
            self.current = Some(new_name.to_string());
        }
        true
    }

    /// Select the current calendar. An unknown name fails and leaves the
    /// prior selection in place.
    pub fn use_calendar(&mut self, name: &str) -> bool {
        if !self.calendars.contains_key(name) {
            return false;
        }
        self.current = Some(name.to_string());
        true
    }

    pub fn current_calendar(&self) -> Option<&Calendar> {
        self.calendars.get(self.current.as_deref()?)
    }

    pub fn current_calendar_name(&self) -> Option<&str> {
        self.current.as_deref()
    }

    pub fn calendar(&self, name: &str) -> Option<&Calendar> {
        self.calendars.get(name)
    }

    pub fn calendar_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.calendars.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn calendar_exists(&self, name: &str) -> bool {
        self.calendars.contains_key(name)
    }

    fn current_calendar_mut(&mut self) -> Option<&mut Calendar> {
        let name = self.current.as_deref()?;
        self.calendars.get_mut(name)
    }

    /// Owned snapshot of the current calendar. Copies read from the
    /// snapshot so the borrow on the registry is released before the
    /// target is borrowed mutably; this also makes a calendar copying
    /// onto itself read a stable source.
    fn current_snapshot(&self) -> Option<Calendar> {
        self.current_calendar().cloned()
    }

    // EVENT CREATION (delegated to the current calendar):

    pub fn create_event(&mut self, subject: &str, start: NaiveDateTime, end: NaiveDateTime) -> bool {
        match self.current_calendar_mut() {
            Some(calendar) => calendar.create_event(subject, start, end),
            None => false,
        }
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
        match self.current_calendar_mut() {
            Some(calendar) => {
                calendar.create_event_with_details(subject, start, end, description, location, status)
            }
            None => false,
        }
    }

    pub fn create_all_day_event(&mut self, subject: &str, date: NaiveDate) -> bool {
        match self.current_calendar_mut() {
            Some(calendar) => calendar.create_all_day_event(subject, date),
            None => false,
        }
    }

    pub fn create_all_day_event_with_details(
        &mut self,
        subject: &str,
        date: NaiveDate,
        description: Option<String>,
        location: Option<String>,
        status: Option<EventStatus>,
    ) -> bool {
        match self.current_calendar_mut() {
            Some(calendar) => {
                calendar.create_all_day_event_with_details(subject, date, description, location, status)
            }
            None => false,
        }
    }

    pub fn create_event_series(
        &mut self,
        subject: &str,
        start: NaiveDateTime,
        end: NaiveDateTime,
        weekdays: &HashSet<Weekday>,
        occurrences: u32,
    ) -> bool {
        self.create_event_series_with_details(
            subject,
            start,
            end,
            weekdays,
            occurrences,
            None,
            None,
            Some(EventStatus::Public),
        )
    }

    #[allow(clippy::too_many_arguments)]
    pub fn create_event_series_with_details(
        &mut self,
        subject: &str,
        start: NaiveDateTime,
        end: NaiveDateTime,
        weekdays: &HashSet<Weekday>,
        occurrences: u32,
        description: Option<String>,
        location: Option<String>,
        status: Option<EventStatus>,
    ) -> bool {
        if self.current.is_none() {
            return false;
        }
        let series_id = self.series_ids.next_id();
        match self.current_calendar_mut() {
            Some(calendar) => calendar.create_event_series(
                subject,
                start,
                end,
                weekdays,
                occurrences,
                description,
                location,
                status,
                &series_id,
            ),
            None => false,
        }
    }

    pub fn create_event_series_until(
        &mut self,
        subject: &str,
        start: NaiveDateTime,
        end: NaiveDateTime,
        weekdays: &HashSet<Weekday>,
        end_date: NaiveDate,
    ) -> bool {
        self.create_event_series_until_with_details(
            subject,
            start,
            end,
            weekdays,
            end_date,
            None,
            None,
            Some(EventStatus::Public),
        )
    }

    #[allow(clippy::too_many_arguments)]
    pub fn create_event_series_until_with_details(
        &mut self,
        subject: &str,
        start: NaiveDateTime,
        end: NaiveDateTime,
        weekdays: &HashSet<Weekday>,
        end_date: NaiveDate,
        description: Option<String>,
        location: Option<String>,
        status: Option<EventStatus>,
    ) -> bool {
        if self.current.is_none() {
            return false;
        }
        let series_id = self.series_ids.next_id();
        match self.current_calendar_mut() {
            Some(calendar) => calendar.create_event_series_until(
                subject,
                start,
                end,
                weekdays,
                end_date,
                description,
                location,
                status,
                &series_id,
            ),
            None => false,
        }
    }

    pub fn create_all_day_event_series(
        &mut self,
        subject: &str,
        start_date: NaiveDate,
        weekdays: &HashSet<Weekday>,
        occurrences: u32,
    ) -> bool {
        self.create_all_day_event_series_with_details(
            subject,
            start_date,
            weekdays,
            occurrences,
            None,
            None,
            Some(EventStatus::Public),
        )
    }

    #[allow(clippy::too_many_arguments)]
    pub fn create_all_day_event_series_with_details(
        &mut self,
        subject: &str,
        start_date: NaiveDate,
        weekdays: &HashSet<Weekday>,
        occurrences: u32,
        description: Option<String>,
        location: Option<String>,
        status: Option<EventStatus>,
    ) -> bool {
        if self.current.is_none() {
            return false;
        }
        let series_id = self.series_ids.next_id();
        match self.current_calendar_mut() {
            Some(calendar) => calendar.create_all_day_event_series(
                subject,
                start_date,
                weekdays,
                occurrences,
                description,
                location,
                status,
                &series_id,
            ),
            None => false,
        }
    }

    pub fn create_all_day_event_series_until(
        &mut self,
        subject: &str,
        start_date: NaiveDate,
        weekdays: &HashSet<Weekday>,
        end_date: NaiveDate,
    ) -> bool {
        self.create_all_day_event_series_until_with_details(
            subject,
            start_date,
            weekdays,
            end_date,
            None,
            None,
            Some(EventStatus::Public),
        )
    }

    #[allow(clippy::too_many_arguments)]
    pub fn create_all_day_event_series_until_with_details(
        &mut self,
        subject: &str,
        start_date: NaiveDate,
        weekdays: &HashSet<Weekday>,
        end_date: NaiveDate,
        description: Option<String>,
        location: Option<String>,
        status: Option<EventStatus>,
    ) -> bool {
        if self.current.is_none() {
            return false;
        }
        let series_id = self.series_ids.next_id();
        match self.current_calendar_mut() {
            Some(calendar) => calendar.create_all_day_event_series_until(
                subject,
                start_date,
                weekdays,
                end_date,
                description,
                location,
                status,
                &series_id,
            ),
            None => false,
        }
    }

    // QUERIES (delegated):

    pub fn get_events_on_date(&self, date: NaiveDate) -> Vec<Event> {
        match self.current_calendar() {
            Some(calendar) => calendar.get_events_on_date(date),
            None => Vec::new(),
        }
    }

    pub fn get_events_in_range(&self, start: NaiveDateTime, end: NaiveDateTime) -> Vec<Event> {
        match self.current_calendar() {
            Some(calendar) => calendar.get_events_in_range(start, end),
            None => Vec::new(),
        }
    }

    pub fn is_busy(&self, at: NaiveDateTime) -> bool {
        match self.current_calendar() {
            Some(calendar) => calendar.is_busy(at),
            None => false,
        }
    }

    pub fn find_event(
        &self,
        subject: &str,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Option<&Event> {
        self.current_calendar()?.find_event(subject, start, end)
    }

    pub fn find_event_by_subject_and_start(
        &self,
        subject: &str,
        start: NaiveDateTime,
    ) -> Option<&Event> {
        self.current_calendar()?
            .find_event_by_subject_and_start(subject, start)
    }

    /// All events of the current calendar, or empty with none selected.
    pub fn events(&self) -> Vec<Event> {
        match self.current_calendar() {
            Some(calendar) => calendar.events().to_vec(),
            None => Vec::new(),
        }
    }

    // EDITS (delegated):

    pub fn edit_event(
        &mut self,
        property: &str,
        subject: &str,
        start: NaiveDateTime,
        end: NaiveDateTime,
        new_value: &str,
    ) -> bool {
        match self.current_calendar_mut() {
            Some(calendar) => calendar.edit_event(property, subject, start, end, new_value),
            None => false,
        }
    }

    pub fn edit_events_from_date(
        &mut self,
        property: &str,
        subject: &str,
        start: NaiveDateTime,
        new_value: &str,
    ) -> bool {
        match self.current_calendar_mut() {
            Some(calendar) => calendar.edit_events_from_date(property, subject, start, new_value),
            None => false,
        }
    }

    pub fn edit_entire_series(
        &mut self,
        property: &str,
        subject: &str,
        start: NaiveDateTime,
        new_value: &str,
    ) -> bool {
        match self.current_calendar_mut() {
            Some(calendar) => calendar.edit_entire_series(property, subject, start, new_value),
            None => false,
        }
    }

    // CROSS-CALENDAR COPIES:
    //
    // All three fail without invoking the service when no calendar is
    // selected or the target is unknown.

    pub fn copy_event(
        &mut self,
        subject: &str,
        source_start: NaiveDateTime,
        target_calendar: &str,
        target_start: NaiveDateTime,
    ) -> bool {
        let Some(source) = self.current_snapshot() else {
            return false;
        };
        let Some(target) = self.calendars.get_mut(target_calendar) else {
            return false;
        };
        self.copy_service
            .copy_event(&source, target, subject, source_start, target_start)
    }

    pub fn copy_events_on_date(
        &mut self,
        source_date: NaiveDate,
        target_calendar: &str,
        target_date: NaiveDate,
    ) -> bool {
        let Some(source) = self.current_snapshot() else {
            return false;
        };
        let Some(target) = self.calendars.get_mut(target_calendar) else {
            return false;
        };
        self.copy_service
            .copy_events_on_date(&source, target, source_date, target_date)
    }

    pub fn copy_events_in_range(
        &mut self,
        start_date: NaiveDate,
        end_date: NaiveDate,
        target_calendar: &str,
        target_start_date: NaiveDate,
    ) -> bool {
        let Some(source) = self.current_snapshot() else {
            return false;
        };
        let Some(target) = self.calendars.get_mut(target_calendar) else {
            return false;
        };
        self.copy_service.copy_events_in_range(
            &source,
            target,
            start_date,
            end_date,
            target_start_date,
        )
    }
}

impl fmt::Display for CalendarManager {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} calendar(s), current: {}",
            self.calendars.len(),
            self.current.as_deref().unwrap_or("(none)")
        )
    }
}
