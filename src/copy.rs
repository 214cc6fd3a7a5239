//! Cross-calendar event copying with timezone conversion.
//!
//! The copy service is stateless: it reads events from a source calendar
//! and writes them into a target calendar through the target's
//! conflict-checked `add_event` path. Times are converted through the
//! timezone pivot: the naive local timestamp is interpreted in the source
//! zone, converted to the target zone, and the resulting time-of-day is
//! recombined with the already-computed target date.

use chrono::{LocalResult, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, TimeZone};
use chrono_tz::Tz;
use log::{debug, trace};
use std::collections::HashMap;
use uuid::Uuid;

use crate::calendar::Calendar;
use crate::event::Event;

/// Stateless copier between two calendars.
#[derive(Debug, Clone, Copy, Default)]
pub struct EventCopyService;

impl EventCopyService {
    pub fn new() -> EventCopyService {
        EventCopyService
    }

    /// Copy one event, located by (subject, start) in the source calendar,
    /// to `target_start` on the target calendar. The event's duration is
    /// preserved; the start is pivoted into the target zone.
    pub fn copy_event(
        &self,
        source: &Calendar,
        target: &mut Calendar,
        subject: &str,
        source_start: NaiveDateTime,
        target_start: NaiveDateTime,
    ) -> bool {
        let Some(source_event) = source.find_event_by_subject_and_start(subject, source_start)
        else {
            return false;
        };

        let duration = source_event.duration();
        let converted_start = convert_between_zones(
            target_start,
            source.timezone(),
            target.timezone(),
            target_start.date(),
        );
        let converted_end = converted_start + duration;

        let copy = clone_with_times(source_event, converted_start, converted_end);
        target.add_event(copy)
    }

    /// Copy every event occurring on `source_date` onto `target_date`.
    ///
    /// Returns `true` only if the date was empty or every insertion
    /// succeeded. Events inserted before a failure stay inserted; the
    /// batch is not rolled back.
    pub fn copy_events_on_date(
        &self,
        source: &Calendar,
        target: &mut Calendar,
        source_date: NaiveDate,
        target_date: NaiveDate,
    ) -> bool {
        let events = source.get_events_on_date(source_date);
        if events.is_empty() {
            return true;
        }

        let mut all_inserted = true;
        for source_event in &events {
            // Both endpoints recombine onto the one target date, so an
            // event spanning midnight lands compressed on that date.
            let new_start = convert_between_zones(
                source_event.start,
                source.timezone(),
                target.timezone(),
                target_date,
            );
            let new_end = convert_between_zones(
                source_event.end,
                source.timezone(),
                target.timezone(),
                target_date,
            );

            let copy = clone_with_times(source_event, new_start, new_end);
            if !target.add_event(copy) {
                all_inserted = false;
            }
        }

        debug!(
            "copied {} event(s) from '{}' {} to '{}' {} (complete: {})",
            events.len(),
            source.name(),
            source_date,
            target.name(),
            target_date,
            all_inserted
        );
        all_inserted
    }

    /// Copy every event whose start date falls in the inclusive range
    /// [start_date, end_date], shifted so the range lands at
    /// `target_start_date`.
    ///
    /// Series members are remapped onto fresh copied-series ids, stable
    /// per source series within this call, so copied members of one series
    /// stay grouped without colliding with the source series. Same
    /// partial-success batching as `copy_events_on_date`.
    pub fn copy_events_in_range(
        &self,
        source: &Calendar,
        target: &mut Calendar,
        start_date: NaiveDate,
        end_date: NaiveDate,
        target_start_date: NaiveDate,
    ) -> bool {
        let range_start = start_date.and_time(NaiveTime::MIN);
        let range_end = match end_date.succ_opt() {
            Some(next) => next.and_time(NaiveTime::MIN),
            None => NaiveDateTime::MAX,
        };

        let in_range = source.get_events_in_range(range_start, range_end);
        // The range query also returns events merely overlapping the
        // boundary days; the copy takes only those starting inside.
        let to_copy: Vec<Event> = in_range
            .into_iter()
            .filter(|e| {
                let event_date = e.start.date();
                event_date >= start_date && event_date <= end_date
            })
            .collect();
        if to_copy.is_empty() {
            return true;
        }

        let day_offset = target_start_date.signed_duration_since(start_date).num_days();

        let mut all_inserted = true;
        let mut remapped_series: HashMap<String, String> = HashMap::new();

        for source_event in &to_copy {
            let shifted_start = source_event.start + TimeDelta::days(day_offset);
            let shifted_end = source_event.end + TimeDelta::days(day_offset);

            let new_start = convert_between_zones(
                shifted_start,
                source.timezone(),
                target.timezone(),
                shifted_start.date(),
            );
            let new_end = convert_between_zones(
                shifted_end,
                source.timezone(),
                target.timezone(),
                shifted_end.date(),
            );

            let mut copy = clone_with_times(source_event, new_start, new_end);

            if let Some(original_id) = &source_event.series_id {
                let new_id = remapped_series
                    .entry(original_id.clone())
                    .or_insert_with(|| {
                        let id = format!("copied-{}-{}", original_id, Uuid::new_v4());
                        trace!("remapping series '{}' to '{}'", original_id, id);
                        id
                    });
                copy.series_id = Some(new_id.clone());
            }

            if !target.add_event(copy) {
                all_inserted = false;
            }
        }

        all_inserted
    }
}

/// Build a copy of `source` at the new times, preserving subject,
/// description, location, status, all-day flag, and series id.
/// All-day copies re-synthesize the working-day span on the target date.
fn clone_with_times(source: &Event, new_start: NaiveDateTime, new_end: NaiveDateTime) -> Event {
    let mut copy = if source.all_day {
        Event::all_day_with_details(
            source.subject.clone(),
            new_start.date(),
            source.description.clone(),
            source.location.clone(),
            Some(source.status),
        )
    } else {
        Event::timed_with_details(
            source.subject.clone(),
            new_start,
            new_end,
            source.description.clone(),
            source.location.clone(),
            Some(source.status),
        )
    };
    copy.series_id = source.series_id.clone();
    copy
}

/// The timezone pivot: interpret `original` as a local time in
/// `source_tz`, convert that instant into `target_tz`, and recombine the
/// resulting time-of-day with `target_date`. Identical zones skip the
/// conversion so wall times pass through without normalization.
fn convert_between_zones(
    original: NaiveDateTime,
    source_tz: Tz,
    target_tz: Tz,
    target_date: NaiveDate,
) -> NaiveDateTime {
    if source_tz == target_tz {
        return target_date.and_time(original.time());
    }

    let time = match source_tz.from_local_datetime(&original) {
        LocalResult::Single(zoned) => zoned.with_timezone(&target_tz).time(),
        // DST fold: take the earlier of the two mappings
        LocalResult::Ambiguous(earlier, _) => earlier.with_timezone(&target_tz).time(),
        // Spring-forward gap: the wall time never existed, keep it as-is
        LocalResult::None => original.time(),
    };

    target_date.and_time(time)
}
