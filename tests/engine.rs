//! End-to-end scenarios driving the engine the way a command front end
//! would: through a `CalendarManager` only.

use chrono::{Datelike, NaiveDate, NaiveDateTime, Weekday};
use chrono_tz::Tz;
use multical::CalendarManager;
use std::collections::HashSet;

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

fn at(day: u32, hour: u32, minute: u32) -> NaiveDateTime {
    date(2025, 5, day).and_hms_opt(hour, minute, 0).unwrap()
}

/// Copying across a three-hour zone gap shifts the local wall times and
/// leaves the source untouched.
#[test]
fn copy_event_across_timezones() {
    let mut manager = CalendarManager::new();
    assert!(manager.create_calendar("work", Tz::America__New_York));
    assert!(manager.use_calendar("work"));
    assert!(manager.create_event("Meeting", at(5, 10, 0), at(5, 11, 0)));
    assert!(manager.create_calendar("personal", Tz::America__Los_Angeles));

    assert!(manager.copy_event("Meeting", at(5, 10, 0), "personal", at(5, 10, 0)));

    let personal = manager.calendar("personal").unwrap();
    assert_eq!(personal.events().len(), 1);
    let copied = &personal.events()[0];
    assert_eq!(copied.start, at(5, 7, 0));
    assert_eq!(copied.end, at(5, 8, 0));

    // Source unaffected
    let work = manager.calendar("work").unwrap();
    assert_eq!(work.events().len(), 1);
    assert_eq!(work.events()[0].start, at(5, 10, 0));
}

/// A count-bounded Mon/Wed series starting on a Monday yields exactly five
/// events sharing one series id.
#[test]
fn series_materialization_count_bounded() {
    let mut manager = CalendarManager::new();
    manager.create_calendar("work", Tz::America__New_York);
    manager.use_calendar("work");

    let weekdays = HashSet::from([Weekday::Mon, Weekday::Wed]);
    assert!(manager.create_event_series("Standup", at(5, 9, 0), at(5, 9, 30), &weekdays, 5));

    let events = manager.events();
    assert_eq!(events.len(), 5);

    let series_id = events[0].series_id.clone().expect("series id set");
    for event in &events {
        assert_eq!(event.series_id.as_deref(), Some(series_id.as_str()));
        assert!(matches!(
            event.start.date().weekday(),
            Weekday::Mon | Weekday::Wed
        ));
    }
}

/// A forward start-edit detaches the edited occurrences from the series
/// while earlier ones keep their id.
#[test]
fn forward_start_edit_detaches_series_members() {
    let mut manager = CalendarManager::new();
    manager.create_calendar("work", Tz::America__New_York);
    manager.use_calendar("work");

    let weekdays = HashSet::from([Weekday::Mon, Weekday::Wed]);
    assert!(manager.create_event_series("Standup", at(5, 9, 0), at(5, 9, 30), &weekdays, 5));

    // Occurrences: Mon 5, Wed 7, Mon 12, Wed 14, Mon 19; anchor the 3rd
    let third_start = at(12, 9, 0);
    assert!(manager.edit_events_from_date("start", "Standup", third_start, "2025-05-20T08:00"));

    let events = manager.events();
    let (detached, attached): (Vec<_>, Vec<_>) =
        events.iter().partition(|e| e.series_id.is_none());

    assert_eq!(detached.len(), 3);
    assert!(detached.iter().all(|e| e.start == at(20, 8, 0)));

    assert_eq!(attached.len(), 2);
    assert!(attached.iter().all(|e| e.start < third_start));
}

/// A range copy into a slot that already holds a conflicting event reports
/// failure, but the non-conflicting siblings stay inserted.
#[test]
fn range_copy_is_partial_success_without_rollback() {
    let mut manager = CalendarManager::new();
    manager.create_calendar("work", Tz::America__New_York);
    manager.create_calendar("mirror", Tz::America__New_York);
    manager.use_calendar("work");

    assert!(manager.create_event("A", at(5, 10, 0), at(5, 11, 0)));
    assert!(manager.create_event("B", at(6, 10, 0), at(6, 11, 0)));

    // Pre-seed the mirror with exactly what A will become after the
    // +7 day shift (same zone, so wall times carry over)
    manager.use_calendar("mirror");
    assert!(manager.create_event("A", at(12, 10, 0), at(12, 11, 0)));
    manager.use_calendar("work");

    assert!(!manager.copy_events_in_range(date(2025, 5, 5), date(2025, 5, 6), "mirror", date(2025, 5, 12)));

    let mirror = manager.calendar("mirror").unwrap();
    assert_eq!(mirror.events().len(), 2); // pre-seeded A + copied B
    assert!(mirror.events().iter().any(|e| e.subject == "B" && e.start == at(13, 10, 0)));
}

/// Date-bulk copy converts each event's endpoints onto the target date
/// and succeeds on an empty source date.
#[test]
fn date_bulk_copy() {
    let mut manager = CalendarManager::new();
    manager.create_calendar("work", Tz::America__New_York);
    manager.create_calendar("personal", Tz::America__Los_Angeles);
    manager.use_calendar("work");

    // Empty source date is a success
    assert!(manager.copy_events_on_date(date(2025, 5, 5), "personal", date(2025, 5, 9)));
    assert!(manager.calendar("personal").unwrap().events().is_empty());

    assert!(manager.create_event("Morning", at(5, 9, 0), at(5, 10, 0)));
    assert!(manager.create_event("Afternoon", at(5, 15, 0), at(5, 16, 0)));
    assert!(manager.copy_events_on_date(date(2025, 5, 5), "personal", date(2025, 5, 9)));

    let personal = manager.calendar("personal").unwrap();
    let copied = personal.get_events_on_date(date(2025, 5, 9));
    assert_eq!(copied.len(), 2);
    assert_eq!(copied[0].start, at(9, 6, 0)); // 09:00 EDT -> 06:00 PDT
    assert_eq!(copied[1].start, at(9, 12, 0));
}

/// The duplicate-triple invariant holds across direct creation, series
/// materialization, and copies into the same store.
#[test]
fn duplicate_triple_invariant_holds_across_paths() {
    let mut manager = CalendarManager::new();
    manager.create_calendar("work", Tz::UTC);
    manager.use_calendar("work");

    assert!(manager.create_event("Standup", at(5, 9, 0), at(5, 9, 30)));
    assert!(!manager.create_event("Standup", at(5, 9, 0), at(5, 9, 30)));

    // A series whose first occurrence collides with the standalone event
    // aborts entirely
    let weekdays = HashSet::from([Weekday::Mon]);
    assert!(!manager.create_event_series("Standup", at(5, 9, 0), at(5, 9, 30), &weekdays, 3));
    assert_eq!(manager.events().len(), 1);

    // Self-copy onto the identical slot is rejected by the same check
    assert!(!manager.copy_event("Standup", at(5, 9, 0), "work", at(5, 9, 0)));
    assert_eq!(manager.events().len(), 1);

    // No two stored events share the identity triple
    let events = manager.events();
    for (i, a) in events.iter().enumerate() {
        for b in &events[i + 1..] {
            assert!(!a.conflicts_with(b));
        }
    }
}

/// A zero-occurrence series request succeeds and adds nothing.
#[test]
fn empty_series_batch_is_idempotent() {
    let mut manager = CalendarManager::new();
    manager.create_calendar("work", Tz::UTC);
    manager.use_calendar("work");

    let weekdays = HashSet::from([Weekday::Mon, Weekday::Wed]);
    assert!(manager.create_event_series("X", at(5, 9, 0), at(5, 9, 30), &weekdays, 0));
    assert!(manager.events().is_empty());
}

/// Until-bounded all-day series over a week, then an entire-series edit.
#[test]
fn all_day_series_until_and_entire_series_edit() {
    let mut manager = CalendarManager::new();
    manager.create_calendar("work", Tz::Europe__Stockholm);
    manager.use_calendar("work");

    let weekdays = HashSet::from([Weekday::Tue, Weekday::Thu]);
    // Tue 6, Thu 8, Tue 13 (ends inclusive on the 13th)
    assert!(manager.create_all_day_event_series_until(
        "Workshop",
        date(2025, 5, 5),
        &weekdays,
        date(2025, 5, 13),
    ));

    let events = manager.events();
    assert_eq!(events.len(), 3);
    assert!(events.iter().all(|e| e.all_day));
    let working_day_start = chrono::NaiveTime::from_hms_opt(8, 0, 0).unwrap();
    assert!(events.iter().all(|e| e.start.time() == working_day_start));

    assert!(manager.edit_entire_series("location", "Workshop", at(6, 8, 0), "Annex"));
    assert!(
        manager
            .events()
            .iter()
            .all(|e| e.location.as_deref() == Some("Annex"))
    );
}
