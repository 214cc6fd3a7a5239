//! Recurring event series metadata.
//!
//! An `EventSeries` records how a batch of events was generated: which
//! weekdays, what time-of-day window, and whether the occurrences are
//! all-day. It is purely descriptive; the generated events carry the
//! series id themselves, and mutating or dropping the record never
//! touches them.

use chrono::{NaiveTime, Weekday};
use std::collections::HashSet;
use std::fmt;

/// Metadata for one recurrence request.
#[derive(Debug, Clone)]
pub struct EventSeries {
    pub series_id: String,
    pub weekdays: HashSet<Weekday>,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub all_day: bool,
}

impl EventSeries {
    pub fn new(
        series_id: impl Into<String>,
        weekdays: HashSet<Weekday>,
        start_time: NaiveTime,
        end_time: NaiveTime,
        all_day: bool,
    ) -> EventSeries {
        EventSeries {
            series_id: series_id.into(),
            weekdays,
            start_time,
            end_time,
            all_day,
        }
    }
}

// Series identity is the id alone.
impl PartialEq for EventSeries {
    fn eq(&self, other: &Self) -> bool {
        self.series_id == other.series_id
    }
}

impl Eq for EventSeries {}

impl fmt::Display for EventSeries {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} ({} - {}{})",
            self.series_id,
            self.start_time.format("%H:%M"),
            self.end_time.format("%H:%M"),
            if self.all_day { ", all day" } else { "" }
        )
    }
}

/// Single-letter weekday code used at the command boundary: `M T W R F S U`
/// for Monday through Sunday.
pub fn weekday_from_code(code: char) -> Option<Weekday> {
    match code.to_ascii_uppercase() {
        'M' => Some(Weekday::Mon),
        'T' => Some(Weekday::Tue),
        'W' => Some(Weekday::Wed),
        'R' => Some(Weekday::Thu),
        'F' => Some(Weekday::Fri),
        'S' => Some(Weekday::Sat),
        'U' => Some(Weekday::Sun),
        _ => None,
    }
}

/// Parse a run of weekday codes ("MWF", "M W F") into a weekday set.
/// Returns `None` if any non-whitespace character is not a valid code.
pub fn weekdays_from_codes(codes: &str) -> Option<HashSet<Weekday>> {
    codes
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(weekday_from_code)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weekday_codes() {
        assert_eq!(weekday_from_code('M'), Some(Weekday::Mon));
        assert_eq!(weekday_from_code('R'), Some(Weekday::Thu));
        assert_eq!(weekday_from_code('u'), Some(Weekday::Sun));
        assert_eq!(weekday_from_code('X'), None);
    }

    #[test]
    fn test_weekdays_from_codes() {
        let set = weekdays_from_codes("MWF").unwrap();
        assert_eq!(
            set,
            HashSet::from([Weekday::Mon, Weekday::Wed, Weekday::Fri])
        );

        let spaced = weekdays_from_codes("T R").unwrap();
        assert_eq!(spaced, HashSet::from([Weekday::Tue, Weekday::Thu]));

        assert!(weekdays_from_codes("MQZ").is_none());
        assert_eq!(weekdays_from_codes("").unwrap(), HashSet::new());
    }

    #[test]
    fn test_series_identity_is_the_id() {
        let a = EventSeries::new(
            "series-1",
            HashSet::from([Weekday::Mon]),
            NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            NaiveTime::from_hms_opt(9, 30, 0).unwrap(),
            false,
        );
        let b = EventSeries::new(
            "series-1",
            HashSet::from([Weekday::Fri]),
            NaiveTime::from_hms_opt(12, 0, 0).unwrap(),
            NaiveTime::from_hms_opt(13, 0, 0).unwrap(),
            true,
        );
        assert_eq!(a, b);
    }
}
