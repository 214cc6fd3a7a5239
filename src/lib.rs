//! Multi-calendar domain engine.
//!
//! This crate provides the core calendar model used by command-line and
//! graphical front ends:
//! - `Event` and `EventSeries` for single and recurring occurrences
//! - `Calendar` for one named, timezone-scoped event store
//! - `CalendarManager` as the registry of calendars and the entry point
//!   for every operation
//! - `EventCopyService` for timezone-aware cross-calendar copies
//!
//! All state is in-process memory; nothing is persisted. Business-rule
//! violations (duplicate events, unknown calendars, invalid properties)
//! surface as `false`/empty returns rather than errors, so callers can
//! treat every operation as "did it happen or not".

pub mod calendar;
pub mod copy;
pub mod error;
pub mod event;
pub mod manager;
pub mod series;

pub use calendar::{Calendar, EventProperty};
pub use copy::EventCopyService;
pub use error::{CalendarError, CalendarResult};
pub use event::{Event, EventStatus};
pub use manager::{CalendarManager, SeriesIdGenerator};
pub use series::{EventSeries, weekday_from_code, weekdays_from_codes};
