//! # Domain Models
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Currency`] | Closed set of chartable currencies |
//! | [`CalendarDay`] | Day-granularity date identified as `YYYY-MM-DD` |
//! | [`DateSequence`] | Inclusive, strictly increasing run of days |
//! | [`RatePoint`] | Rate for one day, possibly absent |
//! | [`RateSeries`] | Points returned by a source for one currency |
//! | [`Selection`] | Date range plus selected currencies |

mod calendar_day;
mod currency;
pub mod date_range;
mod rate;
mod selection;

pub use calendar_day::CalendarDay;
pub use currency::{Currency, BASE_CURRENCY};
pub use date_range::{expand, expand_datetimes, DateSequence};
pub use rate::{RatePoint, RateSeries};
pub use selection::{Selection, DEFAULT_TRAILING_DAYS};
