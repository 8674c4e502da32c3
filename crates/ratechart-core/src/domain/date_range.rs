use serde::Serialize;
use time::OffsetDateTime;

use super::CalendarDay;

/// Ordered run of calendar days: strictly increasing, no duplicates, both
/// endpoints of the selection included.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DateSequence(Vec<CalendarDay>);

impl DateSequence {
    pub const fn empty() -> Self {
        Self(Vec::new())
    }

    pub fn as_slice(&self) -> &[CalendarDay] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn first(&self) -> Option<CalendarDay> {
        self.0.first().copied()
    }

    pub fn last(&self) -> Option<CalendarDay> {
        self.0.last().copied()
    }

    /// First and last day, when the sequence is not empty.
    pub fn bounds(&self) -> Option<(CalendarDay, CalendarDay)> {
        Some((self.first()?, self.last()?))
    }

    pub fn contains(&self, day: CalendarDay) -> bool {
        self.0.binary_search(&day).is_ok()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CalendarDay> {
        self.0.iter()
    }

    pub fn identifiers(&self) -> Vec<String> {
        self.0.iter().map(|day| day.identifier()).collect()
    }
}

impl<'a> IntoIterator for &'a DateSequence {
    type Item = &'a CalendarDay;
    type IntoIter = std::slice::Iter<'a, CalendarDay>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Expand `start..=end` into one entry per calendar day.
///
/// An inverted range (`start > end`) is a valid request for nothing and
/// yields an empty sequence.
pub fn expand(start: CalendarDay, end: CalendarDay) -> DateSequence {
    let span = start.days_until(end);
    if span < 0 {
        return DateSequence::empty();
    }

    let mut days = Vec::with_capacity(usize::try_from(span).map_or(0, |span| span + 1));
    let mut cursor = Some(start);
    while let Some(day) = cursor {
        if day > end {
            break;
        }
        days.push(day);
        cursor = day.next();
    }

    DateSequence(days)
}

/// Like [`expand`], after truncating both instants to their UTC calendar day.
pub fn expand_datetimes(start: OffsetDateTime, end: OffsetDateTime) -> DateSequence {
    expand(
        CalendarDay::from_datetime(start),
        CalendarDay::from_datetime(end),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::{date, datetime};

    fn day(raw: &str) -> CalendarDay {
        CalendarDay::parse(raw).expect("valid day")
    }

    #[test]
    fn expands_inclusive_range() {
        let days = expand(day("2024-01-01"), day("2024-01-03"));
        assert_eq!(
            days.identifiers(),
            vec!["2024-01-01", "2024-01-02", "2024-01-03"]
        );
    }

    #[test]
    fn inverted_range_is_empty() {
        assert!(expand(day("2024-01-03"), day("2024-01-01")).is_empty());
    }

    #[test]
    fn single_day_range() {
        let days = expand(day("2024-02-29"), day("2024-02-29"));
        assert_eq!(days.identifiers(), vec!["2024-02-29"]);
    }

    #[test]
    fn crosses_month_and_year_boundaries() {
        let days = expand(day("2023-12-30"), day("2024-01-02"));
        assert_eq!(
            days.identifiers(),
            vec!["2023-12-30", "2023-12-31", "2024-01-01", "2024-01-02"]
        );
    }

    #[test]
    fn stops_at_last_representable_day() {
        let last = CalendarDay::new(time::Date::MAX);
        let days = expand(last, last);
        assert_eq!(days.len(), 1);
    }

    #[test]
    fn datetimes_are_truncated_before_expansion() {
        let days = expand_datetimes(
            datetime!(2024-01-01 23:59 UTC),
            datetime!(2024-01-02 00:01 UTC),
        );
        assert_eq!(days.len(), 2);
        assert_eq!(days.first(), Some(CalendarDay::new(date!(2024-01-01))));
    }

    #[test]
    fn contains_uses_calendar_order() {
        let days = expand(day("2024-01-01"), day("2024-01-05"));
        assert!(days.contains(day("2024-01-03")));
        assert!(!days.contains(day("2024-01-06")));
        assert_eq!(days.bounds(), Some((day("2024-01-01"), day("2024-01-05"))));
    }
}
