use serde::Serialize;

use super::date_range::{expand, DateSequence};
use crate::{CalendarDay, Currency, ValidationError};

/// Length of the trailing range a new session starts with.
pub const DEFAULT_TRAILING_DAYS: i64 = 5;

/// What the user currently asks to see: a date range and a set of currencies.
///
/// Membership in `currencies` is a set; the order is insertion order and is
/// the order chart series are drawn in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Selection {
    pub start: CalendarDay,
    pub end: CalendarDay,
    pub currencies: Vec<Currency>,
}

impl Selection {
    pub fn new(
        start: CalendarDay,
        end: CalendarDay,
        currencies: impl IntoIterator<Item = Currency>,
    ) -> Self {
        let mut selection = Self {
            start,
            end,
            currencies: Vec::new(),
        };
        for currency in currencies {
            if !selection.is_selected(currency) {
                selection.currencies.push(currency);
            }
        }
        selection
    }

    /// `days` days back from `today` through `today`, nothing selected.
    pub fn trailing(today: CalendarDay, days: i64) -> Self {
        let start = today.checked_sub_days(days).unwrap_or(today);
        Self::new(start, today, [])
    }

    pub fn default_for(today: CalendarDay) -> Self {
        Self::trailing(today, DEFAULT_TRAILING_DAYS)
    }

    pub fn is_selected(&self, currency: Currency) -> bool {
        self.currencies.contains(&currency)
    }

    /// Copy with `currency` removed if selected, appended otherwise.
    pub fn toggled(&self, currency: Currency) -> Self {
        let mut next = self.clone();
        if let Some(index) = next.currencies.iter().position(|c| *c == currency) {
            next.currencies.remove(index);
        } else {
            next.currencies.push(currency);
        }
        next
    }

    pub fn with_range(&self, start: CalendarDay, end: CalendarDay) -> Self {
        Self {
            start,
            end,
            currencies: self.currencies.clone(),
        }
    }

    pub fn dates(&self) -> DateSequence {
        expand(self.start, self.end)
    }

    /// Date-picker constraints: `start <= end <= today`.
    pub fn validate(&self, today: CalendarDay) -> Result<(), ValidationError> {
        if self.start > self.end {
            return Err(ValidationError::InvertedRange {
                start: self.start.identifier(),
                end: self.end.identifier(),
            });
        }
        if self.end > today {
            return Err(ValidationError::RangeInFuture {
                end: self.end.identifier(),
                today: today.identifier(),
            });
        }
        Ok(())
    }
}
