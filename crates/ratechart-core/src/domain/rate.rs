use serde::Serialize;

use crate::{CalendarDay, Currency, ValidationError};

/// Rate of one currency on one calendar day; a `None` value is the absent marker.
///
/// Only [`RatePoint::new`] and [`RatePoint::absent`] build one, so a stored
/// value is always finite and non-negative.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RatePoint {
    date: CalendarDay,
    value: Option<f64>,
}

impl RatePoint {
    pub fn new(date: CalendarDay, value: f64) -> Result<Self, ValidationError> {
        if !value.is_finite() {
            return Err(ValidationError::NonFiniteValue { field: "rate" });
        }
        if value < 0.0 {
            return Err(ValidationError::NegativeValue { field: "rate" });
        }

        Ok(Self {
            date,
            value: Some(value),
        })
    }

    pub const fn absent(date: CalendarDay) -> Self {
        Self { date, value: None }
    }

    pub const fn date(&self) -> CalendarDay {
        self.date
    }

    pub const fn value(&self) -> Option<f64> {
        self.value
    }

    pub const fn is_absent(&self) -> bool {
        self.value.is_none()
    }
}

/// Rates returned by a source for one currency.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RateSeries {
    pub currency: Currency,
    pub base: String,
    pub points: Vec<RatePoint>,
}

impl RateSeries {
    pub fn new(currency: Currency, base: impl Into<String>, points: Vec<RatePoint>) -> Self {
        Self {
            currency,
            base: base.into(),
            points,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day() -> CalendarDay {
        CalendarDay::parse("2024-01-02").expect("valid day")
    }

    #[test]
    fn accepts_finite_non_negative_rate() {
        let point = RatePoint::new(day(), 1.08).expect("valid point");
        assert_eq!(point.date(), day());
        assert_eq!(point.value(), Some(1.08));
        assert!(!point.is_absent());
    }

    #[test]
    fn rejects_nan_and_negative_rates() {
        assert_eq!(
            RatePoint::new(day(), f64::NAN),
            Err(ValidationError::NonFiniteValue { field: "rate" })
        );
        assert_eq!(
            RatePoint::new(day(), -1.0),
            Err(ValidationError::NegativeValue { field: "rate" })
        );
    }

    #[test]
    fn absent_point_has_date_but_no_value() {
        let point = RatePoint::absent(day());
        assert_eq!(point.date(), day());
        assert_eq!(point.value(), None);
        assert!(point.is_absent());
    }

    #[test]
    fn absent_point_serializes_value_as_null() {
        let json = serde_json::to_string(&RatePoint::absent(day())).expect("serializable");
        assert_eq!(json, r#"{"date":"2024-01-02","value":null}"#);
    }
}
