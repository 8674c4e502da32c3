use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ValidationError;

/// Currency every rate is quoted against.
pub const BASE_CURRENCY: &str = "RUB";

/// Closed set of chartable currencies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Eur,
    Usd,
    Cny,
}

impl Currency {
    /// All currencies in the order the selection controls present them.
    pub const ALL: [Self; 3] = [Self::Eur, Self::Cny, Self::Usd];

    pub const fn code(self) -> &'static str {
        match self {
            Self::Eur => "EUR",
            Self::Usd => "USD",
            Self::Cny => "CNY",
        }
    }

    /// Parse an ISO 4217 code, ignoring case and surrounding whitespace.
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        match input.trim().to_ascii_uppercase().as_str() {
            "EUR" => Ok(Self::Eur),
            "USD" => Ok(Self::Usd),
            "CNY" => Ok(Self::Cny),
            _ => Err(ValidationError::InvalidCurrency {
                value: input.to_owned(),
            }),
        }
    }
}

impl Display for Currency {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Currency {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_normalizes_codes() {
        assert_eq!(Currency::parse(" usd "), Ok(Currency::Usd));
        assert_eq!(Currency::parse("Cny"), Ok(Currency::Cny));
    }

    #[test]
    fn rejects_base_and_unknown_codes() {
        for raw in ["RUB", "GBP", ""] {
            let err = Currency::parse(raw).expect_err("must fail");
            assert!(matches!(err, ValidationError::InvalidCurrency { .. }));
        }
    }

    #[test]
    fn serializes_as_upper_case_code() {
        let json = serde_json::to_string(&Currency::Eur).expect("serializable");
        assert_eq!(json, "\"EUR\"");
    }
}
