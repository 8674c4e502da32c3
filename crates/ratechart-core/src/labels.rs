use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use crate::{Currency, ValidationError};

/// Display language for user-facing labels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Locale {
    #[default]
    En,
    Ru,
}

impl Locale {
    pub const ALL: [Self; 2] = [Self::En, Self::Ru];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Ru => "ru",
        }
    }
}

impl Display for Locale {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Locale {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "en" => Ok(Self::En),
            "ru" => Ok(Self::Ru),
            _ => Err(ValidationError::InvalidLocale {
                value: value.to_owned(),
            }),
        }
    }
}

pub const fn currency_label(currency: Currency, locale: Locale) -> &'static str {
    match (currency, locale) {
        (Currency::Eur, Locale::En) => "Euro",
        (Currency::Usd, Locale::En) => "Dollar",
        (Currency::Cny, Locale::En) => "Yuan",
        (Currency::Eur, Locale::Ru) => "Евро",
        (Currency::Usd, Locale::Ru) => "Доллар",
        (Currency::Cny, Locale::Ru) => "Юань",
    }
}

pub const fn chart_title(locale: Locale) -> &'static str {
    match locale {
        Locale::En => "Exchange rates against the rouble",
        Locale::Ru => "Графиков курса валют по отношению к рублю",
    }
}

/// Caption of the fetch counter.
pub const fn requests_label(locale: Locale) -> &'static str {
    match locale {
        Locale::En => "Requests",
        Locale::Ru => "Запросы",
    }
}

pub const fn date_from_label(locale: Locale) -> &'static str {
    match locale {
        Locale::En => "Date from",
        Locale::Ru => "Дата с",
    }
}

pub const fn date_to_label(locale: Locale) -> &'static str {
    match locale {
        Locale::En => "Date to",
        Locale::Ru => "Дата по",
    }
}
