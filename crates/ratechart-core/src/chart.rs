//! Projection of stored series onto line-chart datasets.
//!
//! Output follows the chart.js data shape: a shared `labels` axis and one
//! dataset per series whose `data` is aligned index by index with the labels.

use serde::Serialize;

use crate::labels::{currency_label, Locale};
use crate::store::SeriesTable;
use crate::{CalendarDay, CoreError, Currency, DateSequence};

/// Line and fill colours of a series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeriesStyle {
    pub border: &'static str,
    pub background: &'static str,
}

pub const PLACEHOLDER_STYLE: SeriesStyle = SeriesStyle {
    border: "rgb(255, 99, 132)",
    background: "rgba(255, 99, 132, 0.5)",
};

pub const fn series_style(currency: Currency) -> SeriesStyle {
    match currency {
        Currency::Eur => SeriesStyle {
            border: "rgb(35,69,243)",
            background: "rgba(101,101,229,0.5)",
        },
        Currency::Usd => SeriesStyle {
            border: "rgb(196,0,88)",
            background: "rgba(246,86,159,0.53)",
        },
        Currency::Cny => SeriesStyle {
            border: "rgb(187,37,9)",
            background: "rgb(231,125,107)",
        },
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    pub label: String,
    /// One entry per label; `None` renders as a gap.
    pub data: Vec<Option<f64>>,
    pub border_color: String,
    pub background_color: String,
    #[serde(skip)]
    pub currency: Option<Currency>,
}

impl Dataset {
    /// The empty series drawn when nothing is selected.
    pub fn placeholder() -> Self {
        Self {
            label: String::new(),
            data: Vec::new(),
            border_color: PLACEHOLDER_STYLE.border.to_owned(),
            background_color: PLACEHOLDER_STYLE.background.to_owned(),
            currency: None,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.currency.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartData {
    pub labels: Vec<CalendarDay>,
    pub datasets: Vec<Dataset>,
}

impl ChartData {
    /// Replaces currency-code labels with display names in `locale`.
    pub fn localized(mut self, locale: Locale) -> Self {
        for dataset in &mut self.datasets {
            if let Some(currency) = dataset.currency {
                dataset.label = currency_label(currency, locale).to_owned();
            }
        }
        self
    }

    pub fn to_json(&self, pretty: bool) -> Result<String, CoreError> {
        let json = if pretty {
            serde_json::to_string_pretty(self)?
        } else {
            serde_json::to_string(self)?
        };
        Ok(json)
    }
}

/// One dataset per selected currency, in selection order, each with one
/// value per date of `dates`. An empty selection yields a single empty
/// placeholder dataset.
pub fn project(dates: &DateSequence, selected: &[Currency], table: &SeriesTable) -> ChartData {
    let datasets = if selected.is_empty() {
        vec![Dataset::placeholder()]
    } else {
        selected
            .iter()
            .map(|currency| {
                let style = series_style(*currency);
                Dataset {
                    label: currency.code().to_owned(),
                    data: dates
                        .iter()
                        .map(|day| table.value(*currency, *day))
                        .collect(),
                    border_color: style.border.to_owned(),
                    background_color: style.background.to_owned(),
                    currency: Some(*currency),
                }
            })
            .collect()
    };

    ChartData {
        labels: dates.as_slice().to_vec(),
        datasets,
    }
}
