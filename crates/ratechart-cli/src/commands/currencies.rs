use ratechart_core::labels::currency_label;
use ratechart_core::Currency;

use super::{Context, CurrencyRow, Report};

pub fn run(context: &Context) -> Report {
    let rows = Currency::ALL
        .into_iter()
        .map(|currency| CurrencyRow {
            code: currency.code(),
            label: currency_label(currency, context.locale),
        })
        .collect();
    Report::Currencies(rows)
}
