//! Tabular rendering of a calculation result.
//!
//! Formatting only: every number here was already computed by the engine and
//! is rendered to two decimals with the currency symbol one space behind it.

use super::pricing::{CalculationResult, Rate, DECLARED_VALUE_FEE_LABEL};

/// Column headers of the result table, matching the tariff sheet's language.
pub const TABLE_HEADER: [&str; 4] = ["Тип операции", "Количество", "Тариф", "Итого"];

/// Label of the trailing totals row.
pub const TOTAL_LABEL: &str = "Итого";

/// Flat 4-column view of a calculation: one row per line item plus a
/// trailing totals row. Shared by terminal output and CSV export.
#[derive(Clone, Debug, PartialEq)]
pub struct ResultTable {
    pub rows: Vec<[String; 4]>,
    pub total_row: [String; 4],
}

/// Render a result into its tabular form without recomputing anything.
pub fn format_result(result: &CalculationResult) -> ResultTable {
    let symbol = result.currency_symbol;

    let rows = result
        .line_items
        .iter()
        .map(|item| {
            let rate = match item.rate {
                Rate::PerUnit(value) => format_amount(value, symbol),
                Rate::Percentage => DECLARED_VALUE_FEE_LABEL.to_string(),
            };
            [
                item.operation.label().to_string(),
                item.quantity.to_string(),
                rate,
                format_amount(item.total, symbol),
            ]
        })
        .collect();

    let total_row = [
        TOTAL_LABEL.to_string(),
        String::new(),
        String::new(),
        format_amount(result.grand_total, symbol),
    ];

    ResultTable { rows, total_row }
}

fn format_amount(value: f64, symbol: &str) -> String {
    format!("{value:.2} {symbol}")
}
