//! Tiered rate table built from raw tariff-sheet records.
//!
//! Records arrive as one JSON object per sheet row, keyed by column header.
//! All raw header strings are interpreted here, once, at load time; the rest
//! of the crate only ever sees typed rows keyed by [`Country`].

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::currency::Country;

/// Header of the operation-type column in the tariff sheet.
const OPERATION_HEADER: &str = "Тип операции";
/// Header of the tier-ceiling column ("up to ..." weight, length or count).
const CEILING_HEADER: &str = "До ...";

/// A raw tariff-sheet row: column header → cell value.
pub type RawRecord = HashMap<String, Value>;

/// One tier of an operation's tariff.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RateRow {
    /// Inclusive tier ceiling; `None` means unbounded and matches any measure.
    pub ceiling: Option<f64>,
    /// Per-country rate, local currency. Unparseable cells are simply absent.
    pub rates: HashMap<Country, f64>,
}

impl RateRow {
    /// Rate for a country; a missing cell resolves to 0.0, never an error.
    pub fn rate_for(&self, country: Country) -> f64 {
        self.rates.get(&country).copied().unwrap_or(0.0)
    }
}

/// Immutable snapshot of the tariff sheet, grouped by operation type.
///
/// Rows keep their source order within each operation, which the sheet is
/// assumed to maintain ascending by ceiling; lookups scan linearly and do not
/// re-sort or reject out-of-order tiers.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RateTable {
    groups: HashMap<String, Vec<RateRow>>,
}

impl RateTable {
    /// Build a table from raw sheet records. Records with a blank or absent
    /// operation type are dropped; everything else is kept in source order.
    pub fn from_records(records: &[RawRecord]) -> RateTable {
        let mut groups: HashMap<String, Vec<RateRow>> = HashMap::new();

        for record in records {
            let Some(operation) = record
                .get(OPERATION_HEADER)
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|label| !label.is_empty())
            else {
                continue;
            };

            let ceiling = record.get(CEILING_HEADER).and_then(parse_cell);

            let mut rates = HashMap::new();
            for country in Country::ALL {
                if let Some(rate) = record.get(country.column_header()).and_then(parse_cell) {
                    rates.insert(country, rate);
                }
            }

            groups
                .entry(operation.to_string())
                .or_default()
                .push(RateRow { ceiling, rates });
        }

        RateTable { groups }
    }

    /// Rebuild a table from previously extracted rows (disk snapshot path).
    pub fn from_groups(groups: HashMap<String, Vec<RateRow>>) -> RateTable {
        RateTable { groups }
    }

    pub fn is_empty(&self) -> bool {
        self.groups.values().all(Vec::is_empty)
    }

    /// Total number of tier rows across all operations.
    pub fn row_count(&self) -> usize {
        self.groups.values().map(Vec::len).sum()
    }

    pub fn groups(&self) -> &HashMap<String, Vec<RateRow>> {
        &self.groups
    }

    /// Resolve the rate for an operation at a given measure in a country.
    ///
    /// First row whose inclusive ceiling covers the measure wins; a missing
    /// ceiling is treated as unbounded. A measure beyond every ceiling clamps
    /// to the last row so an out-of-range order still gets a quote. An unknown
    /// operation resolves to 0.0 — "no applicable rate", not an error.
    pub fn resolve_rate(&self, operation: &str, measure: f64, country: Country) -> f64 {
        let Some(rows) = self.groups.get(operation).filter(|rows| !rows.is_empty()) else {
            return 0.0;
        };

        for row in rows {
            if measure <= row.ceiling.unwrap_or(f64::INFINITY) {
                return row.rate_for(country);
            }
        }

        // Nothing matched (no unbounded row): clamp to the last tier.
        rows[rows.len() - 1].rate_for(country)
    }
}

/// Parse a sheet cell into a number. Cells come back from the feed as JSON
/// numbers or strings; anything else (or an empty/garbled string) is `None`.
fn parse_cell(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(operation: &str, ceiling: Value, rub: Value) -> RawRecord {
        let mut map = RawRecord::new();
        map.insert(OPERATION_HEADER.to_string(), json!(operation));
        map.insert(CEILING_HEADER.to_string(), ceiling);
        map.insert("Рубль (Россия)".to_string(), rub);
        map
    }

    fn receiving_table() -> RateTable {
        RateTable::from_records(&[
            record("Приемка", json!(5), json!(50)),
            record("Приемка", json!(15), json!(80)),
            record("Приемка", json!(""), json!(110)),
        ])
    }

    #[test]
    fn blank_operation_rows_are_dropped() {
        let table = RateTable::from_records(&[
            record("", json!(5), json!(50)),
            record("   ", json!(10), json!(60)),
            record("Приемка", json!(5), json!(50)),
        ]);
        assert_eq!(table.row_count(), 1);
    }

    #[test]
    fn first_covering_tier_wins() {
        let table = receiving_table();
        assert_eq!(table.resolve_rate("Приемка", 3.0, Country::Russia), 50.0);
        assert_eq!(table.resolve_rate("Приемка", 5.0, Country::Russia), 50.0);
        assert_eq!(table.resolve_rate("Приемка", 5.1, Country::Russia), 80.0);
    }

    #[test]
    fn blank_ceiling_is_unbounded() {
        let table = receiving_table();
        assert_eq!(table.resolve_rate("Приемка", 999.0, Country::Russia), 110.0);
    }

    #[test]
    fn measure_beyond_all_ceilings_clamps_to_last_row() {
        let table = RateTable::from_records(&[
            record("Приемка", json!(5), json!(50)),
            record("Приемка", json!(15), json!(80)),
        ]);
        assert_eq!(table.resolve_rate("Приемка", 40.0, Country::Russia), 80.0);
    }

    #[test]
    fn unknown_operation_resolves_to_zero() {
        let table = receiving_table();
        assert_eq!(table.resolve_rate("Фасовка", 1.0, Country::Russia), 0.0);
    }

    #[test]
    fn missing_country_cell_resolves_to_zero() {
        let table = receiving_table();
        assert_eq!(table.resolve_rate("Приемка", 1.0, Country::Kazakhstan), 0.0);
    }

    #[test]
    fn unparseable_rate_cell_resolves_to_zero() {
        let table = RateTable::from_records(&[record("Приемка", json!(5), json!("n/a"))]);
        assert_eq!(table.resolve_rate("Приемка", 1.0, Country::Russia), 0.0);
    }

    #[test]
    fn string_cells_parse_as_numbers() {
        let table = RateTable::from_records(&[record("Приемка", json!("5"), json!(" 42.5 "))]);
        assert_eq!(table.resolve_rate("Приемка", 4.0, Country::Russia), 42.5);
    }

    #[test]
    fn tier_selection_is_monotonic_in_the_measure() {
        let table = receiving_table();
        let mut previous = f64::MIN;
        for step in 0..40 {
            let measure = step as f64;
            let rate = table.resolve_rate("Приемка", measure, Country::Russia);
            assert!(rate >= previous, "rate decreased at measure {measure}");
            previous = rate;
        }
    }

    #[test]
    fn empty_table_reports_empty() {
        assert!(RateTable::from_records(&[]).is_empty());
        assert!(!receiving_table().is_empty());
    }
}
