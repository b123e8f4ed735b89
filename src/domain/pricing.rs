//! Cost engine: turns one order request plus a rate table snapshot into an
//! ordered line-item breakdown and a grand total.
//!
//! Pure and synchronous — no shared state, nothing blocks. Safe to call from
//! any number of tasks as long as each gets its own request and a table
//! snapshot that is not swapped out mid-call.

use std::fmt;

use thiserror::Error;

use super::order::{FulfillmentModel, OrderRequest, OrderValidationError};
use super::tariff::RateTable;

/// Declared-value insurance fee: 0.01% of the declared value, not tiered.
pub const DECLARED_VALUE_FEE_RATE: f64 = 0.0001;
/// Rate label shown for the declared-value fee instead of a currency amount.
pub const DECLARED_VALUE_FEE_LABEL: &str = "0.01%";

/// Billable fulfillment operations, in evaluation order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operation {
    Receiving,
    FboPreparation,
    Storage,
    OrderAssembly,
    ExpressAssembly,
    DeclaredValueFee,
    FbsDelivery,
}

impl Operation {
    /// Label of the operation, matching the tariff sheet's operation-type
    /// column for the tiered operations.
    pub fn label(&self) -> &'static str {
        match self {
            Operation::Receiving => "Приемка",
            Operation::FboPreparation => "Подготовка FBO",
            Operation::Storage => "Хранение",
            Operation::OrderAssembly => "Сборка заказа",
            Operation::ExpressAssembly => "Экспресс-сборка",
            Operation::DeclaredValueFee => "Сбор за объявленную стоимость",
            Operation::FbsDelivery => "Доставка FBS",
        }
    }
}

/// Quantity column of a line item. Most operations bill per count, but
/// storage shows a weight-by-days composite and FBS delivery bills by weight.
#[derive(Clone, Debug, PartialEq)]
pub enum Quantity {
    Count(u32),
    Weight(f64),
    Value(f64),
    WeightAndDays { weight_kg: f64, days: u32 },
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Quantity::Count(count) => write!(f, "{count}"),
            Quantity::Weight(weight) => write!(f, "{weight}"),
            Quantity::Value(value) => write!(f, "{value}"),
            Quantity::WeightAndDays { weight_kg, days } => {
                write!(f, "{weight_kg} кг × {days} дн.")
            }
        }
    }
}

/// Unit rate of a line item: a plain currency amount, or the fixed
/// percentage marker used by the declared-value fee.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Rate {
    PerUnit(f64),
    Percentage,
}

/// One billed operation in the result breakdown. Never mutated once built.
#[derive(Clone, Debug, PartialEq)]
pub struct LineItem {
    pub operation: Operation,
    pub quantity: Quantity,
    pub rate: Rate,
    pub total: f64,
}

/// Full outcome of one calculation. Recomputed on every call, never cached.
#[derive(Clone, Debug, PartialEq)]
pub struct CalculationResult {
    /// Line items in operation evaluation order.
    pub line_items: Vec<LineItem>,
    /// Exact sum of the line totals; rounding happens at presentation time.
    pub grand_total: f64,
    pub currency_symbol: &'static str,
}

#[derive(Debug, Error)]
pub enum PricingError {
    #[error(transparent)]
    InvalidOrder(#[from] OrderValidationError),
    /// The engine refuses to price against a table with no tariff rows at
    /// all; a missing individual rate is a soft 0, an absent table is not.
    #[error("rate table contains no tariff rows")]
    EmptyRateTable,
}

/// Compute the cost breakdown for one order against a rate table snapshot.
///
/// Operations are evaluated in the fixed order of [`Operation`]; each one
/// appends a line item only when its computed amount is strictly positive,
/// so a missing tariff row silently drops that operation instead of failing
/// the whole calculation.
pub fn calculate(
    table: &RateTable,
    request: &OrderRequest,
) -> Result<CalculationResult, PricingError> {
    request.validate()?;
    if table.is_empty() {
        return Err(PricingError::EmptyRateTable);
    }

    let country = request.country;
    let units = request.unit_count;
    let orders = request.order_count;

    let mut line_items = Vec::new();
    let mut push = |operation: Operation, quantity: Quantity, rate: Rate, total: f64| {
        if total > 0.0 {
            line_items.push(LineItem {
                operation,
                quantity,
                rate,
                total,
            });
        }
    };

    let receiving = table.resolve_rate(Operation::Receiving.label(), request.weight_kg, country);
    push(
        Operation::Receiving,
        Quantity::Count(units),
        Rate::PerUnit(receiving),
        receiving * f64::from(units),
    );

    if request.model == FulfillmentModel::Fbo {
        let preparation = table.resolve_rate(
            Operation::FboPreparation.label(),
            request.longest_side_cm,
            country,
        );
        push(
            Operation::FboPreparation,
            Quantity::Count(units),
            Rate::PerUnit(preparation),
            preparation * f64::from(units),
        );
    }

    if request.storage_days > 0 {
        let storage = table.resolve_rate(Operation::Storage.label(), request.weight_kg, country);
        push(
            Operation::Storage,
            Quantity::WeightAndDays {
                weight_kg: request.weight_kg,
                days: request.storage_days,
            },
            Rate::PerUnit(storage),
            storage * f64::from(request.storage_days),
        );
    }

    let assembly = table.resolve_rate(Operation::OrderAssembly.label(), request.weight_kg, country);
    push(
        Operation::OrderAssembly,
        Quantity::Count(orders),
        Rate::PerUnit(assembly),
        assembly * f64::from(orders),
    );

    if request.is_express {
        let express = table.resolve_rate(
            Operation::ExpressAssembly.label(),
            f64::from(orders),
            country,
        );
        push(
            Operation::ExpressAssembly,
            Quantity::Count(orders),
            Rate::PerUnit(express),
            express * f64::from(orders),
        );
    }

    if request.declared_value > 0.0 {
        push(
            Operation::DeclaredValueFee,
            Quantity::Value(request.declared_value),
            Rate::Percentage,
            request.declared_value * DECLARED_VALUE_FEE_RATE,
        );
    }

    if request.model == FulfillmentModel::Fbs {
        let delivery = table.resolve_rate(Operation::FbsDelivery.label(), request.weight_kg, country);
        // Delivery is a single lookup per order batch, not multiplied out.
        push(
            Operation::FbsDelivery,
            Quantity::Weight(request.weight_kg),
            Rate::PerUnit(delivery),
            delivery,
        );
    }

    let grand_total = line_items.iter().map(|item| item.total).sum();

    Ok(CalculationResult {
        line_items,
        grand_total,
        currency_symbol: country.currency_symbol(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::currency::Country;
    use crate::domain::tariff::{RateTable, RawRecord};
    use serde_json::json;

    fn record(operation: &str, ceiling: Option<f64>, rub: f64) -> RawRecord {
        let mut map = RawRecord::new();
        map.insert("Тип операции".to_string(), json!(operation));
        match ceiling {
            Some(value) => map.insert("До ...".to_string(), json!(value)),
            None => map.insert("До ...".to_string(), json!("")),
        };
        map.insert("Рубль (Россия)".to_string(), json!(rub));
        map
    }

    fn standard_table() -> RateTable {
        RateTable::from_records(&[
            record("Приемка", Some(5.0), 50.0),
            record("Приемка", None, 90.0),
            record("Подготовка FBO", Some(30.0), 20.0),
            record("Подготовка FBO", Some(60.0), 35.0),
            record("Хранение", Some(5.0), 8.0),
            record("Сборка заказа", Some(5.0), 80.0),
            record("Сборка заказа", None, 120.0),
            record("Экспресс-сборка", Some(5.0), 240.0),
            record("Доставка FBS", Some(5.0), 120.0),
        ])
    }

    fn fbs_request() -> OrderRequest {
        OrderRequest {
            model: FulfillmentModel::Fbs,
            country: Country::Russia,
            city: "Москва".to_string(),
            weight_kg: 3.0,
            unit_count: 10,
            order_count: 2,
            longest_side_cm: 0.0,
            storage_days: 0,
            declared_value: 0.0,
            is_express: false,
        }
    }

    fn fbo_request() -> OrderRequest {
        OrderRequest {
            model: FulfillmentModel::Fbo,
            longest_side_cm: 40.0,
            ..fbs_request()
        }
    }

    #[test]
    fn fbs_order_breakdown_matches_the_table() {
        let result = calculate(&standard_table(), &fbs_request()).unwrap();

        let operations: Vec<_> = result
            .line_items
            .iter()
            .map(|item| item.operation)
            .collect();
        assert_eq!(
            operations,
            vec![
                Operation::Receiving,
                Operation::OrderAssembly,
                Operation::FbsDelivery
            ]
        );

        let receiving = &result.line_items[0];
        assert_eq!(receiving.quantity, Quantity::Count(10));
        assert_eq!(receiving.rate, Rate::PerUnit(50.0));
        assert_eq!(receiving.total, 500.0);

        let assembly = &result.line_items[1];
        assert_eq!(assembly.total, 160.0); // 80 × 2 orders

        let delivery = &result.line_items[2];
        assert_eq!(delivery.quantity, Quantity::Weight(3.0));
        assert_eq!(delivery.total, 120.0); // single lookup, not multiplied

        assert_eq!(result.grand_total, 500.0 + 160.0 + 120.0);
        assert_eq!(result.currency_symbol, "₽");
    }

    #[test]
    fn fbo_preparation_tiers_on_longest_side() {
        // 40 cm falls past the 30 cm ceiling into the 60 cm tier.
        let result = calculate(&standard_table(), &fbo_request()).unwrap();
        let preparation = result
            .line_items
            .iter()
            .find(|item| item.operation == Operation::FboPreparation)
            .unwrap();
        assert_eq!(preparation.rate, Rate::PerUnit(35.0));
        assert_eq!(preparation.total, 350.0);
    }

    #[test]
    fn grand_total_is_exact_sum_of_line_totals() {
        let mut request = fbo_request();
        request.storage_days = 10;
        request.declared_value = 12345.0;
        request.is_express = true;

        let result = calculate(&standard_table(), &request).unwrap();
        let sum: f64 = result.line_items.iter().map(|item| item.total).sum();
        assert_eq!(result.grand_total, sum);
    }

    #[test]
    fn storage_bills_per_day_with_composite_quantity() {
        let mut request = fbs_request();
        request.storage_days = 10;

        let result = calculate(&standard_table(), &request).unwrap();
        let storage = result
            .line_items
            .iter()
            .find(|item| item.operation == Operation::Storage)
            .unwrap();
        assert_eq!(storage.total, 80.0); // 8 × 10 days
        assert_eq!(storage.quantity.to_string(), "3 кг × 10 дн.");
    }

    #[test]
    fn declared_value_fee_keeps_full_precision_and_percent_label() {
        let mut request = fbs_request();
        request.declared_value = 12345.0;

        let result = calculate(&standard_table(), &request).unwrap();
        let fee = result
            .line_items
            .iter()
            .find(|item| item.operation == Operation::DeclaredValueFee)
            .unwrap();
        assert_eq!(fee.rate, Rate::Percentage);
        assert_eq!(fee.quantity, Quantity::Value(12345.0));
        assert!((fee.total - 1.2345).abs() < 1e-12);
        // Display rounding lands on the expected 2-decimal figure.
        assert_eq!((fee.total * 100.0).round() / 100.0, 1.23);
    }

    #[test]
    fn express_order_carries_both_assembly_items() {
        let mut request = fbs_request();
        request.is_express = true;

        let result = calculate(&standard_table(), &request).unwrap();
        let operations: Vec<_> = result
            .line_items
            .iter()
            .map(|item| item.operation)
            .collect();
        assert!(operations.contains(&Operation::OrderAssembly));
        assert!(operations.contains(&Operation::ExpressAssembly));

        let express = result
            .line_items
            .iter()
            .find(|item| item.operation == Operation::ExpressAssembly)
            .unwrap();
        assert_eq!(express.total, 480.0); // 240 × 2 orders
    }

    #[test]
    fn zero_rate_operations_are_omitted() {
        // Table without storage or express rows: those operations resolve to
        // 0 and must not appear even when requested.
        let table = RateTable::from_records(&[
            record("Приемка", Some(5.0), 50.0),
            record("Сборка заказа", None, 80.0),
            record("Доставка FBS", None, 120.0),
        ]);
        let mut request = fbs_request();
        request.storage_days = 30;
        request.is_express = true;

        let result = calculate(&table, &request).unwrap();
        assert!(result
            .line_items
            .iter()
            .all(|item| item.operation != Operation::Storage
                && item.operation != Operation::ExpressAssembly));
        assert!(result.line_items.iter().all(|item| item.total > 0.0));
    }

    #[test]
    fn unit_rate_stays_consistent_with_line_total() {
        let mut request = fbo_request();
        request.is_express = true;
        let result = calculate(&standard_table(), &request).unwrap();

        for item in &result.line_items {
            let Rate::PerUnit(rate) = item.rate else { continue };
            let quantity = match item.quantity {
                Quantity::Count(count) => f64::from(count),
                // Weight quantity is informational for the flat delivery item.
                _ => continue,
            };
            let implied = item.total / quantity;
            assert!(((implied * 100.0).round() - (rate * 100.0).round()).abs() < 1e-9);
        }
    }

    #[test]
    fn invalid_request_refuses_to_calculate() {
        let mut request = fbs_request();
        request.weight_kg = -1.0;
        assert!(matches!(
            calculate(&standard_table(), &request),
            Err(PricingError::InvalidOrder(_))
        ));
    }

    #[test]
    fn empty_table_refuses_to_calculate() {
        let table = RateTable::from_records(&[]);
        assert!(matches!(
            calculate(&table, &fbs_request()),
            Err(PricingError::EmptyRateTable)
        ));
    }

    #[test]
    fn unknown_country_prices_from_the_russia_column() {
        let mut request = fbs_request();
        request.country = Country::from_name("Нарния");
        let result = calculate(&standard_table(), &request).unwrap();
        assert_eq!(result.currency_symbol, "₽");
        assert_eq!(result.line_items[0].rate, Rate::PerUnit(50.0));
    }
}
