//! Pure calculation logic: tariffs, orders, pricing and formatting.

pub mod currency;
pub mod format;
pub mod order;
pub mod pricing;
pub mod tariff;

pub use currency::Country;
pub use format::{format_result, ResultTable, TABLE_HEADER, TOTAL_LABEL};
pub use order::{FieldIssue, FulfillmentModel, OrderRequest, OrderValidationError};
pub use pricing::{
    calculate, CalculationResult, LineItem, Operation, PricingError, Quantity, Rate,
    DECLARED_VALUE_FEE_LABEL, DECLARED_VALUE_FEE_RATE,
};
pub use tariff::{RateRow, RateTable, RawRecord};
